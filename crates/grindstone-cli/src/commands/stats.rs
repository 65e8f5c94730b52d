use clap::Args;

use super::common::load_app;

#[derive(Args)]
pub struct StatsArgs {
    /// Print the full snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app()?;
    let stats = app.store.stats()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!(
        "Solved: Easy={} Medium={} Hard={}",
        stats.solved_easy, stats.solved_medium, stats.solved_hard
    );
    println!("Cached: {}", stats.total_problems);
    println!("Topic coverage: {}", stats.topic_coverage);
    println!("Avg solve time: {:.1} min", stats.avg_solve_sec / 60.0);
    println!(
        "7-day solved: {} (prev7={})",
        stats.solved_last_7d, stats.solved_prev_7d
    );
    let momentum = stats.solved_last_7d - stats.solved_prev_7d;
    println!("Momentum: {momentum:+} vs previous 7 days");

    println!();
    println!("Recent activity:");
    if stats.recent_activity.is_empty() {
        println!("  (none yet)");
        return Ok(());
    }
    for event in &stats.recent_activity {
        let when = event.created_at.format("%Y-%m-%d %H:%M");
        if event.payload.is_empty() {
            println!("  {when}  {} {}", event.kind, event.slug);
        } else {
            println!("  {when}  {} {} ({})", event.kind, event.slug, event.payload);
        }
    }
    Ok(())
}
