use clap::Args;
use grindstone_core::{Difficulty, ProblemFilter, Status};

use super::common::{load_app, parse_difficulty, parse_status};

#[derive(Args)]
pub struct ListArgs {
    /// Filter by difficulty (easy/medium/hard)
    #[arg(long, value_parser = parse_difficulty)]
    pub difficulty: Option<Difficulty>,
    /// Filter by status (todo/in_progress/solved)
    #[arg(long, value_parser = parse_status)]
    pub status: Option<Status>,
    /// Substring match against slug or title
    #[arg(long)]
    pub query: Option<String>,
    /// Print the rows as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app()?;
    let problems = app.store.list_problems(&ProblemFilter {
        difficulty: args.difficulty,
        status: args.status,
        query: args.query,
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&problems)?);
        return Ok(());
    }
    if problems.is_empty() {
        println!("No cached problems match.");
        return Ok(());
    }
    for p in &problems {
        let minutes = p.time_spent_sec / 60;
        println!(
            "{:>5}  {:<7}  {:<11}  {:<40}  {}m",
            p.frontend_id,
            p.difficulty.as_str(),
            p.status.as_str(),
            p.slug,
            minutes
        );
    }
    Ok(())
}
