use clap::Args;
use grindstone_core::client;
use grindstone_core::{workspace, Client, Difficulty, Status};

use super::common::{load_app, parse_difficulty, App};

#[derive(Args)]
pub struct SolveArgs {
    /// Fetch this exact problem
    #[arg(long)]
    pub slug: Option<String>,
    /// Pick a random unlocked problem (the default when --slug is
    /// omitted)
    #[arg(long)]
    pub random: bool,
    /// Restrict picks to one difficulty (easy/medium/hard)
    #[arg(long, value_parser = parse_difficulty)]
    pub difficulty: Option<Difficulty>,
    /// Keep only problems tagged with this topic; applied after the
    /// fetch, so picks without the topic are skipped
    #[arg(long)]
    pub topic: Option<String>,
    /// Number of problems to prepare
    #[arg(long, default_value_t = 1)]
    pub count: usize,
    /// Solve timer length in minutes
    #[arg(long, default_value_t = 30)]
    pub timer: i64,
    /// Do not start a timer for the first prepared problem
    #[arg(long)]
    pub no_timer: bool,
}

pub fn run(args: SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app()?;
    let client = app.client()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(solve(&app, &client, args))
}

async fn solve(
    app: &App,
    client: &Client,
    args: SolveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let explicit = args
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if args.random && explicit.is_some() {
        return Err("--random cannot be combined with --slug".into());
    }

    let slugs: Vec<String> = match explicit {
        Some(slug) => vec![slug.to_string()],
        None => {
            let summaries = client.summaries().await?;
            if args.count > 1 {
                client::pick_many(&summaries, args.difficulty, args.count)?
                    .into_iter()
                    .map(|s| s.slug.clone())
                    .collect()
            } else {
                vec![client::pick_random(&summaries, args.difficulty)?.slug.clone()]
            }
        }
    };

    let mut prepared = 0;
    for slug in &slugs {
        let mut fetched = match client.question(slug).await {
            Ok(q) => q,
            Err(e) => {
                eprintln!("warning: skipping {slug}: {e}");
                continue;
            }
        };
        if let Some(topic) = args.topic.as_deref() {
            if !fetched.topics.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
                continue;
            }
        }
        if let Some(want) = args.difficulty {
            if fetched.difficulty != want {
                continue;
            }
        }

        fetched.status = Status::InProgress;
        app.store.upsert_problem(&fetched)?;
        // An upsert of an already-cached problem keeps its old status;
        // bump stale todo rows so the pick shows up as in progress.
        let mut row = app.store.problem(slug)?;
        if row.status == Status::Todo {
            app.store.set_status(slug, Status::InProgress)?;
            row.status = Status::InProgress;
        }

        let dir = app.problem_dir(slug);
        workspace::ensure_problem_files(&dir, &row)?;
        workspace::write_meta(&dir, &row)?;

        prepared += 1;
        if prepared == 1 {
            app.store.set_current_problem(slug)?;
            if !args.no_timer {
                app.store.start_timer(slug, args.timer, false)?;
            }
        }
    }

    if prepared == 0 {
        return Err("no problems prepared; filters may be too restrictive".into());
    }
    let current = app.store.current_problem().unwrap_or_default();
    println!("Prepared {prepared} problem(s). Current: {current}");
    println!("Open: grindstone open {current}");
    if !args.no_timer {
        println!("Timer started: {} minutes", args.timer);
    }
    Ok(())
}
