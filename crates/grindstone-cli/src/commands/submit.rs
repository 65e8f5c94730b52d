use clap::Args;
use grindstone_core::{Client, Problem};

use super::common::{load_app, App};

#[derive(Args)]
pub struct SubmitArgs {
    /// Problem slug; defaults to the current problem
    pub slug: Option<String>,
}

pub fn run(args: SubmitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app()?;
    let slug = app.slug_or_current(args.slug.as_deref())?;
    let problem = app.store.problem(&slug)?;
    let client = app.client()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(submit(&app, &client, slug, problem))
}

async fn submit(
    app: &App,
    client: &Client,
    slug: String,
    mut problem: Problem,
) -> Result<(), Box<dyn std::error::Error>> {
    // Rows seeded before the question endpoint existed may miss the
    // internal id the submit API wants; backfill from a fresh fetch.
    if problem.question_id.is_empty() {
        let fetched = client.question(&slug).await?;
        problem.question_id = fetched.question_id;
    }

    let code = std::fs::read_to_string(app.solution_path(&slug))?;
    let outcome = client.submit(&problem, &code).await?;
    app.store
        .save_submission_result(&slug, &outcome.status, &outcome.runtime, &outcome.memory)?;
    let _ = app.sync_meta(&slug);

    println!("Submission {}: {}", outcome.id, outcome.status);
    if !outcome.runtime.is_empty() || !outcome.memory.is_empty() {
        println!("Runtime: {}  Memory: {}", outcome.runtime, outcome.memory);
    }
    Ok(())
}
