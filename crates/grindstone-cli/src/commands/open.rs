use clap::Args;
use grindstone_core::workspace;

use super::common::load_app;

#[derive(Args)]
pub struct OpenArgs {
    /// Problem slug; defaults to the current problem
    pub slug: Option<String>,
    /// Open the problem directory instead of solution.py
    #[arg(long)]
    pub dir: bool,
}

pub fn run(args: OpenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app()?;
    let slug = app.slug_or_current(args.slug.as_deref())?;
    app.sync_meta(&slug)?;

    let path = if args.dir {
        app.problem_dir(&slug)
    } else {
        app.solution_path(&slug)
    };
    println!("Opening {}", path.display());
    workspace::open_in_editor(&path)?;
    Ok(())
}
