use clap::Subcommand;

use super::common::load_app;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a solve timer
    Start {
        /// Problem slug; defaults to the current problem
        slug: Option<String>,
        /// Planned length in minutes
        #[arg(long, default_value_t = 30)]
        minutes: i64,
    },
    /// Stop the newest open timer and bank the elapsed time
    Stop {
        /// Problem slug; defaults to the current problem
        slug: Option<String>,
    },
    /// Add minutes to a problem without a running timer
    Extend {
        /// Problem slug; defaults to the current problem
        slug: Option<String>,
        /// Minutes to add
        #[arg(long, default_value_t = 10)]
        minutes: i64,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = load_app()?;
    match action {
        TimerAction::Start { slug, minutes } => {
            let slug = app.slug_or_current(slug.as_deref())?;
            app.store.start_timer(&slug, minutes, true)?;
            println!("Started {minutes}-minute timer for {slug}");
        }
        TimerAction::Stop { slug } => {
            let slug = app.slug_or_current(slug.as_deref())?;
            let elapsed = app.store.stop_timer(&slug)?;
            if elapsed == 0 {
                println!("No active timer for {slug}");
                return Ok(());
            }
            let _ = app.sync_meta(&slug);
            println!("Stopped timer for {slug}: +{}m{}s", elapsed / 60, elapsed % 60);
        }
        TimerAction::Extend { slug, minutes } => {
            let slug = app.slug_or_current(slug.as_deref())?;
            app.store.add_manual_time(&slug, minutes)?;
            let _ = app.sync_meta(&slug);
            println!("Added {minutes} minutes to {slug}");
        }
    }
    Ok(())
}
