use clap::Subcommand;
use grindstone_core::CustomCase;
use serde_json::Value;

use super::common::load_app;

#[derive(Subcommand)]
pub enum CaseAction {
    /// Record a custom test case
    Add {
        /// Problem slug; defaults to the current problem
        slug: Option<String>,
        /// Case input as JSON, usually an array of arguments
        #[arg(long)]
        input: String,
        /// Expected output as JSON; omit to just print what the
        /// solution returns
        #[arg(long)]
        expected: Option<String>,
    },
    /// List recorded custom cases
    List {
        /// Problem slug; defaults to the current problem
        slug: Option<String>,
    },
}

pub fn run(action: CaseAction) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app()?;
    match action {
        CaseAction::Add {
            slug,
            input,
            expected,
        } => {
            let slug = app.slug_or_current(slug.as_deref())?;
            let input: Value = serde_json::from_str(&input)
                .map_err(|e| format!("invalid case input JSON: {e}"))?;
            let expected = match expected {
                Some(raw) => Some(
                    serde_json::from_str(&raw)
                        .map_err(|e| format!("invalid expected JSON: {e}"))?,
                ),
                None => None,
            };
            app.store.add_custom_case(&slug, &CustomCase { input, expected })?;
            println!("Recorded case for {slug}");
        }
        CaseAction::List { slug } => {
            let slug = app.slug_or_current(slug.as_deref())?;
            let cases = app.store.custom_cases(&slug)?;
            if cases.is_empty() {
                println!("No custom cases for {slug}");
                return Ok(());
            }
            for (i, case) in cases.iter().enumerate() {
                match &case.expected {
                    Some(expected) => {
                        println!("{}. input={} expected={}", i + 1, case.input, expected)
                    }
                    None => println!("{}. input={}", i + 1, case.input),
                }
            }
        }
    }
    Ok(())
}
