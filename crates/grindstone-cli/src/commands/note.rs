use clap::Args;
use grindstone_core::workspace;

use super::common::load_app;

#[derive(Args)]
pub struct NoteArgs {
    /// Problem slug, or the note text itself when only one argument is
    /// given (the current problem is used then)
    pub slug_or_text: String,
    /// Note text when a slug was given first
    pub text: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
}

pub fn run(args: NoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app()?;
    let (slug, text) = match args.text {
        Some(text) => (args.slug_or_text, text),
        None => (app.slug_or_current(None)?, args.slug_or_text),
    };
    if text.trim().is_empty() {
        return Err("note text is required".into());
    }

    let tags = parse_tags(args.tags.as_deref().unwrap_or(""));
    app.store.add_note(&slug, &text, &tags)?;
    let _ = workspace::append_note_line(&app.problem_dir(&slug), text.trim(), &tags);
    let _ = app.sync_meta(&slug);
    println!("Saved note for {slug}");
    Ok(())
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_split_on_commas_and_drop_blanks() {
        assert_eq!(parse_tags("dp, graphs ,,  "), vec!["dp", "graphs"]);
        assert!(parse_tags("").is_empty());
    }
}
