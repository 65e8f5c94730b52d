//! Shared plumbing for command implementations: config + store
//! loading, current-problem resolution, and workspace file sync.

use std::path::PathBuf;

use grindstone_core::{workspace, Client, Config, Difficulty, Status, Store};

pub struct App {
    pub config: Config,
    pub store: Store,
}

/// Load config, make sure the problems directory exists, and open the
/// store.
pub fn load_app() -> Result<App, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    std::fs::create_dir_all(config.problems_dir())?;
    let store = Store::open(&config.db_path())?;
    Ok(App { config, store })
}

impl App {
    /// Resolve an explicit slug argument, falling back to the current
    /// problem.
    pub fn slug_or_current(
        &self,
        slug: Option<&str>,
    ) -> Result<String, Box<dyn std::error::Error>> {
        match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Ok(s.to_string()),
            None => self
                .store
                .current_problem()
                .map_err(|_| "no current problem set; pass a slug".into()),
        }
    }

    /// Rewrite README.md and meta.json for a slug from its cached row.
    pub fn sync_meta(&self, slug: &str) -> Result<(), Box<dyn std::error::Error>> {
        let problem = self.store.problem(slug)?;
        let dir = self.problem_dir(slug);
        workspace::ensure_problem_files(&dir, &problem)?;
        workspace::write_meta(&dir, &problem)?;
        Ok(())
    }

    pub fn problem_dir(&self, slug: &str) -> PathBuf {
        workspace::problem_dir(&self.config.problems_dir(), slug)
    }

    pub fn solution_path(&self, slug: &str) -> PathBuf {
        workspace::solution_path(&self.problem_dir(slug))
    }

    pub fn client(&self) -> Result<Client, Box<dyn std::error::Error>> {
        Ok(Client::new(&self.config)?)
    }
}

pub fn parse_difficulty(raw: &str) -> Result<Difficulty, String> {
    Difficulty::parse(raw)
        .ok_or_else(|| format!("unknown difficulty: {raw} (expected easy, medium, or hard)"))
}

pub fn parse_status(raw: &str) -> Result<Status, String> {
    Status::parse(raw)
        .ok_or_else(|| format!("unknown status: {raw} (expected todo, in_progress, or solved)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parser_rejects_garbage() {
        assert_eq!(parse_difficulty("Medium").unwrap(), Difficulty::Medium);
        assert!(parse_difficulty("brutal").is_err());
    }

    #[test]
    fn status_parser_accepts_snake_case() {
        assert_eq!(parse_status("in_progress").unwrap(), Status::InProgress);
        assert!(parse_status("done").is_err());
    }
}
