//! Configuration loading and persistence.
//!
//! Settings live in TOML at the XDG config path
//! (`~/.config/grindstone/config.toml`), with an optional per-project
//! overlay at `.grindstone/config.toml` merged on top. Credentials can
//! also come from environment variables, which win over both files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Directory for the project-local overlay and database.
pub const PROJECT_DIR: &str = ".grindstone";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub harness: HarnessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the judge.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Cookie credentials for the judge. Both values are required for
/// submitting; browsing cached problems works without them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub session: String,
    #[serde(default)]
    pub csrf: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory problem folders are created under.
    #[serde(default = "default_problems_dir")]
    pub problems_dir: String,
    /// Location of the SQLite database.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Python interpreter used by the test harness.
    #[serde(default = "default_python")]
    pub python: String,
}

fn default_base_url() -> String {
    "https://leetcode.com".to_string()
}

fn default_problems_dir() -> String {
    "problems".to_string()
}

fn default_db_path() -> String {
    format!("{PROJECT_DIR}/grindstone.db")
}

fn default_python() -> String {
    "python3".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            base_url: default_base_url(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            problems_dir: default_problems_dir(),
            db_path: default_db_path(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            python: default_python(),
        }
    }
}

impl Config {
    /// XDG config file path.
    pub fn xdg_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("grindstone").join("config.toml"))
    }

    /// Per-project overlay path, relative to the working directory.
    pub fn project_path() -> PathBuf {
        PathBuf::from(PROJECT_DIR).join("config.toml")
    }

    /// Load the effective configuration: XDG file, then project
    /// overlay, then environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        let mut paths = Vec::new();
        if let Ok(xdg) = Self::xdg_path() {
            paths.push(xdg);
        }
        paths.push(Self::project_path());
        let mut config = Self::load_from(&paths)?;
        config.apply_env();
        Ok(config)
    }

    /// Load by merging the given files in order; later files win
    /// key-by-key. Missing files are skipped.
    pub fn load_from(paths: &[PathBuf]) -> Result<Config, ConfigError> {
        let mut merged = toml::Table::new();
        for path in paths {
            let raw = match std::fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })
                }
            };
            let table: toml::Table = toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
            // Surface type errors against the file that caused them.
            let _: Config = table.clone().try_into().map_err(|e: toml::de::Error| {
                ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                }
            })?;
            merge_tables(&mut merged, table);
        }
        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::LoadFailed {
                path: Self::project_path(),
                message: e.to_string(),
            })
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("LEETCODE_SESSION") {
            if !v.is_empty() {
                self.auth.session = v;
            }
        }
        let csrf = std::env::var("LEETCODE_CSRFTOKEN").or_else(|_| std::env::var("CSRFTOKEN"));
        if let Ok(v) = csrf {
            if !v.is_empty() {
                self.auth.csrf = v;
            }
        }
        if let Ok(v) = std::env::var("LEETCODE_SITE") {
            if !v.is_empty() {
                self.site.base_url = v;
            }
        }
    }

    /// Save to the project overlay or the XDG file. Returns the path
    /// written.
    pub fn save(&self, project: bool) -> Result<PathBuf, ConfigError> {
        let path = if project {
            Self::project_path()
        } else {
            Self::xdg_path()?
        };
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |e: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
            }
        }
        let raw = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(path, raw).map_err(|e| save_err(e.to_string()))
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.workspace.db_path)
    }

    pub fn problems_dir(&self) -> PathBuf {
        PathBuf::from(&self.workspace.problems_dir)
    }

    pub fn has_auth(&self) -> bool {
        !self.auth.session.is_empty() && !self.auth.csrf.is_empty()
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(src) => {
                if let Some(toml::Value::Table(dst)) = base.get_mut(&key) {
                    merge_tables(dst, src);
                } else {
                    base.insert(key, toml::Value::Table(src));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.site.base_url, "https://leetcode.com");
        assert_eq!(config.harness.python, "python3");
        assert_eq!(config.problems_dir(), PathBuf::from("problems"));
        assert_eq!(config.db_path(), PathBuf::from(".grindstone/grindstone.db"));
        assert!(!config.has_auth());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.auth.session = "sess".into();
        config.auth.csrf = "tok".into();
        config.workspace.problems_dir = "katas".into();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&[path]).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.has_auth());
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&[dir.path().join("absent.toml")]).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn overlay_wins_key_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.toml");
        let overlay = dir.path().join("overlay.toml");
        std::fs::write(
            &base,
            "[auth]\nsession = \"global\"\ncsrf = \"global-tok\"\n\n[harness]\npython = \"python3.12\"\n",
        )
        .unwrap();
        std::fs::write(&overlay, "[auth]\nsession = \"project\"\n").unwrap();

        let loaded = Config::load_from(&[base, overlay]).unwrap();
        assert_eq!(loaded.auth.session, "project");
        assert_eq!(loaded.auth.csrf, "global-tok");
        assert_eq!(loaded.harness.python, "python3.12");
        assert_eq!(loaded.site.base_url, "https://leetcode.com");
    }

    #[test]
    fn malformed_toml_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid [toml").unwrap();
        let err = Config::load_from(&[path.clone()]).unwrap_err();
        match err {
            ConfigError::LoadFailed { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn type_error_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typed.toml");
        std::fs::write(&path, "[auth]\nsession = 3\n").unwrap();
        let err = Config::load_from(&[path.clone()]).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }
}
