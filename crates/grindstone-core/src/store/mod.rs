//! SQLite-backed entity store.
//!
//! All practice state lives in one database file: problem metadata,
//! notes, custom test cases, test runs, timer sessions, the append-only
//! activity log, and a key/value settings table holding the current
//! problem pointer. The store is the sole writer of every table;
//! the timer engine and the stats aggregator go through it.

pub mod activity;
pub mod problem;
pub mod record;
pub mod stats;
pub mod timer;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;

pub use activity::{ActivityEvent, EventKind};
pub use problem::{Difficulty, Problem, ProblemFilter, Status};
pub use record::{CustomCase, TestRun};
pub use stats::Stats;

const CURRENT_SLUG_KEY: &str = "current_slug";

/// Handle to the practice database.
pub struct Store {
    conn: Connection,
    clock: Box<dyn Clock>,
}

impl Store {
    /// Open (or create) the database at the given path and run migrations.
    /// Parent directories are created as needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_clock(path, SystemClock)
    }

    /// Open with an explicit time source.
    pub fn open_with_clock(path: &Path, clock: impl Clock + 'static) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Persistence(format!("create {}: {e}", parent.display())))?;
        }
        let conn = Connection::open(path)?;
        let store = Store {
            conn,
            clock: Box::new(clock),
        };
        store.migrate()?;
        debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    /// In-memory database for tests.
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::open_memory_with_clock(SystemClock)
    }

    #[cfg(test)]
    pub fn open_memory_with_clock(clock: impl Clock + 'static) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Store {
            conn,
            clock: Box::new(clock),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS problems (
                slug TEXT PRIMARY KEY,
                frontend_id TEXT NOT NULL DEFAULT '',
                question_id TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL DEFAULT '',
                difficulty TEXT NOT NULL DEFAULT 'Unknown',
                topics TEXT NOT NULL DEFAULT '[]',
                statement TEXT NOT NULL DEFAULT '',
                examples TEXT NOT NULL DEFAULT '',
                code_stub TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'todo',
                time_spent_sec INTEGER NOT NULL DEFAULT 0,
                last_result TEXT NOT NULL DEFAULT '',
                last_runtime TEXT NOT NULL DEFAULT '',
                last_memory TEXT NOT NULL DEFAULT '',
                fetched_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL,
                body TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS custom_cases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL,
                input TEXT NOT NULL,
                expected TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS test_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL,
                passed INTEGER NOT NULL,
                failed_count INTEGER NOT NULL DEFAULT 0,
                output TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS timer_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL,
                started_at TEXT NOT NULL,
                ended_at TEXT,
                planned_min INTEGER NOT NULL DEFAULT 0,
                manual INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS activity_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL,
                kind TEXT NOT NULL,
                payload TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- Create indexes for common queries
            CREATE INDEX IF NOT EXISTS idx_problems_status ON problems(status);
            CREATE INDEX IF NOT EXISTS idx_activity_kind_created ON activity_log(kind, created_at);
            CREATE INDEX IF NOT EXISTS idx_timer_open ON timer_sessions(slug, ended_at);",
        )?;
        Ok(())
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn now_str(&self) -> String {
        fmt_ts(self.now())
    }

    fn setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        ) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Slug of the problem currently under work.
    ///
    /// Returns `NotFound` when no current problem has been set; callers
    /// treat that as "no active problem", not a fatal condition.
    pub fn current_problem(&self) -> Result<String, StoreError> {
        match self.setting(CURRENT_SLUG_KEY)? {
            Some(slug) if !slug.is_empty() => Ok(slug),
            _ => Err(StoreError::not_found("current problem", "(unset)")),
        }
    }

    pub fn set_current_problem(&self, slug: &str) -> Result<(), StoreError> {
        self.set_setting(CURRENT_SLUG_KEY, slug)
    }
}

/// Timestamps are stored as RFC 3339 UTC text with fixed-width "Z"
/// suffix, so lexicographic comparison in SQL matches chronological
/// order.
pub(crate) fn fmt_ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_ts(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn open_creates_schema() {
        let store = Store::open_memory().unwrap();
        let count: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(count >= 7);
    }

    #[test]
    fn migrate_is_idempotent() {
        let store = Store::open_memory().unwrap();
        store.migrate().unwrap();
        store.migrate().unwrap();
    }

    #[test]
    fn current_problem_unset_is_not_found() {
        let store = Store::open_memory().unwrap();
        let err = store.current_problem().unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn current_problem_roundtrip() {
        let store = Store::open_memory().unwrap();
        store.set_current_problem("two-sum").unwrap();
        assert_eq!(store.current_problem().unwrap(), "two-sum");
        store.set_current_problem("three-sum").unwrap();
        assert_eq!(store.current_problem().unwrap(), "three-sum");
    }

    #[test]
    fn timestamp_format_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 11, 20, 21, 30, 5).unwrap();
        let a = fmt_ts(early);
        let b = fmt_ts(late);
        assert!(a < b);
        assert_eq!(parse_ts(&a).unwrap(), early);
        assert_eq!(parse_ts(&b).unwrap(), late);
    }
}
