//! Notes, custom test cases, and recorded test runs.

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::store::activity::EventKind;
use crate::store::{parse_ts, Store};

/// User-authored test case: structured input plus an optional expected
/// value. Without `expected` the harness only echoes the call result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomCase {
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

/// One recorded harness run. Append-only audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct TestRun {
    pub slug: String,
    pub passed: bool,
    pub failed_count: i64,
    pub output: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Append a note. Blank text is rejected; tags are optional.
    pub fn add_note(&self, slug: &str, text: &str, tags: &[String]) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::Validation("note text must not be blank".into()));
        }
        let tags_json = serde_json::to_string(tags)
            .map_err(|e| StoreError::Persistence(format!("encode tags: {e}")))?;
        self.conn.execute(
            "INSERT INTO notes (slug, body, tags, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![slug, text, tags_json, self.now_str()],
        )?;
        self.append_event(slug, EventKind::Note, text)?;
        Ok(())
    }

    pub fn add_custom_case(&self, slug: &str, case: &CustomCase) -> Result<(), StoreError> {
        let input = serde_json::to_string(&case.input)
            .map_err(|e| StoreError::Persistence(format!("encode case input: {e}")))?;
        let expected = case
            .expected
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Persistence(format!("encode expected value: {e}")))?;
        self.conn.execute(
            "INSERT INTO custom_cases (slug, input, expected, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![slug, input, expected, self.now_str()],
        )?;
        Ok(())
    }

    /// Custom cases for a slug in insertion order.
    pub fn custom_cases(&self, slug: &str) -> Result<Vec<CustomCase>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT input, expected FROM custom_cases WHERE slug = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![slug], |row| {
            let input: String = row.get(0)?;
            let expected: Option<String> = row.get(1)?;
            Ok((input, expected))
        })?;
        let mut cases = Vec::new();
        for row in rows {
            let (input, expected) = row?;
            let input: Value = serde_json::from_str(&input)
                .map_err(|e| StoreError::Persistence(format!("decode case input: {e}")))?;
            let expected = expected
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .map_err(|e| StoreError::Persistence(format!("decode expected value: {e}")))?;
            cases.push(CustomCase { input, expected });
        }
        Ok(cases)
    }

    /// Record a harness run and append a `test` activity event
    /// summarizing it.
    pub fn save_test_run(
        &self,
        slug: &str,
        passed: bool,
        failed_count: i64,
        output: &str,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO test_runs (slug, passed, failed_count, output, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![slug, passed, failed_count, output, self.now_str()],
        )?;
        self.append_event(
            slug,
            EventKind::Test,
            &format!("passed={passed} failed={failed_count}"),
        )?;
        Ok(())
    }

    /// Recorded runs for a slug, newest first.
    pub fn test_runs(&self, slug: &str, limit: u32) -> Result<Vec<TestRun>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT slug, passed, failed_count, output, created_at FROM test_runs
             WHERE slug = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![slug, limit], |row| {
            let created: String = row.get(4)?;
            Ok(TestRun {
                slug: row.get(0)?,
                passed: row.get(1)?,
                failed_count: row.get(2)?,
                output: row.get(3)?,
                created_at: parse_ts(&created)?,
            })
        })?;
        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?);
        }
        Ok(runs)
    }
}
