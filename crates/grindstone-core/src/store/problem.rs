//! Problem rows: metadata cache, status, and submission fields.

use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::store::activity::EventKind;
use crate::store::{fmt_ts, parse_ts, Store};

/// Verdict string the judge uses for a passing submission.
pub const ACCEPTED: &str = "Accepted";

/// Problem difficulty as reported by the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Difficulty> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "unknown" => Some(Difficulty::Unknown),
            _ => None,
        }
    }

    /// Map the judge's numeric difficulty level (1..=3).
    pub fn from_level(level: u64) -> Difficulty {
        match level {
            1 => Difficulty::Easy,
            2 => Difficulty::Medium,
            3 => Difficulty::Hard,
            _ => Difficulty::Unknown,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solving status. No transition graph is enforced beyond the
/// "Accepted submission forces solved" rule in
/// [`Store::save_submission_result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Solved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Solved => "solved",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "todo" => Some(Status::Todo),
            "in_progress" => Some(Status::InProgress),
            "solved" => Some(Status::Solved),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached problem. `fetched_at` at the Unix epoch (the
/// `Default` value) means "never stamped"; the store replaces it with
/// the current time on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    pub slug: String,
    pub frontend_id: String,
    pub question_id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
    pub statement: String,
    pub examples: String,
    pub code_stub: String,
    pub status: Status,
    pub time_spent_sec: i64,
    pub last_result: String,
    pub last_runtime: String,
    pub last_memory: String,
    pub fetched_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional filters for [`Store::list_problems`]. `None` means no
/// constraint; `query` matches slug or title by substring.
#[derive(Debug, Clone, Default)]
pub struct ProblemFilter {
    pub difficulty: Option<Difficulty>,
    pub status: Option<Status>,
    pub query: Option<String>,
}

impl Store {
    /// Insert or update a problem by slug.
    ///
    /// On conflict only the fetched metadata (title, difficulty, topics,
    /// statement, examples, stub) and the fetch/update stamps change;
    /// status, accumulated time, and submission fields are preserved.
    pub fn upsert_problem(&self, p: &Problem) -> Result<(), StoreError> {
        let now = self.now();
        let fetched = if p.fetched_at.timestamp() == 0 {
            now
        } else {
            p.fetched_at
        };
        let topics = serde_json::to_string(&p.topics)
            .map_err(|e| StoreError::Persistence(format!("encode topics: {e}")))?;
        self.conn.execute(
            "INSERT INTO problems (
                slug, frontend_id, question_id, title, difficulty, topics,
                statement, examples, code_stub, status, time_spent_sec,
                last_result, last_runtime, last_memory, fetched_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            ON CONFLICT(slug) DO UPDATE SET
                frontend_id = excluded.frontend_id,
                question_id = excluded.question_id,
                title = excluded.title,
                difficulty = excluded.difficulty,
                topics = excluded.topics,
                statement = excluded.statement,
                examples = excluded.examples,
                code_stub = excluded.code_stub,
                fetched_at = excluded.fetched_at,
                updated_at = excluded.updated_at",
            params![
                p.slug,
                p.frontend_id,
                p.question_id,
                p.title,
                p.difficulty.as_str(),
                topics,
                p.statement,
                p.examples,
                p.code_stub,
                p.status.as_str(),
                p.time_spent_sec,
                p.last_result,
                p.last_runtime,
                p.last_memory,
                fmt_ts(fetched),
                fmt_ts(now),
            ],
        )?;
        debug!(slug = %p.slug, "upserted problem");
        Ok(())
    }

    /// Exact lookup by slug.
    pub fn problem(&self, slug: &str) -> Result<Problem, StoreError> {
        match self.conn.query_row(
            &format!("SELECT {PROBLEM_COLUMNS} FROM problems WHERE slug = ?1"),
            params![slug],
            row_to_problem,
        ) {
            Ok(p) => Ok(p),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StoreError::not_found("problem", slug))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List problems matching all given filters, ordered by numeric
    /// frontend id ascending, then slug. Non-numeric ids cast to 0 and
    /// sort first.
    pub fn list_problems(&self, filter: &ProblemFilter) -> Result<Vec<Problem>, StoreError> {
        let difficulty = filter.difficulty.map(|d| d.as_str());
        let status = filter.status.map(|s| s.as_str());
        let pattern = filter.query.as_ref().map(|q| format!("%{q}%"));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROBLEM_COLUMNS} FROM problems
             WHERE (?1 IS NULL OR difficulty = ?1)
               AND (?2 IS NULL OR status = ?2)
               AND (?3 IS NULL OR slug LIKE ?3 OR title LIKE ?3)
             ORDER BY CAST(frontend_id AS INTEGER) ASC, slug ASC"
        ))?;
        let rows = stmt.query_map(params![difficulty, status, pattern], row_to_problem)?;
        let mut problems = Vec::new();
        for row in rows {
            problems.push(row?);
        }
        Ok(problems)
    }

    /// Overwrite a problem's status. Setting `solved` appends a
    /// `solved` activity event; repeated calls append repeated events.
    pub fn set_status(&self, slug: &str, status: Status) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE problems SET status = ?1, updated_at = ?2 WHERE slug = ?3",
            params![status.as_str(), self.now_str(), slug],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("problem", slug));
        }
        if status == Status::Solved {
            self.append_event(slug, EventKind::Solved, "")?;
        }
        Ok(())
    }

    /// Record a submission outcome. An "Accepted" verdict forces the
    /// problem to `solved` regardless of its current status.
    pub fn save_submission_result(
        &self,
        slug: &str,
        status: &str,
        runtime: &str,
        memory: &str,
    ) -> Result<(), StoreError> {
        let now = self.now_str();
        let changed = self.conn.execute(
            "UPDATE problems SET last_result = ?1, last_runtime = ?2, last_memory = ?3,
                updated_at = ?4 WHERE slug = ?5",
            params![status, runtime, memory, now, slug],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("problem", slug));
        }
        self.append_event(slug, EventKind::Submit, status)?;
        if status == ACCEPTED {
            self.conn.execute(
                "UPDATE problems SET status = ?1, updated_at = ?2 WHERE slug = ?3",
                params![Status::Solved.as_str(), now, slug],
            )?;
        }
        Ok(())
    }
}

const PROBLEM_COLUMNS: &str = "slug, frontend_id, question_id, title, difficulty, topics, \
     statement, examples, code_stub, status, time_spent_sec, last_result, last_runtime, \
     last_memory, fetched_at, updated_at";

fn row_to_problem(row: &rusqlite::Row<'_>) -> rusqlite::Result<Problem> {
    let difficulty: String = row.get(4)?;
    let topics: String = row.get(5)?;
    let status: String = row.get(9)?;
    let fetched: String = row.get(14)?;
    let updated: String = row.get(15)?;
    Ok(Problem {
        slug: row.get(0)?,
        frontend_id: row.get(1)?,
        question_id: row.get(2)?,
        title: row.get(3)?,
        difficulty: Difficulty::parse(&difficulty).unwrap_or_default(),
        topics: serde_json::from_str(&topics).unwrap_or_default(),
        statement: row.get(6)?,
        examples: row.get(7)?,
        code_stub: row.get(8)?,
        status: Status::parse(&status).unwrap_or_default(),
        time_spent_sec: row.get(10)?,
        last_result: row.get(11)?,
        last_runtime: row.get(12)?,
        last_memory: row.get(13)?,
        fetched_at: parse_ts(&fetched)?,
        updated_at: parse_ts(&updated)?,
    })
}
