//! Read-side statistics. Nothing here is persisted; every call
//! recomputes from the problem rows and the activity log.

use std::collections::HashSet;

use chrono::Duration;
use serde::Serialize;

use crate::error::StoreError;
use crate::store::activity::ActivityEvent;
use crate::store::Store;

/// Size of the recent-activity feed.
const RECENT_LIMIT: u32 = 10;

/// Aggregated snapshot.
///
/// Difficulty counts reflect the *current* problem rows, so flipping a
/// problem back out of `solved` lowers them. The windowed counts come
/// from `solved` activity events instead and never shrink.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub total_problems: i64,
    pub solved_easy: i64,
    pub solved_medium: i64,
    pub solved_hard: i64,
    /// Mean time-spent over solved problems with nonzero recorded
    /// time. Zero-time solves are excluded, not averaged in as zero.
    pub avg_solve_sec: f64,
    /// Distinct topic strings across solved problems.
    pub topic_coverage: i64,
    pub solved_last_7d: i64,
    pub solved_prev_7d: i64,
    pub recent_activity: Vec<ActivityEvent>,
}

impl Store {
    pub fn stats(&self) -> Result<Stats, StoreError> {
        let total_problems: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM problems", [], |row| row.get(0))?;

        let mut solved_easy = 0;
        let mut solved_medium = 0;
        let mut solved_hard = 0;
        {
            let mut stmt = self.conn.prepare(
                "SELECT difficulty, COUNT(*) FROM problems
                 WHERE status = 'solved' GROUP BY difficulty",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (difficulty, count) = row?;
                match difficulty.as_str() {
                    "Easy" => solved_easy = count,
                    "Medium" => solved_medium = count,
                    "Hard" => solved_hard = count,
                    _ => {}
                }
            }
        }

        let avg_solve_sec: f64 = self.conn.query_row(
            "SELECT COALESCE(AVG(time_spent_sec), 0.0) FROM problems
             WHERE status = 'solved' AND time_spent_sec > 0",
            [],
            |row| row.get(0),
        )?;

        let mut topics = HashSet::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT topics FROM problems WHERE status = 'solved'")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            for row in rows {
                let raw = row?;
                let list: Vec<String> = serde_json::from_str(&raw).unwrap_or_default();
                topics.extend(list);
            }
        }

        let now = self.now();
        let solved_last_7d = self.solved_count_since(now - Duration::days(7))?;
        let solved_prev_7d =
            self.solved_count_between(now - Duration::days(14), now - Duration::days(7))?;
        let recent_activity = self.recent_activity(RECENT_LIMIT)?;

        Ok(Stats {
            total_problems,
            solved_easy,
            solved_medium,
            solved_hard,
            avg_solve_sec,
            topic_coverage: topics.len() as i64,
            solved_last_7d,
            solved_prev_7d,
            recent_activity,
        })
    }
}
