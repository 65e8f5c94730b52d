//! Append-only activity log.
//!
//! Every mutating store operation that matters for history appends one
//! row here. The log is never updated or deleted; time-windowed stats
//! and the recent-activity feed read from it.

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{fmt_ts, parse_ts, Store};

/// What happened. Payload interpretation depends on the kind:
/// planned minutes for `timer_start`, elapsed seconds for `timer_stop`,
/// added minutes for `manual_time`, a pass/fail summary for `test`,
/// the judge verdict for `submit`, the note text for `note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Solved,
    Note,
    TimerStart,
    TimerStop,
    ManualTime,
    Test,
    Submit,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Solved => "solved",
            EventKind::Note => "note",
            EventKind::TimerStart => "timer_start",
            EventKind::TimerStop => "timer_stop",
            EventKind::ManualTime => "manual_time",
            EventKind::Test => "test",
            EventKind::Submit => "submit",
        }
    }

    pub fn parse(s: &str) -> Option<EventKind> {
        match s {
            "solved" => Some(EventKind::Solved),
            "note" => Some(EventKind::Note),
            "timer_start" => Some(EventKind::TimerStart),
            "timer_stop" => Some(EventKind::TimerStop),
            "manual_time" => Some(EventKind::ManualTime),
            "test" => Some(EventKind::Test),
            "submit" => Some(EventKind::Submit),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log entry.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
    pub slug: String,
    pub kind: EventKind,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub(crate) fn append_event(
        &self,
        slug: &str,
        kind: EventKind,
        payload: &str,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO activity_log (slug, kind, payload, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![slug, kind.as_str(), payload, self.now_str()],
        )?;
        Ok(())
    }

    /// Most recent events, newest first.
    pub fn recent_activity(&self, limit: u32) -> Result<Vec<ActivityEvent>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT slug, kind, payload, created_at FROM activity_log
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], row_to_event)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Count of `solved` events at or after `from`.
    pub(crate) fn solved_count_since(&self, from: DateTime<Utc>) -> Result<i64, StoreError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM activity_log WHERE kind = 'solved' AND created_at >= ?1",
            params![fmt_ts(from)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count of `solved` events in the half-open window `[from, to)`.
    pub(crate) fn solved_count_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM activity_log
             WHERE kind = 'solved' AND created_at >= ?1 AND created_at < ?2",
            params![fmt_ts(from), fmt_ts(to)],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityEvent> {
    let kind: String = row.get(1)?;
    let created: String = row.get(3)?;
    Ok(ActivityEvent {
        slug: row.get(0)?,
        kind: EventKind::parse(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                format!("unknown event kind: {kind}").into(),
            )
        })?,
        payload: row.get(2)?,
        created_at: parse_ts(&created)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, testing::ManualClock};
    use chrono::{Duration, TimeZone};

    #[test]
    fn kind_strings_roundtrip() {
        for kind in [
            EventKind::Solved,
            EventKind::Note,
            EventKind::TimerStart,
            EventKind::TimerStop,
            EventKind::ManualTime,
            EventKind::Test,
            EventKind::Submit,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::parse("bogus"), None);
    }

    #[test]
    fn recent_activity_is_newest_first_and_limited() {
        let store = Store::open_memory().unwrap();
        store.append_event("a", EventKind::Note, "first").unwrap();
        store.append_event("b", EventKind::Note, "second").unwrap();
        store.append_event("c", EventKind::Note, "third").unwrap();
        let events = store.recent_activity(2).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].payload, "third");
        assert_eq!(events[1].payload, "second");
    }

    #[test]
    fn solved_counts_respect_window_bounds() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::at(t0);
        let store = Store::open_memory_with_clock(clock.clone()).unwrap();

        store.append_event("a", EventKind::Solved, "").unwrap();
        clock.advance(Duration::days(3));
        store.append_event("b", EventKind::Solved, "").unwrap();
        clock.advance(Duration::days(6));
        store.append_event("c", EventKind::Solved, "").unwrap();
        // now = t0 + 9d

        let now = clock.now();
        assert_eq!(store.solved_count_since(now - Duration::days(7)).unwrap(), 2);
        assert_eq!(
            store
                .solved_count_between(now - Duration::days(14), now - Duration::days(7))
                .unwrap(),
            1
        );
        // Boundary: an event exactly at `from` counts, one exactly at
        // `to` does not.
        assert_eq!(
            store
                .solved_count_between(t0, t0 + Duration::days(3))
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .solved_count_between(t0 + Duration::days(3), t0 + Duration::days(9))
                .unwrap(),
            1
        );
    }
}
