//! Timer engine.
//!
//! Sessions are plain rows; there is no in-memory state machine. A
//! session is open while `ended_at` is NULL. Starting never closes or
//! rejects an existing open session for the same slug, so several can
//! be open at once; stopping always closes the newest open one.

use rusqlite::params;
use tracing::debug;

use crate::error::StoreError;
use crate::store::activity::EventKind;
use crate::store::{fmt_ts, parse_ts, Store};

impl Store {
    /// Open a new timer session and append a `timer_start` event whose
    /// payload is the planned duration in minutes. `manual` marks
    /// sessions that represent after-the-fact additions.
    pub fn start_timer(&self, slug: &str, planned_min: i64, manual: bool) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO timer_sessions (slug, started_at, planned_min, manual)
             VALUES (?1, ?2, ?3, ?4)",
            params![slug, self.now_str(), planned_min, manual],
        )?;
        self.append_event(slug, EventKind::TimerStart, &planned_min.to_string())?;
        debug!(slug, planned_min, "timer started");
        Ok(())
    }

    /// Close the most recently started open session for the slug.
    ///
    /// The session end, the problem's accumulated time, and the
    /// `timer_stop` event land in one transaction. Returns the elapsed
    /// seconds, or 0 when no session was open (not an error).
    pub fn stop_timer(&mut self, slug: &str) -> Result<i64, StoreError> {
        let now = self.clock.now();
        let now_s = fmt_ts(now);
        let tx = self.conn.transaction()?;
        let open = match tx.query_row(
            "SELECT id, started_at FROM timer_sessions
             WHERE slug = ?1 AND ended_at IS NULL
             ORDER BY id DESC LIMIT 1",
            params![slug],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        ) {
            Ok(found) => Some(found),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };
        let Some((id, started_raw)) = open else {
            return Ok(0);
        };
        let started = parse_ts(&started_raw)?;
        let elapsed = (now - started).num_seconds().max(0);
        tx.execute(
            "UPDATE timer_sessions SET ended_at = ?1 WHERE id = ?2",
            params![now_s, id],
        )?;
        tx.execute(
            "UPDATE problems SET time_spent_sec = time_spent_sec + ?1, updated_at = ?2
             WHERE slug = ?3",
            params![elapsed, now_s, slug],
        )?;
        tx.execute(
            "INSERT INTO activity_log (slug, kind, payload, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![slug, EventKind::TimerStop.as_str(), elapsed.to_string(), now_s],
        )?;
        tx.commit()?;
        debug!(slug, elapsed, "timer stopped");
        Ok(elapsed)
    }

    /// Add minutes to a problem's accumulated time without touching
    /// session rows. Appends a `manual_time` event with the minutes as
    /// payload.
    pub fn add_manual_time(&self, slug: &str, minutes: i64) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE problems SET time_spent_sec = time_spent_sec + ?1, updated_at = ?2
             WHERE slug = ?3",
            params![minutes * 60, self.now_str(), slug],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("problem", slug));
        }
        self.append_event(slug, EventKind::ManualTime, &minutes.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::ManualClock;
    use crate::store::Problem;
    use chrono::{Duration, TimeZone, Utc};

    fn store_at(t: chrono::DateTime<Utc>) -> (Store, ManualClock) {
        let clock = ManualClock::at(t);
        let store = Store::open_memory_with_clock(clock.clone()).unwrap();
        store
            .upsert_problem(&Problem {
                slug: "two-sum".into(),
                ..Problem::default()
            })
            .unwrap();
        (store, clock)
    }

    fn open_sessions(store: &Store, slug: &str) -> i64 {
        store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM timer_sessions WHERE slug = ?1 AND ended_at IS NULL",
                params![slug],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn stop_without_open_session_is_zero_and_silent() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let (mut store, _clock) = store_at(t0);
        assert_eq!(store.stop_timer("two-sum").unwrap(), 0);
        assert!(store.recent_activity(10).unwrap().is_empty());
    }

    #[test]
    fn start_then_stop_accumulates_elapsed_seconds() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let (mut store, clock) = store_at(t0);
        store.start_timer("two-sum", 30, false).unwrap();
        clock.advance(Duration::seconds(90));
        assert_eq!(store.stop_timer("two-sum").unwrap(), 90);

        let p = store.problem("two-sum").unwrap();
        assert_eq!(p.time_spent_sec, 90);
        assert_eq!(open_sessions(&store, "two-sum"), 0);

        let events = store.recent_activity(10).unwrap();
        assert_eq!(events[0].kind, EventKind::TimerStop);
        assert_eq!(events[0].payload, "90");
        assert_eq!(events[1].kind, EventKind::TimerStart);
        assert_eq!(events[1].payload, "30");
    }

    #[test]
    fn stop_closes_newest_open_session_first() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let (mut store, clock) = store_at(t0);
        store.start_timer("two-sum", 30, false).unwrap();
        clock.advance(Duration::seconds(60));
        // Second open session for the same slug is allowed.
        store.start_timer("two-sum", 30, false).unwrap();
        assert_eq!(open_sessions(&store, "two-sum"), 2);

        clock.advance(Duration::seconds(30));
        assert_eq!(store.stop_timer("two-sum").unwrap(), 30);
        assert_eq!(open_sessions(&store, "two-sum"), 1);

        assert_eq!(store.stop_timer("two-sum").unwrap(), 90);
        assert_eq!(open_sessions(&store, "two-sum"), 0);
        assert_eq!(store.problem("two-sum").unwrap().time_spent_sec, 120);
    }

    #[test]
    fn add_manual_time_converts_minutes_to_seconds() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let (store, _clock) = store_at(t0);
        store.add_manual_time("two-sum", 25).unwrap();
        assert_eq!(store.problem("two-sum").unwrap().time_spent_sec, 1500);
        assert_eq!(open_sessions(&store, "two-sum"), 0);

        let events = store.recent_activity(1).unwrap();
        assert_eq!(events[0].kind, EventKind::ManualTime);
        assert_eq!(events[0].payload, "25");
    }

    #[test]
    fn add_manual_time_unknown_slug_is_not_found() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let (store, _clock) = store_at(t0);
        let err = store.add_manual_time("nope", 5).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
