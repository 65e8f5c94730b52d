//! Wall-clock abstraction.
//!
//! Every timestamp the store records flows through a [`Clock`], so tests
//! can pin time and drive window arithmetic deterministically.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
