//! # Grindstone Core Library
//!
//! This library provides the core logic for grindstone, a personal
//! practice tracker for LeetCode-style problems. All operations are
//! available via a standalone CLI binary; the library keeps the state,
//! the binary stays a thin argument-parsing layer.
//!
//! ## Architecture
//!
//! - **Entity Store**: SQLite persistence for problems, notes, timer
//!   sessions, custom test cases, test runs, and the append-only
//!   activity log
//! - **Timer Engine**: open/closed session rows on the store, no
//!   in-memory state machine
//! - **Stats Aggregator**: pure read-side computation over problem
//!   rows and the activity log
//! - **Test Harness**: runs solutions in an isolated Python worker and
//!   returns structured verdicts
//! - **Client**: cookie-authenticated access to the remote judge
//!
//! ## Key Components
//!
//! - [`Store`]: entity persistence and the timer operations
//! - [`Harness`]: solution test runner
//! - [`Client`]: remote judge API
//! - [`Config`]: TOML configuration with project overlay

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod harness;
pub mod store;
pub mod workspace;

pub use client::{Client, SubmitOutcome, Summary};
pub use config::Config;
pub use error::{ClientError, ConfigError, CoreError, HarnessError, Result, StoreError};
pub use harness::{Harness, Verdict};
pub use store::{
    ActivityEvent, CustomCase, Difficulty, EventKind, Problem, ProblemFilter, Stats, Status,
    Store, TestRun,
};
