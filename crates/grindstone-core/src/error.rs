//! Core error types for grindstone-core.
//!
//! This module defines the error hierarchy using thiserror. A failing
//! test run is an ordinary [`crate::harness::Verdict`], never an error;
//! errors here mean an operation could not produce a result at all.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for grindstone-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Entity-store errors
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Test-harness errors
    #[error("harness error: {0}")]
    Harness(#[from] HarnessError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote judge client errors
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Entity-store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Missing row: unknown slug, unset current problem
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Blank or otherwise unusable input
    #[error("validation failed: {0}")]
    Validation(String),

    /// Backing-store I/O or constraint failure
    #[error("storage failure: {0}")]
    Persistence(String),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            key: key.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

/// Test-harness errors: the harness could not produce a verdict at all.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Failed to write or read a harness file
    #[error("harness I/O failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker interpreter could not be launched
    #[error("failed to launch {python}: {source}")]
    Launch {
        python: String,
        #[source]
        source: std::io::Error,
    },

    /// User-authored case file exists but does not parse
    #[error("malformed test cases in {path}: {message}")]
    MalformedCases { path: PathBuf, message: String },

    /// The worker request could not be encoded
    #[error("failed to encode worker request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// No home directory to resolve the config path against
    #[error("config directory could not be determined")]
    NoConfigDir,
}

/// Remote judge client errors.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// Response did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Cookies were rejected by the judge
    #[error("cookie auth failed; run `grindstone auth guide`")]
    AuthRejected,

    /// Session/CSRF cookies are not configured
    #[error("missing auth cookies; run `grindstone auth login`")]
    MissingCredentials,

    /// Summary filters matched nothing
    #[error("no problems found with the requested filters")]
    NoMatch,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
