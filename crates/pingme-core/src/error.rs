//! Error types for the pingme engine.
//!
//! One unified enum covers the user-facing failure kinds (bad time
//! expressions, cancel misses, storage trouble, delivery trouble) plus the
//! plumbing conversions the rest of the crate needs.

use thiserror::Error;

/// Unified error type for reminder operations.
#[derive(Debug, Error)]
pub enum PingmeError {
    /// Duration or clock-time expression did not match any accepted grammar
    #[error("Invalid time expression '{input}': {reason}")]
    InvalidFormat { input: String, reason: String },

    /// Recurring interval below the supported minimum
    #[error("Recurring interval must be at least {minimum_secs}s, got {got_secs}s")]
    IntervalTooShort { got_secs: i64, minimum_secs: i64 },

    /// Cancel selector matched no pending reminder
    #[error("No reminder found matching: {0}")]
    NotFound(String),

    /// State directory or collection file unavailable
    #[error("Reminder storage unavailable: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while touching the store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Platform notifier refused or failed to deliver
    #[error("Notifier failed: {0}")]
    Notifier(String),

    /// Deferred-fire registration with the executor backend failed
    #[error("Deferred executor failed: {0}")]
    Executor(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PingmeError {
    /// Build an `InvalidFormat` from anything stringly.
    pub fn invalid_format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        PingmeError::InvalidFormat {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PingmeError>;
