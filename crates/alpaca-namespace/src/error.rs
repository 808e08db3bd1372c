//! Error types for alpaca-namespace

use std::time::Duration;

/// Result type for alpaca-namespace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the coordination service
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Coordination service error at {path}: {message}")]
    Client { path: String, message: String },

    #[error("Could not connect to {connect_string}: {message}")]
    Connect {
        connect_string: String,
        message: String,
    },

    #[error("Timed out after {wait:?} waiting for a session with {connect_string}")]
    SessionTimeout {
        connect_string: String,
        wait: Duration,
    },

    #[error("Interrupted while waiting for a session with {connect_string}")]
    Interrupted { connect_string: String },

    #[error("Invalid namespace snapshot: {message}")]
    Snapshot { message: String },

    #[error("Filesystem error: {0}")]
    Fs(#[from] alpaca_fs::Error),
}

impl Error {
    pub fn client(path: impl ToString, message: impl ToString) -> Self {
        Self::Client {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether a connection attempt that failed with this error may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Connect { .. } | Error::SessionTimeout { .. })
    }
}
