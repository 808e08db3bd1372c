//! Error types for alpaca-core

/// Result type for alpaca-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a bootstrap or component resolution pass
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Please specify the application name: '{key}'")]
    MissingApplicationName { key: &'static str },

    #[error("clone config repository failed")]
    Repository(#[from] alpaca_git::Error),

    #[error("Namespace error: {0}")]
    Namespace(#[from] alpaca_namespace::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] alpaca_fs::Error),

    #[error("Invalid value '{value}' for setting '{key}': {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid_setting(key: &str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
