//! Error types for alpaca-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] alpaca_core::Error),

    #[error(transparent)]
    Git(#[from] alpaca_git::Error),

    #[error(transparent)]
    Namespace(#[from] alpaca_namespace::Error),

    #[error(transparent)]
    Fs(#[from] alpaca_fs::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
