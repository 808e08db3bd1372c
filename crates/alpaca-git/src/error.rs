//! Error types for alpaca-git

use std::path::PathBuf;

/// Result type for alpaca-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synchronizing the configuration repository
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] alpaca_fs::Error),

    #[error("Cannot clone {uri} into {}", path.display())]
    Clone {
        uri: String,
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Cannot check out '{label}'")]
    Checkout {
        label: String,
        #[source]
        source: git2::Error,
    },

    #[error("Merge of '{reference}' resulted in conflicts")]
    MergeConflict { reference: String },

    #[error("Cannot merge '{reference}' into a detached HEAD")]
    DetachedHead { reference: String },
}
