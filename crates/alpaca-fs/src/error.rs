//! Error types for alpaca-fs

use std::path::PathBuf;

use crate::document::Format;

/// Result type for alpaca-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in alpaca-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} document '{name}': {message}")]
    DocumentParse {
        name: String,
        format: String,
        message: String,
    },

    #[error("Unsupported document format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Could not create directory {path}")]
    CreateDir { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(name: &str, format: Format, message: impl ToString) -> Self {
        Self::DocumentParse {
            name: name.to_string(),
            format: format.to_string(),
            message: message.to_string(),
        }
    }
}
