//! Filesystem operations for documents and working-copy directories

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Recursively delete `path` if it exists.
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    tracing::debug!(path = %path.display(), "Removing directory");
    if path.is_dir() {
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| Error::io(path, e))
    }
}

/// Replace whatever is at `path` with a fresh, empty directory.
pub fn recreate_dir(path: &Path) -> Result<()> {
    remove_dir_if_exists(path)?;
    fs::create_dir_all(path).map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "create_dir_all failed");
        Error::CreateDir {
            path: path.to_path_buf(),
        }
    })?;

    if !path.is_dir() {
        return Err(Error::CreateDir {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
