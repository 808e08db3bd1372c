//! Working-copy synchronization state machine

use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};

use git2::Repository;
use git2::build::RepoBuilder;

use crate::helpers::{self, ORIGIN};
use crate::{Error, Result, TransportOptions};

/// Observed state of the local working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoState {
    /// No repository under the base directory, or it cannot be opened.
    Absent,
    /// Repository opened with a clean working tree.
    OpenClean,
    /// Repository opened with modified or untracked files.
    OpenDirty,
    /// Label checked out after fetch, merge and reset.
    Synced,
}

impl fmt::Display for RepoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepoState::Absent => "absent",
            RepoState::OpenClean => "open-clean",
            RepoState::OpenDirty => "open-dirty",
            RepoState::Synced => "synced",
        };
        write!(f, "{s}")
    }
}

/// What one [`RepoSync::sync`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub label: String,
    pub initial_state: RepoState,
    pub final_state: RepoState,
    /// Files that made the tree dirty before synchronization.
    pub dirty_files: Vec<String>,
    /// Refs updated by the fetch.
    pub updated_refs: usize,
    /// Whether `origin/<label>` was merged into the current branch.
    pub merged: bool,
    /// Whether the tree was hard-reset to `origin/<label>`.
    pub reset: bool,
}

impl SyncReport {
    fn new(label: &str, initial_state: RepoState) -> Self {
        Self {
            label: label.to_string(),
            initial_state,
            final_state: initial_state,
            dirty_files: Vec::new(),
            updated_refs: 0,
            merged: false,
            reset: false,
        }
    }
}

/// Keeps a local working copy of the configuration repository in sync with
/// its remote.
///
/// Callers must run at most one `sync` per base directory at a time; no
/// lock is taken on the working copy.
#[derive(Debug, Clone)]
pub struct RepoSync {
    uri: String,
    basedir: PathBuf,
    transport: TransportOptions,
}

impl RepoSync {
    pub fn new(uri: impl Into<String>, basedir: impl Into<PathBuf>) -> Self {
        Self {
            uri: uri.into(),
            basedir: basedir.into(),
            transport: TransportOptions::default(),
        }
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Bring the working copy to `label`.
    ///
    /// Clone, checkout and directory-creation failures are returned. Fetch,
    /// merge, status and reset failures are logged at WARN and the pass
    /// continues.
    pub fn sync(&self, label: &str) -> Result<SyncReport> {
        let (repo, mut report) = match self.open_existing() {
            Some(repo) => {
                let (state, dirty_files) = self.inspect(&repo);
                let mut report = SyncReport::new(label, state);
                report.dirty_files = dirty_files;
                (repo, report)
            }
            None => (self.clone_fresh()?, SyncReport::new(label, RepoState::Absent)),
        };

        let dirty = report.initial_state == RepoState::OpenDirty;
        let origin = helpers::origin_url(&repo);
        if dirty {
            tracing::warn!(files = ?report.dirty_files, "Dirty files found");
        } else if origin.is_none() {
            tracing::info!(
                basedir = %self.basedir.display(),
                "Working copy has no origin remote, leaving it as is"
            );
            return Ok(report);
        }

        self.fetch_and_merge(&repo, label, &mut report);

        helpers::checkout_label(&repo, label)?;
        tracing::debug!(label, "Checked out label");

        let still_dirty = match helpers::dirty_files(&repo) {
            Ok(files) => !files.is_empty(),
            Err(e) => {
                warn_with_detail("Could not execute status on local repository", &e);
                true
            }
        };
        if still_dirty {
            tracing::warn!(label, "The local repository is dirty, resetting it to {ORIGIN}/{label}");
            match helpers::reset_hard_to_remote(&repo, label) {
                Ok(oid) => {
                    tracing::info!(label, version = %oid, "Reset label");
                    report.reset = true;
                }
                Err(e) => warn_with_detail(
                    &format!(
                        "Could not reset to remote for {label}, remote: {}",
                        origin.as_deref().unwrap_or("<none>")
                    ),
                    &e,
                ),
            }
        }

        report.final_state = RepoState::Synced;
        Ok(report)
    }

    fn open_existing(&self) -> Option<Repository> {
        if !self.basedir.join(".git").exists() {
            return None;
        }
        match Repository::open(&self.basedir) {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::warn!(
                    basedir = %self.basedir.display(),
                    error = %e,
                    "Existing working copy cannot be opened, cloning again"
                );
                None
            }
        }
    }

    fn inspect(&self, repo: &Repository) -> (RepoState, Vec<String>) {
        match helpers::dirty_files(repo) {
            Ok(files) if files.is_empty() => (RepoState::OpenClean, files),
            Ok(files) => (RepoState::OpenDirty, files),
            Err(e) => {
                warn_with_detail("Could not execute status on local repository", &e);
                (RepoState::OpenDirty, Vec::new())
            }
        }
    }

    fn clone_fresh(&self) -> Result<Repository> {
        alpaca_fs::io::recreate_dir(&self.basedir)?;

        tracing::info!(uri = %self.uri, basedir = %self.basedir.display(), "Cloning configuration repository");
        let updated = Cell::new(0);
        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.transport.fetch_options(&updated));

        let cloned = self
            .transport
            .server_timeouts()
            .and_then(|_timeouts| builder.clone(&self.uri, &self.basedir));
        cloned.map_err(|source| {
            if let Err(e) = alpaca_fs::io::remove_dir_if_exists(&self.basedir) {
                tracing::warn!(error = %e, "Could not remove base directory after failed clone");
            }
            Error::Clone {
                uri: self.uri.clone(),
                path: self.basedir.clone(),
                source,
            }
        })
    }

    fn fetch_and_merge(&self, repo: &Repository, label: &str, report: &mut SyncReport) {
        let updated = Cell::new(0);
        let fetched = repo.find_remote(ORIGIN).and_then(|mut remote| {
            let mut options = self.transport.fetch_options(&updated);
            let _timeouts = self.transport.server_timeouts()?;
            remote.fetch::<&str>(&[], Some(&mut options), None)
        });
        if let Err(e) = fetched {
            warn_with_detail(
                &format!("Could not fetch remote for {label} remote: {}", self.uri),
                &e,
            );
            return;
        }

        report.updated_refs = updated.get();
        if report.updated_refs == 0 {
            tracing::debug!(label, "Fetch found no updates");
            return;
        }
        tracing::info!(
            label,
            updates = report.updated_refs,
            "Fetched for remote {label} and found updates"
        );

        match helpers::merge_remote(repo, label) {
            Ok(merged) => report.merged = merged,
            Err(e) => warn_with_detail(&format!("Could not merge remote for {label}"), &e),
        }
    }
}

fn warn_with_detail(message: &str, error: &dyn std::error::Error) {
    tracing::warn!("{message}");
    tracing::debug!(error = %error, "Detail for: {message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clone_failure_removes_basedir() {
        let temp = TempDir::new().unwrap();
        let basedir = temp.path().join("work");
        let sync = RepoSync::new(temp.path().join("missing").to_string_lossy(), &basedir);

        let err = sync.sync("master").unwrap_err();
        assert!(matches!(err, Error::Clone { .. }));
        assert!(!basedir.exists());
    }

    #[test]
    fn test_report_starts_at_initial_state() {
        let report = SyncReport::new("master", RepoState::OpenDirty);
        assert_eq!(report.final_state, RepoState::OpenDirty);
        assert!(!report.merged && !report.reset);
    }
}
