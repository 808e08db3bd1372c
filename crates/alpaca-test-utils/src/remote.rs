//! [`ConfigRemote`] fixture for repository synchronization scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use tempfile::TempDir;

use crate::git;

/// An upstream configuration repository plus a scratch directory where the
/// code under test keeps its working copy.
///
/// Both live in one temporary directory:
///
/// ```text
/// <tmp>/upstream   non-bare repository acting as `origin`
/// <tmp>/work       working copy base directory (initially absent)
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use alpaca_test_utils::ConfigRemote;
///
/// let remote = ConfigRemote::new();
/// remote.commit("dev.yml", "alpaca:\n  zookeeper:\n    connect-string: zk:2181\n");
/// let uri = remote.uri();
/// ```
pub struct ConfigRemote {
    upstream: Repository,
    temp_dir: TempDir,
}

impl Default for ConfigRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRemote {
    /// Create an upstream repository with one commit (`README.md`) on
    /// [`git::DEFAULT_BRANCH`].
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap_or_else(|e| panic!("ConfigRemote: tempdir: {e}"));
        let upstream_path = temp_dir.path().join("upstream");
        fs::create_dir_all(&upstream_path)
            .unwrap_or_else(|e| panic!("ConfigRemote: failed to create upstream dir: {e}"));
        let upstream = git::init_repo(&upstream_path);
        git::commit_file(&upstream, "README.md", "# config\n", "Initial commit");
        Self { upstream, temp_dir }
    }

    /// Path of the upstream repository.
    pub fn upstream_path(&self) -> PathBuf {
        self.temp_dir.path().join("upstream")
    }

    /// URI to clone the upstream from.
    pub fn uri(&self) -> String {
        self.upstream_path().to_string_lossy().into_owned()
    }

    /// Base directory for the working copy under test.
    pub fn basedir(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    /// A directory inside the fixture that is not a git repository.
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn upstream(&self) -> &Repository {
        &self.upstream
    }

    /// Commit a file to the upstream's current branch.
    pub fn commit(&self, relative: &str, content: &str) -> git2::Oid {
        git::commit_file(&self.upstream, relative, content, &format!("Update {relative}"))
    }

    /// Create a branch on the upstream and switch to it.
    pub fn branch(&self, name: &str) {
        git::create_and_checkout_branch(&self.upstream, name);
    }

    /// Switch the upstream back to an existing branch.
    pub fn switch(&self, name: &str) {
        git::checkout_branch(&self.upstream, name);
    }

    /// Tag the upstream's HEAD.
    pub fn tag(&self, name: &str) {
        git::tag_head(&self.upstream, name);
    }

    /// Open the working copy as a repository.
    ///
    /// # Panics
    /// Panics if the working copy does not exist.
    pub fn open_work(&self) -> Repository {
        Repository::open(self.basedir()).unwrap_or_else(|e| {
            panic!(
                "ConfigRemote::open_work: no repository at {}: {e}",
                self.basedir().display()
            )
        })
    }

    /// Write a file into the working copy without committing it.
    pub fn write_work_file(&self, relative: &str, content: &str) {
        write_file(&self.basedir(), relative, content);
    }

    /// Assert that the working copy file at `relative` has exactly `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_work_file(&self, relative: &str, content: &str) {
        let full = self.basedir().join(relative);
        let actual = fs::read_to_string(&full)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full.display()));
        assert_eq!(
            actual,
            content,
            "File {} does not have the expected content",
            full.display()
        );
    }

    /// Assert that `relative` does not exist in the working copy.
    pub fn assert_work_file_absent(&self, relative: &str) {
        let full = self.basedir().join(relative);
        assert!(
            !full.exists(),
            "Expected file NOT to exist: {}",
            full.display()
        );
    }
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let full = root.join(relative);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("write_file: failed to create {}: {e}", parent.display()));
    }
    fs::write(&full, content)
        .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", full.display()));
}
