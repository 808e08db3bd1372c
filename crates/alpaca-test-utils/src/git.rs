//! Git repository fixtures built with `git2`.
//!
//! Every helper panics on failure; they are meant for test setup only.

use std::fs;
use std::path::Path;

use git2::{BranchType, Commit, Oid, Repository, RepositoryInitOptions, Signature};

/// Branch name given to every fixture repository's initial HEAD.
pub const DEFAULT_BRANCH: &str = "master";

/// Initialise a non-bare repository whose HEAD points at [`DEFAULT_BRANCH`].
///
/// No commits are made. Local `user.name`/`user.email` are configured so
/// merge commits made by code under test can be signed.
///
/// # Panics
/// Panics if the repository cannot be created or configured.
pub fn init_repo(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(DEFAULT_BRANCH);
    let repo = Repository::init_opts(path, &opts).unwrap_or_else(|e| {
        panic!("init_repo: failed to init repository at {}: {e}", path.display())
    });

    {
        let mut config = repo
            .config()
            .unwrap_or_else(|e| panic!("init_repo: failed to open config: {e}"));
        config
            .set_str("user.name", "Test User")
            .unwrap_or_else(|e| panic!("init_repo: failed to set user.name: {e}"));
        config
            .set_str("user.email", "test@test.com")
            .unwrap_or_else(|e| panic!("init_repo: failed to set user.email: {e}"));
    }
    repo
}

/// Write `content` to `relative` inside the repository's working tree and
/// commit it on the current branch.
///
/// # Panics
/// Panics if the repository is bare or any git operation fails.
pub fn commit_file(repo: &Repository, relative: &str, content: &str, message: &str) -> Oid {
    let workdir = repo
        .workdir()
        .unwrap_or_else(|| panic!("commit_file: repository is bare"));
    let full = workdir.join(relative);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("commit_file: failed to create {}: {e}", parent.display()));
    }
    fs::write(&full, content)
        .unwrap_or_else(|e| panic!("commit_file: failed to write {}: {e}", full.display()));

    let mut index = repo
        .index()
        .unwrap_or_else(|e| panic!("commit_file: failed to open index: {e}"));
    index
        .add_path(Path::new(relative))
        .unwrap_or_else(|e| panic!("commit_file: failed to stage {relative}: {e}"));
    index
        .write()
        .unwrap_or_else(|e| panic!("commit_file: failed to write index: {e}"));
    let tree_id = index
        .write_tree()
        .unwrap_or_else(|e| panic!("commit_file: failed to write tree: {e}"));
    let tree = repo
        .find_tree(tree_id)
        .unwrap_or_else(|e| panic!("commit_file: failed to find tree: {e}"));

    let sig = Signature::now("Test User", "test@test.com")
        .unwrap_or_else(|e| panic!("commit_file: failed to build signature: {e}"));
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap_or_else(|e| panic!("commit_file: failed to commit: {e}"))
}

/// Create a local branch at HEAD and switch the working tree to it.
///
/// # Panics
/// Panics if HEAD has no commit or any git operation fails.
pub fn create_and_checkout_branch(repo: &Repository, name: &str) {
    let head = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .unwrap_or_else(|e| panic!("create_and_checkout_branch: HEAD has no commit: {e}"));
    repo.branch(name, &head, false)
        .unwrap_or_else(|e| panic!("create_and_checkout_branch: failed to create {name}: {e}"));
    checkout_branch(repo, name);
}

/// Switch HEAD and the working tree to an existing local branch.
///
/// # Panics
/// Panics if the branch does not exist or checkout fails.
pub fn checkout_branch(repo: &Repository, name: &str) {
    repo.find_branch(name, BranchType::Local)
        .unwrap_or_else(|e| panic!("checkout_branch: no local branch {name}: {e}"));
    repo.set_head(&format!("refs/heads/{name}"))
        .unwrap_or_else(|e| panic!("checkout_branch: failed to set HEAD: {e}"));
    repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))
        .unwrap_or_else(|e| panic!("checkout_branch: failed to check out {name}: {e}"));
}

/// Create a lightweight tag at HEAD.
///
/// # Panics
/// Panics if HEAD has no commit or the tag cannot be created.
pub fn tag_head(repo: &Repository, name: &str) {
    let head = repo
        .head()
        .and_then(|h| h.peel(git2::ObjectType::Commit))
        .unwrap_or_else(|e| panic!("tag_head: HEAD has no commit: {e}"));
    repo.tag_lightweight(name, &head, false)
        .unwrap_or_else(|e| panic!("tag_head: failed to create tag {name}: {e}"));
}

/// Name of the branch HEAD points at, or `None` when detached.
pub fn head_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if head.is_branch() {
        head.shorthand().map(String::from)
    } else {
        None
    }
}

/// Whether the working tree has no changes, untracked files included.
pub fn is_clean(repo: &Repository) -> bool {
    let mut opts = git2::StatusOptions::new();
    opts.include_untracked(true).include_ignored(false);
    repo.statuses(Some(&mut opts))
        .map(|statuses| statuses.is_empty())
        .unwrap_or(false)
}
