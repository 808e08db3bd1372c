//! Shared git2 helper functions for working-copy synchronization

use git2::{BranchType, MergeOptions, Repository, ResetType, Signature, Status, StatusOptions};

use crate::{Error, Result};

/// Name of the remote every working copy is cloned from.
pub const ORIGIN: &str = "origin";

/// Get the current branch name from a repository.
///
/// Returns the branch name if HEAD points to a branch, or `None` if HEAD is detached.
pub fn get_current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = repo.head()?;

    if head.is_branch() {
        Ok(Some(head.shorthand().unwrap_or("HEAD").to_string()))
    } else {
        Ok(None)
    }
}

/// URL of the `origin` remote, if one is configured.
pub fn origin_url(repo: &Repository) -> Option<String> {
    repo.find_remote(ORIGIN)
        .ok()
        .and_then(|remote| remote.url().map(String::from))
}

/// Paths that make the working tree dirty, sorted.
///
/// Untracked files count, ignored files do not.
pub fn dirty_files(repo: &Repository) -> Result<Vec<String>> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts))?;
    let mut files: Vec<String> = statuses
        .iter()
        .filter(|entry| entry.status() != Status::CURRENT)
        .filter_map(|entry| entry.path().map(String::from))
        .collect();
    files.sort();
    files.dedup();
    Ok(files)
}

/// Whether `label` names a remote branch that has no local counterpart yet.
pub fn should_track(repo: &Repository, label: &str) -> bool {
    let remote_exists = repo
        .find_branch(&format!("{ORIGIN}/{label}"), BranchType::Remote)
        .is_ok();
    let local_exists = repo.find_branch(label, BranchType::Local).is_ok();
    remote_exists && !local_exists
}

/// Check out `label`.
///
/// A remote branch with no local branch gets a local branch created at
/// `origin/<label>` with its upstream set. Anything else (local branches,
/// tags, commit ids) is resolved with `revparse` and checked out as-is;
/// non-branch targets leave HEAD detached.
pub fn checkout_label(repo: &Repository, label: &str) -> Result<()> {
    checkout_label_inner(repo, label).map_err(|source| Error::Checkout {
        label: label.to_string(),
        source,
    })
}

fn checkout_label_inner(repo: &Repository, label: &str) -> std::result::Result<(), git2::Error> {
    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout.safe();

    if should_track(repo, label) {
        let upstream = format!("{ORIGIN}/{label}");
        let remote_branch = repo.find_branch(&upstream, BranchType::Remote)?;
        let commit = remote_branch.get().peel_to_commit()?;

        let mut local = repo.branch(label, &commit, false)?;
        local.set_upstream(Some(upstream.as_str()))?;
        tracing::info!(label, upstream = %upstream, "Created tracking branch");

        repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
        return repo.set_head(&format!("refs/heads/{label}"));
    }

    let (object, reference) = repo.revparse_ext(label)?;
    repo.checkout_tree(&object, Some(&mut checkout))?;

    match reference {
        Some(reference) if reference.is_branch() => {
            repo.set_head(reference.name().unwrap_or(label))
        }
        _ => {
            let commit = object.peel_to_commit()?;
            repo.set_head_detached(commit.id())
        }
    }
}

/// Merge `origin/<label>` into the current branch.
///
/// Fast-forwards when possible, otherwise creates a merge commit. A merge
/// with conflicts is aborted and reported as [`Error::MergeConflict`].
/// Returns `true` when HEAD moved.
pub fn merge_remote(repo: &Repository, label: &str) -> Result<bool> {
    let reference = format!("refs/remotes/{ORIGIN}/{label}");
    let source_commit = repo.find_reference(&reference)?.peel_to_commit()?;
    let annotated = repo.find_annotated_commit(source_commit.id())?;

    let (merge_analysis, _) = repo.merge_analysis(&[&annotated])?;

    if merge_analysis.is_up_to_date() {
        return Ok(false);
    }

    let current_branch = get_current_branch(repo)?.ok_or_else(|| Error::DetachedHead {
        reference: reference.clone(),
    })?;

    if merge_analysis.is_fast_forward() {
        // Update the tree first so a conflicting local change leaves the ref alone.
        repo.checkout_tree(
            source_commit.as_object(),
            Some(git2::build::CheckoutBuilder::default().safe()),
        )?;
        let refname = format!("refs/heads/{current_branch}");
        let mut head_ref = repo.find_reference(&refname)?;
        head_ref.set_target(
            source_commit.id(),
            &format!("merge {reference}: fast-forward"),
        )?;
        tracing::info!(branch = %current_branch, to = %source_commit.id(), "Fast-forwarded");
        return Ok(true);
    }

    // Normal merge
    let mut merge_opts = MergeOptions::new();
    repo.merge(&[&annotated], Some(&mut merge_opts), None)?;

    let mut index = repo.index()?;
    if index.has_conflicts() {
        repo.cleanup_state()?;
        return Err(Error::MergeConflict { reference });
    }

    let signature = repo
        .signature()
        .or_else(|_| Signature::now("alpaca", "alpaca@localhost"))?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let head_commit = repo.head()?.peel_to_commit()?;

    let message = format!("Merge {reference} into {current_branch}");
    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        &message,
        &tree,
        &[&head_commit, &source_commit],
    )?;

    repo.cleanup_state()?;
    tracing::info!(branch = %current_branch, "Merged {reference}");

    Ok(true)
}

/// Hard-reset the current branch, index and working tree to `origin/<label>`.
///
/// Untracked files are left in place, as `git reset --hard` does.
pub fn reset_hard_to_remote(repo: &Repository, label: &str) -> Result<git2::Oid> {
    let reference = format!("refs/remotes/{ORIGIN}/{label}");
    let target = repo.revparse_single(&reference)?;
    repo.reset(&target, ResetType::Hard, None)?;
    Ok(target.id())
}
