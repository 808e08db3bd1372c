use std::fs;
use std::net::TcpListener;
use std::sync::mpsc;
use std::time::Duration;

use alpaca_git::{Error, RepoState, RepoSync, TransportOptions};
use alpaca_test_utils::ConfigRemote;
use alpaca_test_utils::git::{self as fixtures, DEFAULT_BRANCH};
use git2::BranchType;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn sync_for(remote: &ConfigRemote) -> RepoSync {
    RepoSync::new(remote.uri(), remote.basedir())
}

#[test]
fn test_sync_from_absent_clones_label() {
    let remote = ConfigRemote::new();
    remote.commit("dev.yml", "timeout: 30\n");

    let report = sync_for(&remote).sync(DEFAULT_BRANCH).unwrap();

    assert_eq!(report.initial_state, RepoState::Absent);
    assert_eq!(report.final_state, RepoState::Synced);
    assert!(!report.reset);

    let work = remote.open_work();
    assert_eq!(fixtures::head_branch(&work).as_deref(), Some(DEFAULT_BRANCH));
    assert!(fixtures::is_clean(&work));
    remote.assert_work_file("dev.yml", "timeout: 30\n");
}

#[test]
fn test_stale_directory_is_replaced_by_clone() {
    let remote = ConfigRemote::new();
    fs::create_dir_all(remote.basedir()).unwrap();
    fs::write(remote.basedir().join("leftover.txt"), "junk").unwrap();

    let report = sync_for(&remote).sync(DEFAULT_BRANCH).unwrap();

    assert_eq!(report.initial_state, RepoState::Absent);
    remote.assert_work_file_absent("leftover.txt");
    remote.assert_work_file("README.md", "# config\n");
}

#[test]
fn test_clean_copy_picks_up_remote_commit() {
    let remote = ConfigRemote::new();
    let sync = sync_for(&remote);
    sync.sync(DEFAULT_BRANCH).unwrap();

    remote.commit("dev.yml", "timeout: 45\n");
    let report = sync.sync(DEFAULT_BRANCH).unwrap();

    assert_eq!(report.initial_state, RepoState::OpenClean);
    assert!(report.updated_refs >= 1);
    assert!(report.merged);
    assert!(!report.reset);
    remote.assert_work_file("dev.yml", "timeout: 45\n");
}

#[test]
fn test_dirty_copy_without_remote_changes_is_reset() {
    let remote = ConfigRemote::new();
    let sync = sync_for(&remote);
    sync.sync(DEFAULT_BRANCH).unwrap();

    remote.write_work_file("README.md", "local edit\n");
    let report = sync.sync(DEFAULT_BRANCH).unwrap();

    assert_eq!(report.initial_state, RepoState::OpenDirty);
    assert_eq!(report.dirty_files, vec!["README.md".to_string()]);
    assert_eq!(report.updated_refs, 0);
    assert!(report.reset);
    remote.assert_work_file("README.md", "# config\n");
    assert!(fixtures::is_clean(&remote.open_work()));
}

#[rstest]
#[case::disjoint_change("dev.yml", "timeout: 60\n")]
#[case::conflicting_change("README.md", "# upstream\n")]
fn test_dirty_copy_matches_remote_after_fetch(#[case] file: &str, #[case] content: &str) {
    let remote = ConfigRemote::new();
    let sync = sync_for(&remote);
    sync.sync(DEFAULT_BRANCH).unwrap();

    let upstream_head = remote.commit(file, content);
    remote.write_work_file("README.md", "local edit\n");

    let report = sync.sync(DEFAULT_BRANCH).unwrap();

    assert_eq!(report.initial_state, RepoState::OpenDirty);
    assert!(report.updated_refs >= 1);
    assert!(report.reset);
    assert_eq!(report.final_state, RepoState::Synced);

    let work = remote.open_work();
    assert!(fixtures::is_clean(&work));
    assert_eq!(work.head().unwrap().peel_to_commit().unwrap().id(), upstream_head);
    remote.assert_work_file(file, content);
}

#[test]
fn test_remote_only_branch_is_tracked() {
    let remote = ConfigRemote::new();
    remote.branch("feature");
    remote.commit("feature.yml", "flag: true\n");
    remote.switch(DEFAULT_BRANCH);

    let report = sync_for(&remote).sync("feature").unwrap();
    assert_eq!(report.label, "feature");

    let work = remote.open_work();
    assert_eq!(fixtures::head_branch(&work).as_deref(), Some("feature"));
    let local = work.find_branch("feature", BranchType::Local).unwrap();
    assert_eq!(
        local.upstream().unwrap().name().unwrap(),
        Some("origin/feature")
    );
    remote.assert_work_file("feature.yml", "flag: true\n");
}

#[test]
fn test_tag_label_detaches_head() {
    let remote = ConfigRemote::new();
    remote.commit("dev.yml", "version: 1\n");
    remote.tag("v1");
    remote.commit("dev.yml", "version: 2\n");

    sync_for(&remote).sync("v1").unwrap();

    let work = remote.open_work();
    assert_eq!(fixtures::head_branch(&work), None);
    remote.assert_work_file("dev.yml", "version: 1\n");
}

#[test]
fn test_unknown_label_is_fatal() {
    let remote = ConfigRemote::new();
    let err = sync_for(&remote).sync("no-such-label").unwrap_err();

    assert!(matches!(err, Error::Checkout { ref label, .. } if label == "no-such-label"));
}

#[test]
fn test_clean_copy_without_origin_is_left_alone() {
    let remote = ConfigRemote::new();
    let local = fixtures::init_repo(&remote.basedir());
    let head = fixtures::commit_file(&local, "local.yml", "a: 1\n", "local only");

    let report = sync_for(&remote).sync(DEFAULT_BRANCH).unwrap();

    assert_eq!(report.initial_state, RepoState::OpenClean);
    assert_eq!(report.final_state, RepoState::OpenClean);
    assert_eq!(local.head().unwrap().peel_to_commit().unwrap().id(), head);
    remote.assert_work_file_absent("README.md");
}

#[test]
fn test_unreachable_remote_keeps_local_copy() {
    let remote = ConfigRemote::new();
    let sync = sync_for(&remote);
    sync.sync(DEFAULT_BRANCH).unwrap();

    fs::remove_dir_all(remote.upstream_path()).unwrap();
    remote.write_work_file("README.md", "local edit\n");

    let report = sync.sync(DEFAULT_BRANCH).unwrap();

    assert_eq!(report.initial_state, RepoState::OpenDirty);
    assert_eq!(report.final_state, RepoState::Synced);
    assert_eq!(report.updated_refs, 0);
    assert!(report.reset);
    remote.assert_work_file("README.md", "# config\n");
}

#[test]
fn test_failed_reset_is_not_fatal() {
    let remote = ConfigRemote::new();
    remote.tag("v1");
    let sync = sync_for(&remote);
    sync.sync("v1").unwrap();

    // A tag has no origin/<label> ref to reset to.
    remote.write_work_file("README.md", "local edit\n");
    let report = sync.sync("v1").unwrap();

    assert_eq!(report.initial_state, RepoState::OpenDirty);
    assert_eq!(report.final_state, RepoState::Synced);
    assert!(!report.reset);
    remote.assert_work_file("README.md", "local edit\n");
}

#[test]
fn test_silent_remote_is_bounded_by_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    // Accept connections and never answer.
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });

    let remote = ConfigRemote::new();
    let sync = RepoSync::new(format!("http://127.0.0.1:{port}/config.git"), remote.basedir())
        .with_transport(TransportOptions {
            timeout: Duration::from_secs(1),
            ..Default::default()
        });

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(sync.sync(DEFAULT_BRANCH));
    });

    let result = rx
        .recv_timeout(Duration::from_secs(20))
        .expect("clone against a silent remote did not time out");
    assert!(matches!(result, Err(Error::Clone { .. })));
    remote.assert_work_file_absent(".git");
}
