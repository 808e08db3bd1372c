//! End-to-end integration test for the full resolution flow
//!
//! repository sync -> profile files -> namespace bootstrap -> component trigger

use std::sync::Arc;

use alpaca_core::bootstrap::file_layer_name;
use alpaca_core::settings::{APPLICATION_NAME_KEY, CONFIG_BASEDIR_KEY, CONFIG_URI_KEY};
use alpaca_core::{
    Bootstrap, ComponentRegistry, ComponentTrigger, DEFAULT_PROPERTIES, Environment,
    MapPropertySource, SharedEnvironment,
};
use alpaca_git::RepoState;
use alpaca_namespace::{CoordinationClient, MemoryNamespace};
use alpaca_test_utils::ConfigRemote;
use alpaca_test_utils::namespace::SAMPLE_SNAPSHOT;
use pretty_assertions::assert_eq;

fn namespace() -> Arc<dyn CoordinationClient> {
    Arc::new(MemoryNamespace::from_yaml(SAMPLE_SNAPSHOT).unwrap())
}

/// Host chain with a command-line layer on top and defaults at the bottom.
fn host_environment(remote: &ConfigRemote) -> Environment {
    let uri = remote.uri();
    let basedir = remote.basedir().to_string_lossy().into_owned();
    Environment::new()
        .with_profiles(["dev"])
        .with_source(MapPropertySource::from_pairs(
            "commandLine",
            [
                (APPLICATION_NAME_KEY, "svc"),
                (CONFIG_URI_KEY, uri.as_str()),
                (CONFIG_BASEDIR_KEY, basedir.as_str()),
                ("log.level", "warn"),
            ],
        ))
        .with_source(MapPropertySource::from_pairs(
            DEFAULT_PROPERTIES,
            [("timeout", "1"), ("pool-size", "1"), ("only.default", "yes")],
        ))
}

#[test]
fn test_bootstrap_then_component_resolution() {
    let remote = ConfigRemote::new();
    remote.commit("dev.yml", "db:\n  url: jdbc:file-dev\n");

    // Startup pass
    let mut env = host_environment(&remote);
    let done = Bootstrap::run_with_client(&mut env, namespace()).unwrap();

    assert_eq!(done.sync.as_ref().unwrap().initial_state, RepoState::Absent);
    assert_eq!(
        env.property_sources().names(),
        vec![
            "commandLine",
            file_layer_name("dev").as_str(),
            "/config/applications/svc/dev",
            "/config/applications/default/dev",
            DEFAULT_PROPERTIES,
        ]
    );
    assert_eq!(env.get_property("log.level"), Some("warn"));
    assert_eq!(env.get_property("db.url"), Some("jdbc:file-dev"));
    assert_eq!(env.get_property("timeout"), Some("30"));
    assert_eq!(env.get_property("only.default"), Some("yes"));

    // Components resolved on demand share the bootstrap client
    let registry: ComponentRegistry = [
        ("primaryDataSource", "alpaca.datasource.primary"),
        ("cache", "alpaca.components.cache"),
    ]
    .into_iter()
    .collect();
    let trigger = ComponentTrigger::new(registry, done.client.clone(), SharedEnvironment::new(env));

    trigger.on_instantiate("primaryDataSource").unwrap();
    trigger.on_instantiate("cache").unwrap();

    let shared = trigger.environment();
    assert_eq!(
        shared.get_property("alpaca.datasource.primary.url").as_deref(),
        Some("jdbc:primary-dev")
    );
    assert_eq!(shared.get_property("alpaca.components.cache.ttl").as_deref(), Some("300"));
    // Component layers sit above defaults but below everything installed earlier
    assert_eq!(shared.get_property("pool-size").as_deref(), Some("4"));
    assert_eq!(shared.get_property("timeout").as_deref(), Some("30"));

    let env = shared.lock();
    let names = env.property_sources().names();
    assert_eq!(names.first(), Some(&"commandLine"));
    assert_eq!(names.last(), Some(&DEFAULT_PROPERTIES));
    assert_eq!(names.len(), 8);
}

#[test]
fn test_second_startup_picks_up_remote_changes_and_discards_local_edits() {
    let remote = ConfigRemote::new();
    remote.commit("dev.yml", "timeout: 45\n");

    let mut first = host_environment(&remote);
    Bootstrap::run_with_client(&mut first, namespace()).unwrap();
    assert_eq!(first.get_property("timeout"), Some("45"));

    remote.write_work_file("dev.yml", "timeout: 0\n");
    remote.commit("dev.yml", "timeout: 50\n");

    let mut second = host_environment(&remote);
    let done = Bootstrap::run_with_client(&mut second, namespace()).unwrap();

    let sync = done.sync.unwrap();
    assert_eq!(sync.initial_state, RepoState::OpenDirty);
    assert_eq!(sync.final_state, RepoState::Synced);
    assert_eq!(second.get_property("timeout"), Some("50"));
    remote.assert_work_file("dev.yml", "timeout: 50\n");
}

#[test]
fn test_namespace_outage_keeps_file_layers() {
    let remote = ConfigRemote::new();
    remote.commit("dev.yml", "timeout: 45\n");
    let ns = MemoryNamespace::from_yaml(SAMPLE_SNAPSHOT).unwrap();
    ns.fail_on("/config/applications/default/dev", "connection loss");

    let mut env = host_environment(&remote);
    let err = Bootstrap::run_with_client(&mut env, Arc::new(ns)).unwrap_err();

    assert!(err.to_string().contains("connection loss"));
    assert!(env.property_sources().contains(&file_layer_name("dev")));
    assert!(env.property_sources().contains("/config/applications/svc/dev"));
    assert!(!env.property_sources().contains("/config/applications/default/dev"));
}
