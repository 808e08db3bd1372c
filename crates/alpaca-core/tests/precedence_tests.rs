use std::sync::Arc;

use alpaca_core::plan::is_unset;
use alpaca_core::{
    ComponentRegistry, ComponentTrigger, ConfigMerger, ContextEntry, ContextPlan, DEFAULT_PROPERTIES,
    Environment, MapPropertySource, SharedEnvironment,
};
use alpaca_namespace::{CoordinationClient, MemoryNamespace};
use alpaca_test_utils::namespace::{BROKEN_DOCUMENT_SNAPSHOT, SAMPLE_SNAPSHOT};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn sample() -> Arc<MemoryNamespace> {
    Arc::new(MemoryNamespace::from_yaml(SAMPLE_SNAPSHOT).unwrap())
}

fn dev() -> Vec<String> {
    vec!["dev".to_string()]
}

#[test]
fn test_bootstrap_plan_order() {
    let plan = ContextPlan::bootstrap("svc", &dev());

    assert_eq!(
        plan.declared(),
        &[
            ContextEntry::new("config/applications/default/dev", "", "dev"),
            ContextEntry::new("config/applications/svc/dev", "", "dev"),
        ]
    );
    let order: Vec<&str> = plan.resolution_order().map(|e| e.path.as_str()).collect();
    assert_eq!(
        order,
        vec!["/config/applications/svc/dev", "/config/applications/default/dev"]
    );
}

#[test]
fn test_bootstrap_plan_multiple_profiles() {
    let profiles = vec!["dev".to_string(), "local".to_string()];
    let paths: Vec<String> = ContextPlan::bootstrap("svc", &profiles)
        .declared()
        .iter()
        .map(|e| e.path.to_string())
        .collect();

    assert_eq!(
        paths,
        vec![
            "/config/applications/default/dev",
            "/config/applications/default/local",
            "/config/applications/svc/dev",
            "/config/applications/svc/local",
        ]
    );
}

#[test]
fn test_app_specific_layer_wins_over_default() {
    let ns = sample();
    let mut env = Environment::new().with_profiles(["dev"]);

    let plan = ContextPlan::bootstrap("svc", &env.active_profiles());
    let report = ConfigMerger::new(ns.as_ref()).apply(&plan, &mut env).unwrap();

    assert_eq!(
        env.property_sources().names(),
        vec!["/config/applications/svc/dev", "/config/applications/default/dev"]
    );
    assert_eq!(report.installed.len(), 2);
    assert_eq!(env.get_property("timeout"), Some("30"));
    assert_eq!(env.get_property("log.level"), Some("info"));
    assert_eq!(env.get_property("server.port"), Some("8081"));
    assert_eq!(env.get_property("feature-x"), Some(""));
}

#[test]
fn test_layers_go_above_default_properties() {
    let ns = sample();
    let mut env = Environment::new()
        .with_profiles(["dev"])
        .with_source(MapPropertySource::from_pairs("commandLine", [("timeout", "5")]))
        .with_source(MapPropertySource::from_pairs(
            DEFAULT_PROPERTIES,
            [("timeout", "1"), ("fallback", "yes")],
        ));

    let plan = ContextPlan::bootstrap("svc", &dev());
    ConfigMerger::new(ns.as_ref()).apply(&plan, &mut env).unwrap();

    assert_eq!(
        env.property_sources().names(),
        vec![
            "commandLine",
            "/config/applications/svc/dev",
            "/config/applications/default/dev",
            DEFAULT_PROPERTIES,
        ]
    );
    assert_eq!(env.get_property("timeout"), Some("5"));
    assert_eq!(env.get_property("fallback"), Some("yes"));
}

#[test]
fn test_empty_layer_never_installed() {
    let ns = sample();
    let mut env = Environment::new().with_profiles(["prod"]);

    let plan = ContextPlan::bootstrap("svc", &env.active_profiles());
    let report = ConfigMerger::new(ns.as_ref()).apply(&plan, &mut env).unwrap();

    assert_eq!(env.property_sources().names(), vec!["/config/applications/default/prod"]);
    assert_eq!(report.skipped_empty, 1);
}

#[test]
fn test_document_errors_reported() {
    let ns = MemoryNamespace::from_yaml(BROKEN_DOCUMENT_SNAPSHOT).unwrap();
    let mut env = Environment::new().with_profiles(["dev"]);

    let plan = ContextPlan::bootstrap("svc", &dev());
    let report = ConfigMerger::new(&ns).apply(&plan, &mut env).unwrap();

    assert_eq!(report.document_errors, 1);
    assert_eq!(env.get_property("timeout"), Some("30"));
}

#[test]
fn test_client_failure_aborts_merge() {
    let ns = sample();
    ns.fail_on("/config/applications/default/dev", "connection loss");
    let mut env = Environment::new().with_profiles(["dev"]);

    let plan = ContextPlan::bootstrap("svc", &dev());
    let err = ConfigMerger::new(ns.as_ref()).apply(&plan, &mut env).unwrap_err();

    assert!(err.to_string().contains("connection loss"));
    // The layer resolved before the failure stays installed.
    assert_eq!(env.property_sources().names(), vec!["/config/applications/svc/dev"]);
}

#[test]
fn test_datasource_plan_has_default_then_named() {
    let plan = ContextPlan::component("alpaca.datasource.primary", &dev());

    assert_eq!(
        plan.declared(),
        &[
            ContextEntry::new("config/databases/default/dev", "", "dev"),
            ContextEntry::new("config/databases/primary/dev", "alpaca.datasource.primary", "dev"),
        ]
    );
}

#[rstest]
#[case("alpaca.other.thing")]
#[case("server")]
#[case("alpaca.components.")]
fn test_unrelated_prefix_plans_nothing(#[case] prefix: &str) {
    assert!(ContextPlan::component(prefix, &dev()).is_empty());
}

#[test]
fn test_set_prefix_plans_nothing() {
    let env = Environment::new()
        .with_profiles(["dev"])
        .with_source(MapPropertySource::from_pairs(
            "host",
            [("alpaca.datasource.primary", "configured")],
        ));

    assert!(!is_unset(&env, "alpaca.datasource.primary"));
    assert!(ContextPlan::for_component("alpaca.datasource.primary", &env).is_empty());
}

fn trigger(ns: Arc<MemoryNamespace>) -> ComponentTrigger {
    let registry: ComponentRegistry = [
        ("primaryDataSource", "alpaca.datasource.primary"),
        ("cache", "alpaca.components.cache"),
        ("web", "server"),
    ]
    .into_iter()
    .collect();
    let environment = SharedEnvironment::new(Environment::new().with_profiles(["dev"]));
    ComponentTrigger::new(registry, ns as Arc<dyn CoordinationClient>, environment)
}

#[test]
fn test_trigger_resolves_datasource() {
    let trigger = trigger(sample());

    let report = trigger.on_instantiate("primaryDataSource").unwrap().unwrap();
    assert_eq!(
        report.installed,
        vec!["/config/databases/primary/dev", "/config/databases/default/dev"]
    );

    let env = trigger.environment();
    assert_eq!(
        env.get_property("alpaca.datasource.primary.url").as_deref(),
        Some("jdbc:primary-dev")
    );
    assert_eq!(env.get_property("pool-size").as_deref(), Some("4"));
}

#[test]
fn test_trigger_is_idempotent() {
    let trigger = trigger(sample());
    trigger.on_instantiate("cache").unwrap();

    let again = trigger.on_instantiate("cache").unwrap().unwrap();
    assert!(again.installed.is_empty());
    assert_eq!(again.skipped_duplicate, 1);
    assert_eq!(
        trigger.environment().get_property("alpaca.components.cache.ttl").as_deref(),
        Some("300")
    );
}

#[test]
fn test_trigger_ignores_unregistered_and_unrelated() {
    let trigger = trigger(sample());

    assert!(trigger.on_instantiate("unknown").unwrap().is_none());
    let report = trigger.on_instantiate("web").unwrap().unwrap();
    assert!(report.installed.is_empty());
    assert!(trigger.environment().lock().property_sources().is_empty());
}

#[test]
fn test_concurrent_instantiation_installs_once() {
    let trigger = trigger(sample());

    let installed: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| trigger.resolve_prefix("alpaca.components.cache").unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().installed.len())
            .sum()
    });

    assert_eq!(installed, 1);
    assert_eq!(trigger.environment().lock().property_sources().len(), 1);
}
