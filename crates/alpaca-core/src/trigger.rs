//! Per-component resolution pass

use std::sync::Arc;

use alpaca_namespace::CoordinationClient;

use crate::{ComponentRegistry, ConfigMerger, ContextPlan, MergeReport, Result, SharedEnvironment};

/// Resolves namespace layers for a component when it is instantiated.
///
/// A component is eligible when its declared prefix belongs to the
/// datasource or components family and that prefix is unset in the
/// environment. The environment lock is held from the unset check through
/// the merge, so concurrent instantiations of components sharing a prefix
/// resolve it once.
pub struct ComponentTrigger {
    registry: ComponentRegistry,
    client: Arc<dyn CoordinationClient>,
    environment: SharedEnvironment,
}

impl ComponentTrigger {
    pub fn new(
        registry: ComponentRegistry,
        client: Arc<dyn CoordinationClient>,
        environment: SharedEnvironment,
    ) -> Self {
        Self {
            registry,
            client,
            environment,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn environment(&self) -> &SharedEnvironment {
        &self.environment
    }

    /// Run the pass for a registered component.
    ///
    /// Returns `Ok(None)` for components that declared no prefix.
    pub fn on_instantiate(&self, component_id: &str) -> Result<Option<MergeReport>> {
        let Some(prefix) = self.registry.declared_prefix(component_id) else {
            tracing::trace!(component = component_id, "No declared prefix");
            return Ok(None);
        };
        self.resolve_prefix(prefix).map(Some)
    }

    /// Run the pass for a declared prefix directly.
    pub fn resolve_prefix(&self, declared_prefix: &str) -> Result<MergeReport> {
        let mut environment = self.environment.lock();

        let plan = ContextPlan::for_component(declared_prefix, &environment);
        if plan.is_empty() {
            return Ok(MergeReport::default());
        }

        tracing::debug!(prefix = declared_prefix, targets = plan.len(), "Resolving component configuration");
        ConfigMerger::new(self.client.as_ref()).apply(&plan, &mut environment)
    }
}
