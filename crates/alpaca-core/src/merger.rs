//! Resolve plan entries and install them into the environment chain

use alpaca_namespace::{CoordinationClient, NamespaceWalker};

use crate::{ContextEntry, ContextPlan, Environment, LayeredSource, PropertySource, Result};

/// What one merge pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Names of the sources added to the chain, in insertion order.
    pub installed: Vec<String>,
    /// Layers that resolved to no entries.
    pub skipped_empty: usize,
    /// Layers whose name was already in the chain.
    pub skipped_duplicate: usize,
    /// Payloads or files that failed to parse as documents.
    pub document_errors: usize,
}

impl MergeReport {
    /// Fold another pass into this one.
    pub fn absorb(&mut self, other: MergeReport) {
        self.installed.extend(other.installed);
        self.skipped_empty += other.skipped_empty;
        self.skipped_duplicate += other.skipped_duplicate;
        self.document_errors += other.document_errors;
    }
}

/// Resolves plan entries against a coordination client.
pub struct ConfigMerger<'a> {
    client: &'a dyn CoordinationClient,
}

impl<'a> ConfigMerger<'a> {
    pub fn new(client: &'a dyn CoordinationClient) -> Self {
        Self { client }
    }

    /// Resolve every entry of `plan` in resolution order and install the
    /// non-empty layers.
    ///
    /// A client error aborts the pass; layers installed before it stay in
    /// the chain.
    pub fn apply(&self, plan: &ContextPlan, environment: &mut Environment) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        for entry in plan.resolution_order() {
            let source = self.resolve(entry, &mut report)?;
            install(environment, source, &mut report);
        }
        Ok(report)
    }

    /// Walk one entry into a layer named after its namespace path.
    pub fn resolve(&self, entry: &ContextEntry, report: &mut MergeReport) -> Result<LayeredSource> {
        let outcome = NamespaceWalker::new(self.client).walk(&entry.path)?;
        report.document_errors += outcome.document_errors;
        Ok(LayeredSource::from_walk(
            entry.path.as_str(),
            entry.prefix.as_str(),
            outcome,
        ))
    }
}

/// Install `source` at the lowest precedence above any `defaultProperties`
/// fallback, unless it is empty or its name is taken.
pub fn install(environment: &mut Environment, source: LayeredSource, report: &mut MergeReport) {
    let name = PropertySource::name(&source).to_string();

    if source.is_empty() {
        tracing::debug!(source = %name, "Skipping empty property source");
        report.skipped_empty += 1;
        return;
    }
    if environment.property_sources().contains(&name) {
        tracing::info!(source = %name, "Property source already installed, keeping existing one");
        report.skipped_duplicate += 1;
        return;
    }

    for (key, value) in source.iter() {
        tracing::debug!(source = %name, key, value, "load property");
    }
    if environment.add_above_defaults(source) {
        report.installed.push(name);
    }
}
