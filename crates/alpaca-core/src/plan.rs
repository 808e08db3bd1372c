//! Resolution planning: which namespace roots to read, with which prefix
//!
//! Planning is pure. Given an application name, the active profiles and a
//! scope it lists `(path, prefix, profile)` targets in declaration order.
//! Resolution walks them in reverse, so with each resolved layer appended at
//! the back of the chain the last-declared target ends up with the highest
//! precedence among them.

use std::fmt;

use alpaca_namespace::NodePath;

use crate::Environment;

pub const APPLICATIONS_BASE: &str = "config/applications";
pub const DATABASES_BASE: &str = "config/databases";
pub const COMPONENTS_BASE: &str = "config/components";

/// Context shared by every application (or every datasource).
pub const DEFAULT_CONTEXT: &str = "default";

pub const DATASOURCE_FAMILY: &str = "alpaca.datasource.";
pub const COMPONENTS_FAMILY: &str = "alpaca.components.";

/// One namespace root to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub path: NodePath,
    pub prefix: String,
    pub profile: String,
}

impl ContextEntry {
    pub fn new(path: impl Into<NodePath>, prefix: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
            profile: profile.into(),
        }
    }
}

impl fmt::Display for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{} -> {}", self.path, self.prefix)
        }
    }
}

/// What a plan is computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Process startup for one application.
    Bootstrap { application: String },
    /// One component that declared a configuration prefix.
    Component { declared_prefix: String },
}

/// Ordered resolution targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPlan {
    entries: Vec<ContextEntry>,
}

impl ContextPlan {
    pub fn plan(scope: &Scope, profiles: &[String]) -> Self {
        match scope {
            Scope::Bootstrap { application } => Self::bootstrap(application, profiles),
            Scope::Component { declared_prefix } => Self::component(declared_prefix, profiles),
        }
    }

    /// `default/<profile>` for every profile, then `<app>/<profile>` for
    /// every profile, all under [`APPLICATIONS_BASE`] with no prefix.
    pub fn bootstrap(application: &str, profiles: &[String]) -> Self {
        let mut plan = Self::default();
        plan.add_profiles(&format!("{APPLICATIONS_BASE}/{DEFAULT_CONTEXT}"), "", profiles);
        plan.add_profiles(&format!("{APPLICATIONS_BASE}/{application}"), "", profiles);
        plan
    }

    /// Targets for a component's declared prefix.
    ///
    /// Only `alpaca.datasource.<name>` and `alpaca.components.<name>` are
    /// planned; any other prefix, or an empty `<name>`, yields an empty
    /// plan. Whether the prefix is already set is not checked here, see
    /// [`ContextPlan::for_component`].
    pub fn component(declared_prefix: &str, profiles: &[String]) -> Self {
        let mut plan = Self::default();

        if let Some(name) = declared_prefix.strip_prefix(DATASOURCE_FAMILY)
            && !name.is_empty()
        {
            plan.add_profiles(&format!("{DATABASES_BASE}/{DEFAULT_CONTEXT}"), "", profiles);
            plan.add_profiles(&format!("{DATABASES_BASE}/{name}"), declared_prefix, profiles);
        } else if let Some(name) = declared_prefix.strip_prefix(COMPONENTS_FAMILY)
            && !name.is_empty()
        {
            plan.add_profiles(&format!("{COMPONENTS_BASE}/{name}"), declared_prefix, profiles);
        }

        plan
    }

    /// Like [`ContextPlan::component`], but empty when the declared prefix
    /// already resolves to a value in `environment`.
    pub fn for_component(declared_prefix: &str, environment: &Environment) -> Self {
        if !is_unset(environment, declared_prefix) {
            tracing::debug!(prefix = declared_prefix, "Prefix already set, nothing to resolve");
            return Self::default();
        }
        Self::component(declared_prefix, &environment.active_profiles())
    }

    /// Targets in declaration order.
    pub fn declared(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// Targets in the order they are resolved and installed.
    pub fn resolution_order(&self) -> impl Iterator<Item = &ContextEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add_profiles(&mut self, base: &str, prefix: &str, profiles: &[String]) {
        for profile in profiles {
            self.entries
                .push(ContextEntry::new(format!("{base}/{profile}"), prefix, profile.as_str()));
        }
    }
}

/// A key counts as unset when absent or holding the literal `null`.
pub fn is_unset(environment: &Environment, key: &str) -> bool {
    environment.get_property(key).is_none_or(|value| value == "null")
}
