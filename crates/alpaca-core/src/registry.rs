//! Component registry for on-demand resolution
//!
//! Maps component ids to the configuration prefix each component declared.

use std::collections::HashMap;

/// Registry mapping component ids to declared configuration prefixes.
///
/// Populated at startup by the host. [`crate::ComponentTrigger`] consults it
/// when a component is instantiated.
///
/// # Example
///
/// ```
/// use alpaca_core::ComponentRegistry;
///
/// let mut registry = ComponentRegistry::new();
/// registry.register("primaryDataSource", "alpaca.datasource.primary");
/// assert_eq!(
///     registry.declared_prefix("primaryDataSource"),
///     Some("alpaca.datasource.primary")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    prefixes: HashMap<String, String>,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the prefix a component declares.
    ///
    /// Registering the same component again replaces its prefix.
    pub fn register(&mut self, component_id: impl Into<String>, declared_prefix: impl Into<String>) {
        self.prefixes
            .insert(component_id.into(), declared_prefix.into());
    }

    pub fn declared_prefix(&self, component_id: &str) -> Option<&str> {
        self.prefixes.get(component_id).map(String::as_str)
    }

    /// All registered component ids, sorted.
    pub fn list_components(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.prefixes.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.prefixes.contains_key(component_id)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComponentRegistry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (id, prefix) in iter {
            registry.register(id, prefix);
        }
        registry
    }
}
