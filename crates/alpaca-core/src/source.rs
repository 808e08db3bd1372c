//! Prefixable property source built from one resolved root

use alpaca_fs::PropertyMap;
use alpaca_namespace::WalkOutcome;

use crate::PropertySource;

/// One named layer of resolved properties.
///
/// Keys are `prefix.relativeKey`, or just `relativeKey` when the prefix is
/// empty. Immutable after construction. An empty layer is valid but is never
/// installed into an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredSource {
    name: String,
    prefix: String,
    entries: PropertyMap,
}

impl LayeredSource {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, entries: PropertyMap) -> Self {
        let prefix = prefix.into();
        let entries = entries.with_prefix(&prefix);
        Self {
            name: name.into(),
            prefix,
            entries,
        }
    }

    /// Layer built from a namespace walk.
    pub fn from_walk(name: impl Into<String>, prefix: impl Into<String>, outcome: WalkOutcome) -> Self {
        Self::new(name, prefix, outcome.entries)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertySource for LayeredSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, key: &str) -> Option<&str> {
        self.get(key)
    }

    fn property_names(&self) -> Vec<&str> {
        self.names().collect()
    }
}
