//! Host environment and its ordered property chain

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alpaca_fs::PropertyMap;

/// Name of the lowest-precedence source a host may register for fallbacks.
///
/// Resolved layers are inserted immediately before it when present.
pub const DEFAULT_PROPERTIES: &str = "defaultProperties";

/// Comma-separated profile list consulted when no profiles were set explicitly.
pub const ACTIVE_PROFILES_KEY: &str = "alpaca.profiles.active";

/// A named, enumerable set of properties.
pub trait PropertySource: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn get_property(&self, key: &str) -> Option<&str>;

    /// Every key this source defines, in source order.
    fn property_names(&self) -> Vec<&str>;

    fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }
}

/// A property source backed by a plain map, for host-supplied values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPropertySource {
    name: String,
    properties: PropertyMap,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Build from `(key, value)` pairs.
    pub fn from_pairs<K, V>(name: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(name, pairs.into_iter().collect())
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    fn property_names(&self) -> Vec<&str> {
        self.properties.keys().collect()
    }
}

/// Ordered chain of property sources, highest precedence first.
///
/// Source names are unique. Every insertion refuses a name that is already
/// present and reports it by returning `false`; nothing is ever replaced or
/// removed.
#[derive(Debug, Default)]
pub struct PropertySources {
    sources: Vec<Box<dyn PropertySource>>,
}

impl PropertySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with the highest precedence.
    pub fn add_first(&mut self, source: impl PropertySource + 'static) -> bool {
        self.insert_at(0, Box::new(source))
    }

    /// Insert with the lowest precedence.
    pub fn add_last(&mut self, source: impl PropertySource + 'static) -> bool {
        let index = self.sources.len();
        self.insert_at(index, Box::new(source))
    }

    /// Insert immediately ahead of the source named `marker`.
    ///
    /// Returns `false` without inserting when `marker` is not in the chain.
    pub fn add_before(&mut self, marker: &str, source: impl PropertySource + 'static) -> bool {
        match self.position(marker) {
            Some(index) => self.insert_at(index, Box::new(source)),
            None => {
                tracing::warn!(marker, source = source.name(), "Marker source not found");
                false
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&dyn PropertySource> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Source names, highest precedence first.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn PropertySource> {
        self.sources.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// First value for `key` walking the chain in precedence order, with the
    /// name of the source that supplied it.
    pub fn resolve(&self, key: &str) -> Option<(&str, &str)> {
        self.sources
            .iter()
            .find_map(|s| s.get_property(key).map(|value| (s.name(), value)))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sources.iter().position(|s| s.name() == name)
    }

    fn insert_at(&mut self, index: usize, source: Box<dyn PropertySource>) -> bool {
        if self.contains(source.name()) {
            tracing::debug!(source = source.name(), "Property source already present");
            return false;
        }
        self.sources.insert(index, source);
        true
    }
}

/// The host process's configuration environment.
#[derive(Debug, Default)]
pub struct Environment {
    sources: PropertySources,
    active_profiles: Option<Vec<String>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active profiles explicitly, overriding [`ACTIVE_PROFILES_KEY`].
    pub fn with_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_active_profiles(profiles);
        self
    }

    /// Append a source with the lowest precedence.
    pub fn with_source(mut self, source: impl PropertySource + 'static) -> Self {
        self.sources.add_last(source);
        self
    }

    pub fn set_active_profiles<I, S>(&mut self, profiles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_profiles = Some(profiles.into_iter().map(Into::into).collect());
    }

    /// Active profiles, in declaration order.
    ///
    /// Falls back to the comma-separated [`ACTIVE_PROFILES_KEY`] property when
    /// no profiles were set explicitly.
    pub fn active_profiles(&self) -> Vec<String> {
        if let Some(profiles) = &self.active_profiles {
            return profiles.clone();
        }
        self.get_property(ACTIVE_PROFILES_KEY)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn property_sources(&self) -> &PropertySources {
        &self.sources
    }

    pub fn property_sources_mut(&mut self) -> &mut PropertySources {
        &mut self.sources
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.sources.resolve(key).map(|(_, value)| value)
    }

    pub fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    /// Install `source` with the lowest precedence above any
    /// [`DEFAULT_PROPERTIES`] fallback source.
    pub fn add_above_defaults(&mut self, source: impl PropertySource + 'static) -> bool {
        if self.sources.contains(DEFAULT_PROPERTIES) {
            self.sources.add_before(DEFAULT_PROPERTIES, source)
        } else {
            self.sources.add_last(source)
        }
    }
}

/// An [`Environment`] shared between threads that instantiate components.
///
/// Holding the guard makes a check-then-merge sequence atomic.
#[derive(Debug, Clone, Default)]
pub struct SharedEnvironment {
    inner: Arc<Mutex<Environment>>,
}

impl SharedEnvironment {
    pub fn new(environment: Environment) -> Self {
        Self {
            inner: Arc::new(Mutex::new(environment)),
        }
    }

    /// Lock the environment for reading or writing.
    pub fn lock(&self) -> MutexGuard<'_, Environment> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Convenience for a single read under the lock.
    pub fn get_property(&self, key: &str) -> Option<String> {
        self.lock().get_property(key).map(String::from)
    }
}

impl From<Environment> for SharedEnvironment {
    fn from(environment: Environment) -> Self {
        Self::new(environment)
    }
}
