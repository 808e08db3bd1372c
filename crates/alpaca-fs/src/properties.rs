//! Insertion-ordered string map used for every flattened configuration layer

use std::collections::HashMap;

/// Flat `key -> value` mapping that remembers insertion order.
///
/// Re-inserting an existing key replaces its value but keeps the key at its
/// original position, so a walk that registers the same key twice still
/// enumerates it once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    keys: Vec<String>,
    values: HashMap<String, String>,
}

impl PropertyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value for `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.values.insert(key.clone(), value) {
            Some(previous) => Some(previous),
            None => {
                self.keys.push(key);
                None
            }
        }
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .map(|k| (k.as_str(), self.values[k].as_str()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Move every entry of `other` into this map, in `other`'s order.
    pub fn extend(&mut self, other: PropertyMap) {
        for (key, value) in other.into_iter() {
            self.insert(key, value);
        }
    }

    /// Return a copy with every key rewritten as `prefix.key`.
    ///
    /// An empty prefix returns the map unchanged.
    pub fn with_prefix(self, prefix: &str) -> PropertyMap {
        if prefix.is_empty() {
            return self;
        }
        let mut prefixed = PropertyMap::new();
        for (key, value) in self.into_iter() {
            prefixed.insert(format!("{prefix}.{key}"), value);
        }
        prefixed
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(mut self) -> Self::IntoIter {
        self.keys
            .into_iter()
            .map(|k| {
                let v = self.values.remove(&k).unwrap_or_default();
                (k, v)
            })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
