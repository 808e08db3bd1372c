//! In-process namespace tree
//!
//! Used for tests, offline resolution from a snapshot file, and any host
//! that wants to seed namespace data without a running coordination service.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use serde_yaml::Value as YamlValue;

use crate::{CoordinationClient, Error, NodePath, Result};

/// Snapshot key holding the payload of a mapping node that also has children.
pub const SNAPSHOT_DATA_KEY: &str = "_data";

/// A namespace held entirely in memory.
///
/// The root `/` always exists. Creating a node creates its missing
/// ancestors with empty payloads, the same way `mkdir -p` would.
#[derive(Debug, Default)]
pub struct MemoryNamespace {
    nodes: RwLock<BTreeMap<NodePath, Vec<u8>>>,
    failures: RwLock<HashMap<NodePath, String>>,
}

impl MemoryNamespace {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or overwrite) a node with the given payload.
    pub fn put(&self, path: impl Into<NodePath>, payload: impl AsRef<[u8]>) {
        let path = path.into();
        if path.is_root() {
            return;
        }
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        ensure_ancestors(&mut nodes, &path);
        nodes.insert(path, payload.as_ref().to_vec());
    }

    /// Create a node with an empty payload, keeping any existing payload.
    pub fn create(&self, path: impl Into<NodePath>) {
        let path = path.into();
        if path.is_root() {
            return;
        }
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        ensure_ancestors(&mut nodes, &path);
        nodes.entry(path).or_default();
    }

    /// Delete a node and everything below it.
    pub fn remove(&self, path: impl Into<NodePath>) {
        let path = path.into();
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        nodes.retain(|p, _| p != &path && !p.is_descendant_of(&path));
    }

    /// Make every read of `path` fail with `message`.
    ///
    /// Simulates a lost session or transport error for one node.
    pub fn fail_on(&self, path: impl Into<NodePath>, message: impl Into<String>) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), message.into());
    }

    /// Number of nodes, excluding the root.
    pub fn len(&self) -> usize {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a namespace from a YAML snapshot.
    ///
    /// Mappings become nodes with children, scalars become payloads, and
    /// `null` becomes an empty node. A mapping may carry its own payload
    /// under the [`SNAPSHOT_DATA_KEY`] key:
    ///
    /// ```text
    /// config:
    ///   applications:
    ///     svc:
    ///       dev:
    ///         _data: "timeout: 30"
    ///         db:
    ///           url: jdbc:dev
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self> {
        let value: YamlValue = serde_yaml::from_str(text).map_err(|e| Error::Snapshot {
            message: e.to_string(),
        })?;

        let namespace = Self::new();
        match &value {
            YamlValue::Null => {}
            YamlValue::Mapping(_) => namespace.load_value(&NodePath::root(), &value)?,
            _ => {
                return Err(Error::Snapshot {
                    message: "snapshot root must be a mapping".into(),
                });
            }
        }
        Ok(namespace)
    }

    fn load_value(&self, path: &NodePath, value: &YamlValue) -> Result<()> {
        match value {
            YamlValue::Mapping(map) => {
                if !path.is_root() {
                    self.create(path.clone());
                }
                for (key, child) in map {
                    let name = key.as_str().ok_or_else(|| Error::Snapshot {
                        message: format!("non-string key below {path}"),
                    })?;
                    if name == SNAPSHOT_DATA_KEY {
                        self.put(path.clone(), snapshot_payload(child));
                    } else {
                        self.load_value(&path.join(name), child)?;
                    }
                }
            }
            YamlValue::Null => self.create(path.clone()),
            other => self.put(path.clone(), snapshot_payload(other)),
        }
        Ok(())
    }

    fn check_failure(&self, path: &NodePath) -> Result<()> {
        let failures = self.failures.read().unwrap_or_else(PoisonError::into_inner);
        match failures.get(path) {
            Some(message) => Err(Error::client(path, message)),
            None => Ok(()),
        }
    }
}

fn ensure_ancestors(nodes: &mut BTreeMap<NodePath, Vec<u8>>, path: &NodePath) {
    let mut ancestor = path.parent();
    while let Some(p) = ancestor {
        if p.is_root() {
            break;
        }
        ancestor = p.parent();
        nodes.entry(p).or_default();
    }
}

fn snapshot_payload(value: &YamlValue) -> String {
    match value {
        YamlValue::Null => String::new(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other).unwrap_or_default(),
    }
}

impl CoordinationClient for MemoryNamespace {
    fn get_data(&self, path: &NodePath) -> Result<Option<Vec<u8>>> {
        self.check_failure(path)?;
        if path.is_root() {
            return Ok(Some(Vec::new()));
        }
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        Ok(nodes.get(path).cloned())
    }

    fn get_children(&self, path: &NodePath) -> Result<Option<Vec<String>>> {
        self.check_failure(path)?;
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        if !path.is_root() && !nodes.contains_key(path) {
            return Ok(None);
        }

        let children = nodes
            .keys()
            .filter(|p| p.parent().as_ref() == Some(path))
            .filter_map(|p| p.name().map(String::from))
            .collect();
        Ok(Some(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_creates_ancestors() {
        let ns = MemoryNamespace::new();
        ns.put("/a/b/c", "v");

        assert_eq!(ns.len(), 3);
        assert_eq!(ns.get_data(&"/a/b".into()).unwrap(), Some(Vec::new()));
        assert_eq!(
            ns.get_children(&"/a".into()).unwrap(),
            Some(vec!["b".to_string()])
        );
    }

    #[test]
    fn test_missing_node_is_none() {
        let ns = MemoryNamespace::new();
        assert_eq!(ns.get_data(&"/nope".into()).unwrap(), None);
        assert_eq!(ns.get_children(&"/nope".into()).unwrap(), None);
    }

    #[test]
    fn test_remove_subtree() {
        let ns = MemoryNamespace::new();
        ns.put("/a/b", "1");
        ns.put("/ab", "2");
        ns.remove("/a");

        assert_eq!(ns.get_data(&"/a/b".into()).unwrap(), None);
        assert_eq!(ns.get_data(&"/ab".into()).unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_injected_failure() {
        let ns = MemoryNamespace::new();
        ns.put("/a", "1");
        ns.fail_on("/a", "connection loss");

        let err = ns.get_data(&"/a".into()).unwrap_err();
        assert!(err.to_string().contains("connection loss"));
    }

    #[test]
    fn test_from_yaml_snapshot() {
        let ns = MemoryNamespace::from_yaml(
            "config:\n  svc:\n    _data: \"a: 1\"\n    port: 8080\n    flag: ~\n",
        )
        .unwrap();

        assert_eq!(
            ns.get_data(&"/config/svc".into()).unwrap(),
            Some(b"a: 1".to_vec())
        );
        assert_eq!(
            ns.get_data(&"/config/svc/port".into()).unwrap(),
            Some(b"8080".to_vec())
        );
        assert_eq!(
            ns.get_data(&"/config/svc/flag".into()).unwrap(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_from_yaml_rejects_scalar_root() {
        assert!(MemoryNamespace::from_yaml("42").is_err());
    }
}
