//! Namespace node paths

use std::fmt;

/// An absolute, `/`-delimited path in the coordination-service namespace.
///
/// Paths are normalized on construction: a leading slash is added when
/// missing, empty segments are dropped, and there is never a trailing slash
/// except for the root `/` itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath {
    inner: String,
}

impl NodePath {
    /// Create a new NodePath from any string-like input.
    pub fn new(path: impl AsRef<str>) -> Self {
        let segments: Vec<&str> = path
            .as_ref()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            inner: format!("/{}", segments.join("/")),
        }
    }

    /// The namespace root `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Join this path with a child segment (which may itself contain slashes).
    pub fn join(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Get the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Last path segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.inner.rsplit('/').next()
        }
    }

    /// Iterate over the path segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// Whether `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &NodePath) -> bool {
        if ancestor.is_root() {
            return !self.is_root();
        }
        self.inner
            .strip_prefix(ancestor.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Property key for this node relative to a walked `root`.
    ///
    /// `/config/app/dev/db/url` relative to `/config/app/dev` is `db.url`.
    /// Returns `None` unless `self` lies strictly below `root`.
    pub fn relative_key(&self, root: &NodePath) -> Option<String> {
        if !self.is_descendant_of(root) {
            return None;
        }
        let rest = if root.is_root() {
            &self.inner[1..]
        } else {
            &self.inner[root.inner.len() + 1..]
        };
        Some(rest.replace('/', "."))
    }
}

impl Default for NodePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NodePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for NodePath {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_slashes() {
        assert_eq!(NodePath::new("config/applications/").as_str(), "/config/applications");
        assert_eq!(NodePath::new("//a//b").as_str(), "/a/b");
        assert_eq!(NodePath::new("").as_str(), "/");
    }

    #[test]
    fn test_parent_and_name() {
        let path = NodePath::new("/a/b");
        assert_eq!(path.name(), Some("b"));
        assert_eq!(path.parent(), Some(NodePath::new("/a")));
        assert_eq!(NodePath::new("/a").parent(), Some(NodePath::root()));
        assert_eq!(NodePath::root().parent(), None);
        assert_eq!(NodePath::root().name(), None);
    }

    #[test]
    fn test_relative_key() {
        let root = NodePath::new("/config/svc/dev");
        let node = NodePath::new("/config/svc/dev/db/url");
        assert_eq!(node.relative_key(&root), Some("db.url".to_string()));
        assert_eq!(root.relative_key(&root), None);
    }

    #[test]
    fn test_relative_key_requires_segment_boundary() {
        let root = NodePath::new("/config/svc");
        let sibling = NodePath::new("/config/svc-other/key");
        assert_eq!(sibling.relative_key(&root), None);
    }

    #[test]
    fn test_relative_key_from_root() {
        let node = NodePath::new("/a/b");
        assert_eq!(node.relative_key(&NodePath::root()), Some("a.b".to_string()));
    }
}
