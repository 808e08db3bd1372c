//! Recursive namespace flattening

use alpaca_fs::{Format, PropertyMap, parse_document};

use crate::{CoordinationClient, NodePath, Result};

/// Result of walking one namespace subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Flattened entries keyed relative to the walked root.
    pub entries: PropertyMap,

    /// Number of payloads that looked like documents but failed to parse.
    pub document_errors: usize,
}

/// Flattens a namespace subtree into dotted property keys.
///
/// For a root `/config/applications/svc/dev`:
///
/// ```text
/// /config/applications/svc/dev            "timeout: 30"   -> timeout = 30
/// /config/applications/svc/dev/db         (empty)
/// /config/applications/svc/dev/db/url     "jdbc:x"        -> db.url = jdbc:x
/// /config/applications/svc/dev/feature    (empty, leaf)   -> feature = ""
/// ```
///
/// The root's own payload is parsed as a YAML document. Every descendant
/// contributes its raw payload as a value; an empty leaf contributes an
/// empty-string presence marker, and an empty node with children contributes
/// nothing for itself. Siblings are visited in sorted order.
///
/// No point-in-time consistency is guaranteed: a writer mutating the subtree
/// during the walk may produce a torn view.
pub struct NamespaceWalker<'a> {
    client: &'a dyn CoordinationClient,
}

impl<'a> NamespaceWalker<'a> {
    pub fn new(client: &'a dyn CoordinationClient) -> Self {
        Self { client }
    }

    /// Walk the subtree at `root`.
    ///
    /// Missing nodes contribute nothing. Any other client error aborts the
    /// walk.
    pub fn walk(&self, root: &NodePath) -> Result<WalkOutcome> {
        let mut outcome = WalkOutcome::default();

        if let Some(bytes) = self.client.get_data(root)?
            && !bytes.is_empty()
        {
            let text = String::from_utf8_lossy(&bytes);
            match parse_document(root.as_str(), Format::Yaml, &text) {
                Ok(document) => outcome.entries.extend(document),
                Err(e) => {
                    tracing::warn!(
                        path = %root,
                        error = %e,
                        "Ignoring namespace payload that is not a valid document"
                    );
                    outcome.document_errors += 1;
                }
            }
        }

        self.find_properties(root, root, None, &mut outcome.entries)?;
        Ok(outcome)
    }

    fn find_properties(
        &self,
        root: &NodePath,
        path: &NodePath,
        children: Option<Vec<String>>,
        out: &mut PropertyMap,
    ) -> Result<()> {
        tracing::trace!(path = %path, "entering find_properties");

        let mut children = match children {
            Some(children) => children,
            None => self.client.get_children(path)?.unwrap_or_default(),
        };
        if children.is_empty() {
            return Ok(());
        }
        children.sort();

        for child in children {
            let child_path = path.join(&child);
            let grandchildren = self.client.get_children(&child_path)?.unwrap_or_default();
            let payload = self.client.get_data(&child_path)?;

            let Some(key) = child_path.relative_key(root) else {
                continue;
            };
            match payload {
                Some(bytes) if !bytes.is_empty() => {
                    out.insert(key, String::from_utf8_lossy(&bytes));
                }
                _ if grandchildren.is_empty() => {
                    out.insert(key, "");
                }
                _ => {}
            }

            // A node may carry a value and descendants at the same time.
            self.find_properties(root, &child_path, Some(grandchildren), out)?;
        }

        tracing::trace!(path = %path, "leaving find_properties");
        Ok(())
    }
}
