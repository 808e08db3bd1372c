//! Coordination-service client trait

use std::sync::Arc;

use crate::{NodePath, Result};

/// Read-only view of a hierarchical coordination-service namespace.
///
/// A missing node is reported as `Ok(None)`, never as an error. Any other
/// failure (lost session, transport error) is an `Err` and aborts the
/// resolution pass that issued the read.
///
/// One client is created at bootstrap and shared for the lifetime of the
/// process, so implementations must be `Send + Sync`.
pub trait CoordinationClient: Send + Sync {
    /// Read a node's payload.
    fn get_data(&self, path: &NodePath) -> Result<Option<Vec<u8>>>;

    /// List the names (not full paths) of a node's direct children.
    fn get_children(&self, path: &NodePath) -> Result<Option<Vec<String>>>;
}

impl<C: CoordinationClient + ?Sized> CoordinationClient for Arc<C> {
    fn get_data(&self, path: &NodePath) -> Result<Option<Vec<u8>>> {
        (**self).get_data(path)
    }

    fn get_children(&self, path: &NodePath) -> Result<Option<Vec<String>>> {
        (**self).get_children(path)
    }
}

impl<C: CoordinationClient + ?Sized> CoordinationClient for &C {
    fn get_data(&self, path: &NodePath) -> Result<Option<Vec<u8>>> {
        (**self).get_data(path)
    }

    fn get_children(&self, path: &NodePath) -> Result<Option<Vec<String>>> {
        (**self).get_children(path)
    }
}
