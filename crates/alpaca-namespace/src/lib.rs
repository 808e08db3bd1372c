//! Coordination-service namespace walking for alpaca-config
//!
//! A namespace is a tree of `/`-delimited nodes, each optionally carrying a
//! byte payload. [`NamespaceWalker`] flattens one subtree into dotted
//! property keys through any [`CoordinationClient`].

pub mod client;
pub mod connect;
pub mod error;
pub mod memory;
pub mod path;
pub mod walker;

#[cfg(feature = "zookeeper")]
pub mod zk;

pub use client::CoordinationClient;
pub use connect::{ConnectSettings, connect_with_retry};
pub use error::{Error, Result};
pub use memory::MemoryNamespace;
pub use path::NodePath;
pub use walker::{NamespaceWalker, WalkOutcome};

#[cfg(feature = "zookeeper")]
pub use zk::ZkClient;
