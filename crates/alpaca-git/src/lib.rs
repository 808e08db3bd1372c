//! Configuration repository synchronization for alpaca-config
//!
//! [`RepoSync`] brings a local working copy of the configuration repository
//! into a known state: clone when absent, fetch and merge when open, check
//! out the requested label, and hard-reset anything left dirty.

pub mod error;
pub mod helpers;
pub mod sync;
pub mod transport;

pub use error::{Error, Result};
pub use sync::{RepoState, RepoSync, SyncReport};
pub use transport::{ServerTimeoutGuard, TransportOptions};
