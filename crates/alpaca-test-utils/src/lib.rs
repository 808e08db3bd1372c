//! Shared test utilities for the alpaca-config workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: real git repositories built with `git2`, no network
//! - [`remote`]: [`ConfigRemote`] pairing an upstream repository with a
//!   scratch working-copy directory
//! - [`namespace`]: namespace snapshot documents for the in-memory client

pub mod git;
pub mod namespace;
pub mod remote;

pub use remote::ConfigRemote;
