//! Command implementations for alpaca-cli

pub mod plan;
pub mod resolve;
pub mod sync;

pub use plan::run_plan;
pub use resolve::run_resolve;
pub use sync::{SyncArgs, run_sync};
