//! Property chain, resolution planning and bootstrap for alpaca-config
//!
//! The host owns an [`Environment`]: an ordered chain of named property
//! sources, highest precedence first. [`Bootstrap::run`] synchronizes the
//! configuration repository, installs its file layers, connects to the
//! coordination service and merges the application's namespace layers into
//! that chain. [`ComponentTrigger`] later resolves namespace layers for
//! individual components on demand.

pub mod bootstrap;
pub mod environment;
pub mod error;
pub mod logging;
pub mod merger;
pub mod plan;
pub mod registry;
pub mod settings;
pub mod source;
pub mod trigger;

pub use bootstrap::{Bootstrap, Bootstrapped};
pub use environment::{
    DEFAULT_PROPERTIES, Environment, MapPropertySource, PropertySource, PropertySources,
    SharedEnvironment,
};
pub use error::{Error, Result};
pub use merger::{ConfigMerger, MergeReport};
pub use plan::{ContextEntry, ContextPlan, Scope};
pub use registry::ComponentRegistry;
pub use settings::{BootstrapSettings, RepositorySettings};
pub use source::LayeredSource;
pub use trigger::ComponentTrigger;
