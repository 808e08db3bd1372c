//! Document loading and filesystem helpers for alpaca-config
//!
//! Turns YAML, JSON, and TOML documents into flat, insertion-ordered
//! property maps, and provides the small set of directory operations the
//! repository synchronizer needs.

pub mod document;
pub mod error;
pub mod io;
pub mod properties;

pub use document::{Format, load_file, parse_document};
pub use error::{Error, Result};
pub use properties::PropertyMap;
