//! Format-agnostic document loading
//!
//! Every supported format is normalized to a `serde_yaml::Value` tree and
//! flattened into dotted keys:
//!
//! ```text
//! server:                      server.port      -> 8080
//!   port: 8080          =>     server.hosts[0]  -> a
//!   hosts: [a, b]              server.hosts[1]  -> b
//! ```

use std::fmt;
use std::path::Path;

use serde_yaml::Value as YamlValue;

use crate::{Error, PropertyMap, Result, io};

/// Key used when a document root is a scalar or a sequence instead of a mapping.
pub const DOCUMENT_KEY: &str = "document";

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Detect the format from a file extension.
    ///
    /// - `.yaml`, `.yml` -> YAML
    /// - `.json` -> JSON
    /// - `.toml` -> TOML
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => write!(f, "YAML"),
            Format::Json => write!(f, "JSON"),
            Format::Toml => write!(f, "TOML"),
        }
    }
}

/// Parse an in-memory document into a flat property map.
///
/// `name` is only used in error messages.
pub fn parse_document(name: &str, format: Format, text: &str) -> Result<PropertyMap> {
    let value = match format {
        Format::Yaml => {
            serde_yaml::from_str::<YamlValue>(text).map_err(|e| Error::parse(name, format, e))?
        }
        Format::Json => {
            let json: serde_json::Value =
                serde_json::from_str(text).map_err(|e| Error::parse(name, format, e))?;
            serde_yaml::to_value(json).map_err(|e| Error::parse(name, format, e))?
        }
        Format::Toml => {
            let table: toml::Table =
                toml::from_str(text).map_err(|e| Error::parse(name, format, e))?;
            serde_yaml::to_value(table).map_err(|e| Error::parse(name, format, e))?
        }
    };

    Ok(flatten(&value))
}

/// Load a document file into a flat property map.
///
/// Returns `Ok(None)` when the file does not exist. The format comes from
/// the file extension.
pub fn load_file(path: &Path) -> Result<Option<PropertyMap>> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "Document not found, skipping");
        return Ok(None);
    }

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let format = Format::from_extension(extension)?;
    let text = io::read_text(path)?;

    parse_document(&path.display().to_string(), format, &text).map(Some)
}

/// Flatten a document tree into dotted keys.
pub fn flatten(value: &YamlValue) -> PropertyMap {
    let mut out = PropertyMap::new();
    match value {
        YamlValue::Null => {}
        YamlValue::Mapping(_) => flatten_into("", value, &mut out),
        YamlValue::Tagged(tagged) => return flatten(&tagged.value),
        other => flatten_into(DOCUMENT_KEY, other, &mut out),
    }
    out
}

fn flatten_into(path: &str, value: &YamlValue, out: &mut PropertyMap) {
    match value {
        YamlValue::Mapping(map) => {
            if map.is_empty() {
                if !path.is_empty() {
                    out.insert(path, "");
                }
                return;
            }
            for (key, child) in map {
                let child_path = join_key(path, &key_to_string(key));
                flatten_into(&child_path, child, out);
            }
        }
        YamlValue::Sequence(items) => {
            if items.is_empty() {
                out.insert(path, "");
                return;
            }
            for (index, item) in items.iter().enumerate() {
                flatten_into(&format!("{path}[{index}]"), item, out);
            }
        }
        YamlValue::Tagged(tagged) => flatten_into(path, &tagged.value, out),
        scalar => {
            out.insert(path, scalar_to_string(scalar));
        }
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else if key.starts_with('[') {
        format!("{path}{key}")
    } else {
        format!("{path}.{key}")
    }
}

fn key_to_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Tagged(tagged) => key_to_string(&tagged.value),
        other => scalar_to_string(other),
    }
}

fn scalar_to_string(value: &YamlValue) -> String {
    match value {
        YamlValue::Null => String::new(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
