//! Reading option graphs from schema files.
//!
//! Schema files carry the loader records directly: a list of `options`
//! and an optional list of `choice_groups`, in TOML or JSON.

use std::path::Path;

use crate::error::{Result, SchemaError};
use crate::graph::{OptionGraph, SchemaDocument};

/// Parse a TOML schema document.
pub fn from_toml_str(text: &str) -> Result<OptionGraph> {
    let doc: SchemaDocument = toml::from_str(text)?;
    OptionGraph::try_from(doc)
}

/// Parse a JSON schema document.
pub fn from_json_str(text: &str) -> Result<OptionGraph> {
    let doc: SchemaDocument = serde_json::from_str(text)?;
    OptionGraph::try_from(doc)
}

/// Load a schema file, choosing the format from the extension.
pub fn load_file(path: &Path) -> Result<OptionGraph> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => from_toml_str(&text),
        Some("json") => from_json_str(&text),
        _ => Err(SchemaError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
