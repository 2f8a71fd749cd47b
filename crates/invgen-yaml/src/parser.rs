/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Loading YAML documents from strings and files.
 */

//! Loading YAML documents into `serde_yaml::Value` trees.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::{Error, Result};

/// Parse YAML from a string.
///
/// This parses a single YAML document. An empty input yields `Value::Null`.
/// Custom tags such as `!vault` are kept as `Value::Tagged`.
///
/// # Example
///
/// ```rust
/// use invgen_yaml::parse;
///
/// let yaml = parse("title: My Host").unwrap();
/// assert!(yaml.is_mapping());
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] if the YAML is invalid.
pub fn parse(content: &str) -> Result<Value> {
    parse_impl(content, None)
}

/// Parse YAML from a string with an associated filename.
///
/// The filename is carried in the error for better reporting.
pub fn parse_file(content: &str, filename: &str) -> Result<Value> {
    parse_impl(content, Some(filename))
}

/// Read and parse a YAML file.
pub fn load_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file(&content, &path.display().to_string())
}

/// Interpret a loaded document as a top-level mapping.
///
/// An empty document (`Value::Null`) is an empty mapping. Any other
/// non-mapping value is rejected with [`Error::NotAMapping`].
pub fn into_mapping(value: Value, filename: &str) -> Result<Mapping> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::NotAMapping {
            file: filename.to_string(),
            found: kind_name(&other),
        }),
    }
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<Value> {
    serde_yaml::from_str(content).map_err(|err| Error::from_parse(err, filename))
}

/// Human-readable name for the kind of a YAML value.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
