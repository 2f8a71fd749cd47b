/*
 * dump.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Deterministic YAML output.
 */

//! Deterministic YAML output.
//!
//! Output is block style with 2-space indentation, unicode left unescaped,
//! and mapping keys in insertion order. Multi-line strings are written in
//! literal block style, and vault values always are, even when the payload
//! fits on one line (`!vault |-`).
//!
//! Generated files are also read by YAML 1.1 consumers such as Ansible,
//! where a bare `yes`, `no`, `on` or `off` is a boolean. Strings spelled like
//! those words are single-quoted so they stay strings.

use std::path::Path;

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

use crate::vault::{VAULT_TAG, vault_text};
use crate::{Error, Result};

/// Temporary tag for one-line vault payloads, rewritten to `!vault |-`.
const BLOCK_VAULT_MARKER: &str = "!invgen-block-vault";

/// Temporary tag for strings that must be single-quoted.
const QUOTE_MARKER: &str = "!invgen-quote";

/// Plain scalars that YAML 1.1 resolves to booleans but YAML 1.2 does not.
const YAML11_BOOLEANS: [&str; 16] = [
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "on", "On", "ON", "off", "Off",
    "OFF",
];

/// Dump a value as a YAML document.
pub fn dump(value: &Value) -> Result<String> {
    let mut marked = 0;
    let prepared = mark_styles(value, &mut marked);
    if marked > 0 {
        if let Some(text) = emit(&prepared).ok().and_then(|text| apply_styles(&text)) {
            return Ok(text);
        }
    }
    emit(value)
}

fn emit(value: &Value) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| Error::Serialize(e.to_string()))
}

/// Copy `value`, tagging every scalar whose emitted style needs adjusting.
fn mark_styles(value: &Value, marked: &mut usize) -> Value {
    match value {
        Value::String(s) if YAML11_BOOLEANS.contains(&s.as_str()) => {
            *marked += 1;
            tagged(QUOTE_MARKER, value.clone())
        }
        Value::Tagged(_) => match vault_text(value) {
            Some(text) if !text.is_empty() && !text.contains('\n') => {
                *marked += 1;
                tagged(BLOCK_VAULT_MARKER, Value::String(format!("{text}\n")))
            }
            _ => value.clone(),
        },
        Value::Sequence(items) => {
            Value::Sequence(items.iter().map(|item| mark_styles(item, marked)).collect())
        }
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .iter()
                .map(|(k, v)| (mark_styles(k, marked), mark_styles(v, marked)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn tagged(tag: &str, value: Value) -> Value {
    Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(tag),
        value,
    }))
}

/// Replace the temporary tags with the intended styles.
///
/// Returns `None` if the emitter chose a layout the rewrite does not expect,
/// so the caller can fall back to the unadjusted output.
fn apply_styles(text: &str) -> Option<String> {
    let text = text.replace(
        &format!("{BLOCK_VAULT_MARKER} |\n"),
        &format!("{VAULT_TAG} |-\n"),
    );

    let quote_prefix = format!("{QUOTE_MARKER} ");
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(start) = rest.find(&quote_prefix) {
        out.push_str(&rest[..start]);
        rest = &rest[start + quote_prefix.len()..];
        let word_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let word = &rest[..word_len];
        if !YAML11_BOOLEANS.contains(&word) {
            return None;
        }
        out.push('\'');
        out.push_str(word);
        out.push('\'');
        rest = &rest[word_len..];
    }
    out.push_str(rest);

    if out.contains(BLOCK_VAULT_MARKER) || out.contains(QUOTE_MARKER) {
        return None;
    }
    Some(out)
}

/// Dump a single `key: value` pair as a one-entry mapping.
///
/// This is the unit the host renderer writes beneath each source comment.
pub fn dump_entry(key: &Value, value: &Value) -> Result<String> {
    let mut entry = Mapping::with_capacity(1);
    entry.insert(key.clone(), value.clone());
    dump(&Value::Mapping(entry))
}

/// Dump a value and write it to `path`.
pub fn save_file(path: &Path, value: &Value) -> Result<()> {
    let content = dump(value)?;
    std::fs::write(path, content).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
