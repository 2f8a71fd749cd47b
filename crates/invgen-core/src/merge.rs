/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Layered merge of metadata fragments into a host record.
 */

//! Layered merge of metadata fragments into a host record.
//!
//! Merging walks the host's `metadata` selectors in declaration order and
//! copies every key of every selected fragment into one ordered table, then
//! copies the host's own keys on top. Each later write replaces the value
//! and provenance of an existing key but keeps the position where the key
//! first appeared:
//!
//! ```text
//! metadata:            metadata/os/debian.yaml    merged
//!   os: debian         ntp: pool.ntp.org          ntp: 10.0.0.1       # hosts/web1
//!   tags: [web, db]    metadata/tags/db.yaml      backup: daily       # tags/db
//! ntp: 10.0.0.1        backup: daily              metadata: {...}     # hosts/web1
//! ```
//!
//! Precedence, lowest to highest: earlier metadata types, later metadata
//! types, later names within one type's list, and finally the host file.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use indexmap::map::Entry;
use invgen_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::error::{InvgenError, Result};
use crate::hosts::HostRecord;
use crate::metadata::MetadataStore;

/// Metadata types required by strict validation when none are configured.
pub const DEFAULT_REQUIRED_METADATA: [&str; 7] = [
    "customer",
    "os",
    "environment",
    "location",
    "services",
    "groups",
    "tags",
];

/// How strictly host records are checked before merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// A missing `metadata` section is a warning and is treated as empty.
    #[default]
    Loose,
    /// Every host must declare each of `required`.
    Strict { required: BTreeSet<String> },
}

impl ValidationPolicy {
    pub fn strict(required: impl IntoIterator<Item = String>) -> Self {
        Self::Strict {
            required: required.into_iter().collect(),
        }
    }

    pub fn strict_default() -> Self {
        Self::strict(DEFAULT_REQUIRED_METADATA.iter().map(|s| s.to_string()))
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict { .. })
    }
}

/// Check a host record against a validation policy.
pub fn validate_host(record: &HostRecord, policy: &ValidationPolicy) -> Result<()> {
    let metadata = match record.metadata() {
        None | Some(Value::Null) => {
            if policy.is_strict() {
                return Err(InvgenError::MissingMetadataSection {
                    host: record.name.clone(),
                });
            }
            warn!("Host {} has no metadata", record.name);
            return Ok(());
        }
        Some(Value::Mapping(metadata)) => metadata,
        Some(other) => {
            return Err(InvgenError::InvalidMetadataSection {
                host: record.name.clone(),
                found: kind_name(other),
            });
        }
    };

    if let ValidationPolicy::Strict { required } = policy {
        if metadata.is_empty() {
            return Err(InvgenError::MissingMetadataSection {
                host: record.name.clone(),
            });
        }
        for metadata_type in required {
            if !metadata.contains_key(metadata_type.as_str()) {
                return Err(InvgenError::MissingRequiredMetadata {
                    host: record.name.clone(),
                    metadata_type: metadata_type.clone(),
                });
            }
        }
    }

    Ok(())
}

/// A merged value and the label of the file that contributed it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedValue {
    pub value: Value,
    pub source: String,
}

/// The merged variables of one host, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedHost {
    pub name: String,
    entries: IndexMap<Value, SourcedValue>,
}

impl MergedHost {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Record `key`, replacing any earlier value and source in place.
    pub fn insert(&mut self, key: Value, value: Value, source: &str) {
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                slot.value = value;
                slot.source = source.to_string();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(SourcedValue {
                    value,
                    source: source.to_string(),
                });
            }
        }
    }

    /// Copy every key of `vars` with the given source label.
    pub fn extend_from(&mut self, vars: &Mapping, source: &str) {
        for (key, value) in vars {
            self.insert(key.clone(), value.clone(), source);
        }
    }

    pub fn get(&self, key: &str) -> Option<&SourcedValue> {
        self.entries.get(&Value::String(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &SourcedValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The merged variables without provenance.
    pub fn to_mapping(&self) -> Mapping {
        self.entries
            .iter()
            .map(|(key, sourced)| (key.clone(), sourced.value.clone()))
            .collect()
    }
}

/// Merge a host record with the metadata it selects.
pub fn merge_host(record: &HostRecord, store: &MetadataStore) -> Result<MergedHost> {
    let mut merged = MergedHost::new(&record.name);

    if let Some(Value::Mapping(metadata)) = record.metadata() {
        for (type_key, selector) in metadata {
            let metadata_type = type_key.as_str().ok_or_else(|| {
                InvgenError::InvalidMetadataSelector {
                    host: record.name.clone(),
                    metadata_type: describe_key(type_key),
                    found: "a non-string metadata type",
                }
            })?;

            for name in selector_names(record, metadata_type, selector)? {
                merge_fragment(&mut merged, store, metadata_type, name)?;
            }
        }
    }

    merged.extend_from(&record.vars, &record.source_label());
    Ok(merged)
}

/// Expand a selector into the fragment names it refers to, in order.
fn selector_names<'a>(
    record: &HostRecord,
    metadata_type: &str,
    selector: &'a Value,
) -> Result<Vec<&'a str>> {
    let invalid = |found: &'static str| InvgenError::InvalidMetadataSelector {
        host: record.name.clone(),
        metadata_type: metadata_type.to_string(),
        found,
    };

    match selector {
        Value::String(name) => Ok(vec![name.as_str()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(|| invalid(list_item_kind(item))))
            .collect(),
        other => Err(invalid(kind_name(other))),
    }
}

fn merge_fragment(
    merged: &mut MergedHost,
    store: &MetadataStore,
    metadata_type: &str,
    name: &str,
) -> Result<()> {
    debug!("Processing metadata {}/{}", metadata_type, name);
    let fragment = store.lookup(metadata_type, name)?;
    if !fragment.is_empty() {
        merged.extend_from(&fragment, &format!("{metadata_type}/{name}"));
    }
    Ok(())
}

fn kind_name(value: &Value) -> &'static str {
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

fn list_item_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "a list containing null",
        Value::Bool(_) => "a list containing a boolean",
        Value::Number(_) => "a list containing a number",
        Value::Sequence(_) => "a nested list",
        Value::Mapping(_) => "a list containing a mapping",
        Value::String(_) => "a list containing a string",
        Value::Tagged(_) => "a list containing a tagged value",
    }
}

fn describe_key(key: &Value) -> String {
    invgen_yaml::dump(key)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| "<unprintable>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        invgen_yaml::into_mapping(invgen_yaml::parse(yaml).unwrap(), "test").unwrap()
    }

    fn host(name: &str, yaml: &str) -> HostRecord {
        HostRecord::from_mapping(name, mapping(yaml))
    }

    fn keys(merged: &MergedHost) -> Vec<String> {
        merged
            .iter()
            .map(|(k, _)| k.as_str().unwrap().to_string())
            .collect()
    }

    fn store() -> MetadataStore {
        let mut store = MetadataStore::new("metadata");
        store.set_fragment("platform", "rpi4", mapping("cpu_arch: arm64\nmemory: 4GB"));
        store.set_fragment("environment", "production", mapping("backup: daily\nmemory: 8GB"));
        store.set_fragment("tags", "a", mapping("x: from-a\nonly_a: 1"));
        store.set_fragment("tags", "b", mapping("x: from-b"));
        store
    }

    #[test]
    fn test_merge_single_selector_and_host_vars() {
        let record = host("web1", "metadata:\n  platform: rpi4\nrole: web\n");
        let merged = merge_host(&record, &store()).unwrap();

        assert_eq!(keys(&merged), vec!["cpu_arch", "memory", "metadata", "role"]);
        assert_eq!(merged.get("cpu_arch").unwrap().source, "platform/rpi4");
        assert_eq!(merged.get("role").unwrap().source, "hosts/web1");
        assert_eq!(merged.get("metadata").unwrap().source, "hosts/web1");
    }

    #[test]
    fn test_host_vars_win_over_metadata() {
        let record = host("web1", "metadata:\n  platform: rpi4\nmemory: 2GB\n");
        let merged = merge_host(&record, &store()).unwrap();

        let memory = merged.get("memory").unwrap();
        assert_eq!(memory.value, Value::String("2GB".into()));
        assert_eq!(memory.source, "hosts/web1");
        // position is where the key first appeared
        assert_eq!(keys(&merged), vec!["cpu_arch", "memory", "metadata"]);
    }

    #[test]
    fn test_host_vars_win_even_when_declared_first() {
        let record = host("web1", "memory: 2GB\nmetadata:\n  platform: rpi4\n");
        let merged = merge_host(&record, &store()).unwrap();
        assert_eq!(
            merged.get("memory").unwrap().value,
            Value::String("2GB".into())
        );
    }

    #[test]
    fn test_later_metadata_types_win() {
        let record = host(
            "web1",
            "metadata:\n  platform: rpi4\n  environment: production\n",
        );
        let merged = merge_host(&record, &store()).unwrap();

        let memory = merged.get("memory").unwrap();
        assert_eq!(memory.value, Value::String("8GB".into()));
        assert_eq!(memory.source, "environment/production");
    }

    #[test]
    fn test_later_list_entries_win() {
        let record = host("web1", "metadata:\n  tags: [a, b]\n");
        let merged = merge_host(&record, &store()).unwrap();

        assert_eq!(
            merged.get("x").unwrap().value,
            Value::String("from-b".into())
        );
        assert_eq!(merged.get("x").unwrap().source, "tags/b");
        assert_eq!(merged.get("only_a").unwrap().source, "tags/a");
    }

    #[test]
    fn test_unknown_fragment_name_contributes_nothing() {
        let record = host("web1", "metadata:\n  tags: [doesnotexist]\nrole: web\n");
        let merged = merge_host(&record, &store()).unwrap();
        assert_eq!(keys(&merged), vec!["metadata", "role"]);
    }

    #[test]
    fn test_unknown_type_fails() {
        let record = host("web1", "metadata:\n  bogus_type: x\n");
        let err = merge_host(&record, &store()).unwrap_err();
        assert!(matches!(err, InvgenError::MetadataTypeNotFound { .. }));
    }

    #[test]
    fn test_invalid_selector_shapes() {
        for selector in ["42", "null", "{nested: true}", "[a, 3]"] {
            let record = host("web1", &format!("metadata:\n  tags: {selector}\n"));
            match merge_host(&record, &store()) {
                Err(InvgenError::InvalidMetadataSelector {
                    host,
                    metadata_type,
                    ..
                }) => {
                    assert_eq!(host, "web1");
                    assert_eq!(metadata_type, "tags");
                }
                other => panic!("selector {selector}: expected InvalidMetadataSelector, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_to_mapping_drops_sources() {
        let record = host("web1", "metadata:\n  platform: rpi4\nrole: web\n");
        let merged = merge_host(&record, &store()).unwrap();
        let vars = merged.to_mapping();
        assert_eq!(vars.get("cpu_arch"), Some(&Value::String("arm64".into())));
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn test_validate_loose_allows_missing_metadata() {
        let record = host("web1", "role: web\n");
        assert!(validate_host(&record, &ValidationPolicy::Loose).is_ok());
        let merged = merge_host(&record, &store()).unwrap();
        assert_eq!(keys(&merged), vec!["role"]);
    }

    #[test]
    fn test_validate_strict_requires_metadata() {
        let record = host("web1", "role: web\n");
        let err = validate_host(&record, &ValidationPolicy::strict_default()).unwrap_err();
        assert!(matches!(err, InvgenError::MissingMetadataSection { .. }));

        let record = host("web1", "metadata: {}\n");
        let err = validate_host(&record, &ValidationPolicy::strict(Vec::new())).unwrap_err();
        assert!(matches!(err, InvgenError::MissingMetadataSection { .. }));
    }

    #[test]
    fn test_validate_strict_required_types() {
        let policy = ValidationPolicy::strict(["os".to_string(), "tags".to_string()]);

        let record = host("web1", "metadata:\n  os: debian\n");
        match validate_host(&record, &policy) {
            Err(InvgenError::MissingRequiredMetadata { metadata_type, .. }) => {
                assert_eq!(metadata_type, "tags");
            }
            other => panic!("expected MissingRequiredMetadata, got {other:?}"),
        }

        let record = host("web1", "metadata:\n  os: debian\n  tags: [web]\n");
        assert!(validate_host(&record, &policy).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_mapping_metadata() {
        let record = host("web1", "metadata: rpi4\n");
        let err = validate_host(&record, &ValidationPolicy::Loose).unwrap_err();
        assert!(matches!(err, InvgenError::InvalidMetadataSection { .. }));
    }
}
