/*
 * inventory.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Ansible dynamic inventory built from generated hosts.
 */

//! Ansible dynamic inventory.
//!
//! Groups are derived from each host's `metadata` selectors: a host with
//! `metadata: {tags: [web, db]}` joins `tags_web` and `tags_db`. The result
//! follows the dynamic inventory JSON layout:
//!
//! ```json
//! {
//!   "_meta": {"hostvars": {"web1": {...}}},
//!   "all": {"hosts": ["web1"]},
//!   "tags_web": {"hosts": ["web1"]}
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use invgen_yaml::{Mapping, Value, vault};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::warn;

use crate::hosts::GeneratedHost;

/// Group for hosts that declare no metadata at all.
pub const UNGROUPED: &str = "ungrouped";

/// Key Ansible uses to mark vault-encrypted strings in inventory JSON.
pub const ANSIBLE_VAULT_KEY: &str = "__ansible_vault";

/// A named set of hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub hosts: BTreeSet<String>,
}

/// Host list entry in the inventory document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostList {
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Meta {
    pub hostvars: BTreeMap<String, JsonValue>,
}

/// The complete inventory document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub all: HostList,
    #[serde(flatten)]
    pub groups: BTreeMap<String, HostList>,
}

/// Builds inventory views over a set of generated hosts.
#[derive(Debug, Clone, Default)]
pub struct InventoryBuilder {
    hosts: Vec<GeneratedHost>,
}

impl InventoryBuilder {
    pub fn new(hosts: Vec<GeneratedHost>) -> Self {
        Self { hosts }
    }

    /// Invert host metadata into groups, sorted by name.
    pub fn build_groups(&self) -> Vec<Group> {
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for host in &self.hosts {
            let Some(metadata) = host.metadata() else {
                warn!("Host {} has no metadata; adding to {}", host.name, UNGROUPED);
                groups
                    .entry(UNGROUPED.to_string())
                    .or_default()
                    .insert(host.name.clone());
                continue;
            };

            let Some(metadata) = metadata.as_mapping() else {
                warn!("Host {} has a metadata value that is not a mapping; skipping", host.name);
                continue;
            };

            for (metadata_type, value) in metadata {
                let Some(metadata_type) = scalar_text(metadata_type) else {
                    warn!("Host {} has a non-scalar metadata type; skipping", host.name);
                    continue;
                };

                let names: Vec<String> = match value {
                    Value::Sequence(items) => items
                        .iter()
                        .filter_map(|item| {
                            let name = scalar_text(item);
                            if name.is_none() {
                                warn!(
                                    "Unknown metadata item in {} for host {}; skipping",
                                    metadata_type, host.name
                                );
                            }
                            name
                        })
                        .collect(),
                    other => match scalar_text(other) {
                        Some(name) => vec![name],
                        None => {
                            warn!(
                                "Unknown metadata value type for {} on host {}; skipping",
                                metadata_type, host.name
                            );
                            Vec::new()
                        }
                    },
                };

                for name in names {
                    groups
                        .entry(format!("{metadata_type}_{name}"))
                        .or_default()
                        .insert(host.name.clone());
                }
            }
        }

        groups
            .into_iter()
            .map(|(name, hosts)| Group { name, hosts })
            .collect()
    }

    /// Every host's variables, converted to JSON.
    pub fn build_hostvars(&self) -> BTreeMap<String, JsonValue> {
        self.hosts
            .iter()
            .map(|host| (host.name.clone(), mapping_to_json(&host.vars)))
            .collect()
    }

    /// Assemble the full inventory document.
    pub fn build(&self) -> Inventory {
        let all: BTreeSet<&str> = self.hosts.iter().map(|h| h.name.as_str()).collect();

        Inventory {
            meta: Meta {
                hostvars: self.build_hostvars(),
            },
            all: HostList {
                hosts: all.into_iter().map(str::to_string).collect(),
            },
            groups: self
                .build_groups()
                .into_iter()
                .map(|group| {
                    let hosts = group.hosts.into_iter().collect();
                    (group.name, HostList { hosts })
                })
                .collect(),
        }
    }

    /// Variables for a single host; an unknown host yields an empty object.
    pub fn build_host(&self, name: &str) -> JsonValue {
        self.hosts
            .iter()
            .find(|host| host.name == name)
            .map(|host| mapping_to_json(&host.vars))
            .unwrap_or_else(|| JsonValue::Object(JsonMap::new()))
    }

    /// Render the inventory as JSON.
    pub fn render(&self, pretty: bool) -> serde_json::Result<String> {
        to_json_string(&self.build(), pretty)
    }

    /// Render a single host's variables as JSON.
    pub fn render_host(&self, name: &str, pretty: bool) -> serde_json::Result<String> {
        to_json_string(&self.build_host(name), pretty)
    }
}

fn to_json_string<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Text of a scalar usable in a group name.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn mapping_to_json(mapping: &Mapping) -> JsonValue {
    let object = mapping
        .iter()
        .map(|(key, value)| (key_to_string(key), yaml_to_json(value)))
        .collect();
    JsonValue::Object(object)
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::Null => "null".to_string(),
        other => scalar_text(other).unwrap_or_else(|| {
            invgen_yaml::dump(other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default()
        }),
    }
}

/// Convert a YAML value to JSON.
///
/// Vault strings become `{"__ansible_vault": "<ciphertext>"}`, which Ansible
/// decodes back into a vaulted value. Other tags are dropped.
pub fn yaml_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(JsonValue::Null, JsonValue::Number)
            }
        }
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Sequence(items) => JsonValue::Array(items.iter().map(yaml_to_json).collect()),
        Value::Mapping(mapping) => mapping_to_json(mapping),
        Value::Tagged(tagged) => match vault::vault_text(value) {
            Some(ciphertext) => {
                let mut object = JsonMap::new();
                object.insert(
                    ANSIBLE_VAULT_KEY.to_string(),
                    JsonValue::String(ciphertext.to_string()),
                );
                JsonValue::Object(object)
            }
            None => yaml_to_json(&tagged.value),
        },
    }
}
