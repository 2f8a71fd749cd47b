/*
 * hosts.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Host records and generated host files.
 */

//! Host records.
//!
//! A host record is a YAML mapping whose reserved `metadata` key selects
//! metadata fragments; every other key is a host variable. The host name is
//! the file stem, so `hosts/dc1/web1.yaml` defines host `web1`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use invgen_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::cache::YamlCache;
use crate::error::{InvgenError, Result};
use crate::layout::{DataLayout, file_stem, find_yaml_files};

/// Reserved key holding a host's metadata selectors.
pub const METADATA_KEY: &str = "metadata";

/// A host definition as read from `hosts/`.
#[derive(Debug, Clone)]
pub struct HostRecord {
    /// Host identifier (file stem).
    pub name: String,
    /// File the record was read from.
    pub path: PathBuf,
    /// Top-level mapping, including the `metadata` key.
    pub vars: Arc<Mapping>,
}

impl HostRecord {
    /// Load a host record from a file.
    pub fn load(path: &Path, cache: &mut YamlCache) -> Result<Self> {
        let vars = cache.load_mapping(path)?;
        Ok(Self {
            name: file_stem(path),
            path: path.to_path_buf(),
            vars,
        })
    }

    /// Build a record from an in-memory mapping.
    pub fn from_mapping(name: impl Into<String>, vars: Mapping) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(format!("{name}.yaml")),
            name,
            vars: Arc::new(vars),
        }
    }

    /// The raw `metadata` value, if the record has one.
    pub fn metadata(&self) -> Option<&Value> {
        self.vars.get(METADATA_KEY)
    }

    /// Provenance label for variables declared in this record.
    pub fn source_label(&self) -> String {
        format!("hosts/{}", self.name)
    }
}

/// Find every host file under `hosts/`, in traversal order.
pub fn discover_host_files(layout: &DataLayout) -> Result<Vec<PathBuf>> {
    let dir = layout.hosts_dir();
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Hosts directory not found");
    }
    find_yaml_files(&dir)
}

/// Reject host files that would write to the same generated file.
///
/// Host names come from file stems, so `hosts/a/web1.yaml` and
/// `hosts/b/web1.yaml` would silently overwrite each other's output.
pub fn check_unique_names(files: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    for file in files {
        let name = file_stem(file);
        if let Some(first) = seen.get(&name) {
            return Err(InvgenError::DuplicateHostName {
                name,
                first: (*first).clone(),
                second: file.clone(),
            });
        }
        seen.insert(name, file);
    }
    Ok(())
}

/// A host's merged variables, as read back from `generated/`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedHost {
    pub name: String,
    pub vars: Mapping,
}

impl GeneratedHost {
    pub fn new(name: impl Into<String>, vars: Mapping) -> Self {
        Self {
            name: name.into(),
            vars,
        }
    }

    /// The host's `metadata` mapping value, if present.
    pub fn metadata(&self) -> Option<&Value> {
        self.vars.get(METADATA_KEY)
    }
}

/// Load every generated host file.
pub fn load_generated_hosts(layout: &DataLayout) -> Result<Vec<GeneratedHost>> {
    let mut cache = YamlCache::new();
    let mut hosts = Vec::new();

    for file in find_yaml_files(&layout.generated_dir())? {
        let vars = cache.load_mapping(&file)?;
        debug!("Loaded generated host {}", file.display());
        hosts.push(GeneratedHost::new(file_stem(&file), (*vars).clone()));
    }

    Ok(hosts)
}
