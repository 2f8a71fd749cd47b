/*
 * metadata.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Metadata fragments indexed by type and name.
 */

//! The metadata store.
//!
//! Every immediate subdirectory of `metadata/` is a metadata type, and every
//! YAML file below it is a fragment named by its file stem:
//!
//! ```text
//! metadata/
//!   os/debian12.yaml        -> (os, debian12)
//!   tags/web.yaml           -> (tags, web)
//!   tags/legacy/ftp.yaml    -> (tags, ftp)
//! ```
//!
//! The set of types is whatever directories exist. Looking up a type with no
//! directory is an error; looking up a missing name within a known type is
//! only a warning and yields an empty fragment.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use invgen_yaml::Mapping;
use tracing::{debug, info, warn};

use crate::cache::YamlCache;
use crate::error::{InvgenError, Result};
use crate::layout::{DataLayout, file_stem, find_yaml_files};

/// A parsed metadata fragment, shared read-only between hosts.
pub type Fragment = Arc<Mapping>;

/// Metadata fragments keyed by type, then by name.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    /// Directory the types were discovered in (used in error hints).
    dir: PathBuf,
    types: BTreeMap<String, BTreeMap<String, Fragment>>,
}

impl MetadataStore {
    /// Create an empty store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            types: BTreeMap::new(),
        }
    }

    /// Load every fragment under the layout's `metadata/` directory.
    ///
    /// A missing `metadata/` directory yields an empty store.
    pub fn build(layout: &DataLayout, cache: &mut YamlCache) -> Result<Self> {
        let dir = layout.metadata_dir();
        let mut store = Self::new(&dir);

        if !dir.is_dir() {
            warn!(dir = %dir.display(), "Metadata directory not found; no metadata types available");
            return Ok(store);
        }

        info!("Loading metadata from {}", dir.display());
        let mut type_dirs = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| InvgenError::io(&dir, e))? {
            let entry = entry.map_err(|e| InvgenError::io(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                type_dirs.push(path);
            }
        }
        type_dirs.sort();

        for type_dir in type_dirs {
            let metadata_type = file_name(&type_dir);
            store.add_type(&metadata_type);

            for file in find_yaml_files(&type_dir)? {
                let name = file_stem(&file);
                let fragment = cache.load_mapping(&file)?;
                if store.contains(&metadata_type, &name) {
                    warn!(
                        path = %file.display(),
                        "Duplicate metadata fragment {}/{}; the later file wins",
                        metadata_type,
                        name
                    );
                }
                store.insert_fragment(&metadata_type, name, fragment);
            }

            debug!(
                "Metadata type {} has {} fragment(s)",
                metadata_type,
                store.types.get(&metadata_type).map_or(0, BTreeMap::len)
            );
        }

        Ok(store)
    }

    /// Register a metadata type with no fragments.
    pub fn add_type(&mut self, metadata_type: &str) {
        self.types.entry(metadata_type.to_string()).or_default();
    }

    /// Set the fragment for `(metadata_type, name)`, registering the type if needed.
    pub fn set_fragment(&mut self, metadata_type: &str, name: &str, vars: Mapping) {
        self.insert_fragment(metadata_type, name.to_string(), Arc::new(vars));
    }

    fn insert_fragment(&mut self, metadata_type: &str, name: String, fragment: Fragment) {
        self.types
            .entry(metadata_type.to_string())
            .or_default()
            .insert(name, fragment);
    }

    /// Look up the fragment `(metadata_type, name)`.
    ///
    /// An unknown type fails with [`InvgenError::MetadataTypeNotFound`]. An
    /// unknown name within a known type logs a warning and returns an empty
    /// mapping, which callers treat as "nothing to merge".
    pub fn lookup(&self, metadata_type: &str, name: &str) -> Result<Fragment> {
        debug!("Looking up metadata {} key {}", metadata_type, name);

        let fragments =
            self.types
                .get(metadata_type)
                .ok_or_else(|| InvgenError::MetadataTypeNotFound {
                    metadata_type: metadata_type.to_string(),
                    expected_dir: self.dir.join(metadata_type),
                })?;

        match fragments.get(name) {
            Some(fragment) => Ok(Arc::clone(fragment)),
            None => {
                warn!("Metadata {} key {} not found", metadata_type, name);
                Ok(Fragment::default())
            }
        }
    }

    /// Whether `(metadata_type, name)` names an existing fragment.
    pub fn contains(&self, metadata_type: &str, name: &str) -> bool {
        self.types
            .get(metadata_type)
            .is_some_and(|fragments| fragments.contains_key(name))
    }

    /// Known metadata types, sorted.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Fragment names for a type, sorted. Empty for unknown types.
    pub fn fragment_names(&self, metadata_type: &str) -> Vec<&str> {
        self.types
            .get(metadata_type)
            .map(|fragments| fragments.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
