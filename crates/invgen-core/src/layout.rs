/*
 * layout.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Data directory layout and YAML file discovery.
 */

//! Data directory layout.
//!
//! An invgen data directory looks like:
//!
//! ```text
//! <root>/
//!   invgen.yml                 # optional project configuration
//!   hosts/**/*.yaml            # host records
//!   metadata/<type>/**/*.yaml  # metadata fragments
//!   generated/<host>.yaml      # merge output
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{InvgenError, Result};

/// Extension of every file invgen reads or writes.
pub const YAML_EXTENSION: &str = "yaml";

/// Paths inside an invgen data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn hosts_dir(&self) -> PathBuf {
        self.root.join("hosts")
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join("metadata")
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root.join("generated")
    }

    /// Where the merged output for `host` is written.
    pub fn generated_host_path(&self, host: &str) -> PathBuf {
        self.generated_dir()
            .join(format!("{host}.{YAML_EXTENSION}"))
    }

    /// Candidate project configuration files, in lookup order.
    pub fn config_candidates(&self) -> [PathBuf; 2] {
        [self.root.join("invgen.yml"), self.root.join("invgen.yaml")]
    }
}

/// Recursively find every `.yaml` file under `dir`.
///
/// Entries are visited in file-name order so repeated runs see the same
/// sequence. A missing directory yields an empty list.
pub fn find_yaml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir).follow_links(true).sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            InvgenError::io(path, e.into())
        })?;

        if entry.file_type().is_file() && is_yaml(entry.path()) {
            debug!(path = %entry.path().display(), "Discovered YAML file");
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// File stem as an owned string (the host or fragment name).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_yaml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == YAML_EXTENSION)
}
