//! Per-run memoization of parsed YAML files.
//!
//! A `YamlCache` lives for one generation run and is dropped with it, so
//! edits between runs are always picked up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use invgen_yaml::Mapping;
use tracing::trace;

use crate::error::{InvgenError, Result};

#[derive(Debug, Default)]
pub struct YamlCache {
    entries: HashMap<PathBuf, Arc<Mapping>>,
    parses: usize,
}

impl YamlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` as a top-level mapping, parsing it at most once.
    pub fn load_mapping(&mut self, path: &Path) -> Result<Arc<Mapping>> {
        if let Some(cached) = self.entries.get(path) {
            trace!(path = %path.display(), "YAML cache hit");
            return Ok(Arc::clone(cached));
        }

        let value = invgen_yaml::load_file(path).map_err(|e| InvgenError::yaml(path, e))?;
        let mapping = invgen_yaml::into_mapping(value, &path.display().to_string())
            .map_err(|e| InvgenError::yaml(path, e))?;
        self.parses += 1;

        let mapping = Arc::new(mapping);
        self.entries.insert(path.to_path_buf(), Arc::clone(&mapping));
        Ok(mapping)
    }

    /// Number of files actually parsed (cache misses).
    pub fn parse_count(&self) -> usize {
        self.parses
    }
}
