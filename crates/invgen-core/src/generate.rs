/*
 * generate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Generation of merged host files.
 */

//! Generation of every host file in a data directory.
//!
//! One run builds the metadata store once, then processes host files one at
//! a time: load, validate, merge, render, self-check, write. Output goes to
//! `generated/<host>.yaml` through a temporary file in the same directory,
//! so a host's file is either fully replaced or left untouched.
//!
//! By default the first failing host aborts the run. With
//! `continue_on_error` every host is attempted and all failures are reported
//! together at the end.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::YamlCache;
use crate::config::ProjectConfig;
use crate::error::{HostFailure, InvgenError, Result};
use crate::hosts::{HostRecord, check_unique_names, discover_host_files};
use crate::layout::{DataLayout, file_stem};
use crate::merge::{ValidationPolicy, merge_host, validate_host};
use crate::metadata::MetadataStore;
use crate::render::{render_host, verify_generated};

/// Options for a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub policy: ValidationPolicy,
    /// Attempt every host and report all failures together.
    pub continue_on_error: bool,
    /// Remove `generated/` before writing.
    pub clean: bool,
}

impl From<&ProjectConfig> for GenerateOptions {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            policy: config.validation_policy(),
            continue_on_error: config.continue_on_error,
            clean: false,
        }
    }
}

/// Outcome of a successful generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Files whose content changed (or were created).
    pub written: Vec<PathBuf>,
    /// Files that already had the generated content.
    pub unchanged: Vec<PathBuf>,
}

impl GenerateReport {
    pub fn host_count(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }
}

/// Produce the generated file content for one host.
pub fn generate_host(
    record: &HostRecord,
    store: &MetadataStore,
    policy: &ValidationPolicy,
) -> Result<String> {
    validate_host(record, policy)?;
    let merged = merge_host(record, store)?;
    let content = render_host(&merged)?;
    verify_generated(&record.name, &content)?;
    Ok(content)
}

/// Generate every host in the data directory.
pub fn generate_all(layout: &DataLayout, options: &GenerateOptions) -> Result<GenerateReport> {
    let mut cache = YamlCache::new();
    let store = MetadataStore::build(layout, &mut cache)?;

    let files = discover_host_files(layout)?;
    check_unique_names(&files)?;
    info!("Generating {} hosts", files.len());

    let generated_dir = layout.generated_dir();
    if options.clean && generated_dir.exists() {
        info!("Cleaning {}", generated_dir.display());
        fs::remove_dir_all(&generated_dir).map_err(|e| InvgenError::io(&generated_dir, e))?;
    }

    let mut report = GenerateReport::default();
    let mut failures = Vec::new();

    for file in &files {
        let outcome = HostRecord::load(file, &mut cache).and_then(|record| {
            info!("Generating host {}", record.name);
            let content = generate_host(&record, &store, &options.policy)?;
            let path = layout.generated_host_path(&record.name);
            let changed = write_if_changed(&path, &content)?;
            Ok((path, changed))
        });

        match outcome {
            Ok((path, true)) => report.written.push(path),
            Ok((path, false)) => report.unchanged.push(path),
            Err(error) if options.continue_on_error => {
                let host = error
                    .host()
                    .map_or_else(|| file_stem(file), str::to_string);
                warn!("Host {} failed: {}", host, error);
                failures.push(HostFailure { host, error });
            }
            Err(error) => return Err(error),
        }
    }

    if !failures.is_empty() {
        return Err(InvgenError::GenerationFailed { failures });
    }

    debug!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        "Generation finished"
    );
    Ok(report)
}

/// Atomically write `content` to `path` unless it already holds it.
///
/// Returns whether the file was written.
fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            debug!("Unchanged {}", path.display());
            return Ok(false);
        }
    }

    let dir = path
        .parent()
        .ok_or_else(|| InvgenError::io(path, std::io::Error::other("path has no parent")))?;
    fs::create_dir_all(dir).map_err(|e| InvgenError::io(dir, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| InvgenError::io(dir, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| InvgenError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| InvgenError::io(path, e.error))?;

    debug!("Wrote {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_if_changed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("generated/web1.yaml");

        assert!(write_if_changed(&path, "role: web\n").unwrap());
        assert!(!write_if_changed(&path, "role: web\n").unwrap());
        assert!(write_if_changed(&path, "role: db\n").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "role: db\n");
    }

    #[test]
    fn test_options_from_config() {
        let config = ProjectConfig {
            strict: true,
            required_metadata: Some(vec!["os".into()]),
            continue_on_error: true,
        };
        let options = GenerateOptions::from(&config);
        assert_eq!(options.policy, ValidationPolicy::strict(["os".to_string()]));
        assert!(options.continue_on_error);
        assert!(!options.clean);
    }
}
