/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Project configuration for invgen data directories.
 */

//! Project configuration.
//!
//! A data directory may carry an `invgen.yml` (or `invgen.yaml`) file:
//!
//! ```yaml
//! strict: true
//! required-metadata: [customer, os, environment]
//! continue-on-error: false
//! ```
//!
//! Every key is optional. Command-line flags are applied on top of the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{InvgenError, Result};
use crate::layout::DataLayout;
use crate::merge::ValidationPolicy;

/// Parsed `invgen.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Require every host to declare a minimum set of metadata types.
    #[serde(default)]
    pub strict: bool,

    /// Required metadata types under strict validation.
    #[serde(default)]
    pub required_metadata: Option<Vec<String>>,

    /// Process every host and report all failures instead of stopping at the first.
    #[serde(default)]
    pub continue_on_error: bool,
}

impl ProjectConfig {
    /// Load the project configuration from a data directory.
    ///
    /// Returns the default configuration when no config file exists.
    pub fn discover(layout: &DataLayout) -> Result<Self> {
        match layout.config_candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific config file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading project configuration");
        let content = std::fs::read_to_string(path).map_err(|e| InvgenError::io(path, e))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| InvgenError::Config {
            path: PathBuf::from(path),
            message: e.to_string(),
        })
    }

    /// The validation policy this configuration selects.
    pub fn validation_policy(&self) -> ValidationPolicy {
        if self.strict {
            match &self.required_metadata {
                Some(required) => ValidationPolicy::strict(required.iter().cloned()),
                None => ValidationPolicy::strict_default(),
            }
        } else {
            ValidationPolicy::Loose
        }
    }
}
