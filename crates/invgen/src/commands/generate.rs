/*
 * generate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Generate command implementation
 */

//! Generate command implementation.
//!
//! Reads `invgen.yml` from the data directory (if present), applies the
//! command-line overrides, and writes every merged host file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use invgen_core::{DataLayout, GenerateOptions, ProjectConfig, generate_all};

/// Arguments for the generate command
#[derive(Debug)]
pub struct GenerateArgs {
    /// Data directory
    pub source: PathBuf,
    /// Force strict validation
    pub strict: bool,
    /// Continue past failing hosts
    pub keep_going: bool,
    /// Remove generated/ first
    pub clean: bool,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs) -> Result<()> {
    if !args.source.is_dir() {
        anyhow::bail!("Source directory does not exist: {}", args.source.display());
    }

    let layout = DataLayout::new(&args.source);
    let config = ProjectConfig::discover(&layout).context("Failed to load project configuration")?;
    let options = resolve_options(&config, &args);

    info!("Generating hosts from {}", layout.root().display());
    let report = generate_all(&layout, &options)
        .with_context(|| format!("Failed to generate hosts in {}", layout.root().display()))?;

    println!(
        "Generated {} hosts in {} ({} updated, {} unchanged)",
        report.host_count(),
        layout.generated_dir().display(),
        report.written.len(),
        report.unchanged.len()
    );
    Ok(())
}

/// Combine the project configuration with command-line flags.
fn resolve_options(config: &ProjectConfig, args: &GenerateArgs) -> GenerateOptions {
    let config = ProjectConfig {
        strict: config.strict || args.strict,
        continue_on_error: config.continue_on_error || args.keep_going,
        ..config.clone()
    };
    GenerateOptions {
        clean: args.clean,
        ..GenerateOptions::from(&config)
    }
}
