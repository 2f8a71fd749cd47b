/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Provenance-annotated YAML output for merged hosts.
 */

//! Rendering merged hosts as provenance-annotated YAML.
//!
//! Consecutive keys from the same source share one `# source` comment, and
//! groups after the first are separated by a blank line:
//!
//! ```yaml
//! # platform/rpi4
//! cpu_arch: arm64
//!
//! # hosts/web1
//! metadata:
//!   platform: rpi4
//! role: web
//! ```

use crate::error::{InvgenError, Result};
use crate::merge::MergedHost;

/// Render a merged host as YAML with source comments.
pub fn render_host(merged: &MergedHost) -> Result<String> {
    let mut out = String::new();
    let mut previous_source: Option<&str> = None;

    for (key, sourced) in merged.iter() {
        match previous_source {
            None => out.push_str(&format!("# {}\n", sourced.source)),
            Some(previous) if previous != sourced.source => {
                out.push_str(&format!("\n# {}\n", sourced.source));
            }
            Some(_) => {}
        }
        previous_source = Some(sourced.source.as_str());

        let entry = invgen_yaml::dump_entry(key, &sourced.value).map_err(|e| {
            InvgenError::GeneratedFileInvalid {
                host: merged.name.clone(),
                message: e.to_string(),
            }
        })?;
        out.push_str(&entry);
    }

    Ok(out)
}

/// Re-parse rendered output and reject it if it is not a valid YAML mapping.
pub fn verify_generated(host: &str, content: &str) -> Result<()> {
    let invalid = |message: String| InvgenError::GeneratedFileInvalid {
        host: host.to_string(),
        message,
    };

    let value = invgen_yaml::parse(content).map_err(|e| invalid(e.to_string()))?;
    invgen_yaml::into_mapping(value, &format!("generated/{host}.yaml"))
        .map_err(|e| invalid(e.to_string()))?;
    Ok(())
}
