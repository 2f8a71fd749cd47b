//! Inventory command implementation.
//!
//! Speaks the Ansible dynamic inventory protocol: `--list` prints the whole
//! inventory, `--host NAME` prints one host's variables (`{}` if unknown).

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use invgen_core::{DataLayout, InventoryBuilder, load_generated_hosts};

/// Arguments for the inventory command
#[derive(Debug)]
pub struct InventoryArgs {
    /// Data directory
    pub source: PathBuf,
    /// Single host to print instead of the full inventory
    pub host: Option<String>,
    /// Indent the JSON output
    pub pretty: bool,
}

/// Execute the inventory command
pub fn execute(args: InventoryArgs) -> Result<()> {
    let layout = DataLayout::new(&args.source);
    let hosts = load_generated_hosts(&layout).with_context(|| {
        format!(
            "Failed to read generated hosts from {}",
            layout.generated_dir().display()
        )
    })?;
    debug!("Loaded {} generated hosts", hosts.len());

    let builder = InventoryBuilder::new(hosts);
    let output = match &args.host {
        Some(name) => builder.render_host(name, args.pretty),
        None => builder.render(args.pretty),
    }
    .context("Failed to render inventory")?;

    println!("{output}");
    Ok(())
}
