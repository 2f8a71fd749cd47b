/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Metadata merge engine and inventory builder for invgen.
//!
//! invgen turns a tree of declarative YAML files into per-host variable
//! files and an Ansible dynamic inventory:
//!
//! 1. [`MetadataStore::build`] loads every fragment under `metadata/<type>/`.
//! 2. [`generate_all`] merges each host in `hosts/` with the fragments its
//!    `metadata` section selects and writes `generated/<host>.yaml`, with
//!    comments recording which file contributed each key.
//! 3. [`InventoryBuilder`] reads the generated files back and groups hosts
//!    by their metadata selectors.
//!
//! ```rust,no_run
//! use invgen_core::{DataLayout, GenerateOptions, InventoryBuilder, generate_all, load_generated_hosts};
//!
//! let layout = DataLayout::new("data");
//! generate_all(&layout, &GenerateOptions::default())?;
//!
//! let inventory = InventoryBuilder::new(load_generated_hosts(&layout)?);
//! println!("{}", inventory.render(true).unwrap());
//! # Ok::<(), invgen_core::InvgenError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod generate;
pub mod hosts;
pub mod inventory;
pub mod layout;
pub mod merge;
pub mod metadata;
pub mod render;

pub use cache::YamlCache;
pub use config::ProjectConfig;
pub use error::{HostFailure, InvgenError, Result};
pub use generate::{GenerateOptions, GenerateReport, generate_all, generate_host};
pub use hosts::{GeneratedHost, HostRecord, METADATA_KEY, load_generated_hosts};
pub use inventory::{Group, Inventory, InventoryBuilder};
pub use layout::DataLayout;
pub use merge::{MergedHost, SourcedValue, ValidationPolicy, merge_host, validate_host};
pub use metadata::{Fragment, MetadataStore};
pub use render::{render_host, verify_generated};
