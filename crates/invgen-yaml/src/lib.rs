/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! # invgen-yaml
//!
//! YAML loading and dumping for invgen.
//!
//! Documents are represented as `serde_yaml::Value`, whose mappings keep
//! insertion order. Loading never reorders keys and dumping never sorts them,
//! so a document read and written back keeps its layout.
//!
//! Ansible vault strings (`!vault |`) are kept as tagged values and treated
//! as opaque text: they are never decrypted or reinterpreted, and they are
//! re-emitted with the tag and literal block style.
//!
//! ## Example
//!
//! ```rust
//! use invgen_yaml::{dump, parse, vault};
//!
//! let doc = parse("password: !vault |\n  $ANSIBLE_VAULT;1.1;AES256\n  336366\n").unwrap();
//! let password = doc.get("password").unwrap();
//! assert_eq!(vault::vault_text(password), Some("$ANSIBLE_VAULT;1.1;AES256\n336366\n"));
//! ```

mod dump;
mod error;
mod parser;
pub mod vault;

pub use dump::{dump, dump_entry, save_file};
pub use error::{Error, Result};
pub use parser::{into_mapping, load_file, parse, parse_file};
pub use serde_yaml::{Mapping, Value};
