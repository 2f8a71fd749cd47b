//! Command implementations for the invgen CLI
//!
//! Each command module handles the CLI interface and delegates to
//! invgen-core for the actual work.

pub mod generate;
pub mod inventory;
