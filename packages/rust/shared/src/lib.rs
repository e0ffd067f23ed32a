//! Shared types, error model, and configuration for ThreatVault.
//!
//! This crate is the foundation depended on by all other ThreatVault crates.
//! It provides:
//! - [`ThreatVaultError`] — the unified error type
//! - Domain types ([`Record`], [`RecordKind`], [`Collection`], [`CorpusSets`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, InputsConfig, OutputConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, ThreatVaultError};
pub use types::{Collection, CorpusSets, Record, RecordKind};
