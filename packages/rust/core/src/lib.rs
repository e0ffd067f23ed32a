//! ThreatVault core: the vault build pipeline and document writer.
//!
//! [`pipeline::build_vault`] drives the whole run; [`writer`] owns the
//! filesystem side (entity documents, placeholder stubs, index pages).

pub mod pipeline;
pub mod writer;

pub use pipeline::{BuildConfig, BuildResult, ProgressReporter, SilentProgress, build_vault};
