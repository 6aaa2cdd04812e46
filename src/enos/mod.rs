//! Generated configuration for the enos integration-test harness
//!
//! The harness reads `enos-dynamic-config.hcl` for the values that change per
//! branch: which regions and distro versions to sample, and which released
//! versions to upgrade from. This module builds that record and writes it.

pub mod dynamic_config;

pub use dynamic_config::{
  DynamicConfigEmitter, DynamicConfigRecord, EmitRequest, EmitResult, Globals, PREAMBLE, SampleAttributes,
};

/// File name the harness looks for
pub const DEFAULT_FILE_NAME: &str = "enos-dynamic-config.hcl";
