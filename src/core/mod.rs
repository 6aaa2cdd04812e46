//! Shared plumbing for every pipeline operation
//!
//! - **config**: optional `pipeline.toml` parsing and validation
//! - **context**: cancellation signal and deadline passed to every operation
//! - **error**: error kinds with contextual help messages and exit codes

pub mod config;
pub mod context;
pub mod error;
