//! Release pipeline helpers
//!
//! Resolves which released versions a build should be tested against, keeps
//! `.release/versions.hcl` (the list of actively maintained branches) in shape,
//! and writes the generated config consumed by the enos test harness.

pub mod catalog;
pub mod core;
pub mod enos;
pub mod hcl;
pub mod manifest;
pub mod release;
