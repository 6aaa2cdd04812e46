//! CLI commands for the pipeline binary
//!
//! ## Generate
//! - **generate**: write `enos-dynamic-config.hcl` for the enos harness
//!
//! ## Releases
//! - **releases**: list released versions in a window, list or update the
//!   active-versions manifest
//!
//! All commands take the `&RunContext` and loaded `&PipelineConfig` built once
//! in `main`.

pub mod generate;
pub mod releases;

pub use generate::{EnosDynamicConfigArgs, run_enos_dynamic_config};
pub use releases::{
  ListActiveVersionsArgs, ListVersionsArgs, UpdateActiveVersionsArgs, run_list_active_versions, run_list_versions,
  run_update_active_versions,
};

use release_pipeline::catalog::{PagedCatalog, ReleaseCatalog, SnapshotSource};
use release_pipeline::core::config::PipelineConfig;
use release_pipeline::core::error::{PipelineResult, ResultExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Catalog from `--catalog`, falling back to `[catalog] snapshot`.
///
/// `None` when neither is set; the resolver then rejects the request.
pub fn open_catalog(config: &PipelineConfig, flag: Option<&Path>) -> PipelineResult<Option<Arc<dyn ReleaseCatalog>>> {
  let Some(path) = flag.map(Path::to_path_buf).or_else(|| config.catalog.snapshot.clone()) else {
    return Ok(None);
  };

  let source = SnapshotSource::load(&path).context("Failed to open release catalog")?;
  debug!(path = %path.display(), releases = source.len(), "loaded catalog snapshot");
  Ok(Some(Arc::new(PagedCatalog::new(source, config.catalog.page_size))))
}

/// Flag value if given, otherwise the configured default
fn or_config<T: Clone>(flag: Option<T>, configured: &T) -> T {
  flag.unwrap_or_else(|| configured.clone())
}

/// Non-empty flag list, otherwise the configured list
fn skip_or_config(flag: Vec<String>, configured: &[String]) -> Vec<String> {
  if flag.is_empty() { configured.to_vec() } else { flag }
}

/// `--dir` default: the working directory
fn current_dir_or(dir: Option<PathBuf>) -> PipelineResult<PathBuf> {
  match dir {
    Some(dir) => Ok(dir),
    None => std::env::current_dir().context("Failed to get current directory"),
  }
}
