use super::ActiveVersionsManifest;
use crate::core::context::RunContext;
use crate::core::error::{ManifestError, PipelineError, PipelineResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest location relative to a checkout root
pub const MANIFEST_RELATIVE_PATH: &str = ".release/versions.hcl";

/// Probe `<dir>/.release/versions.hcl` for `start` and up to `depth` of its
/// ancestors, nearest first.
pub fn find_manifest(start: &Path, depth: usize) -> PipelineResult<PathBuf> {
  for dir in start.ancestors().take(depth + 1) {
    let candidate = dir.join(MANIFEST_RELATIVE_PATH);
    debug!(path = %candidate.display(), "probing for versions manifest");
    if candidate.is_file() {
      return Ok(candidate);
    }
  }

  Err(PipelineError::Manifest(ManifestError::NotFound {
    start: start.to_path_buf(),
    depth,
  }))
}

/// Loads the active-versions manifest from an explicit path or by search
#[derive(Debug, Clone)]
pub struct ManifestReader {
  start: PathBuf,
  search_depth: usize,
}

impl ManifestReader {
  /// Search upward from `start` through `search_depth` ancestors
  pub fn new(start: impl Into<PathBuf>, search_depth: usize) -> Self {
    Self {
      start: start.into(),
      search_depth,
    }
  }

  /// Search upward from the process working directory
  pub fn from_current_dir(search_depth: usize) -> PipelineResult<Self> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(Self::new(cwd, search_depth))
  }

  /// The manifest path: `explicit` when given, otherwise the nearest match
  pub fn resolve_path(&self, explicit: Option<&Path>) -> PipelineResult<PathBuf> {
    match explicit {
      Some(path) => Ok(path.to_path_buf()),
      None => find_manifest(&self.start, self.search_depth),
    }
  }

  /// Resolve, read and parse the manifest
  pub fn read(&self, ctx: &RunContext, explicit: Option<&Path>) -> PipelineResult<(PathBuf, ActiveVersionsManifest)> {
    ctx.check()?;
    let path = self.resolve_path(explicit)?;
    let content =
      fs::read_to_string(&path).with_context(|| format!("Failed to read versions manifest {}", path.display()))?;
    let manifest = ActiveVersionsManifest::parse(&content, Some(&path))?;
    debug!(path = %path.display(), branches = manifest.branches.len(), "loaded versions manifest");
    Ok((path, manifest))
  }
}

/// Write `manifest` canonically to `path`, replacing its contents
pub fn write_manifest(ctx: &RunContext, path: &Path, manifest: &ActiveVersionsManifest) -> PipelineResult<()> {
  ctx.check()?;
  fs::write(path, manifest.to_hcl())
    .with_context(|| format!("Failed to write versions manifest {}", path.display()))?;
  info!(path = %path.display(), branches = manifest.branches.len(), "wrote versions manifest");
  Ok(())
}
