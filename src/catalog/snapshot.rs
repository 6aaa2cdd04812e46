//! JSON snapshot of a release feed
//!
//! ```json
//! {
//!   "product": "vault",
//!   "releases": [
//!     { "version": "1.17.3+ent", "license_class": "enterprise", "timestamp_created": "2024-08-01T17:00:00Z" }
//!   ]
//! }
//! ```

use super::{PageCursor, ReleaseRecord, ReleaseSource, feed_order};
use crate::core::context::RunContext;
use crate::core::error::{CatalogError, PipelineError, PipelineResult, ResultExt};
use crate::release::license::LicenseClass;
use crate::release::version::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotFile {
  product: String,
  #[serde(default)]
  releases: Vec<ReleaseRecord>,
}

/// [`ReleaseSource`] serving releases from an in-memory snapshot
#[derive(Debug, Clone)]
pub struct SnapshotSource {
  product: String,
  releases: Vec<ReleaseRecord>,
}

impl SnapshotSource {
  pub fn from_records(product: impl Into<String>, releases: Vec<ReleaseRecord>) -> Self {
    Self {
      product: product.into(),
      releases,
    }
  }

  /// Load a snapshot from a JSON file
  pub fn load(path: &Path) -> PipelineResult<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read catalog snapshot {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_str(&content)
      .with_context(|| format!("Failed to parse catalog snapshot {}", path.display()))?;

    for record in &file.releases {
      Version::parse(&record.version)
        .with_context(|| format!("Invalid release in catalog snapshot {}", path.display()))?;
    }

    Ok(Self::from_records(file.product, file.releases))
  }

  pub fn product(&self) -> &str {
    &self.product
  }

  pub fn len(&self) -> usize {
    self.releases.len()
  }

  pub fn is_empty(&self) -> bool {
    self.releases.is_empty()
  }

  fn ensure_product(&self, product: &str) -> PipelineResult<()> {
    if product == self.product {
      Ok(())
    } else {
      Err(PipelineError::Catalog(CatalogError::Upstream {
        message: format!(
          "catalog snapshot holds releases for '{}', not '{}'",
          self.product, product
        ),
      }))
    }
  }
}

impl ReleaseSource for SnapshotSource {
  fn release(
    &self,
    ctx: &RunContext,
    product: &str,
    license_class: LicenseClass,
    version: &Version,
  ) -> PipelineResult<Option<ReleaseRecord>> {
    ctx.check()?;
    self.ensure_product(product)?;

    // Several edition variants share an identity; the earliest upload wins.
    let mut best: Option<&ReleaseRecord> = None;
    for record in self.releases.iter().filter(|r| r.license_class == license_class) {
      if Version::parse(&record.version)? != *version {
        continue;
      }
      if best.is_none_or(|b| record.timestamp_created < b.timestamp_created) {
        best = Some(record);
      }
    }

    Ok(best.cloned())
  }

  fn releases_before(
    &self,
    ctx: &RunContext,
    product: &str,
    license_class: LicenseClass,
    cursor: &PageCursor,
    limit: usize,
  ) -> PipelineResult<Vec<ReleaseRecord>> {
    ctx.check()?;
    self.ensure_product(product)?;

    let mut page: Vec<ReleaseRecord> = self
      .releases
      .iter()
      .filter(|r| r.license_class == license_class && cursor.admits(r))
      .cloned()
      .collect();
    page.sort_by(feed_order);
    page.truncate(limit);

    Ok(page)
  }
}
