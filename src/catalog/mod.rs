//! Release catalog contract
//!
//! The resolver only ever talks to [`ReleaseCatalog`]. How an implementation
//! finds releases (paging an upload-ordered feed, reading a snapshot, a fixed
//! list in tests) stays behind the trait.
//!
//! - **memory**: `StaticCatalog`, a fixed in-memory list filtered semantically
//! - **paged**: `PagedCatalog`, the upload-time cursor strategy over a [`ReleaseSource`]
//! - **snapshot**: `SnapshotSource`, a [`ReleaseSource`] backed by a JSON file

pub mod memory;
pub mod paged;
pub mod snapshot;

pub use memory::StaticCatalog;
pub use paged::PagedCatalog;
pub use snapshot::SnapshotSource;

use std::cmp::Ordering;

use crate::core::context::RunContext;
use crate::core::error::PipelineResult;
use crate::release::license::LicenseClass;
use crate::release::version::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lists released versions of a product.
pub trait ReleaseCatalog: Send + Sync {
  /// Every released version `v` of `product` for `license_class` with
  /// `floor <= v <= ceiling` (identity comparison).
  ///
  /// The same identity may appear several times with different build
  /// metadata, and order is unspecified. Implementations check `ctx` at entry.
  fn list_releases(
    &self,
    ctx: &RunContext,
    product: &str,
    license_class: LicenseClass,
    ceiling: &Version,
    floor: &Version,
  ) -> PipelineResult<Vec<String>>;
}

/// One published release as an upload-ordered feed reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
  pub version: String,
  pub license_class: LicenseClass,
  pub timestamp_created: DateTime<Utc>,
}

/// Upload-ordered feed of releases, the raw material for [`PagedCatalog`].
pub trait ReleaseSource: Send + Sync {
  /// Look up a single release by identity (build metadata ignored).
  fn release(
    &self,
    ctx: &RunContext,
    product: &str,
    license_class: LicenseClass,
    version: &Version,
  ) -> PipelineResult<Option<ReleaseRecord>>;

  /// Up to `limit` releases that come after `cursor` in feed order, newest
  /// first. Releases sharing an upload time are ordered by version string,
  /// descending.
  fn releases_before(
    &self,
    ctx: &RunContext,
    product: &str,
    license_class: LicenseClass,
    cursor: &PageCursor,
    limit: usize,
  ) -> PipelineResult<Vec<ReleaseRecord>>;
}

/// Keyset position in an upload-ordered feed
///
/// Feed order is upload time descending, then version string descending.
/// Edition variants are often uploaded in one batch with the same timestamp,
/// so the version string is needed to resume inside such a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
  pub timestamp: DateTime<Utc>,
  pub version: String,
}

impl PageCursor {
  /// Start of a listing: everything uploaded strictly before `timestamp`
  pub fn start(timestamp: DateTime<Utc>) -> Self {
    Self {
      timestamp,
      version: String::new(),
    }
  }

  /// Resume after `record`
  pub fn after(record: &ReleaseRecord) -> Self {
    Self {
      timestamp: record.timestamp_created,
      version: record.version.clone(),
    }
  }

  /// Whether `record` comes after this position in feed order
  pub fn admits(&self, record: &ReleaseRecord) -> bool {
    match record.timestamp_created.cmp(&self.timestamp) {
      Ordering::Less => true,
      Ordering::Equal => record.version.as_str() < self.version.as_str(),
      Ordering::Greater => false,
    }
  }
}

/// Feed order: newest upload first, ties broken by version string descending
pub fn feed_order(a: &ReleaseRecord, b: &ReleaseRecord) -> Ordering {
  b.timestamp_created
    .cmp(&a.timestamp_created)
    .then_with(|| b.version.cmp(&a.version))
}
