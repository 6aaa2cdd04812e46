//! Upload-time cursor strategy over an upload-ordered release feed
//!
//! Release feeds are ordered by upload time, not by semantic version, and a
//! patch for an old minor can be uploaded long after a newer minor. The
//! strategy therefore:
//!
//! 1. Looks up the floor release; its upload time minus a 24 hour margin is
//!    the point where paging stops (missing floor fails with `FloorNotFound`).
//! 2. Pages backwards from now, newest first, so late backports below the
//!    ceiling are still seen. A ceiling above every release needs no lookup.
//!    The cursor is the last record's `(upload time, version)`, so a page
//!    boundary inside a batch of same-time uploads loses nothing.
//! 3. Filters every page by the semantic range and checks cancellation
//!    between pages.

use super::{PageCursor, ReleaseCatalog, ReleaseSource};
use crate::core::context::RunContext;
use crate::core::error::{CatalogError, PipelineError, PipelineResult};
use crate::release::license::LicenseClass;
use crate::release::version::Version;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Slack subtracted from the floor's upload time before paging stops
pub const FLOOR_MARGIN_HOURS: i64 = 24;

/// [`ReleaseCatalog`] that pages a [`ReleaseSource`] by upload time
pub struct PagedCatalog<S> {
  source: S,
  page_size: usize,
}

impl<S: ReleaseSource> PagedCatalog<S> {
  pub fn new(source: S, page_size: usize) -> Self {
    Self {
      source,
      page_size: page_size.max(1),
    }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  fn stop_time(
    &self,
    ctx: &RunContext,
    product: &str,
    license_class: LicenseClass,
    floor: &Version,
  ) -> PipelineResult<DateTime<Utc>> {
    let record = self
      .source
      .release(ctx, product, license_class, floor)?
      .ok_or_else(|| {
        PipelineError::Catalog(CatalogError::FloorNotFound {
          version: floor.to_string(),
        })
      })?;

    Ok(record.timestamp_created - Duration::hours(FLOOR_MARGIN_HOURS))
  }
}

impl<S: ReleaseSource> ReleaseCatalog for PagedCatalog<S> {
  fn list_releases(
    &self,
    ctx: &RunContext,
    product: &str,
    license_class: LicenseClass,
    ceiling: &Version,
    floor: &Version,
  ) -> PipelineResult<Vec<String>> {
    ctx.check()?;

    let stop = self.stop_time(ctx, product, license_class, floor)?;
    let mut cursor = PageCursor::start(Utc::now());
    let mut found = Vec::new();
    let mut pages = 0usize;

    loop {
      ctx.check()?;

      let page = self
        .source
        .releases_before(ctx, product, license_class, &cursor, self.page_size)?;
      pages += 1;
      let page_len = page.len();
      debug!(page = pages, releases = page_len, before = %cursor.timestamp, "fetched release page");

      let mut reached_stop = false;
      for record in page {
        if record.timestamp_created < stop {
          reached_stop = true;
          break;
        }
        cursor = PageCursor::after(&record);

        let version = Version::parse(&record.version)?;
        if version.within(floor, ceiling) {
          found.push(record.version);
        }
      }

      if reached_stop || page_len < self.page_size {
        break;
      }
    }

    debug!(pages, matched = found.len(), %floor, %ceiling, "finished paging release catalog");
    Ok(found)
  }
}
