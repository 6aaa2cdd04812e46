//! Version range resolution: which released versions fall inside a window
//!
//! A request names a ceiling and either an explicit floor or an N-minus
//! offset. The resolver validates the request without touching the catalog,
//! computes the window, lists releases, and normalizes them into a sorted,
//! deduplicated list of metadata-free versions.

use crate::catalog::ReleaseCatalog;
use crate::core::config::DEFAULT_PRODUCT;
use crate::core::context::RunContext;
use crate::core::error::{PipelineError, PipelineResult, ValidationError};
use crate::release::license::LicenseClass;
use crate::release::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Input for [`VersionResolver::resolve`]. Never mutated by resolution.
#[derive(Clone, Default)]
pub struct VersionRangeRequest {
  /// Inclusive ceiling, e.g. the version being built
  pub upper_bound: String,
  /// Inclusive floor; mutually exclusive with `n_minus`
  pub lower_bound: Option<String>,
  /// Minor versions back from the ceiling; 0 means unset
  pub n_minus: u64,
  /// Edition or license class string, normalized during validation
  pub license_class: String,
  /// Versions to leave out, with or without build metadata
  pub skip: Vec<String>,
  /// Catalog to query
  pub catalog: Option<Arc<dyn ReleaseCatalog>>,
}

impl fmt::Debug for VersionRangeRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VersionRangeRequest")
      .field("upper_bound", &self.upper_bound)
      .field("lower_bound", &self.lower_bound)
      .field("n_minus", &self.n_minus)
      .field("license_class", &self.license_class)
      .field("skip", &self.skip)
      .field("catalog", &self.catalog.is_some())
      .finish()
  }
}

/// Ascending, deduplicated, metadata-free versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRangeResult {
  pub versions: Vec<String>,
}

/// Validated form of a [`VersionRangeRequest`]
struct ResolvedRange<'a> {
  license_class: LicenseClass,
  catalog: &'a dyn ReleaseCatalog,
  ceiling: Version,
  floor: Version,
}

/// Resolves version windows against an injected catalog
#[derive(Debug, Clone)]
pub struct VersionResolver {
  product: String,
}

impl Default for VersionResolver {
  fn default() -> Self {
    Self::new(DEFAULT_PRODUCT)
  }
}

impl VersionResolver {
  pub fn new(product: impl Into<String>) -> Self {
    Self {
      product: product.into(),
    }
  }

  pub fn product(&self) -> &str {
    &self.product
  }

  /// Resolve the request into the released versions inside its window
  pub fn resolve(&self, ctx: &RunContext, request: &VersionRangeRequest) -> PipelineResult<VersionRangeResult> {
    ctx.check()?;
    let range = validate(request)?;

    debug!(
      product = %self.product,
      license_class = %range.license_class,
      floor = %range.floor,
      ceiling = %range.ceiling,
      "listing releases"
    );
    let listed = range
      .catalog
      .list_releases(ctx, &self.product, range.license_class, &range.ceiling, &range.floor)?;

    let versions = normalize(&listed, &request.skip)?;
    debug!(listed = listed.len(), kept = versions.len(), "resolved version range");

    Ok(VersionRangeResult {
      versions: versions.iter().map(ToString::to_string).collect(),
    })
  }
}

fn validate(request: &VersionRangeRequest) -> PipelineResult<ResolvedRange<'_>> {
  let license_class = LicenseClass::normalize_queryable(&request.license_class)?;

  let catalog = request
    .catalog
    .as_deref()
    .ok_or_else(|| PipelineError::validation("no release catalog client configured"))?;

  let lower_bound = request.lower_bound.as_deref().filter(|s| !s.is_empty());
  match (lower_bound, request.n_minus) {
    (Some(_), n) if n > 0 => {
      return Err(PipelineError::Validation(ValidationError::RangePolicy {
        reason: "lower bound and N-minus are mutually exclusive".to_string(),
      }));
    }
    (None, 0) => {
      return Err(PipelineError::Validation(ValidationError::RangePolicy {
        reason: "either a lower bound or N-minus is required".to_string(),
      }));
    }
    _ => {}
  }

  let ceiling = Version::parse(&request.upper_bound)
    .map_err(|e| PipelineError::validation(format!("invalid upper bound: {}", e)))?;

  let floor = match lower_bound {
    Some(lower) => {
      Version::parse(lower).map_err(|e| PipelineError::validation(format!("invalid lower bound: {}", e)))?
    }
    None => n_minus_floor(&ceiling, request.n_minus)?,
  };

  Ok(ResolvedRange {
    license_class,
    catalog,
    ceiling,
    floor,
  })
}

/// `M.(m-k).0` for ceiling `M.m.p`. Does not cross major versions.
pub fn n_minus_floor(ceiling: &Version, n_minus: u64) -> PipelineResult<Version> {
  let minor = ceiling.minor().checked_sub(n_minus).ok_or_else(|| {
    PipelineError::Validation(ValidationError::RangePolicy {
      reason: format!(
        "N-minus {} reaches below minor 0 of {}; use an explicit lower bound to cross a major version",
        n_minus, ceiling
      ),
    })
  })?;

  Ok(Version::new(ceiling.major(), minor, 0))
}

/// Parse, strip metadata, drop skipped, deduplicate by identity, sort.
///
/// An identity is skipped when any listed form of it matches the skip list,
/// with or without its build metadata, regardless of listing order.
fn normalize(listed: &[String], skip: &[String]) -> PipelineResult<Vec<Version>> {
  let skip: HashSet<&str> = skip.iter().map(|s| s.trim()).collect();
  let parsed = listed
    .iter()
    .map(|raw| -> PipelineResult<(&str, Version)> { Ok((raw.as_str(), Version::parse(raw)?.strip_metadata())) })
    .collect::<PipelineResult<Vec<_>>>()?;

  let mut skipped = HashSet::new();
  for (raw, identity) in &parsed {
    if skip.contains(raw) || skip.contains(identity.to_string().as_str()) {
      warn!(version = %raw, "skipping version from skip list");
      skipped.insert(identity.clone());
    }
  }

  let mut seen = HashSet::new();
  let mut versions: Vec<Version> = parsed
    .into_iter()
    .map(|(_, identity)| identity)
    .filter(|identity| !skipped.contains(identity) && seen.insert(identity.clone()))
    .collect();

  versions.sort();
  Ok(versions)
}
