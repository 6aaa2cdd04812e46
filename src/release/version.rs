//! Semantic versions as the release catalog reports them
//!
//! Catalog entries carry edition variants as build metadata
//! (`1.17.3+ent.hsm.fips1402`), so two strings that differ only after the `+`
//! name the same release. [`Version`] therefore orders, compares and hashes on
//! its identity `(major, minor, patch, pre)` and ignores build metadata.

use crate::core::error::{PipelineError, PipelineResult};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A parsed `MAJOR.MINOR.PATCH[-PRE][+BUILD]` version
#[derive(Debug, Clone)]
pub struct Version {
  inner: semver::Version,
}

impl Version {
  /// Create a release version with no pre-release or build metadata
  pub fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self {
      inner: semver::Version::new(major, minor, patch),
    }
  }

  /// Parse a version string, failing with `InvalidVersion`
  pub fn parse(input: &str) -> PipelineResult<Self> {
    semver::Version::parse(input)
      .map(|inner| Self { inner })
      .map_err(|e| PipelineError::invalid_version(input, e))
  }

  pub fn major(&self) -> u64 {
    self.inner.major
  }

  pub fn minor(&self) -> u64 {
    self.inner.minor
  }

  pub fn patch(&self) -> u64 {
    self.inner.patch
  }

  /// Pre-release tag without the leading `-`, empty when absent
  pub fn pre(&self) -> &str {
    self.inner.pre.as_str()
  }

  /// Build metadata without the leading `+`, empty when absent
  pub fn build(&self) -> &str {
    self.inner.build.as_str()
  }

  pub fn is_prerelease(&self) -> bool {
    !self.inner.pre.is_empty()
  }

  pub fn has_metadata(&self) -> bool {
    !self.inner.build.is_empty()
  }

  /// The same version with build metadata removed
  pub fn strip_metadata(&self) -> Self {
    let mut inner = self.inner.clone();
    inner.build = semver::BuildMetadata::EMPTY;
    Self { inner }
  }

  /// The same version with pre-release and build metadata removed
  pub fn release(&self) -> Self {
    Self::new(self.major(), self.minor(), self.patch())
  }

  /// Whether `floor <= self <= ceiling` by identity
  pub fn within(&self, floor: &Version, ceiling: &Version) -> bool {
    floor <= self && self <= ceiling
  }

  /// Borrow the underlying semver value
  pub fn as_semver(&self) -> &semver::Version {
    &self.inner
  }
}

impl PartialEq for Version {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Version {}

impl PartialOrd for Version {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Version {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .inner
      .major
      .cmp(&other.inner.major)
      .then(self.inner.minor.cmp(&other.inner.minor))
      .then(self.inner.patch.cmp(&other.inner.patch))
      .then_with(|| self.inner.pre.cmp(&other.inner.pre))
  }
}

impl Hash for Version {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.inner.major.hash(state);
    self.inner.minor.hash(state);
    self.inner.patch.hash(state);
    self.inner.pre.as_str().hash(state);
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.inner)
  }
}

impl FromStr for Version {
  type Err = PipelineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl From<semver::Version> for Version {
  fn from(inner: semver::Version) -> Self {
    Self { inner }
  }
}
