use super::ReleaseCatalog;
use crate::core::context::RunContext;
use crate::core::error::PipelineResult;
use crate::release::license::LicenseClass;
use crate::release::version::Version;

/// Fixed list of version strings, filtered by semantic range without any I/O.
///
/// Product and license class are ignored; the list is whatever the caller
/// seeded.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
  versions: Vec<String>,
}

impl StaticCatalog {
  pub fn new<I, S>(versions: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      versions: versions.into_iter().map(Into::into).collect(),
    }
  }

  pub fn versions(&self) -> &[String] {
    &self.versions
  }
}

impl ReleaseCatalog for StaticCatalog {
  fn list_releases(
    &self,
    ctx: &RunContext,
    _product: &str,
    _license_class: LicenseClass,
    ceiling: &Version,
    floor: &Version,
  ) -> PipelineResult<Vec<String>> {
    ctx.check()?;

    let mut found = Vec::new();
    for raw in &self.versions {
      let version = Version::parse(raw)?;
      if version.within(floor, ceiling) {
        found.push(raw.clone());
      }
    }

    Ok(found)
  }
}
