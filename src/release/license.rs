//! Editions and the license classes the release catalog scopes queries by

use crate::core::error::{PipelineError, PipelineResult, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edition strings accepted at the emitter boundary
pub const EDITIONS: &[&str] = &[
  "ce",
  "oss",
  "ent",
  "enterprise",
  "ent.fips1402",
  "ent.hsm",
  "ent.hsm.fips1402",
];

/// Coarse grouping used by the release catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseClass {
  Community,
  Enterprise,
  Hosted,
}

impl LicenseClass {
  pub fn as_str(&self) -> &'static str {
    match self {
      LicenseClass::Community => "community",
      LicenseClass::Enterprise => "enterprise",
      LicenseClass::Hosted => "hosted",
    }
  }

  /// Fold an edition string onto its license class.
  ///
  /// Returns `None` for anything outside [`EDITIONS`].
  pub fn from_edition(edition: &str) -> Option<Self> {
    match edition {
      "ce" | "oss" => Some(LicenseClass::Community),
      "ent" | "enterprise" | "ent.hsm" | "ent.fips1402" | "ent.hsm.fips1402" => Some(LicenseClass::Enterprise),
      _ => None,
    }
  }

  /// Normalize either an edition or a canonical class name.
  ///
  /// Only community and enterprise are queryable by the resolver; `hosted`
  /// and unknown strings are rejected.
  pub fn normalize_queryable(input: &str) -> PipelineResult<Self> {
    let class = match input {
      "community" => Some(LicenseClass::Community),
      other => Self::from_edition(other),
    };

    class.ok_or_else(|| {
      PipelineError::Validation(ValidationError::UnknownEdition {
        edition: input.to_string(),
      })
    })
  }
}

/// Whether `edition` is one of the recognized edition strings
pub fn is_known_edition(edition: &str) -> bool {
  EDITIONS.contains(&edition)
}

impl fmt::Display for LicenseClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for LicenseClass {
  type Err = PipelineError;

  /// Parses canonical class names only (`community`, `enterprise`, `hosted`)
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "community" => Ok(LicenseClass::Community),
      "enterprise" => Ok(LicenseClass::Enterprise),
      "hosted" => Ok(LicenseClass::Hosted),
      other => Err(PipelineError::Validation(ValidationError::UnknownEdition {
        edition: other.to_string(),
      })),
    }
  }
}
