//! Retention policy for active branches
//!
//! Given the latest branch N:
//!
//! - N stays and is the only community-active branch
//! - N-1 and N-2 stay, enterprise only
//! - anything older stays only while it is LTS
//!
//! Branches newer than N (possible when N is picked from an older input) are
//! left untouched. Ordering is semantic on `(major, minor)`.

use super::{ActiveBranch, ActiveVersionsManifest, BranchLabel};
use crate::core::error::{PipelineError, PipelineResult};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const CE_SUFFIX: &str = "-ce";
const LTS_SUFFIX: &str = "-lts";

/// A branch requested on the command line, e.g. `1.20.x-ce` or `1.19.4-lts-ce`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionInput {
  pub label: BranchLabel,
  pub ce: bool,
  pub lts: bool,
}

impl RetentionInput {
  /// Strip trailing `-ce` / `-lts` flags in any order, then take the leading
  /// `MAJOR.MINOR` of what remains.
  pub fn parse(input: &str) -> PipelineResult<Self> {
    let mut rest = input.trim();
    let mut ce = false;
    let mut lts = false;
    loop {
      if let Some(stripped) = rest.strip_suffix(CE_SUFFIX) {
        ce = true;
        rest = stripped;
      } else if let Some(stripped) = rest.strip_suffix(LTS_SUFFIX) {
        lts = true;
        rest = stripped;
      } else {
        break;
      }
    }

    let label = BranchLabel::from_version_prefix(rest).ok_or_else(|| {
      PipelineError::validation(format!(
        "'{}' does not start with MAJOR.MINOR (expected e.g. 1.20.x, 1.20.x-ce or 1.19.3-lts)",
        input
      ))
    })?;

    Ok(Self { label, ce, lts })
  }
}

impl FromStr for RetentionInput {
  type Err = PipelineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for RetentionInput {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.label)?;
    if self.lts {
      f.write_str(LTS_SUFFIX)?;
    }
    if self.ce {
      f.write_str(CE_SUFFIX)?;
    }
    Ok(())
  }
}

/// Apply the retention policy, returning the new manifest.
///
/// Inputs are upserted first: a new branch takes the input's flags; an
/// existing branch takes the input's `-ce` flag and keeps LTS once set.
///
/// This departs from a literal "`lts` = input has `-lts`" reset. Under that
/// rule a bare `1.19.x` input would clear LTS on a branch the manifest marks
/// as LTS, and the branch would later be dropped once it falls past N-2.
pub fn apply_retention(manifest: &ActiveVersionsManifest, inputs: &[RetentionInput]) -> ActiveVersionsManifest {
  let mut branches = manifest.branches.clone();
  for input in inputs {
    branches
      .entry(input.label)
      .and_modify(|branch| {
        branch.ce_active = input.ce;
        branch.lts |= input.lts;
      })
      .or_insert(ActiveBranch {
        ce_active: input.ce,
        lts: input.lts,
      });
  }

  let Some(latest) = inputs
    .iter()
    .map(|input| input.label)
    .max()
    .or_else(|| branches.keys().next_back().copied())
  else {
    return ActiveVersionsManifest::new(manifest.schema);
  };

  // Newest first: N, N-1, N-2 are the first three at or below N.
  let supported: Vec<BranchLabel> = branches.range(..=latest).rev().take(3).map(|(label, _)| *label).collect();
  debug!(latest = %latest, supported = ?supported, "applying retention");

  let mut retained = ActiveVersionsManifest::new(manifest.schema);
  for (label, branch) in branches {
    let kept = if label > latest {
      Some(branch)
    } else if label == latest {
      Some(ActiveBranch {
        ce_active: true,
        lts: branch.lts,
      })
    } else if supported.contains(&label) || branch.lts {
      Some(ActiveBranch {
        ce_active: false,
        lts: branch.lts,
      })
    } else {
      None
    };

    match kept {
      Some(kept) => {
        retained.branches.insert(label, kept);
      }
      None => debug!(branch = %label, "dropping unsupported branch"),
    }
  }

  retained
}
