//! Active-versions manifest (`.release/versions.hcl`)
//!
//! ```hcl
//! schema = 1
//!
//! active_versions {
//!   version "1.19.x" {
//!     ce_active = true
//!     lts       = true
//!   }
//!   version "1.18.x" {
//!     ce_active = true
//!   }
//! }
//! ```
//!
//! Branches are keyed by [`BranchLabel`] and always ordered semantically on
//! `(major, minor)`, so `1.10.x` sorts above `1.9.x`.

pub mod reader;
pub mod retention;

pub use reader::{MANIFEST_RELATIVE_PATH, ManifestReader, find_manifest, write_manifest};
pub use retention::{RetentionInput, apply_retention};

use crate::core::error::{Diagnostic, ManifestError, PipelineError, PipelineResult};
use crate::hcl::{self, Block, Body, Expr, Pos};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.x$").expect("valid label regex"));
static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)").expect("valid prefix regex"));

/// Schema version written by this crate
pub const CURRENT_SCHEMA: i64 = 1;

/// A `MAJOR.MINOR.x` branch label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchLabel {
  pub major: u64,
  pub minor: u64,
}

impl BranchLabel {
  pub fn new(major: u64, minor: u64) -> Self {
    Self { major, minor }
  }

  /// Branch of a version-like string by its leading `MAJOR.MINOR`
  /// (`1.19.2-rc1` and `1.19.x` both map to `1.19.x`).
  pub fn from_version_prefix(input: &str) -> Option<Self> {
    let caps = PREFIX_RE.captures(input.trim())?;
    Some(Self {
      major: caps[1].parse().ok()?,
      minor: caps[2].parse().ok()?,
    })
  }
}

impl FromStr for BranchLabel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || format!("invalid branch label '{}', expected MAJOR.MINOR.x", s);
    let caps = LABEL_RE.captures(s).ok_or_else(invalid)?;
    Ok(Self {
      major: caps[1].parse().map_err(|_| invalid())?,
      minor: caps[2].parse().map_err(|_| invalid())?,
    })
  }
}

impl fmt::Display for BranchLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.x", self.major, self.minor)
  }
}

impl Serialize for BranchLabel {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Per-branch flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActiveBranch {
  pub ce_active: bool,
  pub lts: bool,
}

/// A branch with its flags, as listed for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchEntry {
  pub version: BranchLabel,
  pub ce_active: bool,
  pub lts: bool,
}

/// Parsed `.release/versions.hcl`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveVersionsManifest {
  pub schema: i64,
  pub branches: BTreeMap<BranchLabel, ActiveBranch>,
}

impl ActiveVersionsManifest {
  pub fn new(schema: i64) -> Self {
    Self {
      schema,
      branches: BTreeMap::new(),
    }
  }

  /// Parse manifest text. `path` is only used in error messages.
  pub fn parse(src: &str, path: Option<&Path>) -> PipelineResult<Self> {
    let body = hcl::parse(src).map_err(|diagnostics| parse_error(path, diagnostics))?;
    Decoder::default().decode(&body, path)
  }

  /// Canonical manifest text, branches newest first
  pub fn to_hcl(&self) -> String {
    hcl::to_string(&self.to_body())
  }

  fn to_body(&self) -> Body {
    let versions = self.descending().fold(Body::new(), |body, (label, branch)| {
      let mut attrs = Body::new();
      if branch.ce_active {
        attrs = attrs.attribute("ce_active", Expr::Bool(true));
      }
      if branch.lts {
        attrs = attrs.attribute("lts", Expr::Bool(true));
      }
      body.block(Block::new("version", vec![label.to_string()], attrs))
    });

    Body::new()
      .attribute("schema", Expr::Number(self.schema))
      .block(Block::new("active_versions", vec![], versions))
  }

  /// Branches newest first
  pub fn descending(&self) -> impl Iterator<Item = (&BranchLabel, &ActiveBranch)> {
    self.branches.iter().rev()
  }

  /// Largest branch, if any
  pub fn latest(&self) -> Option<BranchLabel> {
    self.branches.keys().next_back().copied()
  }

  pub fn get(&self, label: &BranchLabel) -> Option<&ActiveBranch> {
    self.branches.get(label)
  }

  /// Branches newest first, flattened for output
  pub fn entries(&self) -> Vec<BranchEntry> {
    self
      .descending()
      .map(|(label, branch)| BranchEntry {
        version: *label,
        ce_active: branch.ce_active,
        lts: branch.lts,
      })
      .collect()
  }
}

fn parse_error(path: Option<&Path>, diagnostics: Vec<Diagnostic>) -> PipelineError {
  PipelineError::Manifest(ManifestError::Parse {
    path: path.map(Path::to_path_buf),
    diagnostics,
  })
}

/// Schema decoding; collects every schema diagnostic before failing.
#[derive(Default)]
struct Decoder {
  diagnostics: Vec<Diagnostic>,
  unknown: Option<ManifestError>,
}

impl Decoder {
  fn error(&mut self, pos: Pos, message: impl Into<String>) {
    self.diagnostics.push(Diagnostic {
      line: pos.line,
      column: pos.column,
      message: message.into(),
    });
  }

  fn decode(mut self, body: &Body, path: Option<&Path>) -> PipelineResult<ActiveVersionsManifest> {
    let mut manifest = ActiveVersionsManifest::default();
    let mut schema_seen = false;

    for attr in body.attributes() {
      match attr.name.as_str() {
        "schema" if schema_seen => self.error(attr.pos, "duplicate attribute 'schema'"),
        "schema" => {
          schema_seen = true;
          match attr.value.as_i64() {
            Some(schema) => manifest.schema = schema,
            None => self.error(
              attr.pos,
              format!("'schema' must be a number, found {}", attr.value.type_name()),
            ),
          }
        }
        other => self.error(attr.pos, format!("unsupported top-level attribute '{}'", other)),
      }
    }

    let mut active_blocks = 0usize;
    for block in body.blocks() {
      if block.ident != "active_versions" {
        self.error(block.pos, format!("unsupported top-level block '{}'", block.ident));
        continue;
      }
      active_blocks += 1;
      if active_blocks > 1 {
        self.error(block.pos, "duplicate 'active_versions' block");
        continue;
      }
      if !block.labels.is_empty() {
        self.error(block.pos, "'active_versions' block takes no labels");
      }
      self.decode_active_versions(block, &mut manifest);
    }

    if active_blocks == 0 {
      self.error(Pos { line: 1, column: 1 }, "missing required block 'active_versions'");
    }

    if let Some(unknown) = self.unknown {
      return Err(PipelineError::Manifest(unknown));
    }
    if !self.diagnostics.is_empty() {
      self.diagnostics.sort_by_key(|d| (d.line, d.column));
      return Err(parse_error(path, self.diagnostics));
    }
    Ok(manifest)
  }

  fn decode_active_versions(&mut self, block: &Block, manifest: &mut ActiveVersionsManifest) {
    for attr in block.body.attributes() {
      self.error(
        attr.pos,
        format!("unsupported attribute '{}' in 'active_versions'", attr.name),
      );
    }

    let mut seen = HashSet::new();
    for version in block.body.blocks() {
      if version.ident != "version" {
        self.error(
          version.pos,
          format!("unsupported block '{}' in 'active_versions'", version.ident),
        );
        continue;
      }
      let [label] = version.labels.as_slice() else {
        self.error(version.pos, "'version' block takes exactly one label");
        continue;
      };
      let branch_label = match label.parse::<BranchLabel>() {
        Ok(l) => l,
        Err(message) => {
          self.error(version.pos, message);
          continue;
        }
      };
      if !seen.insert(branch_label) {
        self.error(version.pos, format!("duplicate version \"{}\"", label));
        continue;
      }

      let branch = self.decode_branch(version, label);
      manifest.branches.insert(branch_label, branch);
    }
  }

  fn decode_branch(&mut self, version: &Block, label: &str) -> ActiveBranch {
    let mut branch = ActiveBranch::default();
    for attr in version.body.attributes() {
      let slot = match attr.name.as_str() {
        "ce_active" => &mut branch.ce_active,
        "lts" => &mut branch.lts,
        other => {
          if self.unknown.is_none() {
            self.unknown = Some(ManifestError::UnknownAttribute {
              attribute: other.to_string(),
              label: label.to_string(),
              line: attr.pos.line,
            });
          }
          continue;
        }
      };
      match attr.value.as_bool() {
        Some(value) => *slot = value,
        None => self.error(
          attr.pos,
          format!("'{}' must be a bool, found {}", attr.name, attr.value.type_name()),
        ),
      }
    }
    for nested in version.body.blocks() {
      self.error(
        nested.pos,
        format!("unsupported block '{}' in version \"{}\"", nested.ident, label),
      );
    }
    branch
  }
}
