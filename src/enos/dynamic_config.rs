use crate::catalog::ReleaseCatalog;
use crate::core::context::RunContext;
use crate::core::error::{PipelineError, PipelineResult, ResultExt, ValidationError};
use crate::hcl::{self, Block, Body, Expr};
use crate::release::license::is_known_edition;
use crate::release::resolver::{VersionRangeRequest, VersionResolver};
use crate::release::version::Version;
use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Header written above the generated record, byte for byte
pub const PREAMBLE: &str = "# Copyright (c) HashiCorp, Inc.
# SPDX-License-Identifier: BUSL-1.1

# Code generated by pipeline generate enos-dynamic-config DO NOT EDIT.

# This file is overwritten in CI as it contains branch specific and sometimes ever-changing values.
# It's checked in here so that enos samples and scenarios can be performed, just be aware that this
# might change out from under you.
";

const AWS_REGIONS: &[&str] = &["us-east-1", "us-west-2"];
const DISTRO_VERSION_AMZN: &[&str] = &["2023"];
const DISTRO_VERSION_LEAP: &[&str] = &["15.6"];
const DISTRO_VERSION_RHEL: &[&str] = &["8.10", "9.4"];
const DISTRO_VERSION_SLES: &[&str] = &["15.6"];
const DISTRO_VERSION_UBUNTU: &[&str] = &["20.04", "24.04"];

/// `globals.sample_attributes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleAttributes {
  pub aws_region: Vec<String>,
  pub distro_version_amzn: Vec<String>,
  pub distro_version_leap: Vec<String>,
  pub distro_version_rhel: Vec<String>,
  pub distro_version_sles: Vec<String>,
  pub distro_version_ubuntu: Vec<String>,
  pub upgrade_initial_version: Vec<String>,
}

impl SampleAttributes {
  /// Fixed regions and distro matrix with the given upgrade sources
  pub fn with_defaults(upgrade_initial_version: Vec<String>) -> Self {
    fn owned(values: &[&str]) -> Vec<String> {
      values.iter().map(|s| s.to_string()).collect()
    }

    Self {
      aws_region: owned(AWS_REGIONS),
      distro_version_amzn: owned(DISTRO_VERSION_AMZN),
      distro_version_leap: owned(DISTRO_VERSION_LEAP),
      distro_version_rhel: owned(DISTRO_VERSION_RHEL),
      distro_version_sles: owned(DISTRO_VERSION_SLES),
      distro_version_ubuntu: owned(DISTRO_VERSION_UBUNTU),
      upgrade_initial_version,
    }
  }

  fn to_expr(&self) -> Expr {
    let fields: [(&str, &Vec<String>); 7] = [
      ("aws_region", &self.aws_region),
      ("distro_version_amzn", &self.distro_version_amzn),
      ("distro_version_leap", &self.distro_version_leap),
      ("distro_version_rhel", &self.distro_version_rhel),
      ("distro_version_sles", &self.distro_version_sles),
      ("distro_version_ubuntu", &self.distro_version_ubuntu),
      ("upgrade_initial_version", &self.upgrade_initial_version),
    ];
    Expr::Object(
      fields
        .into_iter()
        .map(|(name, values)| (name.to_string(), Expr::string_list(values.iter().cloned())))
        .collect(),
    )
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Globals {
  pub sample_attributes: SampleAttributes,
}

/// The whole generated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicConfigRecord {
  pub globals: Globals,
}

impl DynamicConfigRecord {
  pub fn new(upgrade_initial_version: Vec<String>) -> Self {
    Self {
      globals: Globals {
        sample_attributes: SampleAttributes::with_defaults(upgrade_initial_version),
      },
    }
  }

  /// Canonical HCL for the record, without the preamble
  pub fn to_hcl(&self) -> String {
    let globals = Body::new().attribute("sample_attributes", self.globals.sample_attributes.to_expr());
    hcl::to_string(&Body::new().block(Block::new("globals", vec![], globals)))
  }

  /// Full file contents: preamble, a blank line, then the record
  pub fn to_file_contents(&self) -> String {
    format!("{}\n{}", PREAMBLE, self.to_hcl())
  }
}

/// Input for [`DynamicConfigEmitter::emit`]
#[derive(Clone, Default)]
pub struct EmitRequest {
  /// Existing directory to write into
  pub dir: PathBuf,
  /// File name inside `dir`
  pub file: String,
  /// Version being built; ceiling of the upgrade window
  pub version: String,
  /// Edition being built, e.g. `ent.hsm`
  pub edition: String,
  /// Minor versions back from `version` to start the upgrade window
  pub n_minus: u64,
  /// Versions never used as upgrade sources
  pub skip: Vec<String>,
  pub catalog: Option<Arc<dyn ReleaseCatalog>>,
}

impl fmt::Debug for EmitRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EmitRequest")
      .field("dir", &self.dir)
      .field("file", &self.file)
      .field("version", &self.version)
      .field("edition", &self.edition)
      .field("n_minus", &self.n_minus)
      .field("skip", &self.skip)
      .field("catalog", &self.catalog.is_some())
      .finish()
  }
}

/// What was written
#[derive(Debug, Clone, Serialize)]
pub struct EmitResult {
  pub path: PathBuf,
  pub record: DynamicConfigRecord,
  pub hcl: String,
}

/// Resolves upgrade sources and writes the dynamic config file
#[derive(Debug, Clone, Default)]
pub struct DynamicConfigEmitter {
  resolver: VersionResolver,
}

impl DynamicConfigEmitter {
  pub fn new(resolver: VersionResolver) -> Self {
    Self { resolver }
  }

  /// Validate, resolve, and write `<dir>/<file>`
  pub fn emit(&self, ctx: &RunContext, request: &EmitRequest) -> PipelineResult<EmitResult> {
    ctx.check()?;
    validate(request)?;

    let upgrade = self.resolver.resolve(
      ctx,
      &VersionRangeRequest {
        upper_bound: request.version.clone(),
        lower_bound: None,
        n_minus: request.n_minus,
        license_class: request.edition.clone(),
        skip: request.skip.clone(),
        catalog: request.catalog.clone(),
      },
    )?;

    let record = DynamicConfigRecord::new(upgrade.versions);
    let hcl = record.to_hcl();
    let path = std::path::absolute(request.dir.join(&request.file))
      .with_context(|| format!("Failed to resolve {}", request.dir.join(&request.file).display()))?;

    ctx.check()?;
    write_file(&path, &hcl).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
      path = %path.display(),
      upgrade_initial_versions = record.globals.sample_attributes.upgrade_initial_version.len(),
      "wrote enos dynamic config"
    );

    Ok(EmitResult { path, record, hcl })
  }
}

fn validate(request: &EmitRequest) -> PipelineResult<()> {
  if request.file.trim().is_empty() {
    return Err(PipelineError::validation("no destination file name given"));
  }
  if request.catalog.is_none() {
    return Err(PipelineError::validation("no release catalog client configured"));
  }
  if !is_known_edition(&request.edition) {
    return Err(PipelineError::Validation(ValidationError::UnknownEdition {
      edition: request.edition.clone(),
    }));
  }
  Version::parse(&request.version)
    .map_err(|e| PipelineError::validation(format!("invalid target version: {}", e)))?;

  match fs::metadata(&request.dir) {
    Ok(meta) if meta.is_dir() => Ok(()),
    Ok(_) => Err(PipelineError::validation(format!(
      "{} is not a directory",
      request.dir.display()
    ))),
    Err(e) => Err(PipelineError::validation(format!(
      "destination directory {} is not accessible: {}",
      request.dir.display(),
      e
    ))),
  }
}

fn write_file(path: &Path, hcl: &str) -> std::io::Result<()> {
  let mut options = OpenOptions::new();
  options.read(true).write(true).create(true).truncate(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o644);
  }

  let mut file = options.open(path)?;
  file.write_all(PREAMBLE.as_bytes())?;
  file.write_all(b"\n")?;
  file.write_all(hcl.as_bytes())?;
  file.flush()
}
