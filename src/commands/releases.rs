//! `pipeline releases ...` commands
//!
//! - `list-versions`: released versions inside a window
//! - `list-active-versions`: branches in `.release/versions.hcl`
//! - `update-active-versions`: apply the retention policy to that manifest

use super::{open_catalog, skip_or_config};
use clap::Args;
use release_pipeline::core::config::PipelineConfig;
use release_pipeline::core::context::RunContext;
use release_pipeline::core::error::PipelineResult;
use release_pipeline::manifest::{ManifestReader, RetentionInput, apply_retention, write_manifest};
use release_pipeline::release::{VersionRangeRequest, VersionResolver};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ListVersionsArgs {
  /// Inclusive ceiling, e.g. 1.18.0
  #[arg(short, long)]
  pub upper: String,
  /// Inclusive floor, e.g. 1.16.0
  #[arg(short, long)]
  pub lower: Option<String>,
  /// Minor versions back from --upper to use as the floor
  #[arg(short, long)]
  pub n_minus: Option<u64>,
  /// License class or edition: community, enterprise, ce, ent.hsm, ...
  #[arg(short = 'c', long)]
  pub license_class: String,
  /// Versions to leave out (repeatable)
  #[arg(short, long)]
  pub skip: Vec<String>,
  /// JSON release catalog snapshot (default: [catalog] snapshot)
  #[arg(long)]
  pub catalog: Option<PathBuf>,
  /// Output results in JSON format
  #[arg(long)]
  pub json: bool,
}

#[derive(Debug, Args)]
pub struct ListActiveVersionsArgs {
  /// Manifest path (default: search upward for .release/versions.hcl)
  #[arg(short, long)]
  pub path: Option<PathBuf>,
  /// Output results in JSON format
  #[arg(long)]
  pub json: bool,
}

#[derive(Debug, Args)]
pub struct UpdateActiveVersionsArgs {
  /// Branches to mark active: 1.20.x, 1.20.x-ce, 1.19.3-lts, ...
  #[arg(required = true)]
  pub inputs: Vec<String>,
  /// Manifest path (default: search upward for .release/versions.hcl)
  #[arg(short, long)]
  pub path: Option<PathBuf>,
  /// Write the result back to the manifest (default: print it)
  #[arg(long)]
  pub write: bool,
}

/// Run `releases list-versions`
pub fn run_list_versions(ctx: &RunContext, config: &PipelineConfig, args: ListVersionsArgs) -> PipelineResult<()> {
  let request = VersionRangeRequest {
    upper_bound: args.upper,
    lower_bound: args.lower,
    n_minus: args.n_minus.unwrap_or(0),
    license_class: args.license_class,
    skip: skip_or_config(args.skip, &config.dynamic_config.skip),
    catalog: open_catalog(config, args.catalog.as_deref())?,
  };

  let result = VersionResolver::new(&config.catalog.product).resolve(ctx, &request)?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&result)?);
  } else {
    for version in &result.versions {
      println!("{}", version);
    }
  }

  Ok(())
}

/// Run `releases list-active-versions`
pub fn run_list_active_versions(
  ctx: &RunContext,
  config: &PipelineConfig,
  args: ListActiveVersionsArgs,
) -> PipelineResult<()> {
  let reader = ManifestReader::from_current_dir(config.manifest.search_depth)?;
  let (path, manifest) = reader.read(ctx, args.path.as_deref())?;
  let entries = manifest.entries();

  if args.json {
    println!("{}", serde_json::to_string_pretty(&entries)?);
    return Ok(());
  }

  if entries.is_empty() {
    println!("⚠️  No active versions in {}", path.display());
    return Ok(());
  }

  println!("{:<10} {:<10} {:<5}", "VERSION", "CE_ACTIVE", "LTS");
  for entry in &entries {
    println!(
      "{:<10} {:<10} {:<5}",
      entry.version.to_string(),
      entry.ce_active,
      entry.lts
    );
  }

  Ok(())
}

/// Run `releases update-active-versions`
pub fn run_update_active_versions(
  ctx: &RunContext,
  config: &PipelineConfig,
  args: UpdateActiveVersionsArgs,
) -> PipelineResult<()> {
  let inputs = args
    .inputs
    .iter()
    .map(|raw| RetentionInput::parse(raw))
    .collect::<PipelineResult<Vec<_>>>()?;

  let reader = ManifestReader::from_current_dir(config.manifest.search_depth)?;
  let (path, manifest) = reader.read(ctx, args.path.as_deref())?;
  let updated = apply_retention(&manifest, &inputs);

  if args.write {
    write_manifest(ctx, &path, &updated)?;
    if updated == manifest {
      eprintln!("✅ {} already up to date", path.display());
    } else {
      eprintln!("✅ Updated {}", path.display());
    }
  } else {
    print!("{}", updated.to_hcl());
  }

  Ok(())
}
