//! `pipeline generate enos-dynamic-config`

use super::{current_dir_or, open_catalog, or_config, skip_or_config};
use clap::Args;
use release_pipeline::core::config::PipelineConfig;
use release_pipeline::core::context::RunContext;
use release_pipeline::core::error::PipelineResult;
use release_pipeline::enos::{DEFAULT_FILE_NAME, DynamicConfigEmitter, EmitRequest};
use release_pipeline::release::VersionResolver;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EnosDynamicConfigArgs {
  /// Directory to write into (default: current directory)
  #[arg(short, long)]
  pub dir: Option<PathBuf>,
  /// File name to write
  #[arg(short, long, default_value = DEFAULT_FILE_NAME)]
  pub file: String,
  /// Version being built, e.g. 1.18.0
  #[arg(short, long)]
  pub version: String,
  /// Edition being built, e.g. ce, ent, ent.hsm.fips1402
  #[arg(short, long)]
  pub edition: String,
  /// Minor versions back from --version to start upgrade testing from
  #[arg(short, long)]
  pub n_minus: Option<u64>,
  /// Versions to leave out of upgrade testing (repeatable)
  #[arg(short, long)]
  pub skip: Vec<String>,
  /// JSON release catalog snapshot (default: [catalog] snapshot)
  #[arg(long)]
  pub catalog: Option<PathBuf>,
  /// Print the generated record to stdout after writing it
  #[arg(long)]
  pub print: bool,
}

/// Run the enos dynamic config generator
pub fn run_enos_dynamic_config(ctx: &RunContext, config: &PipelineConfig, args: EnosDynamicConfigArgs) -> PipelineResult<()> {
  let request = EmitRequest {
    dir: current_dir_or(args.dir)?,
    file: args.file,
    version: args.version,
    edition: args.edition,
    n_minus: or_config(args.n_minus, &config.dynamic_config.n_minus),
    skip: skip_or_config(args.skip, &config.dynamic_config.skip),
    catalog: open_catalog(config, args.catalog.as_deref())?,
  };

  let emitter = DynamicConfigEmitter::new(VersionResolver::new(&config.catalog.product));
  let result = emitter.emit(ctx, &request)?;

  if args.print {
    print!("{}", result.hcl);
  }
  eprintln!("✅ Wrote {}", result.path.display());
  let upgrades = &result.record.globals.sample_attributes.upgrade_initial_version;
  if upgrades.is_empty() {
    eprintln!("⚠️  No released versions in the upgrade window");
  } else {
    eprintln!("   upgrade_initial_version: {}", upgrades.join(", "));
  }

  Ok(())
}
