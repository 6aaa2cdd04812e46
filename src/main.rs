mod commands;

use clap::{Parser, Subcommand};
use release_pipeline::core::config::PipelineConfig;
use release_pipeline::core::context::RunContext;
use release_pipeline::core::error::{PipelineError, print_error};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Release pipeline helpers for CI
#[derive(Parser)]
#[command(name = "pipeline")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Log debug output to stderr (overridden by RUST_LOG)
  #[arg(long, global = true)]
  verbose: bool,

  /// Give up after this many seconds
  #[arg(long, global = true)]
  timeout: Option<u64>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate files consumed by other CI tooling
  #[command(subcommand)]
  Generate(GenerateCommands),

  /// Query releases and the active-versions manifest
  #[command(subcommand)]
  Releases(ReleasesCommands),
}

#[derive(Subcommand)]
enum GenerateCommands {
  /// Write enos-dynamic-config.hcl for enos scenarios
  EnosDynamicConfig(commands::EnosDynamicConfigArgs),
}

#[derive(Subcommand)]
enum ReleasesCommands {
  /// List released versions between two bounds
  ListVersions(commands::ListVersionsArgs),

  /// List branches in .release/versions.hcl
  ListActiveVersions(commands::ListActiveVersionsArgs),

  /// Mark branches active and apply the retention policy
  UpdateActiveVersions(commands::UpdateActiveVersionsArgs),
}

fn get_styles() -> clap::builder::Styles {
  use anstyle::{AnsiColor, Color, Style};

  let yellow = Some(Color::Ansi(AnsiColor::Yellow));
  let green = Some(Color::Ansi(AnsiColor::Green));
  let red = Some(Color::Ansi(AnsiColor::Red));

  clap::builder::Styles::styled()
    .usage(Style::new().bold().underline().fg_color(yellow))
    .header(Style::new().bold().underline().fg_color(yellow))
    .literal(Style::new().fg_color(green))
    .invalid(Style::new().bold().fg_color(red))
    .error(Style::new().bold().fg_color(red))
    .valid(Style::new().bold().underline().fg_color(green))
    .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(PipelineError::from(e).context("Failed to get current directory")),
  };

  let config = match PipelineConfig::load(&workspace_root) {
    Ok(config) => config,
    Err(e) => handle_error(e),
  };

  let ctx = match cli.timeout {
    Some(secs) => RunContext::new().with_timeout(Duration::from_secs(secs)),
    None => RunContext::new(),
  };

  let result = match cli.command {
    Commands::Generate(generate_cmd) => match generate_cmd {
      GenerateCommands::EnosDynamicConfig(args) => commands::run_enos_dynamic_config(&ctx, &config, args),
    },
    Commands::Releases(releases_cmd) => match releases_cmd {
      ReleasesCommands::ListVersions(args) => commands::run_list_versions(&ctx, &config, args),
      ReleasesCommands::ListActiveVersions(args) => commands::run_list_active_versions(&ctx, &config, args),
      ReleasesCommands::UpdateActiveVersions(args) => commands::run_update_active_versions(&ctx, &config, args),
    },
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: PipelineError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
