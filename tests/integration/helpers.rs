//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Enterprise and community releases with realistic upload order: `1.16.9`
/// is a backport uploaded after `1.17.x` shipped.
pub const CATALOG_SNAPSHOT: &str = r#"{
  "product": "vault",
  "releases": [
    { "version": "1.15.9+ent", "license_class": "enterprise", "timestamp_created": "2024-02-01T17:00:00Z" },
    { "version": "1.16.0+ent", "license_class": "enterprise", "timestamp_created": "2024-03-04T17:00:00Z" },
    { "version": "1.16.1+ent", "license_class": "enterprise", "timestamp_created": "2024-03-20T17:00:00Z" },
    { "version": "1.17.0+ent", "license_class": "enterprise", "timestamp_created": "2024-06-12T17:00:00Z" },
    { "version": "1.17.0+ent.hsm", "license_class": "enterprise", "timestamp_created": "2024-06-12T18:00:00Z" },
    { "version": "1.17.0", "license_class": "community", "timestamp_created": "2024-06-12T16:00:00Z" },
    { "version": "1.17.1+ent", "license_class": "enterprise", "timestamp_created": "2024-06-26T17:00:00Z" },
    { "version": "1.17.1", "license_class": "community", "timestamp_created": "2024-06-26T16:00:00Z" },
    { "version": "1.17.2+ent", "license_class": "enterprise", "timestamp_created": "2024-07-10T17:00:00Z" },
    { "version": "1.16.9+ent", "license_class": "enterprise", "timestamp_created": "2024-08-07T17:00:00Z" },
    { "version": "1.18.0-rc1+ent", "license_class": "enterprise", "timestamp_created": "2024-09-05T17:00:00Z" },
    { "version": "1.18.0+ent", "license_class": "enterprise", "timestamp_created": "2024-10-09T17:00:00Z" },
    { "version": "1.18.0", "license_class": "community", "timestamp_created": "2024-10-09T16:00:00Z" }
  ]
}"#;

/// A scratch checkout with an optional manifest and catalog snapshot
pub struct TestCheckout {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestCheckout {
  /// Create an empty checkout
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Write `.release/versions.hcl`
  pub fn with_manifest(self, content: &str) -> Result<Self> {
    std::fs::create_dir_all(self.path.join(".release"))?;
    std::fs::write(self.path.join(".release/versions.hcl"), content)?;
    Ok(self)
  }

  /// Write `catalog.json` and return its path
  pub fn write_catalog(&self) -> Result<PathBuf> {
    let path = self.path.join("catalog.json");
    std::fs::write(&path, CATALOG_SNAPSHOT)?;
    Ok(path)
  }

  /// Write a file relative to the checkout root
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  /// Create a nested directory and return it
  pub fn subdir(&self, path: &str) -> Result<PathBuf> {
    let dir = self.path.join(path);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }
}

/// Run the pipeline binary and return its output whatever the exit status
pub fn run_pipeline_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_pipeline"))
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run pipeline")
}

/// Run the pipeline binary, failing unless it exits successfully
pub fn run_pipeline(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_pipeline_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "pipeline command failed: pipeline {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Stdout as trimmed lines
pub fn stdout_lines(output: &Output) -> Vec<String> {
  String::from_utf8_lossy(&output.stdout)
    .lines()
    .map(|l| l.trim().to_string())
    .filter(|l| !l.is_empty())
    .collect()
}
