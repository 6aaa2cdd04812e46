//! Integration tests for the `pipeline` binary

use crate::helpers::{TestCheckout, run_pipeline, run_pipeline_raw, stdout_lines};
use crate::test_manifest::{S6_MANIFEST, S6_RETAINED};
use anyhow::Result;
use release_pipeline::enos::{DEFAULT_FILE_NAME, PREAMBLE};

#[test]
fn test_list_versions_n_minus_with_skip() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_catalog()?;

  let output = run_pipeline(
    &checkout.path,
    &[
      "releases",
      "list-versions",
      "--upper",
      "1.18.0",
      "--n-minus",
      "2",
      "--license-class",
      "enterprise",
      "--skip",
      "1.16.9+ent",
      "--catalog",
      "catalog.json",
    ],
  )?;

  assert_eq!(
    stdout_lines(&output),
    vec!["1.16.0", "1.16.1", "1.17.0", "1.17.1", "1.17.2", "1.18.0-rc1", "1.18.0"]
  );
  Ok(())
}

#[test]
fn test_list_versions_json_for_community() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_catalog()?;

  let output = run_pipeline(
    &checkout.path,
    &[
      "releases",
      "list-versions",
      "-u",
      "1.18.0",
      "-n",
      "1",
      "-c",
      "ce",
      "--catalog",
      "catalog.json",
      "--json",
    ],
  )?;

  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(json["versions"], serde_json::json!(["1.17.0", "1.17.1", "1.18.0"]));
  Ok(())
}

#[test]
fn test_list_versions_rejects_both_policies() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_catalog()?;

  let output = run_pipeline_raw(
    &checkout.path,
    &[
      "releases",
      "list-versions",
      "--upper",
      "1.18.0",
      "--lower",
      "1.16.0",
      "--n-minus",
      "1",
      "--license-class",
      "enterprise",
      "--catalog",
      "catalog.json",
    ],
  )?;

  assert_eq!(output.status.code(), Some(3));
  assert!(output.stdout.is_empty());
  Ok(())
}

#[test]
fn test_list_versions_unreleased_floor() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_catalog()?;

  let output = run_pipeline_raw(
    &checkout.path,
    &[
      "releases",
      "list-versions",
      "--upper",
      "1.18.0",
      "--lower",
      "1.16.5",
      "--license-class",
      "enterprise",
      "--catalog",
      "catalog.json",
    ],
  )?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("1.16.5"));
  Ok(())
}

#[test]
fn test_list_versions_without_catalog() -> Result<()> {
  let checkout = TestCheckout::new()?;
  let output = run_pipeline_raw(
    &checkout.path,
    &["releases", "list-versions", "--upper", "1.18.0", "--n-minus", "1", "--license-class", "ent"],
  )?;
  assert_eq!(output.status.code(), Some(3));
  Ok(())
}

#[test]
fn test_generate_uses_config_defaults() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_catalog()?;
  checkout.write_file(
    "pipeline.toml",
    "[catalog]\nsnapshot = \"catalog.json\"\npage_size = 4\n\n[dynamic_config]\nn_minus = 1\nskip = [\"1.18.0-rc1\"]\n",
  )?;
  let out_dir = checkout.subdir("enos")?;

  run_pipeline(
    &checkout.path,
    &[
      "generate",
      "enos-dynamic-config",
      "--dir",
      out_dir.to_str().unwrap(),
      "--version",
      "1.18.0",
      "--edition",
      "ent.hsm",
    ],
  )?;

  let written = checkout.read_file(&format!("enos/{}", DEFAULT_FILE_NAME))?;
  assert!(written.starts_with(PREAMBLE));
  assert!(written.contains("upgrade_initial_version = [\"1.17.0\", \"1.17.1\", \"1.17.2\", \"1.18.0\"]"));
  assert!(written.contains("aws_region              = [\"us-east-1\", \"us-west-2\"]"));
  Ok(())
}

#[test]
fn test_generate_expired_deadline_writes_nothing() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_catalog()?;

  let output = run_pipeline_raw(
    &checkout.path,
    &[
      "--timeout",
      "0",
      "generate",
      "enos-dynamic-config",
      "--version",
      "1.18.0",
      "--edition",
      "ent",
      "--n-minus",
      "1",
      "--catalog",
      "catalog.json",
    ],
  )?;

  assert_eq!(output.status.code(), Some(130));
  assert!(!checkout.file_exists(DEFAULT_FILE_NAME));
  Ok(())
}

#[test]
fn test_list_active_versions_searches_upward() -> Result<()> {
  let checkout = TestCheckout::new()?.with_manifest(S6_MANIFEST)?;
  let nested = checkout.subdir("tools/ci")?;

  let output = run_pipeline(&nested, &["releases", "list-active-versions", "--json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(
    json,
    serde_json::json!([
      { "version": "1.19.x", "ce_active": true, "lts": true },
      { "version": "1.18.x", "ce_active": true, "lts": false },
      { "version": "1.17.x", "ce_active": false, "lts": false },
      { "version": "1.16.x", "ce_active": false, "lts": true }
    ])
  );
  Ok(())
}

#[test]
fn test_list_active_versions_without_manifest() -> Result<()> {
  let checkout = TestCheckout::new()?;
  let output = run_pipeline_raw(&checkout.path, &["releases", "list-active-versions"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Help:"));
  Ok(())
}

#[test]
fn test_update_active_versions_dry_run_then_write() -> Result<()> {
  let checkout = TestCheckout::new()?.with_manifest(S6_MANIFEST)?;

  let preview = run_pipeline(&checkout.path, &["releases", "update-active-versions", "1.19.x"])?;
  assert_eq!(String::from_utf8_lossy(&preview.stdout), S6_RETAINED);
  assert_eq!(checkout.read_file(".release/versions.hcl")?, S6_MANIFEST);

  run_pipeline(&checkout.path, &["releases", "update-active-versions", "1.19.x", "--write"])?;
  assert_eq!(checkout.read_file(".release/versions.hcl")?, S6_RETAINED);
  Ok(())
}

#[test]
fn test_update_active_versions_explicit_path() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_file("manifests/versions.hcl", S6_MANIFEST)?;

  run_pipeline(
    &checkout.path,
    &[
      "releases",
      "update-active-versions",
      "1.20.x-ce",
      "--path",
      "manifests/versions.hcl",
      "--write",
    ],
  )?;

  let updated = checkout.read_file("manifests/versions.hcl")?;
  assert!(updated.contains("version \"1.20.x\" {\n    ce_active = true\n  }"));
  assert!(!updated.contains("1.17.x"));
  assert!(updated.contains("version \"1.16.x\" {\n    lts = true\n  }"));
  Ok(())
}
