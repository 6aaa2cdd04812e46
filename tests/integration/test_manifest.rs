//! Integration tests for reading and retaining the active-versions manifest

use crate::helpers::TestCheckout;
use anyhow::Result;
use release_pipeline::core::context::RunContext;
use release_pipeline::core::error::ErrorKind;
use release_pipeline::manifest::{
  ActiveVersionsManifest, BranchLabel, ManifestReader, RetentionInput, apply_retention, write_manifest,
};

pub const S6_MANIFEST: &str = r#"schema = 1

active_versions {
  version "1.19.x" {
    ce_active = true
    lts       = true
  }
  version "1.18.x" {
    ce_active = true
  }
  version "1.17.x" {}
  version "1.16.x" {
    lts = true
  }
}
"#;

pub const S6_RETAINED: &str = r#"schema = 1

active_versions {
  version "1.19.x" {
    ce_active = true
    lts       = true
  }
  version "1.18.x" {}
  version "1.17.x" {}
  version "1.16.x" {
    lts = true
  }
}
"#;

fn inputs(raw: &[&str]) -> Result<Vec<RetentionInput>> {
  Ok(raw.iter().map(|s| RetentionInput::parse(s)).collect::<Result<_, _>>()?)
}

#[test]
fn test_lts_branch_retained_past_window() -> Result<()> {
  let manifest = ActiveVersionsManifest::parse(S6_MANIFEST, None)?;
  let retained = apply_retention(&manifest, &inputs(&["1.19.x"])?);
  assert_eq!(retained.to_hcl(), S6_RETAINED);
  Ok(())
}

#[test]
fn test_retention_is_idempotent_and_exempts_only_lts() -> Result<()> {
  let manifest = ActiveVersionsManifest::parse(S6_MANIFEST, None)?;
  for raw in [&["1.19.x"][..], &["1.20.x-ce"][..], &["1.21.x-ce", "1.20.x-lts"][..]] {
    let input = inputs(raw)?;
    let once = apply_retention(&manifest, &input);
    let twice = apply_retention(&once, &input);
    assert_eq!(once.to_hcl(), twice.to_hcl(), "inputs {:?}", raw);

    let latest = input.iter().map(|i| i.label).max().unwrap();
    let window: Vec<BranchLabel> = once.branches.range(..=latest).rev().take(3).map(|(l, _)| *l).collect();
    for (label, branch) in &once.branches {
      if *label < latest && !window.contains(label) {
        assert!(branch.lts, "{} kept without lts for inputs {:?}", label, raw);
      }
    }
  }
  Ok(())
}

#[test]
fn test_round_trip_through_disk() -> Result<()> {
  let checkout = TestCheckout::new()?.with_manifest(S6_MANIFEST)?;
  let ctx = RunContext::new();
  let reader = ManifestReader::new(checkout.subdir("tools/ci")?, 2);

  let (path, manifest) = reader.read(&ctx, None)?;
  write_manifest(&ctx, &path, &manifest)?;
  assert_eq!(checkout.read_file(".release/versions.hcl")?, S6_MANIFEST);
  Ok(())
}

#[test]
fn test_search_depth_bounds_lookup() -> Result<()> {
  let checkout = TestCheckout::new()?.with_manifest(S6_MANIFEST)?;
  let deep = checkout.subdir("a/b/c/d")?;

  let err = ManifestReader::new(&deep, 3).read(&RunContext::new(), None).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::ManifestNotFound);
  assert!(ManifestReader::new(&deep, 4).read(&RunContext::new(), None).is_ok());
  Ok(())
}

#[test]
fn test_syntax_errors_reported_together() -> Result<()> {
  let checkout = TestCheckout::new()?.with_manifest("schema = \nactive_versions {\n  version \"1.19.x\" {\n    lts = \n  }\n}\n")?;
  let err = ManifestReader::new(&checkout.path, 0)
    .read(&RunContext::new(), None)
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Parse);
  let rendered = err.to_string();
  assert!(rendered.contains("1:"), "{}", rendered);
  assert!(rendered.contains("4:"), "{}", rendered);
  Ok(())
}

#[test]
fn test_cancelled_write_leaves_file_untouched() -> Result<()> {
  let checkout = TestCheckout::new()?.with_manifest(S6_MANIFEST)?;
  let ctx = RunContext::new();
  let (path, manifest) = ManifestReader::new(&checkout.path, 0).read(&ctx, None)?;

  ctx.cancel();
  let retained = apply_retention(&manifest, &inputs(&["1.20.x-ce"])?);
  let err = write_manifest(&ctx, &path, &retained).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Cancelled);
  assert_eq!(checkout.read_file(".release/versions.hcl")?, S6_MANIFEST);
  Ok(())
}
