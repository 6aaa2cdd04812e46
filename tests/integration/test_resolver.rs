//! Integration tests for version range resolution

use crate::helpers::TestCheckout;
use anyhow::Result;
use release_pipeline::catalog::{PagedCatalog, ReleaseCatalog, SnapshotSource, StaticCatalog};
use release_pipeline::core::context::RunContext;
use release_pipeline::core::error::ErrorKind;
use release_pipeline::release::{LicenseClass, Version, VersionRangeRequest, VersionResolver};
use std::sync::Arc;

const S1_CATALOG: &[&str] = &[
  "1.16.6+ent",
  "1.16.7+ent",
  "1.16.8+ent",
  "1.16.9+ent",
  "1.16.10+ent",
  "1.17.2+ent",
  "1.17.3+ent",
  "1.17.3+ent.hsm",
  "1.17.4+ent",
  "1.17.5+ent",
  "1.17.6+ent",
  "1.18.0-rc1+ent",
];

const S1_EXPECTED: &[&str] = &[
  "1.16.6",
  "1.16.7",
  "1.16.8",
  "1.16.9",
  "1.16.10",
  "1.17.2",
  "1.17.3",
  "1.17.4",
  "1.17.5",
  "1.17.6",
  "1.18.0-rc1",
];

fn catalog() -> Arc<dyn ReleaseCatalog> {
  Arc::new(StaticCatalog::new(S1_CATALOG.iter().copied()))
}

fn request(lower: Option<&str>, n_minus: u64, skip: &[&str]) -> VersionRangeRequest {
  VersionRangeRequest {
    upper_bound: "1.18.0".to_string(),
    lower_bound: lower.map(str::to_string),
    n_minus,
    license_class: "enterprise".to_string(),
    skip: skip.iter().map(|s| s.to_string()).collect(),
    catalog: Some(catalog()),
  }
}

fn resolve(request: &VersionRangeRequest) -> Result<Vec<String>> {
  Ok(VersionResolver::default().resolve(&RunContext::new(), request)?.versions)
}

#[test]
fn test_explicit_floor_returns_whole_range() -> Result<()> {
  assert_eq!(resolve(&request(Some("1.15.0"), 0, &[]))?, S1_EXPECTED);
  Ok(())
}

#[test]
fn test_n_minus_two_matches_explicit_floor() -> Result<()> {
  assert_eq!(resolve(&request(None, 2, &[]))?, S1_EXPECTED);
  Ok(())
}

#[test]
fn test_n_minus_one_narrows_to_previous_minor() -> Result<()> {
  assert_eq!(
    resolve(&request(None, 1, &[]))?,
    vec!["1.17.2", "1.17.3", "1.17.4", "1.17.5", "1.17.6", "1.18.0-rc1"]
  );
  Ok(())
}

#[test]
fn test_skip_list_removes_versions() -> Result<()> {
  let expected: Vec<_> = S1_EXPECTED
    .iter()
    .filter(|v| !["1.17.2", "1.17.5"].contains(v))
    .copied()
    .collect();
  assert_eq!(resolve(&request(Some("1.15.0"), 0, &["1.17.2", "1.17.5"]))?, expected);
  Ok(())
}

#[test]
fn test_floor_and_n_minus_together_rejected() {
  let err = VersionResolver::default()
    .resolve(&RunContext::new(), &request(Some("1.15.0"), 2, &[]))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_result_properties_hold_across_requests() -> Result<()> {
  let requests = [
    request(Some("1.15.0"), 0, &[]),
    request(Some("1.17.3"), 0, &["1.17.4+ent"]),
    request(None, 1, &["1.18.0-rc1"]),
    request(None, 2, &["1.16.10", "1.17.3+ent.hsm"]),
  ];

  for req in &requests {
    let versions = resolve(req)?;
    let parsed: Vec<Version> = versions.iter().map(|v| Version::parse(v)).collect::<Result<_, _>>()?;
    let ceiling = Version::parse(&req.upper_bound)?;
    let floor = match &req.lower_bound {
      Some(lower) => Version::parse(lower)?,
      None => Version::new(ceiling.major(), ceiling.minor() - req.n_minus, 0),
    };

    assert!(parsed.windows(2).all(|w| w[0] < w[1]), "not strictly ascending: {:?}", versions);
    assert!(parsed.iter().all(|v| v.within(&floor, &ceiling)), "out of range: {:?}", versions);
    assert!(parsed.iter().all(|v| !v.has_metadata()), "metadata kept: {:?}", versions);
    for skipped in &req.skip {
      let skipped = Version::parse(skipped)?;
      assert!(!parsed.contains(&skipped), "{} not skipped", skipped);
    }
  }
  Ok(())
}

#[test]
fn test_paged_snapshot_sees_late_backport() -> Result<()> {
  let checkout = TestCheckout::new()?;
  let source = SnapshotSource::load(&checkout.write_catalog()?)?;
  let paged: Arc<dyn ReleaseCatalog> = Arc::new(PagedCatalog::new(source, 2));

  let versions = resolve(&VersionRangeRequest {
    upper_bound: "1.17.2".to_string(),
    lower_bound: Some("1.16.0".to_string()),
    license_class: "ent.hsm".to_string(),
    catalog: Some(paged),
    ..Default::default()
  })?;

  assert_eq!(versions, vec!["1.16.0", "1.16.1", "1.16.9", "1.17.0", "1.17.1", "1.17.2"]);
  Ok(())
}

const BATCH_SNAPSHOT: &str = r#"{
  "product": "vault",
  "releases": [
    { "version": "1.16.0+ent", "license_class": "enterprise", "timestamp_created": "2024-03-01T12:00:00Z" },
    { "version": "1.16.0+ent.hsm", "license_class": "enterprise", "timestamp_created": "2024-03-01T12:00:00Z" },
    { "version": "1.16.0+ent.fips1402", "license_class": "enterprise", "timestamp_created": "2024-03-01T12:00:00Z" },
    { "version": "1.17.0+ent", "license_class": "enterprise", "timestamp_created": "2024-06-01T12:00:00Z" },
    { "version": "1.17.0+ent.hsm", "license_class": "enterprise", "timestamp_created": "2024-06-01T12:00:00Z" },
    { "version": "1.17.0+ent.fips1402", "license_class": "enterprise", "timestamp_created": "2024-06-01T12:00:00Z" },
    { "version": "1.17.1+ent", "license_class": "enterprise", "timestamp_created": "2024-07-01T12:00:00Z" },
    { "version": "1.17.1+ent.hsm", "license_class": "enterprise", "timestamp_created": "2024-07-01T12:00:00Z" },
    { "version": "1.17.1+ent.fips1402", "license_class": "enterprise", "timestamp_created": "2024-07-01T12:00:00Z" }
  ]
}"#;

#[test]
fn test_paged_snapshot_keeps_same_time_edition_variants() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_file("batch.json", BATCH_SNAPSHOT)?;
  let source = SnapshotSource::load(&checkout.path.join("batch.json"))?;

  for page_size in 1..=4 {
    let paged = PagedCatalog::new(source.clone(), page_size);
    let listed = paged.list_releases(
      &RunContext::new(),
      "vault",
      LicenseClass::Enterprise,
      &Version::parse("1.18.0")?,
      &Version::parse("1.16.0")?,
    )?;
    assert_eq!(listed.len(), 9, "page size {}: {:?}", page_size, listed);

    let versions = resolve(&VersionRangeRequest {
      upper_bound: "1.18.0".to_string(),
      lower_bound: Some("1.16.0".to_string()),
      license_class: "ent.fips1402".to_string(),
      catalog: Some(Arc::new(paged)),
      ..Default::default()
    })?;
    assert_eq!(versions, vec!["1.16.0", "1.17.0", "1.17.1"], "page size {}", page_size);
  }
  Ok(())
}

#[test]
fn test_paged_snapshot_missing_floor() -> Result<()> {
  let checkout = TestCheckout::new()?;
  let source = SnapshotSource::load(&checkout.write_catalog()?)?;

  let err = VersionResolver::default()
    .resolve(
      &RunContext::new(),
      &VersionRangeRequest {
        upper_bound: "1.18.0".to_string(),
        lower_bound: Some("1.16.5".to_string()),
        license_class: "enterprise".to_string(),
        catalog: Some(Arc::new(PagedCatalog::new(source, 5))),
        ..Default::default()
      },
    )
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::FloorNotFound);
  Ok(())
}

#[test]
fn test_cancelled_before_start() {
  let ctx = RunContext::new();
  ctx.cancel();
  let err = VersionResolver::default()
    .resolve(&ctx, &request(Some("1.15.0"), 0, &[]))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Cancelled);
}
