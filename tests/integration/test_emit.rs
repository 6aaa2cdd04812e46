//! Integration tests for the enos dynamic config emitter

use crate::helpers::TestCheckout;
use anyhow::Result;
use release_pipeline::catalog::{PagedCatalog, SnapshotSource};
use release_pipeline::core::context::RunContext;
use release_pipeline::core::error::ErrorKind;
use release_pipeline::enos::{DEFAULT_FILE_NAME, DynamicConfigEmitter, EmitRequest, PREAMBLE};
use release_pipeline::hcl;
use std::sync::Arc;

fn request(checkout: &TestCheckout) -> Result<EmitRequest> {
  let source = SnapshotSource::load(&checkout.write_catalog()?)?;
  Ok(EmitRequest {
    dir: checkout.path.clone(),
    file: DEFAULT_FILE_NAME.to_string(),
    version: "1.18.0".to_string(),
    edition: "ent.hsm.fips1402".to_string(),
    n_minus: 1,
    skip: vec!["1.17.1".to_string()],
    catalog: Some(Arc::new(PagedCatalog::new(source, 3))),
  })
}

#[test]
fn test_emitted_file_layout() -> Result<()> {
  let checkout = TestCheckout::new()?;
  let result = DynamicConfigEmitter::default().emit(&RunContext::new(), &request(&checkout)?)?;

  let written = checkout.read_file(DEFAULT_FILE_NAME)?;
  assert_eq!(&written.as_bytes()[..PREAMBLE.len()], PREAMBLE.as_bytes());
  assert_eq!(&written[PREAMBLE.len()..], format!("\n{}", result.hcl));
  assert_eq!(
    result.record.globals.sample_attributes.upgrade_initial_version,
    vec!["1.17.0", "1.17.2", "1.18.0-rc1", "1.18.0"]
  );
  assert!(written.contains("    upgrade_initial_version = [\"1.17.0\", \"1.17.2\", \"1.18.0-rc1\", \"1.18.0\"]\n"));
  Ok(())
}

#[test]
fn test_emitted_record_parses_back() -> Result<()> {
  let checkout = TestCheckout::new()?;
  let result = DynamicConfigEmitter::default().emit(&RunContext::new(), &request(&checkout)?)?;

  let body = hcl::parse(&checkout.read_file(DEFAULT_FILE_NAME)?).map_err(|d| anyhow::anyhow!("{:?}", d))?;
  assert_eq!(hcl::to_string(&body), result.hcl);
  Ok(())
}

#[test]
fn test_cancellation_leaves_existing_file() -> Result<()> {
  let checkout = TestCheckout::new()?;
  checkout.write_file(DEFAULT_FILE_NAME, "# previous run\n")?;
  let req = request(&checkout)?;

  let ctx = RunContext::new();
  ctx.cancel();
  let err = DynamicConfigEmitter::default().emit(&ctx, &req).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Cancelled);
  assert_eq!(checkout.read_file(DEFAULT_FILE_NAME)?, "# previous run\n");
  Ok(())
}

#[test]
fn test_unknown_edition_writes_nothing() -> Result<()> {
  let checkout = TestCheckout::new()?;
  let req = EmitRequest {
    edition: "hosted".to_string(),
    ..request(&checkout)?
  };
  let err = DynamicConfigEmitter::default().emit(&RunContext::new(), &req).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(!checkout.file_exists(DEFAULT_FILE_NAME));
  Ok(())
}
