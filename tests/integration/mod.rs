//! Integration tests for the release pipeline library and `pipeline` binary

mod helpers;
mod test_cli;
mod test_emit;
mod test_manifest;
mod test_resolver;
