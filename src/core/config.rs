use crate::core::error::{PipelineError, PipelineResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Product whose releases the pipeline resolves
pub const DEFAULT_PRODUCT: &str = "vault";

/// Configuration for the release pipeline
/// Searched in order: pipeline.toml, .pipeline.toml, .release/pipeline.toml
///
/// Every section is optional; a missing file means all defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
  #[serde(default)]
  pub catalog: CatalogConfig,
  #[serde(default)]
  pub manifest: ManifestConfig,
  #[serde(default)]
  pub dynamic_config: DynamicConfigDefaults,
}

/// Release catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
  /// Product name passed to every catalog query (default: "vault")
  #[serde(default = "default_product")]
  pub product: String,

  /// JSON catalog snapshot used when no --catalog flag is given
  #[serde(default)]
  pub snapshot: Option<PathBuf>,

  /// Releases requested per catalog page (default: 20)
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

fn default_product() -> String {
  DEFAULT_PRODUCT.to_string()
}

fn default_page_size() -> usize {
  20
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      product: default_product(),
      snapshot: None,
      page_size: default_page_size(),
    }
  }
}

/// Active-versions manifest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
  /// How many ancestor directories to search for .release/versions.hcl (default: 3)
  #[serde(default = "default_search_depth")]
  pub search_depth: usize,
}

fn default_search_depth() -> usize {
  3
}

impl Default for ManifestConfig {
  fn default() -> Self {
    Self {
      search_depth: default_search_depth(),
    }
  }
}

/// Defaults for `generate enos-dynamic-config`, overridden by flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DynamicConfigDefaults {
  /// Minor versions back from the target to start upgrade testing from
  #[serde(default)]
  pub n_minus: u64,

  /// Versions never used as upgrade sources
  #[serde(default)]
  pub skip: Vec<String>,
}

impl PipelineConfig {
  /// Find config file in search order: pipeline.toml, .pipeline.toml, .release/pipeline.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("pipeline.toml"),
      path.join(".pipeline.toml"),
      path.join(".release").join("pipeline.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the first candidate file, or defaults if none exists
  pub fn load(path: &Path) -> PipelineResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };
    Self::load_file(&config_path)
  }

  /// Load config from an explicit file
  pub fn load_file(config_path: &Path) -> PipelineResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: PipelineConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Validate configuration values
  pub fn validate(&self) -> PipelineResult<()> {
    if self.catalog.product.trim().is_empty() {
      return Err(PipelineError::with_help(
        "catalog.product must not be empty",
        "Set [catalog] product = \"vault\" or remove the key to use the default",
      ));
    }

    if self.catalog.page_size == 0 {
      return Err(PipelineError::message("catalog.page_size must be greater than zero"));
    }

    for skip in &self.dynamic_config.skip {
      semver::Version::parse(skip).with_context(|| {
        format!(
          "Invalid version '{}' in dynamic_config.skip. Must be valid semver (e.g., '1.17.2')",
          skip
        )
      })?;
    }

    Ok(())
  }
}
