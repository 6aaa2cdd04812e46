//! Error types for the release pipeline with contextual messages and exit codes
//!
//! Every failure the pipeline can produce maps onto one [`ErrorKind`]. Callers
//! branch on the kind (via [`PipelineError::kind`]) and never on the rendered
//! message, so wrapping an error with context never changes how it is handled.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for the pipeline binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (invalid flags, bad versions, missing manifest)
  User = 1,
  /// System error (catalog, I/O)
  System = 2,
  /// Validation failure (request inputs rejected)
  Validation = 3,
  /// Cancelled before completion
  Cancelled = 130,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Coarse classification of a [`PipelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  InvalidVersion,
  ManifestNotFound,
  Parse,
  UnknownAttribute,
  FloorNotFound,
  Catalog,
  Io,
  Cancelled,
  Other,
}

/// Main error type for the pipeline
#[derive(Debug)]
pub enum PipelineError {
  /// Malformed or inconsistent request inputs
  Validation(ValidationError),

  /// A version string did not parse
  InvalidVersion { input: String, reason: String },

  /// Versions manifest lookup or decoding failures
  Manifest(ManifestError),

  /// Release catalog failures
  Catalog(CatalogError),

  /// I/O errors
  Io(io::Error),

  /// Cancellation signal fired (or the deadline passed)
  Cancelled,

  /// An error wrapped with a short context prefix
  Context {
    context: String,
    source: Box<PipelineError>,
  },

  /// Generic error with message and optional help
  Message { message: String, help: Option<String> },
}

impl PipelineError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    PipelineError::Message {
      message: msg.into(),
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    PipelineError::Message {
      message: msg.into(),
      help: Some(help.into()),
    }
  }

  /// Create a validation error
  pub fn validation(reason: impl Into<String>) -> Self {
    PipelineError::Validation(ValidationError::Invalid { reason: reason.into() })
  }

  /// Create an invalid version error
  pub fn invalid_version(input: impl Into<String>, reason: impl fmt::Display) -> Self {
    PipelineError::InvalidVersion {
      input: input.into(),
      reason: reason.to_string(),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    PipelineError::Context {
      context: ctx.into(),
      source: Box::new(self),
    }
  }

  /// The innermost error, with all context wrappers removed
  pub fn root(&self) -> &PipelineError {
    match self {
      PipelineError::Context { source, .. } => source.root(),
      other => other,
    }
  }

  /// Classify this error
  pub fn kind(&self) -> ErrorKind {
    match self.root() {
      PipelineError::Validation(_) => ErrorKind::Validation,
      PipelineError::InvalidVersion { .. } => ErrorKind::InvalidVersion,
      PipelineError::Manifest(ManifestError::NotFound { .. }) => ErrorKind::ManifestNotFound,
      PipelineError::Manifest(ManifestError::Parse { .. }) => ErrorKind::Parse,
      PipelineError::Manifest(ManifestError::UnknownAttribute { .. }) => ErrorKind::UnknownAttribute,
      PipelineError::Catalog(CatalogError::FloorNotFound { .. }) => ErrorKind::FloorNotFound,
      PipelineError::Catalog(_) => ErrorKind::Catalog,
      PipelineError::Io(_) => ErrorKind::Io,
      PipelineError::Cancelled => ErrorKind::Cancelled,
      PipelineError::Context { .. } | PipelineError::Message { .. } => ErrorKind::Other,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self.kind() {
      ErrorKind::Validation => ExitCode::Validation,
      ErrorKind::Catalog | ErrorKind::FloorNotFound | ErrorKind::Io => ExitCode::System,
      ErrorKind::Cancelled => ExitCode::Cancelled,
      _ => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self.root() {
      PipelineError::Validation(e) => e.help_message(),
      PipelineError::Manifest(e) => e.help_message(),
      PipelineError::Catalog(e) => e.help_message(),
      PipelineError::InvalidVersion { .. } => {
        Some("Versions must look like MAJOR.MINOR.PATCH[-PRE][+BUILD], e.g. 1.18.0-rc1+ent".to_string())
      }
      PipelineError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for PipelineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PipelineError::Validation(e) => write!(f, "{}", e),
      PipelineError::InvalidVersion { input, reason } => {
        write!(f, "Invalid version '{}': {}", input, reason)
      }
      PipelineError::Manifest(e) => write!(f, "{}", e),
      PipelineError::Catalog(e) => write!(f, "{}", e),
      PipelineError::Io(e) => write!(f, "I/O error: {}", e),
      PipelineError::Cancelled => write!(f, "Operation cancelled"),
      PipelineError::Context { context, source } => write!(f, "{}: {}", context, source),
      PipelineError::Message { message, .. } => write!(f, "{}", message),
    }
  }
}

impl std::error::Error for PipelineError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      PipelineError::Io(e) => Some(e),
      PipelineError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for PipelineError {
  fn from(err: io::Error) -> Self {
    PipelineError::Io(err)
  }
}

impl From<String> for PipelineError {
  fn from(msg: String) -> Self {
    PipelineError::message(msg)
  }
}

impl From<&str> for PipelineError {
  fn from(msg: &str) -> Self {
    PipelineError::message(msg)
  }
}

impl From<toml_edit::de::Error> for PipelineError {
  fn from(err: toml_edit::de::Error) -> Self {
    PipelineError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for PipelineError {
  fn from(err: serde_json::Error) -> Self {
    PipelineError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for PipelineError {
  fn from(err: semver::Error) -> Self {
    PipelineError::message(format!("Semver error: {}", err))
  }
}

impl From<chrono::ParseError> for PipelineError {
  fn from(err: chrono::ParseError) -> Self {
    PipelineError::message(format!("Timestamp parse error: {}", err))
  }
}

/// Request validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Generic rejected input
  Invalid { reason: String },

  /// Both or neither of lower bound / N-minus supplied
  RangePolicy { reason: String },

  /// Edition or license class outside the recognized set
  UnknownEdition { edition: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::RangePolicy { .. } => {
        Some("Pass exactly one of --lower or --n-minus (N-minus must be greater than zero).".to_string())
      }
      ValidationError::UnknownEdition { .. } => Some(format!(
        "Recognized editions: {}",
        crate::release::license::EDITIONS.join(", ")
      )),
      ValidationError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::Invalid { reason } => write!(f, "Validation failed: {}", reason),
      ValidationError::RangePolicy { reason } => write!(f, "Invalid version range policy: {}", reason),
      ValidationError::UnknownEdition { edition } => write!(f, "Unknown edition or license class '{}'", edition),
    }
  }
}

/// A single positioned diagnostic produced while parsing a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub line: usize,
  pub column: usize,
  pub message: String,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}: {}", self.line, self.column, self.message)
  }
}

/// Versions manifest errors
#[derive(Debug)]
pub enum ManifestError {
  /// No `.release/versions.hcl` found by the upward search
  NotFound { start: PathBuf, depth: usize },

  /// Syntax or schema errors, reported together
  Parse {
    path: Option<PathBuf>,
    diagnostics: Vec<Diagnostic>,
  },

  /// Attribute not part of the `version` block schema
  UnknownAttribute {
    attribute: String,
    label: String,
    line: usize,
  },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::NotFound { .. } => {
        Some("Pass --path explicitly or run from inside a checkout that has .release/versions.hcl".to_string())
      }
      ManifestError::UnknownAttribute { .. } => Some("version blocks only accept `ce_active` and `lts`".to_string()),
      ManifestError::Parse { .. } => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::NotFound { start, depth } => write!(
        f,
        "No .release/versions.hcl found searching {} levels up from {}",
        depth,
        start.display()
      ),
      ManifestError::Parse { path, diagnostics } => {
        match path {
          Some(p) => write!(f, "Failed to parse {}", p.display())?,
          None => write!(f, "Failed to parse versions manifest")?,
        }
        for d in diagnostics {
          write!(f, "\n  {}", d)?;
        }
        Ok(())
      }
      ManifestError::UnknownAttribute { attribute, label, line } => write!(
        f,
        "Unknown attribute '{}' in version \"{}\" (line {})",
        attribute, label, line
      ),
    }
  }
}

/// Release catalog errors
#[derive(Debug)]
pub enum CatalogError {
  /// The floor version has never been released
  FloorNotFound { version: String },

  /// Transport, authentication or server failure
  Upstream { message: String },
}

impl CatalogError {
  fn help_message(&self) -> Option<String> {
    match self {
      CatalogError::FloorNotFound { .. } => {
        Some("Use a lower bound that has actually been released, or switch to --n-minus.".to_string())
      }
      CatalogError::Upstream { .. } => Some("The catalog call may be retried.".to_string()),
    }
  }
}

impl fmt::Display for CatalogError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CatalogError::FloorNotFound { version } => {
        write!(f, "Floor version {} was not found in the release catalog", version)
      }
      CatalogError::Upstream { message } => write!(f, "Release catalog error: {}", message),
    }
  }
}

/// Result type alias for the pipeline
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> PipelineResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> PipelineResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<PipelineError>,
{
  fn context(self, ctx: impl Into<String>) -> PipelineResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> PipelineResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &PipelineError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
