//! Error types for cargo-impact with contextual messages and exit codes
//!
//! Configuration problems are fatal and reported before any git or graph work.
//! Everything the resolver can absorb (files outside any crate, edges to
//! non-members, empty change sets) never becomes an error.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for cargo-impact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, bad patterns)
  User = 1,
  /// System error (git, cargo metadata, I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for cargo-impact
#[derive(Debug)]
pub enum ImpactError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ImpactError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ImpactError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ImpactError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ImpactError::Message { message, context, help } => ImpactError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ImpactError::Config(_) => ExitCode::User,
      ImpactError::Git(_) => ExitCode::System,
      ImpactError::Io(_) => ExitCode::System,
      ImpactError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ImpactError::Config(e) => e.help_message(),
      ImpactError::Git(e) => e.help_message(),
      ImpactError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ImpactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ImpactError::Config(e) => write!(f, "{}", e),
      ImpactError::Git(e) => write!(f, "{}", e),
      ImpactError::Io(e) => write!(f, "I/O error: {}", e),
      ImpactError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ImpactError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ImpactError::Io(e) => Some(e),
      ImpactError::Config(e) => e.source(),
      _ => None,
    }
  }
}

impl From<ConfigError> for ImpactError {
  fn from(err: ConfigError) -> Self {
    ImpactError::Config(err)
  }
}

impl From<GitError> for ImpactError {
  fn from(err: GitError) -> Self {
    ImpactError::Git(err)
  }
}

impl From<io::Error> for ImpactError {
  fn from(err: io::Error) -> Self {
    ImpactError::Io(err)
  }
}

impl From<String> for ImpactError {
  fn from(msg: String) -> Self {
    ImpactError::message(msg)
  }
}

impl From<&str> for ImpactError {
  fn from(msg: &str) -> Self {
    ImpactError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ImpactError {
  fn from(err: toml_edit::de::Error) -> Self {
    ImpactError::with_help(
      format!("Invalid impact.toml: {}", err),
      "Keys are property names without the `impact.` prefix. Run `cargo impact config` to list them.",
    )
  }
}

impl From<toml_edit::TomlError> for ImpactError {
  fn from(err: toml_edit::TomlError) -> Self {
    ImpactError::message(format!("TOML parse error: {}", err))
  }
}

impl From<cargo_metadata::Error> for ImpactError {
  fn from(err: cargo_metadata::Error) -> Self {
    ImpactError::with_help(
      format!("Cargo metadata error: {}", err),
      "Run cargo-impact from inside a Cargo workspace (a directory containing Cargo.toml).",
    )
  }
}

impl From<serde_json::Error> for ImpactError {
  fn from(err: serde_json::Error) -> Self {
    ImpactError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ImpactError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ImpactError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
///
/// Every variant names the fully-qualified property (`impact.<key>`) it concerns.
#[derive(Debug)]
pub enum ConfigError {
  /// Property name not recognized
  UnknownProperty { name: String, valid: Vec<String> },

  /// Regex pattern failed to compile
  InvalidPattern {
    property: String,
    pattern: String,
    source: regex::Error,
  },

  /// Value could not be interpreted for the property's type
  InvalidValue {
    property: String,
    value: String,
    reason: String,
  },

  /// Two workspace members share a package name
  DuplicateModule { id: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::UnknownProperty { .. } => {
        Some("Check the spelling in impact.toml or in the -D overrides. Run `cargo impact config` to list the effective properties.".to_string())
      }
      ConfigError::InvalidPattern { .. } => {
        Some("Patterns are full-match regular expressions over crate names, e.g. `.*-tests`.".to_string())
      }
      _ => None,
    }
  }

  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ConfigError::InvalidPattern { source, .. } => Some(source),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::UnknownProperty { name, valid } => {
        write!(f, "Unknown property '{}'. Valid properties: {}", name, valid.join(", "))
      }
      ConfigError::InvalidPattern {
        property,
        pattern,
        source,
      } => {
        write!(f, "Invalid pattern '{}' in {}: {}", pattern, property, source)
      }
      ConfigError::InvalidValue {
        property,
        value,
        reason,
      } => {
        write!(f, "Invalid value '{}' for {}: {}", value, property, reason)
      }
      ConfigError::DuplicateModule { id } => {
        write!(f, "Module '{}' is declared more than once in the project graph", id)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run inside a git work tree, or set impact.fail_on_missing_git_dir=false to build everything: {}",
        path.display()
      )),
      GitError::CommandFailed { stderr, .. } => {
        if stderr.contains("unknown revision") || stderr.contains("bad revision") {
          Some("Fetch the reference branch first or set impact.fetch_reference_branch=true.".to_string())
        } else {
          None
        }
      }
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Result type alias for cargo-impact
pub type ImpactResult<T> = Result<T, ImpactError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ImpactResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ImpactResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ImpactError>,
{
  fn context(self, ctx: impl Into<String>) -> ImpactResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ImpactResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with help text
pub fn print_error(error: &ImpactError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
