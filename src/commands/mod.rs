//! CLI commands for cargo-impact
//!
//! - **affected**: Find crates affected by changes
//! - **plan**: Impacted vs. skipped crates, with skipped crates' override arguments
//! - **run**: Run a cargo subcommand for impacted crates only
//! - **config**: Print the effective configuration
//!
//! All commands accept `&WorkspaceContext` to avoid redundant workspace loads.

pub mod affected;
pub mod config;
pub mod plan;
pub mod run;

pub use affected::run_affected;
pub use config::run_config;
pub use plan::run_plan;
pub use run::run_cargo;

use crate::core::error::{ImpactError, ImpactResult};

/// Output format for report commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
  Text,
  Json,
  NamesOnly,
}

impl OutputFormat {
  fn from_str(s: &str) -> ImpactResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(ImpactError::message(format!(
        "Unknown format '{}'. Valid formats: text, json, names-only",
        s
      ))),
    }
  }
}
