//! Unified workspace context - build once, pass everywhere
//!
//! ```text
//! main.rs:
//!   WorkspaceContext::build() -> &WorkspaceContext
//!   |
//!   v
//! commands/affected.rs, plan.rs, run.rs:
//!   fn run_*(ctx: &WorkspaceContext, ...)
//! ```
//!
//! Configuration is validated before the workspace is inspected, so a bad
//! property fails without running `cargo metadata` or `git`.

use crate::cargo::{CargoWorkspace, find_workspace_root};
use crate::core::config::ImpactConfig;
use crate::core::error::ImpactResult;
use crate::graph::{ProjectGraph, ProjectGraphProvider};
use crate::utils::canonical_or_normalized;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Shared workspace-level data for one invocation.
#[derive(Clone)]
pub struct WorkspaceContext {
  /// Workspace root directory (absolute path)
  pub root: PathBuf,

  /// Project graph (built from cargo metadata)
  pub graph: Arc<ProjectGraph>,

  /// Layered impact configuration (impact.toml + `-D` overrides)
  pub config: Arc<ImpactConfig>,
}

impl WorkspaceContext {
  /// Locate the workspace containing `start`, load its configuration, then its graph.
  pub fn build(start: &Path, overrides: &[String]) -> ImpactResult<Self> {
    let workspace_root = find_workspace_root(start)?;
    debug!(root = %workspace_root.display(), "workspace root");

    let config = ImpactConfig::load(&workspace_root, overrides)?;
    match &config.source {
      Some(path) => debug!(config = %path.display(), "loaded configuration"),
      None => debug!("no impact.toml found, using defaults"),
    }

    let workspace = CargoWorkspace::load(&workspace_root)?;
    let graph = workspace.project_graph()?;
    debug!(modules = graph.len(), "project graph ready");

    Ok(Self {
      root: canonical_or_normalized(workspace.workspace_root()),
      graph: Arc::new(graph),
      config: Arc::new(config),
    })
  }

  pub fn workspace_root(&self) -> &Path {
    &self.root
  }
}
