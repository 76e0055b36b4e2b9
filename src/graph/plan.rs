//! Build plan: which modules get a full build and which are skipped
//!
//! Skipped modules stay in the build; they are annotated with the configured
//! override arguments (e.g. disabling tests) so the host build can still compile
//! them for their dependents without re-verifying them.

use super::impact;
use super::matcher;
use super::policy::PolicyConfig;
use super::project_graph::{ModuleId, ProjectGraph};
use crate::core::error::ImpactResult;
use crate::core::vcs::ChangeSetProvider;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::info;

/// Why modules were (or were not) selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selection {
  /// Impact analysis selected the modules
  Impacted,
  /// `impact.build_all` is set
  BuildAll,
  /// `impact.enabled` is false
  Disabled,
}

/// Complete result for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
  pub selection: Selection,

  /// Files that changed (sorted)
  pub changed_files: Vec<PathBuf>,

  /// Modules directly containing changed files
  pub changed: BTreeSet<ModuleId>,

  /// Modules needing a full build
  pub impacted: BTreeSet<ModuleId>,

  /// Impacted modules matched by `impact.force_build_modules` (excluding changed ones)
  pub forced: BTreeSet<ModuleId>,

  /// Modules built with reduced verification, with their override arguments
  pub skipped: BTreeMap<ModuleId, BTreeMap<String, String>>,
}

impl BuildPlan {
  /// Nothing needs a full build
  pub fn is_empty(&self) -> bool {
    self.impacted.is_empty()
  }

  /// Impacted modules reached only by propagation
  pub fn dependents(&self) -> BTreeSet<&ModuleId> {
    self
      .impacted
      .iter()
      .filter(|id| !self.changed.contains(*id) && !self.forced.contains(*id))
      .collect()
  }
}

/// Attach the same override map to every skipped module.
pub fn adjust(
  skipped: &BTreeSet<ModuleId>,
  override_args: &BTreeMap<String, String>,
) -> BTreeMap<ModuleId, BTreeMap<String, String>> {
  skipped
    .iter()
    .map(|id| (id.clone(), override_args.clone()))
    .collect()
}

/// Plan the build for an already collected change set.
pub fn plan(changed_files: &[PathBuf], graph: &ProjectGraph, policy: &PolicyConfig) -> BuildPlan {
  let mut changed_files = changed_files.to_vec();
  changed_files.sort();
  changed_files.dedup();

  let changed = matcher::changed_modules(&changed_files, graph);

  let selection = if !policy.enabled {
    Selection::Disabled
  } else if policy.build_all {
    Selection::BuildAll
  } else {
    Selection::Impacted
  };

  let impacted = match selection {
    Selection::Disabled => graph.module_ids(),
    _ => impact::resolve(&changed, graph, policy),
  };

  // Forced labels only carry meaning when analysis picked the set
  let forced: BTreeSet<ModuleId> = match selection {
    Selection::Impacted => impacted
      .iter()
      .filter(|id| !changed.contains(*id) && policy.is_forced(id))
      .cloned()
      .collect(),
    _ => BTreeSet::new(),
  };

  let skipped: BTreeSet<ModuleId> = graph.module_ids().difference(&impacted).cloned().collect();

  info!(
    changed_files = changed_files.len(),
    changed = changed.len(),
    impacted = impacted.len(),
    forced = forced.len(),
    skipped = skipped.len(),
    "build plan ready"
  );

  BuildPlan {
    selection,
    changed_files,
    changed,
    impacted,
    forced,
    skipped: adjust(&skipped, &policy.skipped_module_args),
  }
}

/// Collect changes from `provider` and plan the build.
///
/// When selection is off (disabled or build-all) the provider is not consulted.
pub fn plan_with(provider: &dyn ChangeSetProvider, graph: &ProjectGraph, policy: &PolicyConfig) -> ImpactResult<BuildPlan> {
  if !policy.selects_modules() {
    return Ok(plan(&[], graph, policy));
  }

  let changed_files: Vec<PathBuf> = provider.changed_paths()?.into_iter().collect();
  Ok(plan(&changed_files, graph, policy))
}
