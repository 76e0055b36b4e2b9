//! Impacted module analysis
//!
//! Given the set of directly changed modules, determine which modules need a full
//! build:
//!
//! 1. Breadth-first upward closure over "depended-on-by" edges
//! 2. Forced exclusion (never removes a directly changed module)
//! 3. Forced inclusion (terminal: does not re-seed propagation)
//! 4. Packaging exclusion for modules reached only through propagation
//!
//! Filters run only after propagation has settled, so excluding a module never
//! cuts off the modules above it. Results are `BTreeSet`s, so iteration and any
//! output built from them is sorted.

use super::policy::PolicyConfig;
use super::project_graph::{ModuleId, ProjectGraph};
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

/// Compute the impacted module set.
///
/// Ids in `changed` that are not part of `graph` are ignored.
pub fn resolve(changed: &BTreeSet<ModuleId>, graph: &ProjectGraph, policy: &PolicyConfig) -> BTreeSet<ModuleId> {
  if policy.build_all {
    return graph.module_ids();
  }

  let changed: BTreeSet<ModuleId> = changed.iter().filter(|id| graph.contains(id)).cloned().collect();

  // Step 1: upward closure
  let mut impacted = changed.clone();
  if policy.build_downstream {
    let mut worklist: VecDeque<&ModuleId> = changed.iter().collect();

    while let Some(module) = worklist.pop_front() {
      for dependent in graph.direct_dependents(module) {
        // Visited check before enqueue: every module is processed at most once, cycles included
        if impacted.insert(dependent.clone()) {
          worklist.push_back(dependent);
        }
      }
    }
  }

  // Step 2: forced exclusion of propagated modules
  impacted.retain(|id| changed.contains(id) || !policy.is_excluded(id));

  // Step 3: forced inclusion over the whole graph
  let forced: BTreeSet<ModuleId> = graph.module_ids().into_iter().filter(|id| policy.is_forced(id)).collect();
  impacted.extend(forced.iter().cloned());

  // Step 4: packaging exclusion for transitive-only modules
  impacted.retain(|id| {
    if changed.contains(id) || forced.contains(id) {
      return true;
    }
    match graph.module(id) {
      Some(module) => !policy.excludes_packaging(&module.packaging),
      None => false,
    }
  });

  let changed_names: Vec<&str> = changed.iter().map(ModuleId::as_str).collect();
  let impacted_names: Vec<&str> = impacted.iter().map(ModuleId::as_str).collect();
  debug!(changed = ?changed_names, impacted = ?impacted_names, "impact resolved");

  impacted
}
