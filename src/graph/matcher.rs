//! Changed file → owning module
//!
//! A file belongs to the module with the deepest root directory containing it.
//! Containment is component-wise (`/ws/foo-bar/x` is not under `/ws/foo`), which
//! `Path::ancestors` gives us for free: walking ancestors deepest-first, the first
//! directory that is some module's root is the most specific match.

use super::project_graph::{ModuleId, ProjectGraph};
use crate::utils::normalize_path;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Map a single path to its most specific module.
///
/// Returns `None` when no module root contains the path.
pub fn match_path(path: &Path, graph: &ProjectGraph) -> Option<ModuleId> {
  let normalized = normalize_path(path);

  normalized
    .ancestors()
    .find_map(|dir| graph.modules_at_root(dir))
    .and_then(|ids| ids.first().cloned())
}

/// Map a whole change set to the set of changed modules.
///
/// Paths outside every module are dropped. Runs as a parallel map; the graph is
/// read-only so no synchronization is needed.
pub fn changed_modules<P>(paths: &[P], graph: &ProjectGraph) -> BTreeSet<ModuleId>
where
  P: AsRef<Path> + Sync,
{
  paths
    .par_iter()
    .filter_map(|path| {
      let matched = match_path(path.as_ref(), graph);
      if matched.is_none() {
        debug!(path = %path.as_ref().display(), "changed file outside every module, ignored");
      }
      matched
    })
    .collect::<Vec<_>>()
    .into_iter()
    .collect()
}
