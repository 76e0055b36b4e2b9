pub mod change_set;
pub mod system_git;

use crate::core::error::ImpactResult;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub use change_set::GitChangeSet;
pub use system_git::SystemGit;

/// Source of changed files (the version-control system).
///
/// Paths are absolute, normalized and deduplicated; each names a file.
pub trait ChangeSetProvider {
  fn changed_paths(&self) -> ImpactResult<BTreeSet<PathBuf>>;
}
