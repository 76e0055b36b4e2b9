//! Git-backed change set
//!
//! Combines, according to [`VcsConfig`]:
//! - the diff between the base revision and the reference (or their merge-base)
//! - uncommitted (staged + unstaged) changes
//! - untracked files
//!
//! and returns normalized absolute paths under the work tree.

use super::ChangeSetProvider;
use super::system_git::SystemGit;
use crate::core::config::VcsConfig;
use crate::core::error::ImpactResult;
use crate::utils::{normalize_path, path_to_git_format};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Change set between two git revisions plus local modifications.
pub struct GitChangeSet<'a> {
  git: SystemGit,
  config: &'a VcsConfig,
}

impl<'a> GitChangeSet<'a> {
  pub fn new(git: SystemGit, config: &'a VcsConfig) -> Self {
    Self { git, config }
  }

  /// Fetch the reference branch when it names a `<remote>/<branch>` of a known remote.
  fn fetch_reference(&self) -> ImpactResult<()> {
    let reference = &self.config.reference_branch;
    let Some((remote, branch)) = reference.split_once('/') else {
      warn!(%reference, "reference branch is not a remote branch, skipping fetch");
      return Ok(());
    };

    if !self.git.list_remotes()?.iter().any(|r| r == remote) {
      warn!(%reference, %remote, "unknown remote, skipping fetch");
      return Ok(());
    }

    debug!(%remote, %branch, "fetching reference branch");
    self.git.fetch(remote, branch)
  }

  fn branch_changes(&self) -> ImpactResult<Vec<PathBuf>> {
    if self.config.fetch_reference_branch {
      self.fetch_reference()?;
    }

    let base = &self.config.base_branch;
    let reference = &self.config.reference_branch;

    let from = if self.config.compare_to_merge_base {
      self.git.merge_base(base, reference)?
    } else {
      reference.clone()
    };

    debug!(%from, to = %base, "comparing revisions");
    self.git.changed_files_between(&from, base)
  }

  fn is_excluded(&self, relative: &std::path::Path) -> bool {
    match &self.config.exclude_path_regex {
      Some(regex) => regex.is_match(&path_to_git_format(relative)),
      None => false,
    }
  }
}

impl ChangeSetProvider for GitChangeSet<'_> {
  fn changed_paths(&self) -> ImpactResult<BTreeSet<PathBuf>> {
    let mut relative: BTreeSet<PathBuf> = BTreeSet::new();

    if !self.config.disable_branch_comparison {
      relative.extend(self.branch_changes()?);
    }
    if self.config.uncommitted {
      relative.extend(self.git.uncommitted_files()?);
    }
    if self.config.untracked {
      relative.extend(self.git.untracked_files()?);
    }

    let changed: BTreeSet<PathBuf> = relative
      .into_iter()
      .filter(|path| {
        let excluded = self.is_excluded(path);
        if excluded {
          debug!(path = %path.display(), "excluded by impact.exclude_path_regex");
        }
        !excluded
      })
      .map(|path| normalize_path(&self.git.work_tree().join(path)))
      .collect();

    debug!(count = changed.len(), "collected changed files");
    Ok(changed)
  }
}
