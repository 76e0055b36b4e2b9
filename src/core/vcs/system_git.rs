//! System git backend - zero dependencies
//!
//! Uses git plumbing commands for all operations:
//! - Safe subprocess execution (isolated environment)
//! - NUL-separated output (`-z`) so unusual file names survive parsing

use crate::core::error::{GitError, ImpactError, ImpactResult, ResultExt};
use crate::utils::canonical_or_normalized;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Working tree root (canonical)
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ImpactResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ImpactError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ImpactError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = canonical_or_normalized(Path::new(stdout.trim()));

    Ok(Self { work_tree })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Resolve the merge-base of two revisions
  pub fn merge_base(&self, a: &str, b: &str) -> ImpactResult<String> {
    let stdout = self.run(&["merge-base", a, b])?;
    Ok(String::from_utf8(stdout)?.trim().to_string())
  }

  /// Files that differ between two revisions (repo-relative)
  ///
  /// Renames are reported as a deletion plus an addition, so both sides count.
  pub fn changed_files_between(&self, from: &str, to: &str) -> ImpactResult<Vec<PathBuf>> {
    let stdout = self.run(&["diff", "--name-only", "-z", "--no-renames", from, to])?;
    Ok(split_nul_paths(&stdout))
  }

  /// Staged and unstaged changes against HEAD (repo-relative)
  pub fn uncommitted_files(&self) -> ImpactResult<Vec<PathBuf>> {
    let stdout = self.run(&["diff", "--name-only", "-z", "--no-renames", "HEAD"])?;
    Ok(split_nul_paths(&stdout))
  }

  /// Untracked files not covered by ignore rules (repo-relative)
  pub fn untracked_files(&self) -> ImpactResult<Vec<PathBuf>> {
    let stdout = self.run(&["ls-files", "--others", "--exclude-standard", "-z"])?;
    Ok(split_nul_paths(&stdout))
  }

  /// Configured remote names
  pub fn list_remotes(&self) -> ImpactResult<Vec<String>> {
    let stdout = self.run(&["remote"])?;
    Ok(
      String::from_utf8_lossy(&stdout)
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect(),
    )
  }

  /// Fetch a branch from a remote, updating its remote-tracking ref
  pub fn fetch(&self, remote: &str, branch: &str) -> ImpactResult<()> {
    self.run(&["fetch", remote, branch])?;
    Ok(())
  }

  /// Run a git command and return stdout, failing on non-zero exit
  fn run(&self, args: &[&str]) -> ImpactResult<Vec<u8>> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ImpactError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(output.stdout)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree root
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    // Paths from diff and ls-files are then both relative to the work tree root
    cmd.arg("-C").arg(&self.work_tree);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}

fn split_nul_paths(stdout: &[u8]) -> Vec<PathBuf> {
  stdout
    .split(|b| *b == 0)
    .filter(|entry| !entry.is_empty())
    .map(|entry| PathBuf::from(String::from_utf8_lossy(entry).into_owned()))
    .collect()
}
