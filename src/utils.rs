//! Utility functions for cross-platform path handling

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` segments and fold `..` into their parent.
///
/// Does not touch the filesystem, so it works for files that were deleted by the
/// change being analyzed (where `canonicalize` would fail).
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();

  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        // `..` at the root stays at the root; leading `..` of a relative path are kept
        let ends_with_parent = matches!(normalized.components().next_back(), Some(Component::ParentDir));
        if ends_with_parent || (!normalized.pop() && !normalized.has_root()) {
          normalized.push("..");
        }
      }
      other => normalized.push(other.as_os_str()),
    }
  }

  normalized
}

/// Canonicalize when the path exists, otherwise fall back to lexical normalization.
pub fn canonical_or_normalized(path: &Path) -> PathBuf {
  path.canonicalize().unwrap_or_else(|_| normalize_path(path))
}

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
/// This function converts backslashes to forward slashes for use in Git commands.
pub fn path_to_git_format(path: &Path) -> String {
  // On Windows, convert backslashes to forward slashes
  // On Unix, this is a no-op since paths already use forward slashes
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
