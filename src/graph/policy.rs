//! Policy filters applied on top of impact propagation
//!
//! - **force_include**: modules always built, changed or not
//! - **force_exclude**: modules dropped when reached only through propagation
//! - **excluded_transitive_packaging**: packaging kinds dropped when reached only
//!   through propagation
//!
//! Patterns are compiled once while loading configuration and are full-match:
//! `core` matches the crate `core`, not `core-utils`.

use super::project_graph::{ModuleId, Packaging};
use crate::core::error::ConfigError;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A compiled, full-match regex over module ids.
#[derive(Clone)]
pub struct ModulePattern {
  source: String,
  regex: Regex,
}

impl ModulePattern {
  /// Compile `pattern`; `property` names the setting it came from for error reporting.
  pub fn new(pattern: &str, property: &str) -> Result<Self, ConfigError> {
    // Compile the raw pattern first so syntax errors refer to what was written
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
      property: property.to_string(),
      pattern: pattern.to_string(),
      source,
    })?;

    let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| ConfigError::InvalidPattern {
      property: property.to_string(),
      pattern: pattern.to_string(),
      source,
    })?;

    Ok(Self {
      source: pattern.to_string(),
      regex,
    })
  }

  /// The pattern as written in configuration
  pub fn as_str(&self) -> &str {
    &self.source
  }

  pub fn matches(&self, id: &str) -> bool {
    self.regex.is_match(id)
  }
}

impl fmt::Debug for ModulePattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ModulePattern({:?})", self.as_str())
  }
}

/// Resolver policy for one invocation.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
  /// When false, selection is off: every module builds, none is skipped
  pub enabled: bool,
  /// Treat every module as impacted
  pub build_all: bool,
  /// Propagate impact to dependents
  pub build_downstream: bool,
  pub force_include: Vec<ModulePattern>,
  pub force_exclude: Vec<ModulePattern>,
  pub excluded_transitive_packaging: BTreeSet<String>,
  /// Override arguments handed to every skipped module
  pub skipped_module_args: BTreeMap<String, String>,
}

impl Default for PolicyConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      build_all: false,
      build_downstream: true,
      force_include: Vec::new(),
      force_exclude: Vec::new(),
      excluded_transitive_packaging: BTreeSet::new(),
      skipped_module_args: BTreeMap::new(),
    }
  }
}

impl PolicyConfig {
  pub fn is_forced(&self, id: &ModuleId) -> bool {
    self.force_include.iter().any(|p| p.matches(id.as_str()))
  }

  pub fn is_excluded(&self, id: &ModuleId) -> bool {
    self.force_exclude.iter().any(|p| p.matches(id.as_str()))
  }

  /// Exact, case-sensitive match against the declared packaging string
  pub fn excludes_packaging(&self, packaging: &Packaging) -> bool {
    self.excluded_transitive_packaging.contains(packaging.as_str())
  }

  /// Whether selection applies at all (disabled or build-all means "build everything")
  pub fn selects_modules(&self) -> bool {
    self.enabled && !self.build_all
  }
}
