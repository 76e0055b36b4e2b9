//! Impact configuration (impact.toml + `-D` overrides)
//!
//! Every setting is a named property `impact.<key>`. Values are layered:
//!
//! 1. `impact.toml` (searched in impact.toml, .impact.toml, .cargo/impact.toml,
//!    .config/impact.toml), keys written without the `impact.` prefix
//! 2. `-D impact.<key>=<value>` on the command line, which wins over the file
//!
//! The layered properties are then compiled once into [`ImpactConfig`]: patterns
//! become regexes, lists and maps are parsed. Anything malformed fails here,
//! before git or cargo metadata are touched.

use crate::core::error::{ConfigError, ImpactError, ImpactResult, ResultExt};
use crate::graph::policy::{ModulePattern, PolicyConfig};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of every fully-qualified property name
pub const PREFIX: &str = "impact.";

/// Recognized configuration properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Property {
  Enabled,
  DisableBranchComparison,
  ReferenceBranch,
  BaseBranch,
  FetchReferenceBranch,
  CompareToMergeBase,
  Uncommitted,
  Untracked,
  ExcludePathRegex,
  FailOnMissingGitDir,
  BuildAll,
  BuildDownstream,
  ForceBuildModules,
  ExcludeTransitiveModules,
  ExcludeTransitiveModulesPackagedAs,
  ArgsForSkippedModules,
}

impl Property {
  pub const ALL: [Property; 16] = [
    Property::Enabled,
    Property::DisableBranchComparison,
    Property::ReferenceBranch,
    Property::BaseBranch,
    Property::FetchReferenceBranch,
    Property::CompareToMergeBase,
    Property::Uncommitted,
    Property::Untracked,
    Property::ExcludePathRegex,
    Property::FailOnMissingGitDir,
    Property::BuildAll,
    Property::BuildDownstream,
    Property::ForceBuildModules,
    Property::ExcludeTransitiveModules,
    Property::ExcludeTransitiveModulesPackagedAs,
    Property::ArgsForSkippedModules,
  ];

  /// Short key as written in impact.toml
  pub fn key(self) -> &'static str {
    match self {
      Property::Enabled => "enabled",
      Property::DisableBranchComparison => "disable_branch_comparison",
      Property::ReferenceBranch => "reference_branch",
      Property::BaseBranch => "base_branch",
      Property::FetchReferenceBranch => "fetch_reference_branch",
      Property::CompareToMergeBase => "compare_to_merge_base",
      Property::Uncommitted => "uncommitted",
      Property::Untracked => "untracked",
      Property::ExcludePathRegex => "exclude_path_regex",
      Property::FailOnMissingGitDir => "fail_on_missing_git_dir",
      Property::BuildAll => "build_all",
      Property::BuildDownstream => "build_downstream",
      Property::ForceBuildModules => "force_build_modules",
      Property::ExcludeTransitiveModules => "exclude_transitive_modules",
      Property::ExcludeTransitiveModulesPackagedAs => "exclude_transitive_modules_packaged_as",
      Property::ArgsForSkippedModules => "args_for_skipped_modules",
    }
  }

  /// Fully-qualified name, e.g. `impact.force_build_modules`
  pub fn full_name(self) -> String {
    format!("{}{}", PREFIX, self.key())
  }

  /// Default value in its command-line string form
  pub fn default_value(self) -> &'static str {
    match self {
      Property::Enabled => "true",
      Property::DisableBranchComparison => "false",
      Property::ReferenceBranch => "origin/main",
      Property::BaseBranch => "HEAD",
      Property::FetchReferenceBranch => "false",
      Property::CompareToMergeBase => "true",
      Property::Uncommitted => "true",
      Property::Untracked => "true",
      Property::FailOnMissingGitDir => "true",
      Property::BuildAll => "false",
      Property::BuildDownstream => "true",
      Property::ExcludePathRegex
      | Property::ForceBuildModules
      | Property::ExcludeTransitiveModules
      | Property::ExcludeTransitiveModulesPackagedAs
      | Property::ArgsForSkippedModules => "",
    }
  }

  /// Resolve a property from its short or fully-qualified name.
  pub fn lookup(name: &str) -> Result<Self, ConfigError> {
    let trimmed = name.trim();
    let key = trimmed.strip_prefix(PREFIX).unwrap_or(trimmed);

    Self::ALL
      .iter()
      .copied()
      .find(|p| p.key() == key)
      .ok_or_else(|| ConfigError::UnknownProperty {
        name: trimmed.to_string(),
        valid: Self::ALL.iter().map(|p| p.full_name()).collect(),
      })
  }
}

impl fmt::Display for Property {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", PREFIX, self.key())
  }
}

/// A raw property value before it is interpreted for its property's type.
///
/// TOML arrays and tables keep their structure; command-line values arrive as
/// scalars and are split according to the property they are assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
  Scalar(String),
  List(Vec<String>),
  Map(BTreeMap<String, String>),
}

impl PropertyValue {
  /// Comma-separated scalar or TOML array
  fn as_list(&self) -> Vec<String> {
    match self {
      PropertyValue::Scalar(s) => s
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect(),
      PropertyValue::List(items) => items.clone(),
      PropertyValue::Map(map) => map.keys().cloned().collect(),
    }
  }

  /// Whitespace-separated `k=v` pairs or TOML table
  fn as_map(&self, property: Property) -> Result<BTreeMap<String, String>, ConfigError> {
    match self {
      PropertyValue::Map(map) => Ok(map.clone()),
      PropertyValue::Scalar(s) => parse_key_values(s, property),
      PropertyValue::List(items) => {
        let mut map = BTreeMap::new();
        for item in items {
          map.extend(parse_key_values(item, property)?);
        }
        Ok(map)
      }
    }
  }

  fn as_scalar(&self, property: Property) -> Result<&str, ConfigError> {
    match self {
      PropertyValue::Scalar(s) => Ok(s.as_str()),
      other => Err(ConfigError::InvalidValue {
        property: property.full_name(),
        value: other.to_string(),
        reason: "expected a single value".to_string(),
      }),
    }
  }
}

impl fmt::Display for PropertyValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PropertyValue::Scalar(s) => write!(f, "{}", s),
      PropertyValue::List(items) => write!(f, "{}", items.join(",")),
      PropertyValue::Map(map) => {
        let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", pairs.join(" "))
      }
    }
  }
}

fn parse_key_values(raw: &str, property: Property) -> Result<BTreeMap<String, String>, ConfigError> {
  let mut map = BTreeMap::new();

  for pair in raw.split_whitespace() {
    match pair.split_once('=') {
      Some((key, value)) if !key.is_empty() => {
        map.insert(key.to_string(), value.to_string());
      }
      _ => {
        return Err(ConfigError::InvalidValue {
          property: property.full_name(),
          value: pair.to_string(),
          reason: "expected key=value".to_string(),
        });
      }
    }
  }

  Ok(map)
}

fn parse_bool(value: &PropertyValue, property: Property) -> Result<bool, ConfigError> {
  let raw = value.as_scalar(property)?;
  match raw.trim().to_lowercase().as_str() {
    "true" => Ok(true),
    "false" => Ok(false),
    _ => Err(ConfigError::InvalidValue {
      property: property.full_name(),
      value: raw.to_string(),
      reason: "expected true or false".to_string(),
    }),
  }
}

/// Layered property values, keyed by property.
#[derive(Debug, Clone, Default)]
pub struct Properties {
  values: BTreeMap<Property, PropertyValue>,
}

impl Properties {
  /// Parse impact.toml
  pub fn from_toml_str(content: &str) -> ImpactResult<Self> {
    let file: ImpactFile = toml_edit::de::from_str(content)?;
    Ok(file.into_properties())
  }

  /// Apply a `key=value` override (a bare key means `true`).
  pub fn set_override(&mut self, raw: &str) -> ImpactResult<()> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, "true"));
    let property = Property::lookup(name)?;
    self.values.insert(property, PropertyValue::Scalar(value.to_string()));
    Ok(())
  }

  pub fn get(&self, property: Property) -> Option<&PropertyValue> {
    self.values.get(&property)
  }

  /// Every property with its effective value (explicit or default), in declaration order.
  pub fn effective(&self) -> Vec<(String, String)> {
    Property::ALL
      .iter()
      .map(|p| {
        let value = self
          .get(*p)
          .map(|v| v.to_string())
          .unwrap_or_else(|| p.default_value().to_string());
        (p.full_name(), value)
      })
      .collect()
  }

  fn bool_or_default(&self, property: Property) -> Result<bool, ConfigError> {
    let default = PropertyValue::Scalar(property.default_value().to_string());
    parse_bool(self.get(property).unwrap_or(&default), property)
  }

  fn string_or_default(&self, property: Property) -> Result<String, ConfigError> {
    match self.get(property) {
      Some(value) => Ok(value.as_scalar(property)?.trim().to_string()),
      None => Ok(property.default_value().to_string()),
    }
  }

  fn list(&self, property: Property) -> Vec<String> {
    self.get(property).map(|v| v.as_list()).unwrap_or_default()
  }
}

/// Typed layout of impact.toml: property keys without the `impact.` prefix
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImpactFile {
  enabled: Option<bool>,
  disable_branch_comparison: Option<bool>,
  reference_branch: Option<String>,
  base_branch: Option<String>,
  fetch_reference_branch: Option<bool>,
  compare_to_merge_base: Option<bool>,
  uncommitted: Option<bool>,
  untracked: Option<bool>,
  exclude_path_regex: Option<String>,
  fail_on_missing_git_dir: Option<bool>,
  build_all: Option<bool>,
  build_downstream: Option<bool>,
  force_build_modules: Option<Vec<String>>,
  exclude_transitive_modules: Option<Vec<String>>,
  exclude_transitive_modules_packaged_as: Option<Vec<String>>,
  args_for_skipped_modules: Option<BTreeMap<String, String>>,
}

impl ImpactFile {
  fn into_properties(self) -> Properties {
    let mut values = BTreeMap::new();

    let flags = [
      (Property::Enabled, self.enabled),
      (Property::DisableBranchComparison, self.disable_branch_comparison),
      (Property::FetchReferenceBranch, self.fetch_reference_branch),
      (Property::CompareToMergeBase, self.compare_to_merge_base),
      (Property::Uncommitted, self.uncommitted),
      (Property::Untracked, self.untracked),
      (Property::FailOnMissingGitDir, self.fail_on_missing_git_dir),
      (Property::BuildAll, self.build_all),
      (Property::BuildDownstream, self.build_downstream),
    ];
    for (property, flag) in flags {
      if let Some(flag) = flag {
        values.insert(property, PropertyValue::Scalar(flag.to_string()));
      }
    }

    let strings = [
      (Property::ReferenceBranch, self.reference_branch),
      (Property::BaseBranch, self.base_branch),
      (Property::ExcludePathRegex, self.exclude_path_regex),
    ];
    for (property, value) in strings {
      if let Some(value) = value {
        values.insert(property, PropertyValue::Scalar(value));
      }
    }

    let lists = [
      (Property::ForceBuildModules, self.force_build_modules),
      (Property::ExcludeTransitiveModules, self.exclude_transitive_modules),
      (Property::ExcludeTransitiveModulesPackagedAs, self.exclude_transitive_modules_packaged_as),
    ];
    for (property, items) in lists {
      if let Some(items) = items {
        values.insert(property, PropertyValue::List(items));
      }
    }

    if let Some(args) = self.args_for_skipped_modules {
      values.insert(Property::ArgsForSkippedModules, PropertyValue::Map(args));
    }

    Properties { values }
  }
}

/// Settings for the git change-set provider
#[derive(Debug, Clone)]
pub struct VcsConfig {
  pub disable_branch_comparison: bool,
  pub reference_branch: String,
  pub base_branch: String,
  pub fetch_reference_branch: bool,
  pub compare_to_merge_base: bool,
  pub uncommitted: bool,
  pub untracked: bool,
  /// Repo-relative paths matching this are dropped from the change set
  pub exclude_path_regex: Option<Regex>,
  pub fail_on_missing_git_dir: bool,
}

/// Fully-validated configuration for one invocation
#[derive(Debug, Clone)]
pub struct ImpactConfig {
  pub vcs: VcsConfig,
  pub policy: PolicyConfig,
  /// Layered raw values (for `cargo impact config`)
  pub properties: Properties,
  /// impact.toml that contributed, if any
  pub source: Option<PathBuf>,
}

impl ImpactConfig {
  /// Find config file in search order: impact.toml, .impact.toml, .cargo/impact.toml, .config/impact.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("impact.toml"),
      path.join(".impact.toml"),
      path.join(".cargo").join("impact.toml"),
      path.join(".config").join("impact.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load impact.toml (if any), apply overrides, and compile.
  pub fn load(workspace_root: &Path, overrides: &[String]) -> ImpactResult<Self> {
    let source = Self::find_config_path(workspace_root);

    let mut properties = match &source {
      Some(config_path) => {
        let content = fs::read_to_string(config_path)
          .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
        Properties::from_toml_str(&content).map_err(|e| match e {
          ImpactError::Config(_) => e,
          other => other.context(format!("Failed to parse config from {}", config_path.display())),
        })?
      }
      None => Properties::default(),
    };

    for raw in overrides {
      properties.set_override(raw)?;
    }

    let mut config = Self::from_properties(properties)?;
    config.source = source;
    Ok(config)
  }

  /// Compile layered properties into typed settings.
  pub fn from_properties(properties: Properties) -> ImpactResult<Self> {
    let exclude_path_regex = match properties.get(Property::ExcludePathRegex) {
      Some(value) => {
        let pattern = value.as_scalar(Property::ExcludePathRegex)?.trim().to_string();
        if pattern.is_empty() {
          None
        } else {
          let regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
            property: Property::ExcludePathRegex.full_name(),
            pattern: pattern.clone(),
            source,
          })?;
          Some(regex)
        }
      }
      None => None,
    };

    let vcs = VcsConfig {
      disable_branch_comparison: properties.bool_or_default(Property::DisableBranchComparison)?,
      reference_branch: properties.string_or_default(Property::ReferenceBranch)?,
      base_branch: properties.string_or_default(Property::BaseBranch)?,
      fetch_reference_branch: properties.bool_or_default(Property::FetchReferenceBranch)?,
      compare_to_merge_base: properties.bool_or_default(Property::CompareToMergeBase)?,
      uncommitted: properties.bool_or_default(Property::Uncommitted)?,
      untracked: properties.bool_or_default(Property::Untracked)?,
      exclude_path_regex,
      fail_on_missing_git_dir: properties.bool_or_default(Property::FailOnMissingGitDir)?,
    };

    let policy = PolicyConfig {
      enabled: properties.bool_or_default(Property::Enabled)?,
      build_all: properties.bool_or_default(Property::BuildAll)?,
      build_downstream: properties.bool_or_default(Property::BuildDownstream)?,
      force_include: compile_patterns(&properties, Property::ForceBuildModules)?,
      force_exclude: compile_patterns(&properties, Property::ExcludeTransitiveModules)?,
      excluded_transitive_packaging: properties
        .list(Property::ExcludeTransitiveModulesPackagedAs)
        .into_iter()
        .collect::<BTreeSet<_>>(),
      skipped_module_args: match properties.get(Property::ArgsForSkippedModules) {
        Some(value) => value.as_map(Property::ArgsForSkippedModules)?,
        None => BTreeMap::new(),
      },
    };

    Ok(Self {
      vcs,
      policy,
      properties,
      source: None,
    })
  }
}

fn compile_patterns(properties: &Properties, property: Property) -> Result<Vec<ModulePattern>, ConfigError> {
  properties
    .list(property)
    .iter()
    .map(|pattern| ModulePattern::new(pattern, &property.full_name()))
    .collect()
}
