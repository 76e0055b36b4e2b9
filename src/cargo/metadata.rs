use crate::core::error::{ImpactError, ImpactResult, ResultExt};
use crate::graph::{ModuleSpec, Packaging, ProjectGraph, ProjectGraphProvider};
use crate::utils::canonical_or_normalized;
use cargo_metadata::{MetadataCommand, Package};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;
use tracing::{debug, warn};

/// Find the workspace root by looking for Cargo.toml with \[workspace\]
///
/// Falls back to the nearest package manifest (a single-package workspace), then
/// to `start` itself.
pub fn find_workspace_root(start: &Path) -> ImpactResult<PathBuf> {
  let mut nearest_manifest = None;

  for dir in start.ancestors() {
    let cargo_toml = dir.join("Cargo.toml");
    if !cargo_toml.is_file() {
      continue;
    }

    let content = fs::read_to_string(&cargo_toml).with_context(|| format!("Failed to read {}", cargo_toml.display()))?;
    let doc: DocumentMut = content
      .parse()
      .map_err(|e| ImpactError::from(e).context(format!("Failed to parse {}", cargo_toml.display())))?;

    if doc.get("workspace").is_some_and(|w| w.is_table_like()) {
      return Ok(dir.to_path_buf());
    }
    if nearest_manifest.is_none() {
      nearest_manifest = Some(dir.to_path_buf());
    }
  }

  Ok(nearest_manifest.unwrap_or_else(|| start.to_path_buf()))
}

/// Workspace introspection using cargo_metadata
#[derive(Clone)]
pub struct WorkspaceMetadata {
  metadata: cargo_metadata::Metadata,
}

impl WorkspaceMetadata {
  pub fn load(workspace_root: &Path) -> ImpactResult<Self> {
    let metadata = MetadataCommand::new()
      .manifest_path(workspace_root.join("Cargo.toml"))
      .no_deps()
      .exec()?;
    Ok(Self { metadata })
  }

  pub fn list_crates(&self) -> Vec<&Package> {
    self.metadata.workspace_packages()
  }

  pub fn workspace_root(&self) -> &Path {
    self.metadata.workspace_root.as_std_path()
  }
}

/// Cargo workspace as a project graph: one module per workspace member.
pub struct CargoWorkspace {
  metadata: WorkspaceMetadata,
}

impl CargoWorkspace {
  pub fn load(workspace_root: &Path) -> ImpactResult<Self> {
    let metadata = WorkspaceMetadata::load(workspace_root)
      .with_context(|| format!("Failed to load cargo metadata for {}", workspace_root.display()))?;
    Ok(Self { metadata })
  }

  pub fn workspace_root(&self) -> &Path {
    self.metadata.workspace_root()
  }

  /// Module description for a workspace member.
  fn module_spec(package: &Package) -> ModuleSpec {
    let name = package.name.as_ref().to_string();
    let manifest_dir = package
      .manifest_path
      .parent()
      .map(|dir| dir.as_std_path().to_path_buf())
      .unwrap_or_else(PathBuf::new);

    let mut spec = ModuleSpec::new(name, canonical_or_normalized(&manifest_dir)).packaging(packaging_of(package));

    // Normal, dev and build dependencies all count
    for dep in &package.dependencies {
      spec = spec.depends_on(dep.name.as_str());
    }

    spec
  }
}

impl ProjectGraphProvider for CargoWorkspace {
  fn project_graph(&self) -> ImpactResult<ProjectGraph> {
    let specs: Vec<ModuleSpec> = self.metadata.list_crates().into_iter().map(Self::module_spec).collect();
    debug!(members = specs.len(), "loaded workspace members");

    let graph = ProjectGraph::from_modules(specs)?;
    if graph.is_empty() {
      warn!(root = %self.workspace_root().display(), "workspace has no members");
    }

    for cycle in graph.find_cycles() {
      let names: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
      warn!(cycle = %names.join(" -> "), "dependency cycle in workspace");
    }

    Ok(graph)
  }
}

/// Packaging declared in `[package.metadata.impact]`, else derived from targets.
fn packaging_of(package: &Package) -> Packaging {
  if let Some(declared) = package
    .metadata
    .get("impact")
    .and_then(|impact| impact.get("packaging"))
    .and_then(|packaging| packaging.as_str())
  {
    return Packaging::from_declared(declared);
  }

  let targets = &package.targets;
  if targets.iter().any(|t| t.is_proc_macro()) {
    Packaging::ProcMacro
  } else if targets.iter().any(|t| t.is_lib()) {
    Packaging::Library
  } else if targets.iter().any(|t| t.is_bin()) {
    Packaging::Binary
  } else {
    Packaging::Other("custom".to_string())
  }
}
