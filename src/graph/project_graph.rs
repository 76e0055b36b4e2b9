//! Project dependency graph built on petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: Modules (workspace members), each with a root directory and packaging
//! - **Reverse edges**: dependents of `M` are the `Incoming` neighbours of `M`
//! - **Index**: module id → node, root directory → module ids (for path matching)
//!
//! Declared dependencies on ids that are not part of the graph are kept on the
//! module but produce no edge: they are external to the project and never carry
//! impact. The graph is immutable once built.

use crate::core::error::ConfigError;
use crate::utils::normalize_path;
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Unique module identifier (the package name for Cargo workspaces)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ModuleId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ModuleId {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}

impl From<String> for ModuleId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

/// Declared output kind of a module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Packaging {
  Library,
  Binary,
  ProcMacro,
  /// Groups other modules; produces nothing to verify itself
  Aggregator,
  Other(String),
}

impl Packaging {
  /// Parse a declared packaging string. Unknown strings are kept verbatim.
  pub fn from_declared(declared: &str) -> Self {
    match declared {
      "lib" => Packaging::Library,
      "bin" => Packaging::Binary,
      "proc-macro" => Packaging::ProcMacro,
      "aggregator" => Packaging::Aggregator,
      other => Packaging::Other(other.to_string()),
    }
  }

  /// The string policy filters compare against
  pub fn as_str(&self) -> &str {
    match self {
      Packaging::Library => "lib",
      Packaging::Binary => "bin",
      Packaging::ProcMacro => "proc-macro",
      Packaging::Aggregator => "aggregator",
      Packaging::Other(s) => s,
    }
  }
}

impl fmt::Display for Packaging {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Input description of a module, as produced by a graph provider.
#[derive(Debug, Clone)]
pub struct ModuleSpec {
  pub id: ModuleId,
  pub root: PathBuf,
  pub packaging: Packaging,
  pub dependencies: Vec<ModuleId>,
}

impl ModuleSpec {
  pub fn new(id: impl Into<ModuleId>, root: impl Into<PathBuf>) -> Self {
    Self {
      id: id.into(),
      root: root.into(),
      packaging: Packaging::Library,
      dependencies: Vec::new(),
    }
  }

  pub fn packaging(mut self, packaging: Packaging) -> Self {
    self.packaging = packaging;
    self
  }

  pub fn depends_on(mut self, dependency: impl Into<ModuleId>) -> Self {
    self.dependencies.push(dependency.into());
    self
  }
}

/// A module node in the project graph.
#[derive(Debug, Clone)]
pub struct Module {
  pub id: ModuleId,
  /// Absolute, normalized root directory
  pub root: PathBuf,
  pub packaging: Packaging,
  /// Declared dependencies, including ones outside the graph
  pub dependencies: BTreeSet<ModuleId>,
}

/// Project dependency graph.
#[derive(Debug)]
pub struct ProjectGraph {
  /// Nodes: Module, Edges: "depends on"
  graph: DiGraph<Module, ()>,

  /// Index: module id → node index
  id_to_node: HashMap<ModuleId, NodeIndex>,

  /// Index: root directory → module ids (sorted; more than one only if roots collide)
  root_to_modules: HashMap<PathBuf, Vec<ModuleId>>,
}

impl ProjectGraph {
  /// Build the graph from module descriptions.
  ///
  /// Fails if two modules share an id.
  pub fn from_modules(specs: impl IntoIterator<Item = ModuleSpec>) -> Result<Self, ConfigError> {
    let mut graph = DiGraph::new();
    let mut id_to_node = HashMap::new();
    let mut root_to_modules: HashMap<PathBuf, Vec<ModuleId>> = HashMap::new();

    for spec in specs {
      if id_to_node.contains_key(&spec.id) {
        return Err(ConfigError::DuplicateModule {
          id: spec.id.to_string(),
        });
      }

      let root = normalize_path(&spec.root);
      root_to_modules.entry(root.clone()).or_default().push(spec.id.clone());

      let node = Module {
        id: spec.id.clone(),
        root,
        packaging: spec.packaging,
        dependencies: spec.dependencies.into_iter().collect(),
      };

      let node_idx = graph.add_node(node);
      id_to_node.insert(spec.id, node_idx);
    }

    for ids in root_to_modules.values_mut() {
      ids.sort();
    }

    // Add dependency edges (only between modules of this graph)
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    for from_idx in nodes {
      let dependencies: Vec<ModuleId> = graph[from_idx].dependencies.iter().cloned().collect();

      for dependency in dependencies {
        match id_to_node.get(&dependency) {
          Some(to_idx) => {
            graph.add_edge(from_idx, *to_idx, ());
          }
          None => {
            debug!(module = %graph[from_idx].id, %dependency, "dependency outside the project graph, ignored");
          }
        }
      }
    }

    Ok(Self {
      graph,
      id_to_node,
      root_to_modules,
    })
  }

  /// Number of modules
  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  pub fn contains(&self, id: &ModuleId) -> bool {
    self.id_to_node.contains_key(id)
  }

  pub fn module(&self, id: &ModuleId) -> Option<&Module> {
    self.id_to_node.get(id).map(|idx| &self.graph[*idx])
  }

  /// All module ids, sorted.
  pub fn module_ids(&self) -> BTreeSet<ModuleId> {
    self.id_to_node.keys().cloned().collect()
  }

  /// Modules whose root directory is exactly `root` (sorted ids).
  pub fn modules_at_root(&self, root: &Path) -> Option<&[ModuleId]> {
    self.root_to_modules.get(root).map(Vec::as_slice)
  }

  /// Direct dependents of a module (what uses it), sorted.
  ///
  /// Unknown ids have no dependents.
  pub fn direct_dependents(&self, id: &ModuleId) -> Vec<&ModuleId> {
    let Some(node_idx) = self.id_to_node.get(id) else {
      return Vec::new();
    };

    let mut dependents: Vec<&ModuleId> = self
      .graph
      .neighbors_directed(*node_idx, Direction::Incoming)
      .map(|idx| &self.graph[idx].id)
      .collect();

    dependents.sort();
    dependents.dedup();
    dependents
  }

  /// Detect dependency cycles using Tarjan's SCC algorithm.
  ///
  /// Returns strongly connected components with size > 1 (cycles), each sorted.
  pub fn find_cycles(&self) -> Vec<Vec<ModuleId>> {
    let mut cycles: Vec<Vec<ModuleId>> = algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| component.len() > 1)
      .map(|component| {
        let mut ids: Vec<ModuleId> = component.into_iter().map(|idx| self.graph[idx].id.clone()).collect();
        ids.sort();
        ids
      })
      .collect();

    cycles.sort();
    cycles
  }
}
