//! Graph-aware impact analysis
//!
//! Built on petgraph for direct control and minimal abstraction.
//!
//! - **project_graph**: modules, packaging, dependency and reverse edges
//! - **matcher**: changed file → most specific module
//! - **impact**: upward closure plus policy filters
//! - **policy**: forced inclusion/exclusion and packaging exclusion
//! - **plan**: impacted vs. skipped modules and their override arguments

pub mod impact;
pub mod matcher;
pub mod plan;
pub mod policy;
pub mod project_graph;

use crate::core::error::ImpactResult;

pub use plan::{BuildPlan, Selection};
pub use project_graph::{ModuleId, ModuleSpec, Packaging, ProjectGraph};

/// Source of the project graph (the host build system).
pub trait ProjectGraphProvider {
  fn project_graph(&self) -> ImpactResult<ProjectGraph>;
}
