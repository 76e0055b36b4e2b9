//! Cargo workspace integration
//!
//! - **metadata**: Locate the workspace root, load its members with cargo_metadata and
//!   expose them as a project graph

pub mod metadata;

pub use metadata::{CargoWorkspace, find_workspace_root};
