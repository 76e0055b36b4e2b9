//! Core engine for cargo-impact
//!
//! - **config**: impact.toml parsing, `-D` overrides and validation
//! - **context**: Unified workspace context shared by all commands
//! - **error**: Error types with exit codes and contextual help messages
//! - **vcs**: Git operations (SystemGit) and the change-set provider

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
