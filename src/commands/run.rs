//! `cargo impact run` - Run a cargo subcommand for impacted crates
//!
//! Builds one invocation `cargo <subcommand> -p <crate>... <args>` covering every
//! impacted crate. Nothing impacted means nothing runs.

use super::plan::collect_plan;
use crate::core::context::WorkspaceContext;
use crate::core::error::{ImpactError, ImpactResult, ResultExt};
use crate::graph::ModuleId;
use std::collections::BTreeSet;
use std::process::Command;
use tracing::info;

/// Run the run command
pub fn run_cargo(ctx: &WorkspaceContext, subcommand: String, dry_run: bool, cargo_args: Vec<String>) -> ImpactResult<()> {
  let plan = collect_plan(ctx)?;

  if plan.is_empty() {
    println!("✅ No impacted crates, nothing to run");
    return Ok(());
  }

  let args = cargo_invocation(&subcommand, &plan.impacted, &cargo_args);

  if dry_run {
    println!("DRY RUN: Would execute:");
    println!("  cargo {}", args.join(" "));
    return Ok(());
  }

  info!(subcommand = %subcommand, crates = plan.impacted.len(), "running cargo for impacted crates");
  println!("Executing: cargo {}", args.join(" "));

  let status = Command::new("cargo")
    .current_dir(ctx.workspace_root())
    .args(&args)
    .status()
    .with_context(|| format!("Failed to execute cargo {}", subcommand))?;

  if !status.success() {
    return Err(ImpactError::message(format!(
      "cargo {} failed with exit code: {}",
      subcommand,
      status.code().unwrap_or(-1)
    )));
  }

  println!("✅ cargo {} completed for {} crates", subcommand, plan.impacted.len());
  Ok(())
}

/// Arguments after `cargo`: subcommand, one `-p` per crate, then passthrough args.
fn cargo_invocation(subcommand: &str, crates: &BTreeSet<ModuleId>, extra: &[String]) -> Vec<String> {
  let mut args = vec![subcommand.to_string()];
  for id in crates {
    args.push("-p".to_string());
    args.push(id.to_string());
  }
  args.extend(extra.iter().cloned());
  args
}
