//! `cargo impact affected` - Show which crates are affected by changes
//!
//! This command collects file changes (via git) and reports:
//! - Which workspace crates directly contain changed files
//! - Which crates transitively depend on those changed crates
//! - Which crates are built only because `impact.force_build_modules` names them
//! - The set of crates that need a full build after policy filters

use super::OutputFormat;
use super::plan::collect_plan;
use crate::core::context::WorkspaceContext;
use crate::core::error::ImpactResult;
use crate::graph::BuildPlan;
use std::path::{Path, PathBuf};

/// Run the affected command
pub fn run_affected(ctx: &WorkspaceContext, format: String) -> ImpactResult<()> {
  let output_format = OutputFormat::from_str(&format)?;
  let plan = collect_plan(ctx)?;
  let changed_files = relative_files(&plan, ctx.workspace_root());

  match output_format {
    OutputFormat::Text => display_text(&plan, &changed_files),
    OutputFormat::Json => display_json(&plan, &changed_files)?,
    OutputFormat::NamesOnly => display_names_only(&plan),
  }

  Ok(())
}

/// Changed files relative to the workspace root when they live under it
fn relative_files(plan: &BuildPlan, root: &Path) -> Vec<PathBuf> {
  plan
    .changed_files
    .iter()
    .map(|file| file.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| file.clone()))
    .collect()
}

/// Display results in human-readable text format
fn display_text(plan: &BuildPlan, changed_files: &[PathBuf]) {
  println!("Affected Analysis");
  println!("=================");
  println!();

  println!("Changed files: {}", changed_files.len());
  if !changed_files.is_empty() && changed_files.len() <= 20 {
    for file in changed_files {
      println!("  {}", file.display());
    }
    println!();
  }

  println!("Direct impact: {} crates", plan.changed.len());
  for id in &plan.changed {
    println!("  📦 {}", id);
  }
  println!();

  let dependents = plan.dependents();
  println!("Transitive dependents: {} crates", dependents.len());
  for id in &dependents {
    println!("  ⬆  {}", id);
  }
  println!();

  if !plan.forced.is_empty() {
    println!("Forced: {} crates", plan.forced.len());
    for id in &plan.forced {
      println!("  📌 {}", id);
    }
    println!();
  }

  println!("Impacted (after policy): {} crates", plan.impacted.len());
  for id in &plan.impacted {
    println!("  🎯 {}", id);
  }
}

/// Display results in JSON format
fn display_json(plan: &BuildPlan, changed_files: &[PathBuf]) -> ImpactResult<()> {
  use serde_json::json;

  let dependents = plan.dependents();

  let output = json!({
      "selection": plan.selection,
      "changed_files": changed_files,
      "impact": {
          "direct": plan.changed,
          "dependents": dependents,
          "forced": plan.forced,
          "impacted": plan.impacted
      },
      "summary": {
          "changed_files_count": changed_files.len(),
          "direct_count": plan.changed.len(),
          "dependents_count": dependents.len(),
          "forced_count": plan.forced.len(),
          "impacted_count": plan.impacted.len()
      }
  });

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

/// Display only crate names (impacted)
fn display_names_only(plan: &BuildPlan) {
  for id in &plan.impacted {
    println!("{}", id);
  }
}
