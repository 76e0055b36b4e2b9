//! `cargo impact plan` - Show impacted crates and the skipped crates' override arguments

use super::OutputFormat;
use crate::core::context::WorkspaceContext;
use crate::core::error::{GitError, ImpactError, ImpactResult};
use crate::core::vcs::{GitChangeSet, SystemGit};
use crate::graph::policy::PolicyConfig;
use crate::graph::{BuildPlan, Selection, plan};
use tracing::warn;

/// Collect the change set for this workspace and plan the build.
///
/// Without a git repository and with `impact.fail_on_missing_git_dir=false`,
/// every module is impacted.
pub fn collect_plan(ctx: &WorkspaceContext) -> ImpactResult<BuildPlan> {
  let config = &ctx.config;

  if !config.policy.selects_modules() {
    return Ok(plan::plan(&[], &ctx.graph, &config.policy));
  }

  let git = match SystemGit::open(ctx.workspace_root()) {
    Ok(git) => git,
    Err(ImpactError::Git(GitError::RepoNotFound { path })) if !config.vcs.fail_on_missing_git_dir => {
      warn!(path = %path.display(), "no git repository found, building every module");
      let build_all = PolicyConfig {
        build_all: true,
        ..config.policy.clone()
      };
      return Ok(plan::plan(&[], &ctx.graph, &build_all));
    }
    Err(e) => return Err(e),
  };

  let changes = GitChangeSet::new(git, &config.vcs);
  plan::plan_with(&changes, &ctx.graph, &config.policy)
}

/// Run the plan command
pub fn run_plan(ctx: &WorkspaceContext, format: String) -> ImpactResult<()> {
  let format = OutputFormat::from_str(&format)?;
  let plan = collect_plan(ctx)?;

  match format {
    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
    OutputFormat::Text => display_text(&plan),
    OutputFormat::NamesOnly => {
      return Err(ImpactError::with_help(
        "Format 'names-only' is not supported by plan",
        "Use 'cargo impact affected --format names-only' to list impacted crates",
      ));
    }
  }

  Ok(())
}

fn display_text(plan: &BuildPlan) {
  println!("Build Plan");
  println!("==========");
  println!();

  match plan.selection {
    Selection::Impacted => println!("Selection: impact analysis ({} changed files)", plan.changed_files.len()),
    Selection::BuildAll => println!("Selection: build all (impact.build_all)"),
    Selection::Disabled => println!("Selection: disabled (impact.enabled=false)"),
  }
  println!();

  println!("Impacted: {} crates", plan.impacted.len());
  for id in &plan.impacted {
    let marker = if plan.changed.contains(id) {
      "changed"
    } else if plan.forced.contains(id) {
      "forced"
    } else {
      "dependent"
    };
    println!("  {} ({})", id, marker);
  }
  println!();

  println!("Skipped: {} crates", plan.skipped.len());
  for (id, args) in &plan.skipped {
    if args.is_empty() {
      println!("  {}", id);
    } else {
      let rendered: Vec<String> = args.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
      println!("  {} [{}]", id, rendered.join(" "));
    }
  }
}
