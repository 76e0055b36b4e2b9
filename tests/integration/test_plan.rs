//! Integration tests for `cargo impact plan` and the module policy properties

use crate::helpers::{TestWorkspace, run_cargo_impact, stdout_json};
use anyhow::Result;

/// app depends on facade, facade depends on core; tools stands alone
fn layered() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("core", &[])?;
  ws.add_crate("facade", &["core"])?;
  ws.add_crate("app", &["facade"])?;
  ws.add_crate("tools", &[])?;
  ws.set_packaging("facade", "aggregator")?;
  ws.commit("Add crates")?;
  ws.baseline()?;

  ws.modify_file("core", "src/lib.rs", "pub fn hello() -> &'static str { \"Changed\" }\n")?;
  ws.commit("Change core")?;
  Ok(ws)
}

fn plan_json(ws: &TestWorkspace, defines: &[&str]) -> Result<serde_json::Value> {
  let mut args = vec!["impact"];
  for define in defines {
    args.push("-D");
    args.push(define);
  }
  args.extend(["plan", "--format", "json"]);

  let output = run_cargo_impact(&ws.path, &args)?;
  stdout_json(&output)
}

#[test]
fn test_plan_default_policy() -> Result<()> {
  let ws = layered()?;
  let json = plan_json(&ws, &[])?;

  assert_eq!(json["selection"], "impacted");
  assert_eq!(json["changed"], serde_json::json!(["core"]));
  assert_eq!(json["impacted"], serde_json::json!(["app", "core", "facade"]));
  assert_eq!(json["skipped"], serde_json::json!({ "tools": {} }));

  Ok(())
}

#[test]
fn test_plan_args_for_skipped_modules() -> Result<()> {
  let ws = layered()?;
  let json = plan_json(&ws, &["impact.args_for_skipped_modules=skip-tests=true lint=false"])?;

  assert_eq!(json["skipped"]["tools"]["skip-tests"], "true");
  assert_eq!(json["skipped"]["tools"]["lint"], "false");

  Ok(())
}

#[test]
fn test_plan_force_build_modules() -> Result<()> {
  let ws = layered()?;
  let json = plan_json(&ws, &["impact.force_build_modules=too.*"])?;

  assert_eq!(json["impacted"], serde_json::json!(["app", "core", "facade", "tools"]));
  assert_eq!(json["forced"], serde_json::json!(["tools"]));
  assert_eq!(json["skipped"], serde_json::json!({}));

  Ok(())
}

#[test]
fn test_plan_text_labels_forced_modules() -> Result<()> {
  let ws = layered()?;

  let output = run_cargo_impact(&ws.path, &["impact", "-D", "impact.force_build_modules=tools", "plan"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("tools (forced)"), "got: {}", stdout);
  assert!(stdout.contains("facade (dependent)"), "got: {}", stdout);
  assert!(!stdout.contains("tools (dependent)"), "got: {}", stdout);

  let output = run_cargo_impact(
    &ws.path,
    &["impact", "-D", "impact.force_build_modules=tools", "affected", "--format", "json"],
  )?;
  let json = stdout_json(&output)?;

  assert_eq!(json["impact"]["forced"], serde_json::json!(["tools"]));
  assert_eq!(json["impact"]["dependents"], serde_json::json!(["app", "facade"]));
  assert_eq!(json["summary"]["forced_count"], 1);

  Ok(())
}

#[test]
fn test_plan_exclude_transitive_modules() -> Result<()> {
  let ws = layered()?;
  let json = plan_json(&ws, &["impact.exclude_transitive_modules=app,core"])?;

  // core changed directly, so the exclusion does not apply to it
  assert_eq!(json["impacted"], serde_json::json!(["core", "facade"]));
  assert!(json["skipped"].get("app").is_some());

  Ok(())
}

#[test]
fn test_plan_exclude_transitive_packaging() -> Result<()> {
  let ws = layered()?;
  let json = plan_json(&ws, &["impact.exclude_transitive_modules_packaged_as=aggregator"])?;

  // facade is skipped but app is still reached through it
  assert_eq!(json["impacted"], serde_json::json!(["app", "core"]));
  assert!(json["skipped"].get("facade").is_some());

  Ok(())
}

#[test]
fn test_plan_build_all() -> Result<()> {
  let ws = layered()?;
  let json = plan_json(&ws, &["impact.build_all=true"])?;

  assert_eq!(json["selection"], "build-all");
  assert_eq!(json["impacted"], serde_json::json!(["app", "core", "facade", "tools"]));

  Ok(())
}

#[test]
fn test_plan_disabled() -> Result<()> {
  let ws = layered()?;
  let json = plan_json(&ws, &["impact.enabled=false"])?;

  assert_eq!(json["selection"], "disabled");
  assert_eq!(json["impacted"], serde_json::json!(["app", "core", "facade", "tools"]));
  assert_eq!(json["skipped"], serde_json::json!({}));

  Ok(())
}

#[test]
fn test_plan_reads_impact_toml() -> Result<()> {
  let ws = layered()?;
  ws.write_file(
    "impact.toml",
    r#"force_build_modules = ["tools"]

[args_for_skipped_modules]
skip-tests = "true"
"#,
  )?;
  ws.commit("Add impact.toml")?;

  let json = plan_json(&ws, &[])?;
  assert_eq!(json["impacted"], serde_json::json!(["app", "core", "facade", "tools"]));

  let json = plan_json(&ws, &["impact.force_build_modules="])?;
  assert_eq!(json["skipped"]["tools"]["skip-tests"], "true");

  Ok(())
}

#[test]
fn test_plan_text_output() -> Result<()> {
  let ws = layered()?;

  let output = run_cargo_impact(
    &ws.path,
    &["impact", "-D", "impact.args_for_skipped_modules=skip-tests=true", "plan"],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Impacted: 3 crates"), "got: {}", stdout);
  assert!(stdout.contains("core (changed)"), "got: {}", stdout);
  assert!(stdout.contains("app (dependent)"), "got: {}", stdout);
  assert!(stdout.contains("tools [skip-tests=true]"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_plan_without_git_when_allowed() -> Result<()> {
  let ws = TestWorkspace::without_git()?;
  ws.add_crate("core", &[])?;
  ws.add_crate("app", &["core"])?;

  let json = plan_json(&ws, &["impact.fail_on_missing_git_dir=false"])?;
  assert_eq!(json["impacted"], serde_json::json!(["app", "core"]));

  Ok(())
}
