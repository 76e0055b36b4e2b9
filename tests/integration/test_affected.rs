//! Integration tests for `cargo impact affected`

use crate::helpers::{TestWorkspace, run_cargo_impact, stdout_json, stdout_lines};
use anyhow::Result;

/// lib-b depends on lib-a, lib-c stands alone
fn three_crates() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", &[])?;
  ws.add_crate("lib-b", &["lib-a"])?;
  ws.add_crate("lib-c", &[])?;
  ws.commit("Add crates")?;
  ws.baseline()?;
  Ok(ws)
}

#[test]
fn test_affected_propagates_to_dependents() -> Result<()> {
  let ws = three_crates()?;

  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() -> &'static str { \"Modified\" }\n")?;
  ws.commit("Modify lib-a")?;

  let output = run_cargo_impact(&ws.path, &["impact", "affected", "--format", "names-only"])?;
  assert_eq!(stdout_lines(&output), vec!["lib-a", "lib-b"]);

  Ok(())
}

#[test]
fn test_affected_leaf_change_stays_local() -> Result<()> {
  let ws = three_crates()?;

  ws.modify_file("lib-b", "README.md", "# lib-b\n\nUpdated.\n")?;
  ws.commit("Touch lib-b docs")?;

  let output = run_cargo_impact(&ws.path, &["impact", "affected", "--format", "names"])?;
  assert_eq!(stdout_lines(&output), vec!["lib-b"]);

  Ok(())
}

#[test]
fn test_affected_no_changes() -> Result<()> {
  let ws = three_crates()?;

  let output = run_cargo_impact(&ws.path, &["impact", "affected"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Changed files: 0"), "Should indicate no changes, got: {}", stdout);
  assert!(stdout.contains("Impacted (after policy): 0 crates"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_affected_json_output() -> Result<()> {
  let ws = three_crates()?;

  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() -> &'static str { \"Changed\" }\n")?;
  ws.commit("Change lib-a")?;

  let output = run_cargo_impact(&ws.path, &["impact", "affected", "--format", "json"])?;
  let json = stdout_json(&output)?;

  assert_eq!(json["selection"], "impacted");
  assert_eq!(json["changed_files"], serde_json::json!(["crates/lib-a/src/lib.rs"]));
  assert_eq!(json["impact"]["direct"], serde_json::json!(["lib-a"]));
  assert_eq!(json["impact"]["dependents"], serde_json::json!(["lib-b"]));
  assert_eq!(json["summary"]["impacted_count"], 2);

  Ok(())
}

#[test]
fn test_affected_includes_uncommitted_and_untracked() -> Result<()> {
  let ws = three_crates()?;

  // Unstaged edit in lib-c, untracked file in lib-b
  ws.modify_file("lib-c", "src/lib.rs", "pub fn hello() -> &'static str { \"Local\" }\n")?;
  ws.modify_file("lib-b", "src/extra.rs", "pub fn extra() {}\n")?;

  let output = run_cargo_impact(&ws.path, &["impact", "affected", "--format", "names-only"])?;
  assert_eq!(stdout_lines(&output), vec!["lib-b", "lib-c"]);

  Ok(())
}

#[test]
fn test_affected_local_changes_can_be_ignored() -> Result<()> {
  let ws = three_crates()?;

  ws.modify_file("lib-c", "src/lib.rs", "pub fn hello() -> &'static str { \"Local\" }\n")?;
  ws.modify_file("lib-b", "src/extra.rs", "pub fn extra() {}\n")?;

  let output = run_cargo_impact(
    &ws.path,
    &[
      "impact",
      "-D",
      "impact.uncommitted=false",
      "-D",
      "impact.untracked=false",
      "affected",
      "--format",
      "names-only",
    ],
  )?;
  assert!(stdout_lines(&output).is_empty());

  Ok(())
}

#[test]
fn test_affected_exclude_path_regex() -> Result<()> {
  let ws = three_crates()?;

  ws.modify_file("lib-a", "README.md", "# lib-a\n\nDocs only.\n")?;
  ws.commit("Docs")?;

  let output = run_cargo_impact(
    &ws.path,
    &[
      "impact",
      "-D",
      r"impact.exclude_path_regex=\.md$",
      "affected",
      "--format",
      "names-only",
    ],
  )?;
  assert!(stdout_lines(&output).is_empty());

  Ok(())
}

#[test]
fn test_affected_disable_branch_comparison() -> Result<()> {
  let ws = three_crates()?;

  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() -> &'static str { \"Committed\" }\n")?;
  ws.commit("Committed change")?;
  ws.modify_file("lib-c", "src/lib.rs", "pub fn hello() -> &'static str { \"Local\" }\n")?;

  let output = run_cargo_impact(
    &ws.path,
    &[
      "impact",
      "-D",
      "impact.disable_branch_comparison",
      "affected",
      "--format",
      "names-only",
    ],
  )?;
  assert_eq!(stdout_lines(&output), vec!["lib-c"]);

  Ok(())
}

#[test]
fn test_affected_custom_reference_branch() -> Result<()> {
  let ws = three_crates()?;

  ws.modify_file("lib-c", "src/lib.rs", "pub fn hello() -> &'static str { \"First\" }\n")?;
  ws.commit("Change lib-c")?;
  crate::helpers::git(&ws.path, &["branch", "release"])?;

  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() -> &'static str { \"Second\" }\n")?;
  ws.commit("Change lib-a")?;

  let output = run_cargo_impact(
    &ws.path,
    &[
      "impact",
      "-D",
      "impact.reference_branch=release",
      "affected",
      "--format",
      "names-only",
    ],
  )?;
  assert_eq!(stdout_lines(&output), vec!["lib-a", "lib-b"]);

  Ok(())
}

#[test]
fn test_affected_build_downstream_off() -> Result<()> {
  let ws = three_crates()?;

  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() -> &'static str { \"Modified\" }\n")?;
  ws.commit("Modify lib-a")?;

  let output = run_cargo_impact(
    &ws.path,
    &[
      "impact",
      "-D",
      "impact.build_downstream=false",
      "affected",
      "--format",
      "names-only",
    ],
  )?;
  assert_eq!(stdout_lines(&output), vec!["lib-a"]);

  Ok(())
}
