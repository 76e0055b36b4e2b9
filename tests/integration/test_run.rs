//! Integration tests for `cargo impact run`

use crate::helpers::{TestWorkspace, run_cargo_impact};
use anyhow::Result;

fn workspace() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", &[])?;
  ws.add_crate("lib-b", &["lib-a"])?;
  ws.add_crate("lib-c", &[])?;
  ws.commit("Add crates")?;
  ws.baseline()?;
  Ok(ws)
}

#[test]
fn test_run_dry_run_lists_impacted_packages() -> Result<()> {
  let ws = workspace()?;
  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() -> &'static str { \"Changed\" }\n")?;
  ws.commit("Change lib-a")?;

  let output = run_cargo_impact(&ws.path, &["impact", "run", "test", "--dry-run", "--", "--lib"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY RUN"), "got: {}", stdout);
  assert!(stdout.contains("cargo test -p lib-a -p lib-b --lib"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_run_nothing_impacted_is_noop() -> Result<()> {
  let ws = workspace()?;

  let output = run_cargo_impact(&ws.path, &["impact", "run", "check"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("nothing to run"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_run_executes_cargo() -> Result<()> {
  let ws = workspace()?;
  ws.modify_file("lib-c", "src/lib.rs", "pub fn hello() -> &'static str { \"Changed\" }\n")?;
  ws.commit("Change lib-c")?;
  ws.generate_lockfile()?;

  // pkgid reads Cargo.lock without compiling anything
  let output = run_cargo_impact(&ws.path, &["impact", "run", "pkgid"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Executing: cargo pkgid -p lib-c"), "got: {}", stdout);
  assert!(stdout.contains("completed for 1 crates"), "got: {}", stdout);

  Ok(())
}
