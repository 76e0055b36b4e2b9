//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A test workspace with git history
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new test workspace with basic structure
  pub fn new() -> Result<Self> {
    let ws = Self::without_git()?;

    // Initialize git repo with main as default branch
    git(&ws.path, &["init", "--initial-branch=main"])?;
    git(&ws.path, &["config", "user.name", "Test User"])?;
    git(&ws.path, &["config", "user.email", "test@example.com"])?;

    git(&ws.path, &["add", "."])?;
    git(&ws.path, &["commit", "-m", "Initial workspace setup"])?;

    Ok(ws)
  }

  /// Create a workspace that is not a git repository
  pub fn without_git() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    std::fs::write(
      path.join("Cargo.toml"),
      r#"[workspace]
members = ["crates/*"]
resolver = "2"

[workspace.package]
edition = "2021"
license = "MIT"
"#,
    )?;

    // Keep cargo's lockfile out of the untracked change set
    std::fs::write(path.join(".gitignore"), "/target\nCargo.lock\n")?;

    Ok(Self { _root: root, path })
  }

  /// Add a crate to the workspace, depending on other workspace crates by path
  pub fn add_crate(&self, name: &str, deps: &[&str]) -> Result<PathBuf> {
    let crate_path = self.path.join("crates").join(name);
    std::fs::create_dir_all(crate_path.join("src"))?;

    let mut cargo_toml = format!(
      r#"[package]
name = "{}"
version = "0.1.0"
edition.workspace = true
license.workspace = true

[dependencies]
"#,
      name
    );

    for dep in deps {
      cargo_toml.push_str(&format!("{} = {{ path = \"../{}\" }}\n", dep, dep));
    }

    std::fs::write(crate_path.join("Cargo.toml"), cargo_toml)?;
    std::fs::write(
      crate_path.join("src/lib.rs"),
      format!("pub fn hello() -> &'static str {{\n    \"Hello from {}\"\n}}\n", name),
    )?;
    std::fs::write(crate_path.join("README.md"), format!("# {}\n", name))?;

    Ok(crate_path)
  }

  /// Declare a crate's packaging in `[package.metadata.impact]`
  pub fn set_packaging(&self, name: &str, packaging: &str) -> Result<()> {
    let manifest = self.path.join("crates").join(name).join("Cargo.toml");
    let mut content = std::fs::read_to_string(&manifest)?;
    content.push_str(&format!("\n[package.metadata.impact]\npackaging = \"{}\"\n", packaging));
    std::fs::write(manifest, content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Mark the current commit as the comparison baseline (`origin/main`)
  pub fn baseline(&self) -> Result<()> {
    git(&self.path, &["branch", "origin/main"])?;
    Ok(())
  }

  /// Write a file in a crate (creating it if needed)
  pub fn modify_file(&self, crate_name: &str, file: &str, content: &str) -> Result<()> {
    let file_path = self.path.join("crates").join(crate_name).join(file);
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Resolve the workspace into Cargo.lock (ignored by git)
  pub fn generate_lockfile(&self) -> Result<()> {
    let output = Command::new("cargo")
      .current_dir(&self.path)
      .args(["generate-lockfile", "--offline"])
      .output()
      .context("Failed to run cargo generate-lockfile")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      anyhow::bail!("cargo generate-lockfile failed\n{}", stderr);
    }

    Ok(())
  }

  /// Write a file relative to the workspace root
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(path), content)?;
    Ok(())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

fn cargo_impact(cwd: &Path, args: &[&str]) -> Result<Output> {
  let cargo_impact_bin = env!("CARGO_BIN_EXE_cargo-impact");

  Command::new(cargo_impact_bin)
    .current_dir(cwd)
    .env_remove("CARGO_IMPACT_LOG")
    .args(args)
    .output()
    .context("Failed to run cargo-impact")
}

/// Run cargo-impact CLI command, failing on a non-zero exit
pub fn run_cargo_impact(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = cargo_impact(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "cargo-impact command failed: cargo {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run cargo-impact CLI command that is expected to fail
pub fn run_cargo_impact_failing(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = cargo_impact(cwd, args)?;

  if output.status.success() {
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!("cargo-impact unexpectedly succeeded: cargo {}\nstdout: {}", args.join(" "), stdout);
  }

  Ok(output)
}

/// Non-empty stdout lines
pub fn stdout_lines(output: &Output) -> Vec<String> {
  String::from_utf8_lossy(&output.stdout)
    .lines()
    .map(|line| line.trim().to_string())
    .filter(|line| !line.is_empty())
    .collect()
}

/// Parse stdout as JSON
pub fn stdout_json(output: &Output) -> Result<serde_json::Value> {
  serde_json::from_slice(&output.stdout).context("stdout is not valid JSON")
}
