//! `cargo impact config` - Print the effective configuration

use crate::core::context::WorkspaceContext;
use crate::core::error::ImpactResult;

/// Run the config command
pub fn run_config(ctx: &WorkspaceContext) -> ImpactResult<()> {
  let config = &ctx.config;

  match &config.source {
    Some(path) => println!("# source: {}", path.display()),
    None => println!("# source: defaults (no impact.toml found)"),
  }

  for (name, value) in config.properties.effective() {
    println!("{} = {}", name, value);
  }

  Ok(())
}
