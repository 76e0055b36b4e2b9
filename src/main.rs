mod cargo;
mod commands;
mod core;
mod graph;
mod logging;
mod utils;

use clap::{Parser, Subcommand};
use core::error::{ImpactError, print_error};
use logging::LogLevel;

/// Build only what a change actually affects
#[derive(Parser)]
#[command(name = "cargo")]
#[command(bin_name = "cargo")]
#[command(styles = get_styles())]
enum CargoCli {
  Impact(ImpactCli),
}

#[derive(Parser)]
#[command(name = "impact")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct ImpactCli {
  /// Override a configuration property (e.g. -D impact.build_all=true)
  #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", global = true)]
  define: Vec<String>,

  /// Log level (default: CARGO_IMPACT_LOG, then warn)
  #[arg(long, value_enum, global = true)]
  log_level: Option<LogLevel>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show which crates are affected by changes
  Affected {
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
  },

  /// Show impacted crates and skipped crates with their override arguments
  Plan {
    /// Output format: text (default), json
    #[arg(long, default_value = "text")]
    format: String,
  },

  /// Run a cargo subcommand for impacted crates
  Run {
    /// Cargo subcommand (test, check, clippy, build, ...)
    subcommand: String,
    /// Show the cargo invocation without executing it
    #[arg(long)]
    dry_run: bool,
    /// Additional arguments passed to cargo (after `--`)
    #[arg(last = true)]
    cargo_args: Vec<String>,
  },

  /// Print the effective configuration
  Config,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let CargoCli::Impact(cli) = CargoCli::parse();

  logging::init_logging(cli.log_level);

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  // Build workspace context once (root, then config, then metadata and graph)
  let ctx = match core::context::WorkspaceContext::build(&cwd, &cli.define) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Affected { format } => commands::run_affected(&ctx, format),
    Commands::Plan { format } => commands::run_plan(&ctx, format),
    Commands::Run {
      subcommand,
      dry_run,
      cargo_args,
    } => commands::run_cargo(&ctx, subcommand, dry_run, cargo_args),
    Commands::Config => commands::run_config(&ctx),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ImpactError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
