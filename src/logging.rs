//! Logging setup using `tracing` + `tracing-subscriber`
//!
//! Level priority:
//! 1. `--log-level` flag
//! 2. `CARGO_IMPACT_LOG` environment variable (e.g. "info", "debug")
//! 3. `warn`
//!
//! Logs go to stderr; stdout is reserved for command output.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::fmt;

pub const LOG_ENV_VAR: &str = "CARGO_IMPACT_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
  Error,
  Warn,
  Info,
  Debug,
  Trace,
}

impl From<LogLevel> for Level {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::Error => Level::ERROR,
      LogLevel::Warn => Level::WARN,
      LogLevel::Info => Level::INFO,
      LogLevel::Debug => Level::DEBUG,
      LogLevel::Trace => Level::TRACE,
    }
  }
}

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(cli_level: Option<LogLevel>) {
  let env_level = std::env::var(LOG_ENV_VAR).ok();
  let level = resolve_level(cli_level, env_level.as_deref());

  fmt()
    .with_max_level(level)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn resolve_level(cli_level: Option<LogLevel>, env_level: Option<&str>) -> Level {
  match cli_level {
    Some(level) => level.into(),
    None => env_level.and_then(parse_level_str).unwrap_or(Level::WARN),
  }
}

fn parse_level_str(s: &str) -> Option<Level> {
  match s.trim().to_lowercase().as_str() {
    "error" => Some(Level::ERROR),
    "warn" | "warning" => Some(Level::WARN),
    "info" => Some(Level::INFO),
    "debug" => Some(Level::DEBUG),
    "trace" => Some(Level::TRACE),
    _ => None,
  }
}
