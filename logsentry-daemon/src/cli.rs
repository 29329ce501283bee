//! CLI argument parsing for the daemon binary.
//!
//! Purely declarative clap derive definitions, no side effects.

use std::path::PathBuf;

use clap::Parser;

/// Logsentry daemon -- scheduled mobile AI-service log analysis and alerting.
#[derive(Parser, Debug)]
#[command(name = "logsentry-daemon", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logsentry.toml configuration file.
    #[arg(short, long, default_value = "logsentry.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Run exactly one analysis pass and exit, ignoring `[schedule]`.
    #[arg(long)]
    pub once: bool,
}
