//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Logsentry -- mobile AI-service log analytics and alerting.
///
/// Use `logsentry <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logsentry", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logsentry.toml configuration file.
    #[arg(short, long, default_value = "logsentry.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(id = "output_format", long = "output", global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one analysis pass over a log file and print the report.
    Analyze(AnalyzeArgs),

    /// Convert a raw text log to JSON Lines.
    Convert(ConvertArgs),

    /// Inspect the effective alert rule set.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- analyze ----

/// Run a single analysis pass.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Log file to analyze (default: `[source].path` from the config).
    pub logfile: Option<PathBuf>,

    /// Log format: auto, text, or jsonl (default: `[source].format`).
    #[arg(long)]
    pub format: Option<String>,

    /// Also write the full report as JSON to this path.
    #[arg(long)]
    pub out_json: Option<PathBuf>,

    /// Also write model latency statistics as CSV to this path.
    #[arg(long)]
    pub out_csv: Option<PathBuf>,
}

// ---- convert ----

/// Convert raw text log lines to JSON Lines.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input raw text log file.
    pub input: PathBuf,

    /// Output JSON Lines file (created or truncated).
    pub output: PathBuf,
}

// ---- rules ----

/// Inspect alert rules.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List the effective rule set built from the configuration.
    List,
}

// ---- config ----

/// Manage logsentry configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, source, schedule, alerts, notify, report).
        #[arg(long)]
        section: Option<String>,
    },
}
