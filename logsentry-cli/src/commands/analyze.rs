//! `analyze` command -- one analysis pass over a log file.

use std::io::Write;
use std::path::{Path, PathBuf};

use logsentry_analytics::analyze_lines;
use logsentry_analytics::parser::ParserRouter;
use logsentry_analytics::report::AnalysisReport;

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

use super::load_config_or_default;

const VALID_FORMATS: &[&str] = &["auto", "text", "jsonl"];

impl Render for AnalysisReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write!(w, "{}", self.render_table())
    }
}

/// Run one analysis pass and print the report.
///
/// The log file and format default to the `[source]` section of the config;
/// optional `--out-json` / `--out-csv` exports are written before rendering.
pub async fn run(
    args: &AnalyzeArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config_or_default(config_path).await?;

    let logfile = args
        .logfile
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.source.path));
    let format = args
        .format
        .clone()
        .unwrap_or_else(|| config.source.format.clone());

    if !VALID_FORMATS.contains(&format.as_str()) {
        return Err(CliError::Command(format!(
            "unknown log format '{format}', expected one of: {}",
            VALID_FORMATS.join(", ")
        )));
    }

    let content = tokio::fs::read_to_string(&logfile).await.map_err(|e| {
        CliError::Command(format!("cannot read log file {}: {e}", logfile.display()))
    })?;

    let router = ParserRouter::with_defaults();
    let report = analyze_lines(
        content.lines(),
        &router,
        &format,
        &config.alerts,
        &logfile.display().to_string(),
    );

    if let Some(path) = &args.out_json {
        tokio::fs::write(path, report.to_json_pretty()?).await?;
    }
    if let Some(path) = &args.out_csv {
        tokio::fs::write(path, report.render_csv()).await?;
    }

    writer.render(&report)?;
    Ok(())
}
