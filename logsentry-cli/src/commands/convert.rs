//! `convert` command -- raw text log to JSON Lines.

use std::io::Write;

use serde::Serialize;

use logsentry_analytics::parser::TextLogParser;
use logsentry_core::pipeline::LogParser;

use crate::cli::ConvertArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Conversion result summary.
#[derive(Debug, Serialize)]
pub struct ConvertSummary {
    /// Input raw text log path.
    pub input: String,
    /// Output JSON Lines path.
    pub output: String,
    /// Successfully converted entries.
    pub entries: u64,
    /// Lines rejected by the text grammar.
    pub rejected: u64,
}

impl Render for ConvertSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "Parsed {} log entries ({} rejected).",
            self.entries, self.rejected
        )?;
        writeln!(w, "JSON Lines written to {}", self.output)?;
        Ok(())
    }
}

/// Convert a raw text log file to JSON Lines.
///
/// Rejected lines are counted and logged, not fatal. The output file is
/// created or truncated.
pub async fn run(args: &ConvertArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(&args.input).await.map_err(|e| {
        CliError::Command(format!("cannot read log file {}: {e}", args.input.display()))
    })?;

    let parser = TextLogParser::new();
    let mut out = String::new();
    let mut entries: u64 = 0;
    let mut rejected: u64 = 0;

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parser.parse(line) {
            Ok(entry) => {
                out.push_str(&serde_json::to_string(&entry)?);
                out.push('\n');
                entries += 1;
            }
            Err(e) => {
                rejected += 1;
                tracing::warn!(line_no = idx + 1, error = %e, "skipping unparseable log line");
            }
        }
    }

    tokio::fs::write(&args.output, out).await?;

    writer.render(&ConvertSummary {
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        entries,
        rejected,
    })?;
    Ok(())
}
