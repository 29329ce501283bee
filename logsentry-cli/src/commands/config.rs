//! `config` command -- validate and show the effective configuration.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use logsentry_core::config::LogsentryConfig;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

use super::load_config_or_default;

/// Result of `config validate`.
#[derive(Debug, Serialize)]
pub struct ValidateResult {
    /// Path of the validated file.
    pub path: String,
    /// Always true on success (errors abort before rendering).
    pub valid: bool,
}

impl Render for ValidateResult {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "configuration OK: {}", self.path)
    }
}

/// Effective configuration for `config show`.
#[derive(Debug, Serialize)]
pub struct ConfigShow {
    /// Selected section, or None for the full configuration.
    pub section: Option<String>,
    /// The effective values as a JSON tree.
    pub config: serde_json::Value,
    /// TOML rendering for text output.
    #[serde(skip)]
    toml_text: String,
}

impl Render for ConfigShow {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write!(w, "{}", self.toml_text)
    }
}

/// Strictly load and validate the configuration file.
pub async fn run_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    LogsentryConfig::load(config_path)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;

    writer.render(&ValidateResult {
        path: config_path.display().to_string(),
        valid: true,
    })?;
    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
pub async fn run_show(
    config_path: &Path,
    section: Option<&str>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config_or_default(config_path).await?;
    let payload = build_show_payload(&config, section)?;
    writer.render(&payload)?;
    Ok(())
}

fn build_show_payload(
    config: &LogsentryConfig,
    section: Option<&str>,
) -> Result<ConfigShow, CliError> {
    fn section_payload<T: Serialize>(value: &T) -> Result<(serde_json::Value, String), CliError> {
        let json = serde_json::to_value(value)?;
        let toml_text =
            toml::to_string_pretty(value).map_err(|e| CliError::Command(e.to_string()))?;
        Ok((json, toml_text))
    }

    let (json, toml_text) = match section {
        None => section_payload(config)?,
        Some("general") => section_payload(&config.general)?,
        Some("source") => section_payload(&config.source)?,
        Some("schedule") => section_payload(&config.schedule)?,
        Some("alerts") => section_payload(&config.alerts)?,
        Some("notify") => section_payload(&config.notify)?,
        Some("report") => section_payload(&config.report)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown config section '{other}'"
            )));
        }
    };

    Ok(ConfigShow {
        section: section.map(str::to_owned),
        config: json,
        toml_text,
    })
}
