//! Subcommand handlers.
//!
//! Each submodule exposes a `run` function that takes its parsed arguments
//! plus the shared [`OutputWriter`](crate::output::OutputWriter).

pub mod analyze;
pub mod config;
pub mod convert;
pub mod rules;

use std::path::Path;

use logsentry_core::config::LogsentryConfig;

use crate::error::CliError;

/// Load the configuration file, falling back to defaults when it is absent.
///
/// One-shot commands (`analyze`, `rules list`, `config show`) should work out
/// of the box without a config file; `config validate` uses strict loading.
pub(crate) async fn load_config_or_default(path: &Path) -> Result<LogsentryConfig, CliError> {
    if path.exists() {
        LogsentryConfig::load(path)
            .await
            .map_err(|e| CliError::Config(e.to_string()))
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        let mut config = LogsentryConfig::default();
        config.apply_env_overrides();
        config
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(config)
    }
}
