use anyhow::Result;
use clap::Parser;

use logsentry_core::config::LogsentryConfig;
use logsentry_daemon::cli::Cli;
use logsentry_daemon::logging;
use logsentry_daemon::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = LogsentryConfig::load(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;

    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }

    logging::init_tracing(&config.general)?;

    tracing::info!(
        config = %cli.config.display(),
        source = %config.source.path,
        "logsentry-daemon starting"
    );

    let run_once = cli.once || !config.schedule.enabled;
    let orchestrator = Orchestrator::from_config(config);
    tracing::info!(channels = ?orchestrator.notifier_channels(), "notifier channels ready");

    if run_once {
        let outcome = orchestrator
            .run_pass()
            .await
            .map_err(|e| anyhow::anyhow!("analysis pass failed: {}", e))?;
        tracing::info!(
            entries = outcome.report.total_entries,
            rejected = outcome.report.rejected_lines,
            triggered = outcome.report.triggered.len(),
            "single analysis pass completed"
        );
    } else {
        orchestrator.run_scheduled().await?;
    }

    tracing::info!("logsentry-daemon shut down");
    Ok(())
}
