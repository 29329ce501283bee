//! Pass orchestration -- drives read / parse / aggregate / evaluate / notify.
//!
//! The [`Orchestrator`] owns every blocking boundary of the pipeline: reading
//! the log source, exporting reports, and handing triggered alerts to the
//! configured notifier channels. The analysis itself (parsing, aggregation,
//! rule evaluation) is the synchronous core in `logsentry-analytics`.
//!
//! # Pass semantics
//!
//! A pass is self-contained: no aggregator or summary state survives into
//! the next pass, so re-running over an unchanged log file yields an
//! identical summary and identical triggered-alert set. In scheduled mode
//! passes never interleave -- each runs to completion before the next tick
//! is considered, and shutdown is only observed between passes.

use std::path::Path;

use anyhow::Result;

use logsentry_analytics::analysis::analyze_lines;
use logsentry_analytics::parser::ParserRouter;
use logsentry_analytics::report::AnalysisReport;
use logsentry_core::config::LogsentryConfig;
use logsentry_core::error::{LogsentryError, PipelineError};
use logsentry_core::pipeline::DynNotifier;

use crate::notify::{ConsoleNotifier, WebhookNotifier};

/// Outcome of a single analysis pass.
#[derive(Debug)]
pub struct PassOutcome {
    /// The rendered analysis report.
    pub report: AnalysisReport,
    /// Notifier channels that accepted the alert.
    pub notified: usize,
    /// Notifier channels that failed (logged, non-fatal).
    pub notify_failures: usize,
}

/// The daemon orchestrator.
///
/// Holds the loaded configuration, the parser router, and the notifier set
/// for the lifetime of the process. Carries no per-pass state.
pub struct Orchestrator {
    config: LogsentryConfig,
    router: ParserRouter,
    notifiers: Vec<Box<dyn DynNotifier>>,
}

impl Orchestrator {
    /// Build an orchestrator from a validated configuration.
    ///
    /// The console channel is always registered so triggered reports reach
    /// the operator even when webhook delivery is disabled or failing.
    pub fn from_config(config: LogsentryConfig) -> Self {
        let mut notifiers: Vec<Box<dyn DynNotifier>> = vec![Box::new(ConsoleNotifier::new())];

        if config.notify.enabled && !config.notify.webhook_url.is_empty() {
            notifiers.push(Box::new(WebhookNotifier::new(
                config.notify.webhook_url.clone(),
                config.notify.timeout_secs,
            )));
        }

        Self {
            config,
            router: ParserRouter::with_defaults(),
            notifiers,
        }
    }

    /// Registered notifier channel names (for startup logging and tests).
    pub fn notifier_channels(&self) -> Vec<&str> {
        self.notifiers.iter().map(|n| n.channel_name()).collect()
    }

    /// Run one self-contained analysis pass.
    ///
    /// A missing or unreadable log source fails the pass; everything after
    /// the read (rejected lines, export failures, notifier failures) is
    /// non-fatal and logged.
    pub async fn run_pass(&self) -> Result<PassOutcome, LogsentryError> {
        let pass_id = uuid::Uuid::new_v4().to_string();
        let path = &self.config.source.path;
        tracing::info!(pass_id = %pass_id, path = %path, "starting analysis pass");

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            LogsentryError::Pipeline(PipelineError::SourceUnavailable {
                path: path.clone(),
                reason: e.to_string(),
            })
        })?;

        let report = analyze_lines(
            content.lines(),
            &self.router,
            &self.config.source.format,
            &self.config.alerts,
            path,
        );

        tracing::info!(
            pass_id = %pass_id,
            entries = report.total_entries,
            rejected = report.rejected_lines,
            triggered = report.triggered.len(),
            "analysis pass aggregated"
        );

        self.export_reports(&report).await;

        let (notified, notify_failures) = if report.triggered.is_empty() {
            tracing::info!(pass_id = %pass_id, "no alert conditions triggered");
            (0, 0)
        } else {
            self.dispatch_alert(&report).await
        };

        Ok(PassOutcome {
            report,
            notified,
            notify_failures,
        })
    }

    /// Write the configured JSON/CSV exports. Failures are logged, non-fatal.
    async fn export_reports(&self, report: &AnalysisReport) {
        if !self.config.report.json_path.is_empty() {
            match report.to_json_pretty() {
                Ok(json) => {
                    if let Err(e) =
                        tokio::fs::write(Path::new(&self.config.report.json_path), json).await
                    {
                        tracing::error!(
                            path = %self.config.report.json_path,
                            error = %e,
                            "failed to write json report"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize json report");
                }
            }
        }

        if !self.config.report.csv_path.is_empty() {
            let csv = report.render_csv();
            if let Err(e) = tokio::fs::write(Path::new(&self.config.report.csv_path), csv).await {
                tracing::error!(
                    path = %self.config.report.csv_path,
                    error = %e,
                    "failed to write csv report"
                );
            }
        }
    }

    /// Hand the triggered report to every notifier channel.
    ///
    /// A failing channel is logged and does not stop the others; the
    /// summary and triggered set remain valid regardless.
    async fn dispatch_alert(&self, report: &AnalysisReport) -> (usize, usize) {
        let subject = format!(
            "{} {} rule(s) triggered",
            self.config.notify.subject_prefix,
            report.triggered.len()
        );
        let body = report.render_alert_body();

        let mut notified = 0;
        let mut failures = 0;
        for notifier in &self.notifiers {
            match notifier
                .notify(&subject, &body, &self.config.notify.recipients)
                .await
            {
                Ok(()) => notified += 1,
                Err(e) => {
                    failures += 1;
                    tracing::error!(
                        channel = notifier.channel_name(),
                        error = %e,
                        "alert delivery failed"
                    );
                }
            }
        }
        (notified, failures)
    }

    /// Run scheduled passes until a shutdown signal arrives.
    ///
    /// Each tick runs one pass to completion; a failed pass (for example a
    /// missing log file) is logged and the loop continues to the next tick.
    /// The shutdown signal is checked between passes only -- a running pass
    /// is never interrupted mid-aggregation.
    pub async fn run_scheduled(&self) -> Result<()> {
        let interval_secs = self.config.schedule.interval_secs;
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(interval_secs, "entering scheduled analysis loop");

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received, leaving scheduled loop");
                    break;
                }
            }

            match self.run_pass().await {
                Ok(outcome) => {
                    tracing::info!(
                        entries = outcome.report.total_entries,
                        triggered = outcome.report.triggered.len(),
                        notified = outcome.notified,
                        notify_failures = outcome.notify_failures,
                        "analysis pass completed"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "analysis pass failed, continuing to next tick");
                }
            }
        }

        Ok(())
    }
}
