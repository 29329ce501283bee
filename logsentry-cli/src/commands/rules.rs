//! `rules list` command -- inspect the effective alert rule set.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use logsentry_analytics::rule::RuleSet;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

use super::load_config_or_default;

/// One rule as shown to the operator.
#[derive(Debug, Serialize)]
pub struct RuleInfo {
    /// Rule name.
    pub name: String,
    /// Whether the rule is evaluated.
    pub enabled: bool,
    /// Comparator applied to the observed value.
    pub comparator: String,
    /// Configured threshold.
    pub threshold: f64,
}

/// The effective rule set built from the configuration.
#[derive(Debug, Serialize)]
pub struct RulesList {
    /// Rules in evaluation order.
    pub rules: Vec<RuleInfo>,
}

impl Render for RulesList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "{:<18} {:<8} {:<4} {:>10}",
            "Rule", "Enabled", "Cmp", "Threshold"
        )?;
        writeln!(w, "{}", "-".repeat(44))?;
        for rule in &self.rules {
            writeln!(
                w,
                "{:<18} {:<8} {:<4} {:>10}",
                rule.name, rule.enabled, rule.comparator, rule.threshold
            )?;
        }
        Ok(())
    }
}

/// List the rules in evaluation order with their thresholds.
pub async fn run(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = load_config_or_default(config_path).await?;
    let set = RuleSet::from_config(&config.alerts);

    let rules = set
        .rules()
        .iter()
        .map(|rule| RuleInfo {
            name: rule.name.clone(),
            enabled: rule.enabled,
            comparator: rule.comparator.to_string(),
            threshold: rule.threshold,
        })
        .collect();

    writer.render(&RulesList { rules })?;
    Ok(())
}
