//! Alert delivery channels.
//!
//! Implementations of the core [`Notifier`] trait. The console channel is
//! always available so a triggered report reaches the operator even when
//! webhook delivery is disabled or failing.

use std::time::Duration;

use logsentry_core::error::{LogsentryError, NotifyError};
use logsentry_core::pipeline::Notifier;

/// Console notifier -- surfaces the alert report through structured logging.
///
/// Delivery cannot fail; this is the operator-facing fallback channel.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier.
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn channel_name(&self) -> &str {
        "console"
    }

    async fn notify(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), LogsentryError> {
        tracing::warn!(subject, recipients = ?recipients, "operational alert triggered");
        for line in body.lines() {
            tracing::warn!("{line}");
        }
        Ok(())
    }
}

/// Webhook notifier -- POSTs the alert as a JSON payload.
///
/// Payload shape: `{"subject": ..., "body": ..., "recipients": [...]}`.
/// Delivery guarantees are out of scope; a non-2xx response or transport
/// error is reported as [`NotifyError::Delivery`] and logged by the caller.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl WebhookNotifier {
    /// Create a new webhook notifier for the given endpoint.
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Notifier for WebhookNotifier {
    fn channel_name(&self) -> &str {
        "webhook"
    }

    async fn notify(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), LogsentryError> {
        let payload = serde_json::json!({
            "subject": subject,
            "body": body,
            "recipients": recipients,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery {
                channel: "webhook".to_owned(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(NotifyError::Delivery {
                channel: "webhook".to_owned(),
                reason: format!("endpoint returned {}", response.status()),
            }
            .into());
        }

        tracing::debug!(endpoint = %self.endpoint, "alert delivered via webhook");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_notify_always_succeeds() {
        let notifier = ConsoleNotifier::new();
        notifier
            .notify("[logsentry] 2 rule(s) triggered", "line one\nline two", &[])
            .await
            .expect("console delivery cannot fail");
    }

    #[test]
    fn channel_names() {
        assert_eq!(ConsoleNotifier::new().channel_name(), "console");
        assert_eq!(
            WebhookNotifier::new("http://localhost/hook", 5).channel_name(),
            "webhook"
        );
    }

    #[test]
    fn webhook_keeps_endpoint() {
        let notifier = WebhookNotifier::new("http://alert-gw.internal/hook", 5);
        assert_eq!(notifier.endpoint(), "http://alert-gw.internal/hook");
    }

    #[tokio::test]
    async fn webhook_unreachable_endpoint_reports_delivery_error() {
        // 예약된 TEST-NET 주소 — 연결이 성립하지 않아야 함
        let notifier = WebhookNotifier::new("http://192.0.2.1:9/hook", 1);
        let err = notifier
            .notify("subject", "body", &["ops@example.com".to_owned()])
            .await
            .expect_err("delivery should fail");
        assert!(matches!(err, LogsentryError::Notify(_)));
    }

    #[tokio::test]
    async fn notifiers_usable_as_dyn_set() {
        use logsentry_core::pipeline::DynNotifier;
        let notifiers: Vec<Box<dyn DynNotifier>> = vec![
            Box::new(ConsoleNotifier::new()),
            Box::new(WebhookNotifier::new("http://localhost/hook", 1)),
        ];
        assert_eq!(notifiers[0].channel_name(), "console");
        assert_eq!(notifiers[1].channel_name(), "webhook");
    }
}
