//! 보고서 렌더링 -- 분석 결과를 JSON / 터미널 표 / CSV / 알림 본문으로 출력
//!
//! [`AnalysisReport`]는 한 번의 분석 패스의 최종 산출물입니다.
//! 지표 요약과 트리거된 알림 목록에 패스 메타데이터(소스, 시각,
//! 파싱/거부 카운트)를 더해 직렬화 가능한 형태로 묶습니다.

use chrono::Utc;
use serde::Serialize;

use logsentry_core::types::{
    ANOMALY_GPU_OOM, ANOMALY_WIFI_DISCONNECTED, LogLevel, MetricsSummary, TriggeredAlert,
};

/// 분석 보고서
///
/// `summary`와 `triggered`는 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// 보고서 생성 시각 (RFC 3339, UTC)
    pub generated_at: String,
    /// 분석한 로그 소스 라벨 (파일 경로 등)
    pub source: String,
    /// 집계에 포함된 엔트리 수
    pub total_entries: u64,
    /// 형식 불일치로 건너뛴 라인 수
    pub rejected_lines: u64,
    /// 지표 요약
    pub summary: MetricsSummary,
    /// 트리거된 알림 (룰 셋 등록 순서)
    pub triggered: Vec<TriggeredAlert>,
}

impl AnalysisReport {
    /// 새 보고서를 생성합니다.
    pub fn new(
        source: impl Into<String>,
        summary: MetricsSummary,
        triggered: Vec<TriggeredAlert>,
        total_entries: u64,
        rejected_lines: u64,
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            source: source.into(),
            total_entries,
            rejected_lines,
            summary,
            triggered,
        }
    }

    /// 보고서를 pretty JSON 문자열로 직렬화합니다.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 터미널용 표 형식으로 렌더링합니다.
    pub fn render_table(&self) -> String {
        let mut out = String::new();

        out.push_str("=== Log Analysis Report ===\n");
        out.push_str(&format!("source  : {}\n", self.source));
        out.push_str(&format!(
            "entries : {} ({} rejected)\n",
            self.total_entries, self.rejected_lines
        ));

        out.push_str("\n[Log Levels]\n");
        for level in [
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::Debug,
            LogLevel::Unknown,
        ] {
            out.push_str(&format!(
                "  {:<7}: {}\n",
                level.to_string(),
                self.summary.level_count(level)
            ));
        }

        out.push_str("\n[AI Model Latency]\n");
        if self.summary.model_stats.is_empty() {
            out.push_str("  (no latency samples)\n");
        } else {
            for (model, stats) in &self.summary.model_stats {
                out.push_str(&format!(
                    "  {}: avg = {:.2} ms, p95 = {} ms\n",
                    model, stats.avg_ms, stats.p95_ms
                ));
            }
        }

        out.push_str("\n[User Logins]\n");
        if self.summary.user_login.is_empty() {
            out.push_str("  (no login activity)\n");
        } else {
            for (user, stats) in &self.summary.user_login {
                out.push_str(&format!(
                    "  {}: success = {}, failure = {}\n",
                    user, stats.success, stats.failure
                ));
            }
        }

        let buckets = &self.summary.http_status_buckets;
        out.push_str("\n[HTTP Status]\n");
        out.push_str(&format!(
            "  2xx = {}, 4xx = {}, 5xx = {}\n",
            buckets.status_2xx, buckets.status_4xx, buckets.status_5xx
        ));

        out.push_str("\n[Network Anomalies]\n");
        if self.summary.anomaly_counts.is_empty() {
            out.push_str("  (none)\n");
        } else {
            for (name, count) in &self.summary.anomaly_counts {
                out.push_str(&format!("  {name} = {count}\n"));
            }
        }

        out.push_str("\n[Triggered Alerts]\n");
        if self.triggered.is_empty() {
            out.push_str("  (none)\n");
        } else {
            for alert in &self.triggered {
                out.push_str(&format!(
                    "  {}: observed {}\n",
                    alert.rule_name, alert.observed_value
                ));
            }
        }

        out
    }

    /// 모델 지연 통계만 담는 CSV를 렌더링합니다.
    ///
    /// 열: `model,avg_ms,p95_ms`. 모델 이름 오름차순.
    pub fn render_csv(&self) -> String {
        let mut out = String::from("model,avg_ms,p95_ms\n");
        for (model, stats) in &self.summary.model_stats {
            out.push_str(&format!(
                "{},{:.2},{}\n",
                csv_field(model),
                stats.avg_ms,
                stats.p95_ms
            ));
        }
        out
    }

    /// 알림 본문 텍스트를 렌더링합니다.
    ///
    /// 전체 지표 개요, 트리거된 조건, 후속 조치 안내로 구성됩니다.
    pub fn render_alert_body(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("Mobile AI service log health check result:".to_owned());
        lines.push(String::new());
        lines.push("[Overall metrics]".to_owned());
        lines.push(format!(
            "- ERROR lines: {}",
            self.summary.level_count(LogLevel::Error)
        ));
        lines.push(format!(
            "- HTTP 5xx responses: {}",
            self.summary.http_status_buckets.status_5xx
        ));
        lines.push(format!(
            "- GPU OOM events: {}",
            self.summary.anomaly_count(ANOMALY_GPU_OOM)
        ));
        lines.push(format!(
            "- WiFi disconnects: {}",
            self.summary.anomaly_count(ANOMALY_WIFI_DISCONNECTED)
        ));
        if self.summary.model_stats.is_empty() {
            lines.push("- model latency: no samples in this window".to_owned());
        } else {
            for (model, stats) in &self.summary.model_stats {
                let samples = self
                    .summary
                    .model_latency
                    .get(model)
                    .map_or(0, Vec::len);
                lines.push(format!(
                    "- {} latency p95: {} ms ({} samples)",
                    model, stats.p95_ms, samples
                ));
            }
        }

        lines.push(String::new());
        if self.triggered.is_empty() {
            lines.push("[No alert conditions triggered]".to_owned());
        } else {
            lines.push("[Triggered conditions]".to_owned());
            for alert in &self.triggered {
                lines.push(format!("- {}: {}", alert.rule_name, alert.observed_value));
            }
        }

        lines.push(String::new());
        lines.push("Suggested follow-ups:".to_owned());
        lines.push("- Check the monitoring dashboard for matching spikes or patterns.".to_owned());
        lines.push(
            "- If GPU OOM or 5xx counts stay high, consider shedding load or adding capacity."
                .to_owned(),
        );
        lines.push("- To adjust thresholds, edit logsentry.toml and redeploy.".to_owned());

        lines.join("\n")
    }
}

/// CSV 필드 이스케이프. 쉼표/따옴표/개행이 있으면 따옴표로 감쌉니다.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsentry_core::types::{LoginStats, ModelStats};

    fn sample_report() -> AnalysisReport {
        let mut summary = MetricsSummary::default();
        summary.counts_by_level.insert(LogLevel::Info, 10);
        summary.counts_by_level.insert(LogLevel::Error, 3);
        summary
            .model_latency
            .insert("asr-small-v1".to_owned(), vec![150, 150, 500]);
        summary.model_stats.insert(
            "asr-small-v1".to_owned(),
            ModelStats {
                avg_ms: 266.666,
                p95_ms: 500,
            },
        );
        summary.user_login.insert(
            "u1001".to_owned(),
            LoginStats {
                success: 2,
                failure: 1,
            },
        );
        summary.http_status_buckets.record(503);
        summary
            .anomaly_counts
            .insert("http_503".to_owned(), 1);

        AnalysisReport::new(
            "/var/log/mobile_ai.log",
            summary,
            vec![TriggeredAlert {
                rule_name: "error_count".to_owned(),
                observed_value: 3.0,
            }],
            13,
            2,
        )
    }

    #[test]
    fn json_contains_summary_fields() {
        let report = sample_report();
        let json = report.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_entries"], 13);
        assert_eq!(value["rejected_lines"], 2);
        assert_eq!(value["summary"]["counts_by_level"]["ERROR"], 3);
        assert_eq!(value["summary"]["http_status_buckets"]["5xx"], 1);
        assert_eq!(value["triggered"][0]["rule_name"], "error_count");
    }

    #[test]
    fn table_renders_all_sections() {
        let table = sample_report().render_table();
        for section in [
            "[Log Levels]",
            "[AI Model Latency]",
            "[User Logins]",
            "[HTTP Status]",
            "[Network Anomalies]",
            "[Triggered Alerts]",
        ] {
            assert!(table.contains(section), "missing section {section}");
        }
        assert!(table.contains("asr-small-v1: avg = 266.67 ms, p95 = 500 ms"));
        assert!(table.contains("u1001: success = 2, failure = 1"));
        assert!(table.contains("error_count: observed 3"));
    }

    #[test]
    fn table_renders_placeholders_when_empty() {
        let report = AnalysisReport::new("test", MetricsSummary::default(), vec![], 0, 0);
        let table = report.render_table();
        assert!(table.contains("(no latency samples)"));
        assert!(table.contains("(no login activity)"));
        assert!(table.contains("[Triggered Alerts]\n  (none)"));
    }

    #[test]
    fn csv_has_header_and_model_rows() {
        let csv = sample_report().render_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "model,avg_ms,p95_ms");
        assert_eq!(lines[1], "asr-small-v1,266.67,500");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn csv_without_models_is_header_only() {
        let report = AnalysisReport::new("test", MetricsSummary::default(), vec![], 0, 0);
        assert_eq!(report.render_csv(), "model,avg_ms,p95_ms\n");
    }

    #[test]
    fn csv_field_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn alert_body_lists_metrics_and_triggers() {
        let body = sample_report().render_alert_body();
        assert!(body.contains("- ERROR lines: 3"));
        assert!(body.contains("- HTTP 5xx responses: 1"));
        assert!(body.contains("- asr-small-v1 latency p95: 500 ms (3 samples)"));
        assert!(body.contains("[Triggered conditions]"));
        assert!(body.contains("- error_count: 3"));
    }

    #[test]
    fn alert_body_without_triggers() {
        let report = AnalysisReport::new("test", MetricsSummary::default(), vec![], 0, 0);
        let body = report.render_alert_body();
        assert!(body.contains("[No alert conditions triggered]"));
        assert!(body.contains("no samples in this window"));
    }
}
