//! 지표 집계 -- 엔트리 배치를 단일 순방향 스캔으로 요약합니다.
//!
//! [`MetricsAggregator`]는 파싱된 엔트리 시퀀스를 받아
//! [`MetricsSummary`]를 생성합니다. 소스별 디스패치 규칙은 서로 독립이며,
//! 엔트리 하나는 항상 갱신되는 레벨 카운터 외에 최대 한 범주의
//! 카운터만 갱신합니다.
//!
//! 분위수 계산은 엔트리별이 아니라 스캔 종료 후 모델당 한 번 수행합니다
//! (O(n) 스캔 + 모델당 O(m log m) 정렬).

use std::collections::BTreeMap;

use logsentry_core::types::{
    ANOMALY_GPU_OOM, ANOMALY_HTTP_503, ANOMALY_HTTP_504, ANOMALY_TCP_RESET,
    ANOMALY_WIFI_DISCONNECTED, LogEntry, MetricsSummary, ModelStats, SOURCE_AI_INFERENCE,
    SOURCE_MOBILE_APP, SOURCE_NET_SERVICE,
};

/// 지표 집계기
///
/// 집계 상태는 호출 간에 유지되지 않습니다 — 패스마다 새 요약을 만들고,
/// 동일 입력에 대해 항상 동일한 요약을 반환합니다.
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// 엔트리 배치를 집계하여 지표 요약을 생성합니다.
    pub fn aggregate(entries: &[LogEntry]) -> MetricsSummary {
        let mut summary = MetricsSummary::default();

        for entry in entries {
            *summary
                .counts_by_level
                .entry(entry.normalized_level())
                .or_insert(0) += 1;

            match entry.source.as_str() {
                SOURCE_AI_INFERENCE => Self::aggregate_inference(entry, &mut summary),
                SOURCE_MOBILE_APP => Self::aggregate_mobile_app(entry, &mut summary),
                SOURCE_NET_SERVICE => Self::aggregate_net_service(entry, &mut summary),
                _ => {}
            }
        }

        summary.model_stats = derive_model_stats(&summary.model_latency);
        summary
    }

    /// AIInference 엔트리: GPU OOM 이벤트와 모델 지연 샘플.
    fn aggregate_inference(entry: &LogEntry, summary: &mut MetricsSummary) {
        // gpu_oom은 model 필드 유무와 무관하게 집계
        if entry.field("event") == Some("gpu_oom") {
            *summary
                .anomaly_counts
                .entry(ANOMALY_GPU_OOM.to_owned())
                .or_insert(0) += 1;
        }

        let Some(model) = entry.field("model") else {
            return;
        };

        if let Some(raw) = entry.field("latency_ms") {
            summary
                .model_latency
                .entry(model.to_owned())
                .or_default()
                .push(parse_latency(raw));
        }

        // 주기적 health_check가 자체 보고하는 평균 지연도 같은 모델의
        // 지연 샘플 모집단에 합산합니다. 원시 샘플과 의미가 섞이지만
        // 의도된 동작입니다 (SLO 자체 점검 신호의 반영).
        if entry.field("event") == Some("health_check") {
            if let Some(raw) = entry.field("avg_latency_ms") {
                summary
                    .model_latency
                    .entry(model.to_owned())
                    .or_default()
                    .push(parse_latency(raw));
            }
        }
    }

    /// MobileApp 엔트리: 사용자별 로그인 성공/실패.
    ///
    /// 사용자 식별자는 `user_id`, 없으면 `user`를 봅니다. 둘 다 없으면
    /// 엔트리를 무시합니다. 액션이 그냥 `login`이면 성공도 실패도 아닌
    /// no-op입니다 — 향후 별도의 "시도" 카운터용으로 예약된 값입니다.
    fn aggregate_mobile_app(entry: &LogEntry, summary: &mut MetricsSummary) {
        let Some(user) = entry.field("user_id").or_else(|| entry.field("user")) else {
            return;
        };

        match entry.field("action") {
            Some("login_success") => {
                summary.user_login.entry(user.to_owned()).or_default().success += 1;
            }
            Some("login_failure") => {
                summary.user_login.entry(user.to_owned()).or_default().failure += 1;
            }
            _ => {}
        }
    }

    /// NetService 엔트리: HTTP 상태 버킷과 네트워크 이상 징후.
    ///
    /// `http_NNN` 이벤트는 3자리 숫자 코드일 때만 버킷에 분류되며
    /// (2xx/4xx/5xx 외 범위는 조용히 무시), `http_503`/`http_504`는
    /// 추가로 이상 징후 카운터도 올립니다. WiFi 끊김과 TCP 리셋은
    /// HTTP 처리와 독립적으로 검사합니다.
    fn aggregate_net_service(entry: &LogEntry, summary: &mut MetricsSummary) {
        let Some(event) = entry.field("event") else {
            return;
        };

        if let Some(code_str) = event.strip_prefix("http_") {
            if code_str.len() == 3 {
                if let Ok(code) = code_str.parse::<u16>() {
                    summary.http_status_buckets.record(code);
                }
            }
            if event == ANOMALY_HTTP_503 || event == ANOMALY_HTTP_504 {
                *summary.anomaly_counts.entry(event.to_owned()).or_insert(0) += 1;
            }
        }

        if event == ANOMALY_WIFI_DISCONNECTED || event == ANOMALY_TCP_RESET {
            *summary.anomaly_counts.entry(event.to_owned()).or_insert(0) += 1;
        }
    }
}

/// 모델별 지연 샘플에서 평균/p95 통계를 파생합니다.
///
/// 샘플이 있는 모델만 결과에 포함됩니다.
fn derive_model_stats(model_latency: &BTreeMap<String, Vec<u64>>) -> BTreeMap<String, ModelStats> {
    let mut stats = BTreeMap::new();
    for (model, samples) in model_latency {
        if let Some(p95_ms) = compute_p95(samples) {
            #[allow(clippy::cast_precision_loss)]
            let avg_ms = samples.iter().sum::<u64>() as f64 / samples.len() as f64;
            stats.insert(model.clone(), ModelStats { avg_ms, p95_ms });
        }
    }
    stats
}

/// 95% 분위값을 nearest-rank 방식으로 계산합니다.
///
/// 오름차순 정렬 후 `max(0, floor(count * 0.95) - 1)` 인덱스의 값입니다.
/// 빈 샘플은 `None` — 숫자 지표로 보고되면 안 되므로 0이 아니라 부재입니다.
pub fn compute_p95(samples: &[u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = ((sorted.len() as f64 * 0.95).floor() as usize).saturating_sub(1);
    Some(sorted[idx])
}

/// 지연 값 문자열을 정수로 파싱합니다.
///
/// 숫자가 아닌 값은 0으로 강제합니다 — panic 대신 손실 있는 보정이며,
/// 샘플 제외가 아니라 0 포함이 이 구현의 일관된 선택입니다.
pub fn parse_latency(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsentry_core::types::LogLevel;
    use std::collections::BTreeMap;

    fn entry(level: &str, source: &str, fields: &[(&str, &str)]) -> LogEntry {
        LogEntry {
            timestamp: "2025-11-16 09:00:01".to_owned(),
            level: level.to_owned(),
            source: source.to_owned(),
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<BTreeMap<_, _>>(),
            raw_message: String::new(),
        }
    }

    #[test]
    fn p95_five_samples() {
        // floor(5 * 0.95) - 1 = 3 → 네 번째 값
        assert_eq!(compute_p95(&[10, 20, 30, 40, 50]), Some(40));
    }

    #[test]
    fn p95_empty_is_absent_not_zero() {
        assert_eq!(compute_p95(&[]), None);
    }

    #[test]
    fn p95_single_sample() {
        assert_eq!(compute_p95(&[7]), Some(7));
    }

    #[test]
    fn p95_unsorted_input() {
        assert_eq!(compute_p95(&[50, 10, 40, 30, 20]), Some(40));
    }

    #[test]
    fn p95_twenty_samples_nineteenth_value() {
        // 19 × 150 + 1 × 500 → 인덱스 18 (정렬 후 19번째) = 150
        let mut samples = vec![150u64; 19];
        samples.push(500);
        assert_eq!(compute_p95(&samples), Some(150));
    }

    #[test]
    fn parse_latency_numeric() {
        assert_eq!(parse_latency("150"), 150);
        assert_eq!(parse_latency(" 42 "), 42);
    }

    #[test]
    fn parse_latency_non_numeric_coerces_to_zero() {
        assert_eq!(parse_latency("fast"), 0);
        assert_eq!(parse_latency("150ms"), 0);
        assert_eq!(parse_latency(""), 0);
        assert_eq!(parse_latency("-5"), 0);
    }

    #[test]
    fn level_counter_always_updates() {
        let entries = vec![
            entry("INFO", "MobileApp", &[]),
            entry("ERROR", "NetService", &[]),
            entry("ERROR", "SomethingElse", &[]),
            entry("NOTICE", "MobileApp", &[]),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.level_count(LogLevel::Info), 1);
        assert_eq!(summary.level_count(LogLevel::Error), 2);
        assert_eq!(summary.level_count(LogLevel::Unknown), 1);
        assert_eq!(summary.total_entries(), 4);
    }

    #[test]
    fn inference_latency_appended_per_model() {
        let entries = vec![
            entry("INFO", "AIInference", &[("model", "asr-small-v1"), ("latency_ms", "150")]),
            entry("INFO", "AIInference", &[("model", "asr-small-v1"), ("latency_ms", "170")]),
            entry("INFO", "AIInference", &[("model", "tts-mini"), ("latency_ms", "80")]),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.model_latency["asr-small-v1"], vec![150, 170]);
        assert_eq!(summary.model_latency["tts-mini"], vec![80]);
        assert_eq!(summary.model_stats["asr-small-v1"].avg_ms, 160.0);
    }

    #[test]
    fn inference_without_model_contributes_nothing_further() {
        let entries = vec![entry("INFO", "AIInference", &[("latency_ms", "150")])];
        let summary = MetricsAggregator::aggregate(&entries);
        assert!(summary.model_latency.is_empty());
        assert!(summary.model_stats.is_empty());
        // 레벨 카운터는 여전히 갱신됨
        assert_eq!(summary.level_count(LogLevel::Info), 1);
    }

    #[test]
    fn inference_health_check_folds_avg_latency() {
        let entries = vec![
            entry("INFO", "AIInference", &[("model", "asr-small-v1"), ("latency_ms", "100")]),
            entry(
                "INFO",
                "AIInference",
                &[("model", "asr-small-v1"), ("event", "health_check"), ("avg_latency_ms", "130")],
            ),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.model_latency["asr-small-v1"], vec![100, 130]);
    }

    #[test]
    fn inference_health_check_with_latency_appends_both() {
        let entries = vec![entry(
            "INFO",
            "AIInference",
            &[
                ("model", "asr-small-v1"),
                ("event", "health_check"),
                ("latency_ms", "90"),
                ("avg_latency_ms", "110"),
            ],
        )];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.model_latency["asr-small-v1"], vec![90, 110]);
    }

    #[test]
    fn inference_non_numeric_latency_counts_as_zero() {
        let entries = vec![entry(
            "WARN",
            "AIInference",
            &[("model", "asr-small-v1"), ("latency_ms", "timeout")],
        )];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.model_latency["asr-small-v1"], vec![0]);
    }

    #[test]
    fn inference_gpu_oom_counted_even_without_model() {
        let entries = vec![
            entry("ERROR", "AIInference", &[("event", "gpu_oom")]),
            entry("ERROR", "AIInference", &[("event", "gpu_oom"), ("model", "llm-7b")]),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.anomaly_count(ANOMALY_GPU_OOM), 2);
    }

    #[test]
    fn mobile_app_login_success_and_failure() {
        let entries = vec![
            entry("INFO", "MobileApp", &[("user_id", "u1"), ("action", "login_success")]),
            entry("INFO", "MobileApp", &[("user_id", "u1"), ("action", "login_failure")]),
            entry("INFO", "MobileApp", &[("user_id", "u1"), ("action", "login_success")]),
            entry("INFO", "MobileApp", &[("user_id", "u2"), ("action", "login_failure")]),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.user_login["u1"].success, 2);
        assert_eq!(summary.user_login["u1"].failure, 1);
        assert_eq!(summary.user_login["u2"].failure, 1);
    }

    #[test]
    fn mobile_app_user_field_fallback() {
        let entries = vec![entry(
            "INFO",
            "MobileApp",
            &[("user", "u9"), ("action", "login_success")],
        )];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.user_login["u9"].success, 1);
    }

    #[test]
    fn mobile_app_without_user_ignored() {
        let entries = vec![entry("INFO", "MobileApp", &[("action", "login_success")])];
        let summary = MetricsAggregator::aggregate(&entries);
        assert!(summary.user_login.is_empty());
    }

    #[test]
    fn mobile_app_bare_login_is_noop() {
        // "login"은 성공도 실패도 아님 — 시도 카운터용 예약값
        let entries = vec![entry(
            "INFO",
            "MobileApp",
            &[("user_id", "u1"), ("action", "login")],
        )];
        let summary = MetricsAggregator::aggregate(&entries);
        assert!(summary.user_login.is_empty());
    }

    #[test]
    fn net_service_http_buckets() {
        let entries = vec![
            entry("INFO", "NetService", &[("event", "http_200")]),
            entry("INFO", "NetService", &[("event", "http_201")]),
            entry("WARN", "NetService", &[("event", "http_404")]),
            entry("ERROR", "NetService", &[("event", "http_500")]),
            entry("INFO", "NetService", &[("event", "http_301")]), // 3xx 미집계
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.http_status_buckets.status_2xx, 2);
        assert_eq!(summary.http_status_buckets.status_4xx, 1);
        assert_eq!(summary.http_status_buckets.status_5xx, 1);
    }

    #[test]
    fn net_service_http_503_counts_bucket_and_anomaly() {
        let entries = vec![
            entry("ERROR", "NetService", &[("event", "http_503")]),
            entry("ERROR", "NetService", &[("event", "http_504")]),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.http_status_buckets.status_5xx, 2);
        assert_eq!(summary.anomaly_count(ANOMALY_HTTP_503), 1);
        assert_eq!(summary.anomaly_count(ANOMALY_HTTP_504), 1);
    }

    #[test]
    fn net_service_http_418_counts_nothing_without_error() {
        let entries = vec![entry("WARN", "NetService", &[("event", "http_118")])];
        let summary = MetricsAggregator::aggregate(&entries);
        // 1xx는 어느 버킷에도 들어가지 않지만 에러도 아님
        assert_eq!(summary.http_status_buckets, Default::default());
        assert!(summary.anomaly_counts.is_empty());
    }

    #[test]
    fn net_service_non_numeric_http_event_ignored() {
        let entries = vec![
            entry("WARN", "NetService", &[("event", "http_retry")]),
            entry("WARN", "NetService", &[("event", "http_5000")]),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.http_status_buckets, Default::default());
    }

    #[test]
    fn net_service_network_anomalies() {
        let entries = vec![
            entry("WARN", "NetService", &[("event", "wifi_disconnected")]),
            entry("WARN", "NetService", &[("event", "wifi_disconnected")]),
            entry("ERROR", "NetService", &[("event", "tcp_reset")]),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.anomaly_count(ANOMALY_WIFI_DISCONNECTED), 2);
        assert_eq!(summary.anomaly_count(ANOMALY_TCP_RESET), 1);
    }

    #[test]
    fn net_service_without_event_ignored() {
        let entries = vec![entry("INFO", "NetService", &[("status", "ok")])];
        let summary = MetricsAggregator::aggregate(&entries);
        assert!(summary.anomaly_counts.is_empty());
        assert_eq!(summary.http_status_buckets, Default::default());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let entries = vec![
            entry("INFO", "AIInference", &[("model", "asr-small-v1"), ("latency_ms", "150")]),
            entry("ERROR", "NetService", &[("event", "http_503")]),
            entry("INFO", "MobileApp", &[("user_id", "u1"), ("action", "login_success")]),
        ];
        let first = MetricsAggregator::aggregate(&entries);
        let second = MetricsAggregator::aggregate(&entries);
        assert_eq!(first, second);
    }

    #[test]
    fn no_inference_entries_means_empty_model_stats() {
        let entries = vec![
            entry("INFO", "MobileApp", &[("user_id", "u1"), ("action", "login_success")]),
            entry("ERROR", "NetService", &[("event", "http_500")]),
        ];
        let summary = MetricsAggregator::aggregate(&entries);
        assert!(summary.model_stats.is_empty());
        assert!(summary.model_latency.is_empty());
    }

    #[test]
    fn spec_p95_example_nineteen_fast_one_slow() {
        let mut entries: Vec<LogEntry> = (0..19)
            .map(|_| {
                entry("INFO", "AIInference", &[("model", "asr-small-v1"), ("latency_ms", "150")])
            })
            .collect();
        entries.push(entry(
            "INFO",
            "AIInference",
            &[("model", "asr-small-v1"), ("latency_ms", "500")],
        ));
        let summary = MetricsAggregator::aggregate(&entries);
        assert_eq!(summary.model_stats["asr-small-v1"].p95_ms, 150);
    }
}
