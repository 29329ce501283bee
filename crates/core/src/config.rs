//! 설정 관리 — logsentry.toml 파싱 및 런타임 설정
//!
//! [`LogsentryConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGSENTRY_SOURCE_PATH=/var/log/app.log` 형식)
//! 3. 설정 파일 (`logsentry.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 알림 룰 섹션
//! `[alerts]` 아래에 룰 이름별 typed 섹션이 하나씩 있습니다.
//! 섹션이 없거나 알 수 없는 섹션이 있으면 해당 룰은 비활성 상태로
//! 취급합니다 (로드 시점 검증, 평가 시점의 ad-hoc 조회 없음).
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logsentry_core::error::LogsentryError> {
//! use logsentry_core::config::LogsentryConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogsentryConfig::load("logsentry.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogsentryConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogsentryError};

/// Logsentry 통합 설정
///
/// `logsentry.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsentryConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 소스 설정
    #[serde(default)]
    pub source: LogSourceConfig,
    /// 주기 실행 설정
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// 알림 룰 임계값 설정
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// 알림 전달 설정
    #[serde(default)]
    pub notify: NotifyConfig,
    /// 보고서 출력 설정
    #[serde(default)]
    pub report: ReportConfig,
}

impl LogsentryConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogsentryError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogsentryError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogsentryError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogsentryError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogsentryError> {
        toml::from_str(toml_str).map_err(|e| {
            LogsentryError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGSENTRY_{SECTION}_{FIELD}`
    /// 예: `LOGSENTRY_SOURCE_PATH=/var/log/mobile_ai.log`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGSENTRY_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGSENTRY_GENERAL_LOG_FORMAT");

        // Source
        override_string(&mut self.source.path, "LOGSENTRY_SOURCE_PATH");
        override_string(&mut self.source.format, "LOGSENTRY_SOURCE_FORMAT");

        // Schedule
        override_bool(&mut self.schedule.enabled, "LOGSENTRY_SCHEDULE_ENABLED");
        override_u64(
            &mut self.schedule.interval_secs,
            "LOGSENTRY_SCHEDULE_INTERVAL_SECS",
        );

        // Notify
        override_bool(&mut self.notify.enabled, "LOGSENTRY_NOTIFY_ENABLED");
        override_string(&mut self.notify.webhook_url, "LOGSENTRY_NOTIFY_WEBHOOK_URL");
        override_csv(&mut self.notify.recipients, "LOGSENTRY_NOTIFY_RECIPIENTS");

        // Report
        override_string(&mut self.report.json_path, "LOGSENTRY_REPORT_JSON_PATH");
        override_string(&mut self.report.csv_path, "LOGSENTRY_REPORT_CSV_PATH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogsentryError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 소스 형식 검증
        let valid_source_formats = ["auto", "text", "jsonl"];
        if !valid_source_formats.contains(&self.source.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "source.format".to_owned(),
                reason: format!("must be one of: {}", valid_source_formats.join(", ")),
            }
            .into());
        }

        if self.source.path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "source.path".to_owned(),
                reason: "log source path must not be empty".to_owned(),
            }
            .into());
        }

        // 주기 실행 검증
        if self.schedule.enabled && self.schedule.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "schedule.interval_secs".to_owned(),
                reason: "must be greater than 0 when schedule is enabled".to_owned(),
            }
            .into());
        }

        // 알림 전달 검증
        if self.notify.enabled && self.notify.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notify.timeout_secs".to_owned(),
                reason: "must be greater than 0 when notify is enabled".to_owned(),
            }
            .into());
        }

        // 지연 룰 검증
        if self.alerts.asr_latency_p95.enabled && self.alerts.asr_latency_p95.model.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "alerts.asr_latency_p95.model".to_owned(),
                reason: "model name must not be empty when the rule is enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 로그 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSourceConfig {
    /// 분석 대상 로그 파일 경로
    pub path: String,
    /// 로그 형식 (auto, text, jsonl)
    pub format: String,
}

impl Default for LogSourceConfig {
    fn default() -> Self {
        Self {
            path: "/var/log/mobile_ai.log".to_owned(),
            format: "auto".to_owned(),
        }
    }
}

/// 주기 실행 설정
///
/// 활성화하면 데몬이 `interval_secs` 간격으로 분석 패스를 반복합니다.
/// 각 패스는 다음 패스가 시작되기 전에 완료(또는 실패)합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 실행 간격 (초)
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 300,
        }
    }
}

/// 알림 룰 임계값 설정
///
/// 섹션이 생략되면 해당 룰은 비활성 기본값을 갖습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// ERROR 레벨 라인 수 룰
    pub error_count: ErrorCountRule,
    /// HTTP 5xx 응답 수 룰
    pub http_5xx: Http5xxRule,
    /// GPU OOM 이벤트 수 룰
    pub gpu_oom: EventCountRule,
    /// WiFi 끊김 이벤트 수 룰
    pub wifi_disconnect: EventCountRule,
    /// 모델 지연 p95 룰
    pub asr_latency_p95: LatencyP95Rule,
}

/// ERROR 라인 수 임계값
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorCountRule {
    /// 활성화 여부
    pub enabled: bool,
    /// 트리거 최소 ERROR 라인 수 (observed >= min_errors)
    pub min_errors: u64,
}

impl Default for ErrorCountRule {
    fn default() -> Self {
        Self {
            enabled: false,
            min_errors: 1,
        }
    }
}

/// HTTP 5xx 응답 수 임계값
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Http5xxRule {
    /// 활성화 여부
    pub enabled: bool,
    /// 트리거 최소 5xx 응답 수 (observed >= min_5xx)
    pub min_5xx: u64,
}

impl Default for Http5xxRule {
    fn default() -> Self {
        Self {
            enabled: false,
            min_5xx: 1,
        }
    }
}

/// 이벤트 수 임계값 (gpu_oom, wifi_disconnect 공용)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventCountRule {
    /// 활성화 여부
    pub enabled: bool,
    /// 트리거 최소 이벤트 수 (observed >= min_events)
    pub min_events: u64,
}

impl Default for EventCountRule {
    fn default() -> Self {
        Self {
            enabled: false,
            min_events: 1,
        }
    }
}

/// 모델 지연 p95 임계값
///
/// 해당 모델의 지연 샘플이 하나도 없으면 룰은 평가를 건너뜁니다
/// (지표 부재는 위반이 아님).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyP95Rule {
    /// 활성화 여부
    pub enabled: bool,
    /// 대상 모델 이름
    pub model: String,
    /// 트리거 p95 임계값 (observed > max_p95_ms)
    pub max_p95_ms: u64,
}

impl Default for LatencyP95Rule {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "asr-small-v1".to_owned(),
            max_p95_ms: 200,
        }
    }
}

/// 알림 전달 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// webhook 전달 활성화 여부 (콘솔 출력은 항상 수행)
    pub enabled: bool,
    /// 알림 payload를 POST할 webhook 엔드포인트
    pub webhook_url: String,
    /// 수신자 목록 (payload에 포함되어 전달됨)
    pub recipients: Vec<String>,
    /// 알림 제목 접두어
    pub subject_prefix: String,
    /// 전달 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: String::new(),
            recipients: Vec::new(),
            subject_prefix: "[logsentry]".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// 보고서 출력 설정
///
/// 경로가 비어 있으면 해당 출력은 생성하지 않습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 요약 JSON 출력 경로
    pub json_path: String,
    /// 모델 지연 통계 CSV 출력 경로
    pub csv_path: String,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}
