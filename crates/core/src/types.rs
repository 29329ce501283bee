//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 파싱된 로그 레코드(`LogEntry`), 한 번의 분석 패스가 산출하는
//! 지표 요약(`MetricsSummary`), 룰 평가 결과(`TriggeredAlert`)를 정의합니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// --- 로그 소스 태그 상수 ---

/// 모바일 앱 로그 소스 태그
pub const SOURCE_MOBILE_APP: &str = "MobileApp";
/// 네트워크 서비스 로그 소스 태그
pub const SOURCE_NET_SERVICE: &str = "NetService";
/// AI 추론 서브시스템 로그 소스 태그
pub const SOURCE_AI_INFERENCE: &str = "AIInference";

// --- 이상 징후 카운터 이름 상수 ---

/// WiFi 연결 끊김 이벤트
pub const ANOMALY_WIFI_DISCONNECTED: &str = "wifi_disconnected";
/// TCP 연결 리셋 이벤트
pub const ANOMALY_TCP_RESET: &str = "tcp_reset";
/// GPU 메모리 부족 이벤트
pub const ANOMALY_GPU_OOM: &str = "gpu_oom";
/// HTTP 503 응답 이벤트
pub const ANOMALY_HTTP_503: &str = "http_503";
/// HTTP 504 응답 이벤트
pub const ANOMALY_HTTP_504: &str = "http_504";

/// 로그 레벨
///
/// 레벨 집계 등 엄격한 분류가 필요한 곳에서 사용합니다.
/// 알 수 없는 토큰은 [`LogLevel::Unknown`]으로 분류되며,
/// 파싱 거부 사유가 되지 않습니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// 정보성 로그
    Info,
    /// 경고
    Warn,
    /// 오류
    Error,
    /// 디버그
    Debug,
    /// 분류 불가 토큰 (기본값)
    #[default]
    Unknown,
}

impl LogLevel {
    /// 레벨 토큰 문자열을 분류합니다.
    ///
    /// 네 가지 표준 레벨 외의 토큰은 모두 `Unknown`입니다.
    /// 대소문자를 구분합니다 (로그 형식이 대문자 고정이므로).
    pub fn from_token(token: &str) -> Self {
        match token {
            "INFO" => Self::Info,
            "WARN" => Self::Warn,
            "ERROR" => Self::Error,
            "DEBUG" => Self::Debug,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// 로그 엔트리
///
/// 한 줄의 원시 로그를 파싱한 구조화 레코드입니다.
/// JSON Lines로 직렬화한 뒤 다시 읽어 들일 수 있습니다
/// (원시 텍스트 → JSONL → 지표 집계 파이프라인이 왕복 가능).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 타임스탬프 (날짜 + 시각 토큰 원문 그대로; 정렬 가능성은 보장하지 않음)
    pub timestamp: String,
    /// 레벨 토큰 원문. 분류는 [`LogEntry::normalized_level`]에서 수행합니다.
    #[serde(default)]
    pub level: String,
    /// 로그 발생 소스 태그 (예: "MobileApp", "NetService", "AIInference")
    pub source: String,
    /// 본문에서 추출한 key=value 쌍. 키는 유일하며, 중복 시 마지막 값이 남습니다.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// key=value 형식이 아닌 본문 토큰을 공백으로 이어붙인 문자열.
    /// `fields`와 `raw_message`는 본문 토큰을 분할 — 같은 토큰이 양쪽에 있지 않습니다.
    #[serde(default)]
    pub raw_message: String,
}

impl LogEntry {
    /// 레벨 토큰을 [`LogLevel`]로 분류합니다.
    pub fn normalized_level(&self) -> LogLevel {
        LogLevel::from_token(&self.level)
    }

    /// 필드 값을 조회합니다.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {} field(s)",
            self.level,
            self.timestamp,
            self.source,
            self.fields.len(),
        )
    }
}

/// 모델별 지연 통계 (파생값 — 집계 종료 시 한 번 계산)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    /// 산술 평균 지연 (ms)
    pub avg_ms: f64,
    /// 95% 분위 지연 (ms, nearest-rank)
    pub p95_ms: u64,
}

/// 사용자별 로그인 성공/실패 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginStats {
    /// 로그인 성공 횟수
    pub success: u64,
    /// 로그인 실패 횟수
    pub failure: u64,
}

/// HTTP 상태 코드 버킷 카운터
///
/// 2xx/4xx/5xx 범위만 집계합니다. 그 외 범위(1xx, 3xx 등)는
/// 에러 없이 무시됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpStatusBuckets {
    /// 2xx 응답 수
    #[serde(rename = "2xx")]
    pub status_2xx: u64,
    /// 4xx 응답 수
    #[serde(rename = "4xx")]
    pub status_4xx: u64,
    /// 5xx 응답 수
    #[serde(rename = "5xx")]
    pub status_5xx: u64,
}

impl HttpStatusBuckets {
    /// 상태 코드를 해당 버킷에 기록합니다. 집계 대상이 아닌 범위는 무시합니다.
    pub fn record(&mut self, code: u16) {
        match code {
            200..=299 => self.status_2xx += 1,
            400..=499 => self.status_4xx += 1,
            500..=599 => self.status_5xx += 1,
            _ => {}
        }
    }
}

/// 지표 요약
///
/// 한 번의 분석 패스가 엔트리 배치를 단일 순방향 스캔으로 집계한 결과입니다.
/// 패스마다 새로 생성되며, 집계가 끝난 뒤에는 변경되지 않습니다.
/// 동일 입력에 대해 재실행하면 동일한 요약이 나옵니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// 레벨별 엔트리 수 (알 수 없는 레벨은 UNKNOWN으로 집계)
    pub counts_by_level: BTreeMap<LogLevel, u64>,
    /// 모델별 지연 샘플 (삽입 순서 = 관측 순서)
    pub model_latency: BTreeMap<String, Vec<u64>>,
    /// 모델별 파생 통계 — 샘플이 1개 이상인 모델만 포함
    pub model_stats: BTreeMap<String, ModelStats>,
    /// 사용자별 로그인 성공/실패
    pub user_login: BTreeMap<String, LoginStats>,
    /// HTTP 상태 코드 버킷
    pub http_status_buckets: HttpStatusBuckets,
    /// 이름별 이상 징후 카운터
    pub anomaly_counts: BTreeMap<String, u64>,
}

impl MetricsSummary {
    /// 해당 레벨의 엔트리 수를 반환합니다 (집계되지 않았으면 0).
    pub fn level_count(&self, level: LogLevel) -> u64 {
        self.counts_by_level.get(&level).copied().unwrap_or(0)
    }

    /// 해당 이름의 이상 징후 수를 반환합니다 (집계되지 않았으면 0).
    pub fn anomaly_count(&self, name: &str) -> u64 {
        self.anomaly_counts.get(name).copied().unwrap_or(0)
    }

    /// 집계된 전체 엔트리 수를 반환합니다.
    pub fn total_entries(&self) -> u64 {
        self.counts_by_level.values().sum()
    }
}

/// 트리거된 알림
///
/// 조건이 성립한 룰의 이름과 관측값입니다.
/// 결과 순서는 RuleSet 등록 순서를 따릅니다 (정렬하지 않음).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    /// 트리거된 룰 이름
    pub rule_name: String,
    /// 룰 셀렉터가 관측한 값
    pub observed_value: f64,
}

impl fmt::Display for TriggeredAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (observed: {})", self.rule_name, self.observed_value)
    }
}
