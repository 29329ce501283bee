//! 알림 룰 데이터 타입
//!
//! 룰은 이름 붙은 불투명한 검사입니다. 엔진은 룰 정체를 하드코딩하지
//! 않으며, 새 룰은 셀렉터 함수를 [`RuleSet::register`]로 등록해서
//! 추가합니다 — 엔진 제어 흐름 수정 없이.

use std::fmt;

use serde::{Deserialize, Serialize};

use logsentry_core::config::AlertsConfig;
use logsentry_core::types::{
    ANOMALY_GPU_OOM, ANOMALY_WIFI_DISCONNECTED, LogLevel, MetricsSummary,
};

/// 임계값 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// observed >= threshold 이면 트리거
    Gte,
    /// observed > threshold 이면 트리거
    Gt,
}

impl Comparator {
    /// 관측값이 임계값 조건을 만족하는지 평가합니다.
    pub fn holds(self, observed: f64, threshold: f64) -> bool {
        match self {
            Self::Gte => observed >= threshold,
            Self::Gt => observed > threshold,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gte => write!(f, ">="),
            Self::Gt => write!(f, ">"),
        }
    }
}

/// 지표 셀렉터 — 요약에서 관측값을 꺼냅니다.
///
/// `None`은 지표 부재를 뜻하며, 부재는 위반이 아니므로 룰 평가를
/// 건너뜁니다. 항상 존재하는 카운터 지표는 `Some(0)`을 반환합니다.
pub type MetricSelector = Box<dyn Fn(&MetricsSummary) -> Option<f64> + Send + Sync>;

/// 알림 룰 — 이름, 활성화 여부, 비교 연산자, 임계값, 지표 셀렉터
pub struct Rule {
    /// 룰 이름 (트리거 결과에 그대로 실림)
    pub name: String,
    /// 비활성 룰은 평가를 건너뜀
    pub enabled: bool,
    /// 비교 연산자
    pub comparator: Comparator,
    /// 임계값
    pub threshold: f64,
    /// 지표 셀렉터
    selector: MetricSelector,
}

impl Rule {
    /// 새 룰을 생성합니다.
    pub fn new(
        name: impl Into<String>,
        enabled: bool,
        comparator: Comparator,
        threshold: f64,
        selector: MetricSelector,
    ) -> Self {
        Self {
            name: name.into(),
            enabled,
            comparator,
            threshold,
            selector,
        }
    }

    /// 요약에서 이 룰의 관측값을 꺼냅니다.
    pub fn observe(&self, summary: &MetricsSummary) -> Option<f64> {
        (self.selector)(summary)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("comparator", &self.comparator)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// 룰 셋 — 등록 순서가 보존되는 룰 레지스트리
///
/// 평가 결과의 순서는 등록 순서를 따릅니다 (정렬 없음).
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// 빈 룰 셋을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 룰을 등록합니다. 등록 순서가 평가/결과 순서가 됩니다.
    pub fn register(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// 등록된 룰 목록을 반환합니다.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 등록된 룰 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 룰이 하나도 없으면 true.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 활성 룰 수를 반환합니다.
    pub fn enabled_count(&self) -> usize {
        self.rules.iter().filter(|r| r.enabled).count()
    }

    /// 설정의 `[alerts]` 섹션에서 표준 룰 다섯 개를 고정 순서로 등록합니다.
    ///
    /// 카운터 기반 룰의 셀렉터는 항상 `Some(값)`을 반환하고 (집계가 없으면 0),
    /// 모델 지연 룰의 셀렉터만 해당 모델 샘플이 없을 때 `None`을 반환합니다.
    pub fn from_config(cfg: &AlertsConfig) -> Self {
        let mut set = Self::new();

        set.register(Rule::new(
            "error_count",
            cfg.error_count.enabled,
            Comparator::Gte,
            cfg.error_count.min_errors as f64,
            Box::new(|summary| Some(summary.level_count(LogLevel::Error) as f64)),
        ));

        set.register(Rule::new(
            "http_5xx",
            cfg.http_5xx.enabled,
            Comparator::Gte,
            cfg.http_5xx.min_5xx as f64,
            Box::new(|summary| Some(summary.http_status_buckets.status_5xx as f64)),
        ));

        set.register(Rule::new(
            "gpu_oom",
            cfg.gpu_oom.enabled,
            Comparator::Gte,
            cfg.gpu_oom.min_events as f64,
            Box::new(|summary| Some(summary.anomaly_count(ANOMALY_GPU_OOM) as f64)),
        ));

        set.register(Rule::new(
            "wifi_disconnect",
            cfg.wifi_disconnect.enabled,
            Comparator::Gte,
            cfg.wifi_disconnect.min_events as f64,
            Box::new(|summary| Some(summary.anomaly_count(ANOMALY_WIFI_DISCONNECTED) as f64)),
        ));

        let model = cfg.asr_latency_p95.model.clone();
        set.register(Rule::new(
            "asr_latency_p95",
            cfg.asr_latency_p95.enabled,
            Comparator::Gt,
            cfg.asr_latency_p95.max_p95_ms as f64,
            Box::new(move |summary| {
                summary.model_stats.get(&model).map(|s| s.p95_ms as f64)
            }),
        ));

        set
    }
}
