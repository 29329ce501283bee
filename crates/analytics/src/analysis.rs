//! 분석 패스 -- 파싱 → 집계 → 룰 평가를 하나로 묶습니다.
//!
//! 이 모듈은 I/O를 수행하지 않습니다. 라인 시퀀스를 받아
//! [`AnalysisReport`]를 돌려줄 뿐이며, 파일 읽기와 보고서 출력,
//! 알림 전달은 호출자(데몬/CLI)의 몫입니다.
//!
//! 패스는 자기완결적입니다 — 이전 패스의 집계 상태를 전혀 들고 있지
//! 않으므로, 동일한 입력에 대해 재실행하면 동일한 보고서가 나옵니다.

use logsentry_core::config::AlertsConfig;
use logsentry_core::error::LogsentryError;
use logsentry_core::types::LogEntry;

use crate::aggregate::MetricsAggregator;
use crate::parser::ParserRouter;
use crate::report::AnalysisReport;
use crate::rule::{RuleEngine, RuleSet};

/// 라인 시퀀스에 대해 한 번의 분석 패스를 수행합니다.
///
/// 빈 라인은 조용히 건너뛰고, 형식 불일치 라인은 라인 번호와 함께
/// 경고를 남긴 뒤 거부 카운트에 더합니다 — 거부는 에러가 아닙니다.
///
/// `format`은 `"auto"`(자동 감지), `"text"`, `"jsonl"` 중 하나입니다.
pub fn analyze_lines<'a, I>(
    lines: I,
    router: &ParserRouter,
    format: &str,
    alerts: &AlertsConfig,
    source_label: &str,
) -> AnalysisReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut entries: Vec<LogEntry> = Vec::new();
    let mut rejected: u64 = 0;

    for (idx, line) in lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(router, format, line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                rejected += 1;
                tracing::warn!(
                    line_no = idx + 1,
                    error = %e,
                    "skipping unparseable log line"
                );
            }
        }
    }

    let summary = MetricsAggregator::aggregate(&entries);
    let rules = RuleSet::from_config(alerts);
    let triggered = RuleEngine::evaluate(&summary, &rules);

    AnalysisReport::new(source_label, summary, triggered, entries.len() as u64, rejected)
}

/// 설정된 형식에 따라 한 라인을 파싱합니다.
fn parse_line(router: &ParserRouter, format: &str, line: &str) -> Result<LogEntry, LogsentryError> {
    match format {
        "auto" => router.parse(line),
        other => router.parse_with(other, line),
    }
}
