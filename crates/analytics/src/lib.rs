#![doc = include_str!("../README.md")]

pub mod aggregate;
pub mod analysis;
pub mod parser;
pub mod report;
pub mod rule;

// --- 주요 타입 re-export ---

// 집계
pub use aggregate::{MetricsAggregator, compute_p95};

// 분석 패스
pub use analysis::analyze_lines;

// 파서
pub use parser::{JsonLineParser, ParserRouter, TextLogParser};

// 보고서
pub use report::AnalysisReport;

// 룰 엔진
pub use rule::{Comparator, Rule, RuleEngine, RuleSet};
