//! JSON Lines 로그 파서
//!
//! 한 줄이 독립적인 JSON 객체인 구조화 로그를 파싱합니다.
//! 이 형식은 `logsentry-cli convert`가 생성하는 출력 형식이기도 하므로
//! 파이프라인이 왕복 가능합니다 (원시 텍스트 → JSONL → 지표 집계).
//!
//! # 엔트리 형식
//! ```json
//! {"timestamp":"2025-11-16 09:00:01","level":"INFO","source":"AIInference",
//!  "fields":{"model":"asr-small-v1","latency_ms":"150"},"raw_message":""}
//! ```
//!
//! `timestamp`와 `source`는 필수이며, `level`/`fields`/`raw_message`는
//! 생략 시 기본값이 적용됩니다.

use logsentry_core::error::{LogsentryError, ParseError};
use logsentry_core::pipeline::LogParser;
use logsentry_core::types::LogEntry;

/// JSON Lines 로그 파서
///
/// 말포맷 라인은 [`ParseError::Json`]으로 거부합니다.
/// 호출자가 라인 번호와 함께 경고를 남기고 건너뜁니다.
pub struct JsonLineParser;

impl JsonLineParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for JsonLineParser {
    fn format_name(&self) -> &str {
        "jsonl"
    }

    fn parse(&self, raw: &str) -> Result<LogEntry, LogsentryError> {
        let line = raw.trim();
        if line.is_empty() {
            return Err(ParseError::EmptyLine.into());
        }

        serde_json::from_str(line)
            .map_err(|e| {
                ParseError::Json {
                    reason: e.to_string(),
                }
                .into()
            })
    }
}
