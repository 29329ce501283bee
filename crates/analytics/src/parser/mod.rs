//! 로그 파싱 모듈 -- 원시 텍스트, JSON Lines 형식별 파서
//!
//! [`ParserRouter`]는 원시 로그 라인의 형식을 판별하여 적절한 파서를 선택합니다.
//! 각 파서는 core의 [`LogParser`](logsentry_core::pipeline::LogParser) trait을 구현합니다.
//!
//! # 지원 형식
//! - JSON Lines ([`JsonLineParser`])
//! - 원시 텍스트 헤더 문법 ([`TextLogParser`])
//!
//! # 사용 예시
//! ```
//! use logsentry_analytics::parser::ParserRouter;
//!
//! let router = ParserRouter::with_defaults();
//! let entry = router
//!     .parse("2025-11-16 09:00:01 INFO MobileApp action=login_success user_id=u1")
//!     .unwrap();
//! assert_eq!(entry.source, "MobileApp");
//! ```

pub mod json;
pub mod text;

pub use json::JsonLineParser;
pub use text::TextLogParser;

use logsentry_core::error::{LogsentryError, ParseError};
use logsentry_core::pipeline::LogParser;
use logsentry_core::types::LogEntry;

/// 파서 라우터 -- 로그 형식을 자동 감지하여 적절한 파서를 선택합니다.
///
/// 등록된 파서 목록을 순회하며, 첫 번째로 파싱에 성공한 파서의 결과를 반환합니다.
/// 모든 파서가 실패하면 마지막 에러를 반환합니다.
///
/// JSON 파서를 먼저 등록합니다 — JSON 라인은 텍스트 문법으로도 토큰이
/// 4개 이상 나올 수 있어, 텍스트 파서가 먼저면 엉뚱한 엔트리가 됩니다.
pub struct ParserRouter {
    /// 등록된 파서 목록 (순서대로 시도)
    parsers: Vec<Box<dyn LogParser>>,
}

impl ParserRouter {
    /// 빈 라우터를 생성합니다.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// 기본 파서 세트 (JSON Lines + 텍스트)로 라우터를 생성합니다.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Box::new(JsonLineParser::new()))
            .register(Box::new(TextLogParser::new()))
    }

    /// 파서를 등록합니다. 등록 순서대로 시도됩니다.
    pub fn register(mut self, parser: Box<dyn LogParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// 원시 로그 라인을 파싱합니다 (형식 자동 감지).
    pub fn parse(&self, raw: &str) -> Result<LogEntry, LogsentryError> {
        if self.parsers.is_empty() {
            return Err(ParseError::UnsupportedFormat("no parsers registered".to_owned()).into());
        }

        let mut last_error = None;

        for parser in &self.parsers {
            match parser.parse(raw) {
                Ok(entry) => return Ok(entry),
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ParseError::UnsupportedFormat("all parsers failed".to_owned()).into()))
    }

    /// 특정 형식 이름의 파서로 직접 파싱합니다.
    pub fn parse_with(&self, format_name: &str, raw: &str) -> Result<LogEntry, LogsentryError> {
        for parser in &self.parsers {
            if parser.format_name() == format_name {
                return parser.parse(raw);
            }
        }
        Err(ParseError::UnsupportedFormat(format_name.to_owned()).into())
    }

    /// 등록된 파서 형식 이름 목록을 반환합니다.
    pub fn registered_formats(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.format_name()).collect()
    }
}

impl Default for ParserRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
