//! 원시 텍스트 로그 파서
//!
//! 모바일 AI 서비스 스택의 헤더 문법을 파싱합니다.
//!
//! # 라인 형식
//! ```text
//! DATE TIME LEVEL SOURCE body...
//! 2025-11-16 09:00:01 INFO MobileApp action=login_success user_id=u1001
//! ```
//!
//! 본문은 공백 단위 토큰이며, `key=value` 토큰은 `fields`로,
//! 나머지 토큰은 순서대로 `raw_message`로 들어갑니다.
//! 값은 큰따옴표로 감쌀 수 있고, 이 경우 내부 공백이 보존됩니다.
//!
//! # 사용 예시
//! ```
//! use logsentry_analytics::parser::TextLogParser;
//! use logsentry_core::pipeline::LogParser;
//!
//! let parser = TextLogParser::new();
//! let entry = parser
//!     .parse("2025-11-16 09:00:01 INFO AIInference model=asr-small-v1 latency_ms=150")
//!     .unwrap();
//! assert_eq!(entry.source, "AIInference");
//! ```

use std::collections::BTreeMap;

use regex::Regex;

use logsentry_core::error::{LogsentryError, ParseError};
use logsentry_core::pipeline::LogParser;
use logsentry_core::types::LogEntry;

/// 본문 토큰 문법: 따옴표 값 key=value | 일반 key=value | 그 외 토큰
const KV_TOKEN_PATTERN: &str = r#"([A-Za-z0-9_]+)="([^"]*)"|([A-Za-z0-9_]+)=(\S+)|(\S+)"#;

/// 원시 텍스트 로그 파서
///
/// 상태가 없는 순수 파서입니다. 형식에 맞지 않는 라인은
/// [`ParseError`]로 거부하며, 호출자가 카운트 후 건너뜁니다.
///
/// 레벨 토큰은 검증하지 않고 원문 그대로 보존합니다 —
/// 분류는 [`LogEntry::normalized_level`]을 쓰는 소비자의 몫입니다.
pub struct TextLogParser {
    /// 컴파일된 본문 토큰 패턴
    kv_token: Regex,
}

impl TextLogParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self {
            kv_token: Regex::new(KV_TOKEN_PATTERN).expect("static kv token pattern"),
        }
    }

    /// 라인을 헤더 4개 토큰과 본문으로 분리합니다.
    ///
    /// 반환값: `(date, time, level, source, body)`. 토큰이 4개 미만이면 `None`.
    fn split_header(line: &str) -> Option<(&str, &str, &str, &str, &str)> {
        let (date, rest) = Self::next_token(line)?;
        let (time, rest) = Self::next_token(rest)?;
        let (level, rest) = Self::next_token(rest)?;
        let (source, rest) = Self::next_token(rest)?;
        Some((date, time, level, source, rest.trim_start()))
    }

    /// 선행 공백을 제거하고 다음 공백 전까지의 토큰을 잘라냅니다.
    fn next_token(input: &str) -> Option<(&str, &str)> {
        let trimmed = input.trim_start();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.find(char::is_whitespace) {
            Some(idx) => Some((&trimmed[..idx], &trimmed[idx..])),
            None => Some((trimmed, "")),
        }
    }

    /// 본문에서 key=value 필드와 나머지 토큰을 분리합니다.
    ///
    /// 중복 키는 마지막 값이 남습니다. 매칭되지 않은 토큰은
    /// 원래 순서 그대로 단일 공백으로 이어붙입니다.
    fn parse_body(&self, body: &str) -> (BTreeMap<String, String>, String) {
        let mut fields = BTreeMap::new();
        let mut raw_tokens: Vec<&str> = Vec::new();

        for caps in self.kv_token.captures_iter(body) {
            if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
                // 따옴표 값 — 따옴표는 제거, 내부 공백은 보존
                fields.insert(key.as_str().to_owned(), value.as_str().to_owned());
            } else if let (Some(key), Some(value)) = (caps.get(3), caps.get(4)) {
                fields.insert(key.as_str().to_owned(), value.as_str().to_owned());
            } else if let Some(token) = caps.get(5) {
                raw_tokens.push(token.as_str());
            }
        }

        (fields, raw_tokens.join(" "))
    }
}

impl Default for TextLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for TextLogParser {
    fn format_name(&self) -> &str {
        "text"
    }

    fn parse(&self, raw: &str) -> Result<LogEntry, LogsentryError> {
        let line = raw.trim();
        if line.is_empty() {
            return Err(ParseError::EmptyLine.into());
        }

        let Some((date, time, level, source, body)) = Self::split_header(line) else {
            return Err(ParseError::InsufficientTokens {
                count: line.split_whitespace().count(),
            }
            .into());
        };

        let (fields, raw_message) = self.parse_body(body);

        Ok(LogEntry {
            timestamp: format!("{date} {time}"),
            level: level.to_owned(),
            source: source.to_owned(),
            fields,
            raw_message,
        })
    }
}
