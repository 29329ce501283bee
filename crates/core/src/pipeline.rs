//! 파이프라인 trait — 모듈 확장 포인트 정의

use std::future::Future;
use std::pin::Pin;

use crate::error::LogsentryError;
use crate::types::LogEntry;

/// Boxed future 타입 별칭
///
/// RPITIT trait을 `dyn` 호환 trait으로 감쌀 때 사용합니다.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 로그 파서 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현합니다.
/// 파서는 상태가 없는 순수 함수여야 하며, 형식에 맞지 않는 라인은
/// panic 없이 [`ParseError`](crate::error::ParseError)로 거부합니다.
pub trait LogParser: Send + Sync {
    /// 지원하는 로그 형식 이름
    fn format_name(&self) -> &str;

    /// 원시 로그 한 줄을 로그 엔트리로 파싱
    fn parse(&self, raw: &str) -> Result<LogEntry, LogsentryError>;
}

/// 알림 전달 trait
///
/// 트리거된 알림 보고서를 외부 채널(콘솔, webhook 등)로 전달합니다.
/// 전달 실패는 호출자가 로그로 남기며, 분석 패스를 실패시키지 않습니다.
pub trait Notifier: Send + Sync {
    /// 알림 채널 이름 (예: "console", "webhook")
    fn channel_name(&self) -> &str;

    /// 알림을 전달합니다.
    fn notify(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> impl Future<Output = Result<(), LogsentryError>> + Send;
}

/// dyn-compatible 알림 trait
///
/// `Notifier` trait은 RPITIT를 사용하므로 `dyn Notifier`가 불가합니다.
/// `DynNotifier`는 `BoxFuture`를 반환하여 `Vec<Box<dyn DynNotifier>>`로
/// 여러 채널을 동적 관리할 수 있게 합니다.
pub trait DynNotifier: Send + Sync {
    /// 알림 채널 이름
    fn channel_name(&self) -> &str;

    /// 알림을 전달합니다.
    fn notify<'a>(
        &'a self,
        subject: &'a str,
        body: &'a str,
        recipients: &'a [String],
    ) -> BoxFuture<'a, Result<(), LogsentryError>>;
}

/// Notifier를 구현한 타입은 자동으로 DynNotifier도 구현됩니다.
impl<T: Notifier> DynNotifier for T {
    fn channel_name(&self) -> &str {
        Notifier::channel_name(self)
    }

    fn notify<'a>(
        &'a self,
        subject: &'a str,
        body: &'a str,
        recipients: &'a [String],
    ) -> BoxFuture<'a, Result<(), LogsentryError>> {
        Box::pin(Notifier::notify(self, subject, body, recipients))
    }
}
