//! 요청 단위 로거
//!
//! [`RequestLogger`](crate::middlewares::RequestLogger)가 부여한 요청 ID를
//! 모든 로그 레코드에 `trace_id` 필드로 붙입니다.

use actix_web::{HttpMessage, HttpRequest};
use log::Level;

use crate::middlewares::request_logger::RequestId;

/// 요청 ID를 함께 기록하는 로거
///
/// ```rust,ignore
/// use backend_utils::logging::ContextLogger;
///
/// async fn create_order(req: HttpRequest) -> AppResult<HttpResponse> {
///     let log = ContextLogger::from_request(&req);
///     log.info("order accepted");   // {"msg":"order accepted","trace_id":"6f1c..."}
///     ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContextLogger {
    trace_id: Option<String>,
}

impl ContextLogger {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
        }
    }

    /// 요청 extension의 [`RequestId`]를 사용합니다. 없으면 `trace_id` 없이 기록합니다.
    pub fn from_request(req: &HttpRequest) -> Self {
        Self {
            trace_id: req.extensions().get::<RequestId>().map(|id| id.to_string()),
        }
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::Info, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log(Level::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::Error, msg);
    }

    fn log(&self, level: Level, msg: &str) {
        match self.trace_id.as_deref() {
            Some(trace_id) => log::log!(level, trace_id = trace_id; "{}", msg),
            None => log::log!(level, "{}", msg),
        }
    }
}
