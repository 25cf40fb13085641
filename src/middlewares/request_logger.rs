//! 콘솔 요청 로거 미들웨어
//!
//! 요청마다 ID를 부여하고 처리 시간을 측정한 뒤 한 줄을 표준 출력에 남깁니다.
//!
//! ```text
//! 2024/05/01 10:00:00 | 200 |       1.532ms |       127.0.0.1 | GET | /orders/7
//! ```

use std::fmt;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::{Duration, Instant};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use futures_util::future::LocalBoxFuture;

use crate::utils::response::ResponseBody;
use crate::utils::string_utils::truncate_for_log;

/// 요청 ID를 주고받는 헤더
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 디버그 로그에 남길 응답 본문 최대 길이 (문자 수)
const MAX_LOGGED_BODY: usize = 512;

/// 요청 ID. 요청 extension에 저장되어 [`ContextLogger`](crate::logging::ContextLogger)가 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// 새 UUID v4 기반 ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_request(req: &ServiceRequest) -> Self {
        req.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(RequestId::from)
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 요청 로거 미들웨어
///
/// ```rust,ignore
/// use backend_utils::middlewares::{Recover, RequestLogger};
///
/// App::new()
///     .wrap(RequestLogger)
///     .wrap(Recover::new())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let request_id = RequestId::from_request(&req);
        req.extensions_mut().insert(request_id.clone());

        let method = req.method().to_string();
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.path().to_string());
        let client_ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("-")
            .to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let status = match &result {
                Ok(res) => res.status().as_u16(),
                Err(e) => e.as_response_error().status_code().as_u16(),
            };

            println!(
                "{}",
                format_line(Local::now(), status, start.elapsed(), &client_ip, &method, &path)
            );

            let mut res = result?;
            if let Some(body) = ResponseBody::of(res.request()) {
                log::debug!(
                    trace_id = request_id.as_str();
                    "response body: {}",
                    truncate_for_log(&body, MAX_LOGGED_BODY)
                );
            }
            if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        })
    }
}

/// `시각 | 상태 | 지연 | 클라이언트 IP | 메서드 | 경로`
pub fn format_line(
    time: DateTime<Local>,
    status: u16,
    latency: Duration,
    client_ip: &str,
    method: &str,
    path: &str,
) -> String {
    format!(
        "{} | {} | {:>13} | {:>15} | {} | {}",
        time.format("%Y/%m/%d %H:%M:%S"),
        status_color(status),
        format!("{:?}", latency),
        client_ip,
        method_color(method),
        path
    )
}

pub fn status_color(status: u16) -> ColoredString {
    let text = status.to_string();
    match status {
        200..=299 => text.green(),
        300..=399 => text.white(),
        400..=499 => text.yellow(),
        _ => text.red(),
    }
}

pub fn method_color(method: &str) -> ColoredString {
    match method {
        "GET" | "HEAD" => method.blue(),
        "POST" => method.magenta(),
        "PUT" => method.yellow(),
        "DELETE" => method.red(),
        "PATCH" => method.green(),
        "OPTIONS" => method.white(),
        _ => method.normal(),
    }
}
