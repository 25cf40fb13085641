//! 패닉 복구 미들웨어
//!
//! 하위 핸들러에서 발생한 패닉을 잡아 요청 정보와 백트레이스를 error 레벨로 기록하고
//! 워커를 유지한 채 500 응답을 반환합니다.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::future::{ready, Ready};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Once;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpRequest, ResponseError};
use colored::Colorize;
use futures_util::future::{FutureExt, LocalBoxFuture};

use crate::core::errors::AppError;

thread_local! {
    // 패닉 훅이 캡처한 마지막 백트레이스 (actix 워커는 요청을 같은 스레드에서 처리)
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// 기존 훅을 유지하면서 백트레이스를 보관하는 훅을 한 번만 설치합니다.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture().to_string();
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
            previous(info);
        }));
    });
}

fn take_backtrace() -> String {
    LAST_BACKTRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_default()
}

/// 패닉 페이로드를 문자열로 변환합니다.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 패닉 복구 미들웨어
///
/// 가장 바깥쪽에 등록해야 다른 미들웨어의 패닉까지 잡을 수 있습니다.
///
/// ```rust,ignore
/// App::new()
///     .wrap(RequestLogger)
///     .wrap(Recover::new())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Recover;

impl Recover {
    pub fn new() -> Self {
        install_panic_hook();
        Recover
    }
}

impl Default for Recover {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for Recover
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RecoverService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        install_panic_hook();
        ready(Ok(RecoverService {
            service: Rc::new(service),
        }))
    }
}

pub struct RecoverService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RecoverService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let http_req = req.request().clone();
        let service = self.service.clone();

        Box::pin(async move {
            // call() 자체의 동기 패닉과 future 내부 패닉을 모두 처리
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| service.call(req))) {
                Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
                Err(payload) => Err(payload),
            };

            match outcome {
                Ok(result) => result.map(|res| res.map_into_left_body()),
                Err(payload) => {
                    log_recovered(&http_req, &panic_message(payload.as_ref()));
                    let response = AppError::InternalError("panic recovered".to_string()).error_response();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
            }
        })
    }
}

fn log_recovered(req: &HttpRequest, error: &str) {
    let uri = req.uri().to_string();
    let method = req.method().to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let client_ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("-")
        .to_string();
    let stacktrace = take_backtrace();

    eprintln!(
        "{}",
        format!("Recovered from a route's handler\n{} {}\n{}\n{}", method, uri, error, stacktrace).red()
    );
    log::error!(
        uri = uri.as_str(),
        user_agent = user_agent.as_str(),
        client_ip = client_ip.as_str(),
        method = method.as_str(),
        error = error,
        stacktrace = stacktrace.as_str();
        "Recovered from a route's handler"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};

    async fn boom() -> HttpResponse {
        panic!("boom")
    }

    async fn fine() -> HttpResponse {
        HttpResponse::Ok().body("fine")
    }

    #[::core::prelude::v1::test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[actix_web::test]
    async fn test_panic_becomes_500() {
        let app = test::init_service(
            App::new()
                .wrap(Recover::new())
                .route("/boom", web::get().to(boom))
                .route("/fine", web::get().to(fine)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/boom").to_request()).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // 패닉 이후에도 같은 서비스가 정상 동작
        let res = test::call_service(&app, test::TestRequest::get().uri("/fine").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "fine");
    }

    #[actix_web::test]
    async fn test_error_body_is_json() {
        let app = test::init_service(
            App::new()
                .wrap(Recover::new())
                .route("/boom", web::get().to(boom)),
        )
        .await;

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/boom").to_request()).await;
        assert_eq!(body["error"], "Internal server error: panic recovered");
    }
}
