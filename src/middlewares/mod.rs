//! 미들웨어 모듈
//!
//! ActixWeb 애플리케이션의 요청 처리 파이프라인에서 사용되는 미들웨어들을 제공합니다.
//! 횡단 관심사(Cross-cutting concerns)를 처리합니다.
//!
//! # 제공 미들웨어
//!
//! ### 1. 요청 로거 (RequestLogger)
//! - 요청 ID 부여 (`x-request-id` 헤더가 있으면 그대로 사용)
//! - 처리 시간 측정, 상태/메서드별 색상으로 표준 출력에 한 줄 기록
//!
//! ### 2. 패닉 복구 (Recover)
//! - 핸들러 패닉을 잡아 요청 정보와 백트레이스를 error 로그로 기록
//! - 500 응답 반환, 워커 유지
//!
//! ### 3. 프로파일링 ([`pprof`])
//! - `/debug/pprof` 아래 CPU 프로파일, 플레임그래프, 실행 인자
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::{App, HttpServer};
//! use backend_utils::middlewares::{pprof, Recover, RequestLogger};
//!
//! HttpServer::new(|| {
//!     App::new()
//!         .wrap(RequestLogger)
//!         .wrap(Recover::new())          // 가장 바깥쪽
//!         .configure(pprof::configure)
//!         .service(/* 라우트들 */)
//! })
//! ```

pub mod pprof;
pub mod recover;
pub mod request_logger;

// 미들웨어 재export
pub use recover::Recover;
pub use request_logger::{RequestId, RequestLogger};
