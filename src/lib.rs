//! 백엔드 서비스 공통 유틸리티
//!
//! INI 설정, 회전 로그, 이름 기반 데이터베이스/Redis 레지스트리,
//! 인메모리 캐시, ActixWeb 미들웨어와 응답 헬퍼를 제공합니다.
//!
//! # Features
//!
//! - **설정**: INI 파일 한 번 로드, 섹션/키 타입 조회, 자식 섹션 탐색
//! - **로깅**: `log` 파사드, JSON/MIS 형식 파일 로그, 크기 기반 회전과 gzip 압축
//! - **레지스트리**: `[database.<name>.<role>]`, `[redis.<name>]` 섹션에서
//!   primary/replica 풀을 구성해 이름으로 공유
//! - **캐시**: 바이트 용량 제한 인메모리 캐시
//! - **미들웨어**: 요청 로거, 패닉 복구, pprof 프로파일링
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   ConfigStore   │ ← app.ini
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ ServiceLogger   │ ← <dir>/<app>.log
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Backends     │ ← Registry<Database>, Registry<RedisClient>
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ HTTP handlers   │ ← web::Data<Backends>
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use backend_utils::core::{Backends, PassthroughResolver};
//! use backend_utils::{config, logging};
//!
//! let store = config::set_default("conf/app.ini")?;
//! logging::init_logger("logs", store)?;
//!
//! let backends = Backends::init(store, &PassthroughResolver).await?;
//! let orders = backends.database("orders");
//! sqlx::query("SELECT 1").execute(orders.reader().as_mysql().unwrap()).await?;
//! ```

pub mod caching;
pub mod config;
pub mod core;
pub mod db;
pub mod logging;
pub mod middlewares;
pub mod utils;
