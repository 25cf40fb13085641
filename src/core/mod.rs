//! # Core Module
//!
//! 백엔드 커넥션 관리의 핵심 구성 요소를 제공하는 모듈입니다.
//! 데이터베이스와 Redis는 모두 같은 레지스트리 패턴으로 초기화됩니다.
//!
//! ## 모듈 구성
//!
//! ### [`registry`] - 이름 기반 커넥션 레지스트리
//! - **Registry**: 인스턴스 이름 → `Arc<Handle>` 맵
//! - **PooledClientFactory**: 백엔드별 레코드 해석과 풀 생성
//! - **init_registry**: 섹션 수집 → 검증 → 연결 → 등록
//!
//! ### [`instance`] - primary/replica 그룹핑
//! - `<instance>.master` 섹션을 primary로, 나머지를 replica로 분류
//! - primary 우선 안정 정렬, 중복 primary 거부
//!
//! ### [`policy`] - replica 선택 정책
//! - 무작위(`RandomPolicy`) / 순환(`RoundRobinPolicy`) 선택
//!
//! ### [`secret`] - 자격 증명 복호화
//! - `sid` 키가 있는 섹션의 비밀번호를 외부 키 관리 시스템으로 복호화
//!
//! ### [`backends`] - 레지스트리 컨테이너
//! - 데이터베이스, Redis 레지스트리를 한 번에 초기화하고 DI로 전달
//!
//! ### [`errors`] - 통합 에러 처리
//! - **AppError**: 애플리케이션 전역 에러 타입 정의
//! - **HTTP 통합**: Actix-Web ResponseError 구현
//!
//! ## 애플리케이션 초기화
//!
//! ```rust,ignore
//! use actix_web::{web, App, HttpServer};
//! use backend_utils::config;
//! use backend_utils::core::{Backends, PassthroughResolver};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = config::set_default("conf/app.ini").expect("config");
//!     let backends = match Backends::init(store, &PassthroughResolver).await {
//!         Ok(backends) => web::Data::new(backends),
//!         Err(e) => {
//!             log::error!("{}", e);
//!             std::process::exit(1);
//!         }
//!     };
//!
//!     HttpServer::new(move || App::new().app_data(backends.clone()))
//!         .bind("0.0.0.0:8080")?
//!         .run()
//!         .await
//! }
//! ```
//!
//! ## 트러블슈팅
//!
//! ### 미등록 인스턴스 조회
//! ```text
//! panic: db not found: orders
//! ```
//! **해결**: `[database.orders]` 또는 `[database.orders.master]` 섹션이 설정 파일에 있는지 확인
//!
//! ### 중복 primary
//! ```text
//! db init failed. name: orders, error: instance orders declares 2 master sections.
//! ```
//! **해결**: 인스턴스당 `master` 섹션은 하나만 선언

pub mod backends;
pub mod errors;
pub mod instance;
pub mod policy;
pub mod registry;
pub mod secret;

pub use backends::*;
pub use errors::*;
pub use instance::*;
pub use policy::*;
pub use registry::*;
pub use secret::*;
