//! # Application Error Handling System
//!
//! 백엔드 유틸리티 전반에서 사용하는 통합 에러 타입입니다.
//! 설정 로딩, 커넥션 레지스트리 초기화, 풀 생성, HTTP 헬퍼까지
//! 모든 계층이 `AppError` 하나로 실패를 표현합니다.
//!
//! ## 설계 철학
//!
//! ### 1. Fail-Fast 초기화
//! - 설정 누락, 알 수 없는 드라이버, 연결 불가 백엔드는 모두 에러 값으로 반환
//! - 임베딩 프로세스(`main`)가 에러를 받아 즉시 종료로 변환
//! - 부분적으로 초기화된 레지스트리는 허용하지 않음
//!
//! ### 2. 컨텍스트 보존
//! - `InitFailed`는 백엔드 종류, 인스턴스 이름, 원인 에러를 모두 보존
//! - `thiserror`의 `#[source]`로 원인 체인 추적
//!
//! ### 3. HTTP 통합
//! - `actix_web::ResponseError` 구현으로 핸들러에서 `?` 로 바로 전파
//!
//! ## 에러 분류
//!
//! | AppError | HTTP Status | 발생 시점 |
//! |----------|-------------|-----------|
//! | `ConfigurationMissing` | 500 | 기본 설정 로드 전 조회 |
//! | `ConfigError` | 500 | INI 파일 없음 / 파싱 실패 |
//! | `ValidationError` | 400 | 필수 필드 누락 (host/port 등) |
//! | `UnknownDriver` | 500 | 지원하지 않는 DB 드라이버 |
//! | `MultiplePrimaries` | 500 | 한 인스턴스에 master 가 둘 이상 |
//! | `ConnectivityError` | 500 | 기동 시 PING 실패 |
//! | `DatabaseError` / `RedisError` | 500 | 풀 생성 / 쿼리 실패 |
//! | `SecretError` | 500 | 자격 증명 복호화 실패 |
//! | `InitFailed` | 500 | 레지스트리 초기화 실패 (원인 포함) |
//! | `NotFound` | 404 | 등록되지 않은 인스턴스 조회 |
//! | `InternalError` | 500 | 예상치 못한 오류 |
//!
//! ## 사용 패턴
//!
//! ```rust,ignore
//! use backend_utils::core::errors::{AppError, AppResult};
//!
//! fn port_of(value: &str) -> AppResult<u16> {
//!     value.parse::<u16>()
//!         .map_err(|e| AppError::ValidationError(format!("invalid port {}: {}", value, e)))
//! }
//! ```

use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 레지스트리 초기화 경로에서 발생하는 모든 실패는 이 타입으로 표현되며,
/// 최종적으로 `InitFailed`로 감싸져 어떤 인스턴스에서 실패했는지 드러납니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 기본 설정이 로드되기 전에 설정 조회가 일어난 경우
    ///
    /// `config::set_default()` 호출 없이 `config::section()`을 부르면 발생합니다.
    #[error("default conf not found.")]
    ConfigurationMissing,

    /// 설정 파일이 없거나 INI 문법이 잘못된 경우
    #[error("Config error: {0}")]
    ConfigError(String),

    /// 필수 필드 누락 등 입력값 검증 실패 (400 Bad Request)
    ///
    /// # 예제
    /// ```rust,ignore
    /// if config.host.is_empty() || config.port.is_empty() {
    ///     return Err(AppError::ValidationError("host or port is empty".to_string()));
    /// }
    /// ```
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 지원하지 않는 데이터베이스 드라이버
    #[error("unknown database drive: {0}")]
    UnknownDriver(String),

    /// 하나의 인스턴스 그룹에 master 레코드가 둘 이상 선언된 경우
    #[error("instance {instance} declares {count} master sections")]
    MultiplePrimaries { instance: String, count: usize },

    /// 같은 이름의 인스턴스를 두 번 등록하려는 경우
    #[error("instance already registered: {0}")]
    DuplicateInstance(String),

    /// 기동 시점 생존 확인(PING) 실패
    #[error("Connectivity error: {0}")]
    ConnectivityError(String),

    /// 데이터베이스 관련 에러
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Redis 관련 에러
    #[error("Redis error: {0}")]
    RedisError(String),

    /// 자격 증명 복호화 실패
    #[error("Secret error: {0}")]
    SecretError(String),

    /// 레지스트리 초기화 실패
    ///
    /// 백엔드 종류(`db`, `redis`)와 인스턴스 이름, 원인을 함께 보존합니다.
    /// 메시지 형식은 운영 로그에서 바로 검색할 수 있도록 고정되어 있습니다.
    ///
    /// ```text
    /// redis init failed. name: sessions, error: Validation error: host or port is empty.
    /// ```
    #[error("{backend} init failed. name: {name}, error: {source}.")]
    InitFailed {
        backend: &'static str,
        name: String,
        #[source]
        source: Box<AppError>,
    },

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 원인 에러를 인스턴스 이름과 함께 `InitFailed`로 감쌉니다.
    pub fn init_failed(backend: &'static str, name: impl Into<String>, source: AppError) -> Self {
        AppError::InitFailed {
            backend,
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// `InitFailed` 체인을 벗겨 최초 원인을 반환합니다.
    pub fn root_cause(&self) -> &AppError {
        match self {
            AppError::InitFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<deadpool_redis::redis::RedisError> for AppError {
    fn from(e: deadpool_redis::redis::RedisError) -> Self {
        AppError::RedisError(e.to_string())
    }
}

impl From<deadpool_redis::PoolError> for AppError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        AppError::RedisError(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 모든 에러 응답은 `{"error": "..."}` 형식의 JSON 입니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        actix_web::HttpResponse::build(status)
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
///
/// ```rust,ignore
/// use backend_utils::core::errors::ErrorContext;
///
/// std::fs::create_dir_all(&dir).context("failed to create log directory")?;
/// ```
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("host or port is empty".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_response() {
        let error = AppError::NotFound("db not found: orders".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_init_failed_response_is_internal() {
        let error = AppError::init_failed("db", "orders", AppError::UnknownDriver("oracle".to_string()));
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_init_failed_message_names_instance_and_cause() {
        let error = AppError::init_failed(
            "redis",
            "sessions",
            AppError::ValidationError("host or port is empty".to_string()),
        );

        assert_eq!(
            error.to_string(),
            "redis init failed. name: sessions, error: Validation error: host or port is empty."
        );
        assert!(matches!(error.root_cause(), AppError::ValidationError(_)));
    }

    #[test]
    fn test_configuration_missing_message() {
        assert_eq!(AppError::ConfigurationMissing.to_string(), "default conf not found.");
    }

    #[test]
    fn test_error_context_trait() {
        let result: Result<(), &str> = Err("original error");
        let app_result = result.context("Additional context");

        assert!(app_result.is_err());
        if let Err(AppError::InternalError(msg)) = app_result {
            assert!(msg.contains("Additional context"));
            assert!(msg.contains("original error"));
        } else {
            panic!("Expected InternalError");
        }
    }
}
