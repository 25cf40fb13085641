//! # Configuration Module
//!
//! INI 파일 기반 설정 관리를 담당하는 모듈입니다.
//! 프로세스 기동 시 설정 파일을 한 번 읽어 기본 저장소로 설치하고,
//! 이후 로거와 커넥션 레지스트리가 섹션 단위로 값을 조회합니다.
//!
//! ## 모듈 구성
//!
//! - [`store`] - INI 파싱, 섹션/키 조회, 자식 섹션 탐색
//! - [`duration`] - `300ms`, `1m30s` 형태의 기간 파서
//! - [`app_config`] - `[app]` 섹션 (서비스 이름, 실행 모드)
//!
//! ## 섹션 구성
//!
//! ```ini
//! [app]
//! name = my-service
//! mode = release
//!
//! [log]
//! maxsize = 1024
//! compress = true
//! encode_type = json
//!
//! [orm]
//! prepare_stmt = true
//! trace_sql = false
//! slow_threshold = 1s
//!
//! [database.orders.master]
//! drive = mysql
//! host = 10.0.0.1
//!
//! [redis.sessions]
//! host = 10.0.0.5
//! port = 6379
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use backend_utils::config;
//!
//! config::set_default("conf/app.ini")?;
//!
//! let app = config::app()?;
//! let log = config::section("log")?;
//! println!("{} logs rotate at {}MB", app.name, log.key("maxsize").as_int(1024));
//! ```

pub mod app_config;
pub mod duration;
pub mod store;

pub use app_config::*;
pub use store::{ConfigStore, Key, Section};

use std::path::Path;

use once_cell::sync::OnceCell;

use crate::core::errors::{AppError, AppResult};

static DEFAULT_STORE: OnceCell<ConfigStore> = OnceCell::new();

/// 설정 파일을 읽어 프로세스 기본 저장소로 설치합니다.
///
/// 기본 저장소는 한 번만 설치할 수 있으며, 두 번째 호출은 `ConfigError`를 반환합니다.
pub fn set_default<P: AsRef<Path>>(path: P) -> AppResult<&'static ConfigStore> {
    let store = ConfigStore::load(path)?;
    DEFAULT_STORE
        .set(store)
        .map_err(|_| AppError::ConfigError("default conf already loaded".to_string()))?;
    default_store()
}

/// 프로세스 기본 저장소
pub fn default_store() -> AppResult<&'static ConfigStore> {
    DEFAULT_STORE.get().ok_or(AppError::ConfigurationMissing)
}

/// 기본 저장소의 섹션을 조회합니다.
///
/// 기본 저장소가 설치되기 전이면 `ConfigurationMissing`을 반환합니다.
pub fn section(name: &str) -> AppResult<Section<'static>> {
    Ok(default_store()?.section(name))
}

/// 기본 저장소의 `[app]` 설정
pub fn app() -> AppResult<AppConfig> {
    Ok(AppConfig::from_store(default_store()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_before_default_is_missing() {
        // 테스트 프로세스에서는 기본 저장소를 설치하지 않음
        assert!(matches!(section("app"), Err(AppError::ConfigurationMissing)));
        assert!(matches!(app(), Err(AppError::ConfigurationMissing)));
    }
}
