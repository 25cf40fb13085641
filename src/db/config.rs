//! 데이터베이스 설정
//!
//! `[database.<instance>[.<role>]]` 섹션 하나가 [`DbConfig`] 하나가 되며,
//! `[orm]` 섹션은 모든 인스턴스에 공통으로 적용되는 [`OrmConfig`]가 됩니다.

use std::time::Duration;

use crate::config::{ConfigStore, Section};
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::default_pool_limits;

pub const DEFAULT_CHARSET: &str = "utf8";
pub const DEFAULT_SSL_MODE: &str = "disable";

/// 유휴 커넥션 최대 유지 시간
pub const DEFAULT_CONN_MAX_IDLE_TIME: Duration = Duration::from_secs(60 * 60);
/// 커넥션 최대 수명
pub const DEFAULT_CONN_MAX_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);
/// 연결 수립 타임아웃
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// 지원 드라이버
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    MySql,
    Postgres,
}

impl Driver {
    /// `drive` 키 값에서 드라이버를 결정합니다.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "mysql" => Ok(Driver::MySql),
            "postgres" => Ok(Driver::Postgres),
            other => Err(AppError::UnknownDriver(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::MySql => "mysql",
            Driver::Postgres => "postgres",
        }
    }
}

/// 데이터베이스 엔드포인트 하나의 연결 정보
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub driver: Driver,
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Postgres 전용 (`disable`, `require` 등)
    pub ssl_mode: String,
    /// MySQL 전용
    pub charset: String,
    pub max_open: u32,
    pub max_idle: u32,
}

impl DbConfig {
    /// 섹션에서 연결 정보를 읽습니다. `password`는 복호화된 값을 받습니다.
    pub fn from_section(section: &Section<'_>, password: String) -> AppResult<Self> {
        let (default_max_open, default_max_idle) = default_pool_limits();
        Ok(Self {
            driver: Driver::parse(&section.key("drive").string())?,
            host: section.key("host").string(),
            port: section.key("port").string(),
            username: section.key("username").string(),
            password,
            database: section.key("db").string(),
            ssl_mode: section.key("ssl_mode").as_string(DEFAULT_SSL_MODE),
            charset: section.key("charset").as_string(DEFAULT_CHARSET),
            max_open: section.key("max_open").as_u32(default_max_open),
            max_idle: section.key("max_idle").as_u32(default_max_idle),
        })
    }

    /// 포트를 숫자로 해석합니다. 비어 있으면 드라이버 기본 포트를 사용합니다.
    pub fn port_number(&self) -> AppResult<u16> {
        if self.port.is_empty() {
            return Ok(match self.driver {
                Driver::MySql => 3306,
                Driver::Postgres => 5432,
            });
        }
        self.port
            .parse::<u16>()
            .map_err(|e| AppError::ValidationError(format!("invalid port {}: {}", self.port, e)))
    }

    /// 로그에 남겨도 되는 엔드포인트 표기
    pub fn endpoint(&self) -> String {
        format!("{}://{}:{}/{}", self.driver.as_str(), self.host, self.port, self.database)
    }
}

/// ORM 계층 공통 설정 (`[orm]` 섹션)
#[derive(Debug, Clone, PartialEq)]
pub struct OrmConfig {
    /// 서버측 prepared statement 캐시 사용 여부
    pub prepare_stmt: bool,
    /// 모든 SQL을 info 레벨로 기록
    pub trace_sql: bool,
    /// 이 시간보다 오래 걸린 SQL은 warn 레벨로 기록 (0 이면 비활성)
    pub slow_threshold: Duration,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            prepare_stmt: true,
            trace_sql: false,
            slow_threshold: Duration::from_secs(1),
        }
    }
}

impl OrmConfig {
    /// `[orm]` 섹션을 읽습니다. 없으면 이전 이름인 `[gorm]` 섹션을 사용합니다.
    pub fn from_store(store: &ConfigStore) -> Self {
        let section = match store.section("orm") {
            section if section.exists() => section,
            _ => store.section("gorm"),
        };
        let defaults = Self::default();
        Self {
            prepare_stmt: section.key("prepare_stmt").as_bool(defaults.prepare_stmt),
            trace_sql: section.key("trace_sql").as_bool(defaults.trace_sql),
            slow_threshold: section
                .key("slow_threshold")
                .as_duration(defaults.slow_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_defaults() {
        let store = ConfigStore::from_str(
            "[database.orders.master]\ndrive = mysql\nhost = 10.0.0.1\nport = 3306\ndb = orders\n",
        )
        .unwrap();
        let config = DbConfig::from_section(&store.section("database.orders.master"), String::new()).unwrap();
        let (max_open, max_idle) = default_pool_limits();

        assert_eq!(config.driver, Driver::MySql);
        assert_eq!(config.charset, "utf8");
        assert_eq!(config.ssl_mode, "disable");
        assert_eq!(config.max_open, max_open);
        assert_eq!(config.max_idle, max_idle);
        assert_eq!(config.port_number().unwrap(), 3306);
    }

    #[test]
    fn test_unknown_driver() {
        let store = ConfigStore::from_str("[database.orders]\ndrive = oracle\n").unwrap();
        let result = DbConfig::from_section(&store.section("database.orders"), String::new());

        match result {
            Err(AppError::UnknownDriver(driver)) => assert_eq!(driver, "oracle"),
            _ => panic!("Expected UnknownDriver"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let store = ConfigStore::from_str("[database.orders]\ndrive = postgres\nport = abc\n").unwrap();
        let config = DbConfig::from_section(&store.section("database.orders"), String::new()).unwrap();

        assert!(matches!(config.port_number(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_orm_config() {
        let store = ConfigStore::from_str("[orm]\nprepare_stmt = false\ntrace_sql = true\nslow_threshold = 250ms\n").unwrap();
        let orm = OrmConfig::from_store(&store);

        assert!(!orm.prepare_stmt);
        assert!(orm.trace_sql);
        assert_eq!(orm.slow_threshold, Duration::from_millis(250));
    }

    #[test]
    fn test_orm_config_legacy_section_and_defaults() {
        let legacy = ConfigStore::from_str("[gorm]\ntrace_sql = on\n").unwrap();
        assert!(OrmConfig::from_store(&legacy).trace_sql);

        let empty = ConfigStore::from_str("").unwrap();
        assert_eq!(OrmConfig::from_store(&empty), OrmConfig::default());
    }
}
