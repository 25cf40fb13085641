//! sqlx 커넥션 풀 생성
//!
//! 드라이버별 접속 옵션을 만들고, 인스턴스의 primary 레코드에서 가져온
//! [`PoolSettings`]를 모든 풀(primary, replica)에 똑같이 적용합니다.
//!
//! | 풀 | 생성 방식 | 실패 시점 |
//! |----|-----------|-----------|
//! | primary | `connect_with` (즉시 연결) | 기동 시 |
//! | replica | `connect_lazy_with` (지연 연결) | 첫 쿼리 시 |

use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::ConnectOptions;

use crate::core::errors::{AppError, AppResult};
use crate::db::config::{
    DbConfig, Driver, OrmConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_CONN_MAX_IDLE_TIME,
    DEFAULT_CONN_MAX_LIFETIME,
};

/// 인스턴스의 모든 풀에 공통 적용되는 설정
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSettings {
    pub max_open: u32,
    pub max_idle: u32,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    /// primary 레코드의 풀 크기로 설정을 만듭니다.
    pub fn from_primary(primary: &DbConfig) -> Self {
        Self {
            max_open: primary.max_open.max(1),
            // 유지 커넥션 수는 최대 커넥션 수를 넘지 않음
            max_idle: primary.max_idle.min(primary.max_open.max(1)),
            idle_timeout: DEFAULT_CONN_MAX_IDLE_TIME,
            max_lifetime: DEFAULT_CONN_MAX_LIFETIME,
            acquire_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    fn mysql(&self) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_connections(self.max_open)
            .min_connections(self.max_idle)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .acquire_timeout(self.acquire_timeout)
    }

    fn postgres(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_open)
            .min_connections(self.max_idle)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// 드라이버별 sqlx 풀
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Postgres(PgPool),
}

impl DbPool {
    /// 즉시 연결하는 풀을 만듭니다. 서버에 닿지 않으면 에러를 반환합니다.
    pub async fn connect(config: &DbConfig, settings: &PoolSettings, orm: &OrmConfig) -> AppResult<Self> {
        let pool = match config.driver {
            Driver::MySql => DbPool::MySql(
                settings
                    .mysql()
                    .connect_with(mysql_options(config, orm)?)
                    .await?,
            ),
            Driver::Postgres => DbPool::Postgres(
                settings
                    .postgres()
                    .connect_with(postgres_options(config, orm)?)
                    .await?,
            ),
        };
        Ok(pool)
    }

    /// 첫 사용 시 연결하는 풀을 만듭니다.
    pub fn connect_lazy(config: &DbConfig, settings: &PoolSettings, orm: &OrmConfig) -> AppResult<Self> {
        let pool = match config.driver {
            Driver::MySql => DbPool::MySql(settings.mysql().connect_lazy_with(mysql_options(config, orm)?)),
            Driver::Postgres => {
                DbPool::Postgres(settings.postgres().connect_lazy_with(postgres_options(config, orm)?))
            }
        };
        Ok(pool)
    }

    pub fn driver(&self) -> Driver {
        match self {
            DbPool::MySql(_) => Driver::MySql,
            DbPool::Postgres(_) => Driver::Postgres,
        }
    }

    /// `SELECT 1`로 생존 여부를 확인합니다.
    pub async fn ping(&self) -> AppResult<()> {
        match self {
            DbPool::MySql(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            DbPool::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    pub fn as_mysql(&self) -> Option<&MySqlPool> {
        match self {
            DbPool::MySql(pool) => Some(pool),
            DbPool::Postgres(_) => None,
        }
    }

    pub fn as_postgres(&self) -> Option<&PgPool> {
        match self {
            DbPool::Postgres(pool) => Some(pool),
            DbPool::MySql(_) => None,
        }
    }

    /// 풀에 적용된 최대 커넥션 수
    pub fn max_connections(&self) -> u32 {
        match self {
            DbPool::MySql(pool) => pool.options().get_max_connections(),
            DbPool::Postgres(pool) => pool.options().get_max_connections(),
        }
    }

    /// 풀에 적용된 최소 유지 커넥션 수
    pub fn min_connections(&self) -> u32 {
        match self {
            DbPool::MySql(pool) => pool.options().get_min_connections(),
            DbPool::Postgres(pool) => pool.options().get_min_connections(),
        }
    }

    pub async fn close(&self) {
        match self {
            DbPool::MySql(pool) => pool.close().await,
            DbPool::Postgres(pool) => pool.close().await,
        }
    }
}

/// SQL 로깅 설정을 접속 옵션에 반영합니다.
///
/// - `trace_sql`: 모든 문장을 info로 기록
/// - `slow_threshold`: 초과한 문장을 warn으로 기록 (0이면 비활성)
fn statement_logging<O: ConnectOptions>(options: O, orm: &OrmConfig) -> O {
    let statements = if orm.trace_sql {
        LevelFilter::Info
    } else {
        LevelFilter::Off
    };
    let slow = if orm.slow_threshold.is_zero() {
        LevelFilter::Off
    } else {
        LevelFilter::Warn
    };
    options
        .log_statements(statements)
        .log_slow_statements(slow, orm.slow_threshold)
}

pub(crate) fn mysql_options(config: &DbConfig, orm: &OrmConfig) -> AppResult<MySqlConnectOptions> {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port_number()?)
        .username(&config.username)
        .password(&config.password)
        .database(&config.database)
        .charset(&config.charset);
    if !orm.prepare_stmt {
        options = options.statement_cache_capacity(0);
    }
    Ok(statement_logging(options, orm))
}

pub(crate) fn postgres_options(config: &DbConfig, orm: &OrmConfig) -> AppResult<PgConnectOptions> {
    let ssl_mode = PgSslMode::from_str(&config.ssl_mode)
        .map_err(|e| AppError::ValidationError(format!("invalid ssl_mode {}: {}", config.ssl_mode, e)))?;
    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port_number()?)
        .username(&config.username)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(ssl_mode);
    if !orm.prepare_stmt {
        options = options.statement_cache_capacity(0);
    }
    Ok(statement_logging(options, orm))
}
