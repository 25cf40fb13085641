//! Database Connection Management Module
//!
//! 설정 파일에 선언된 관계형 데이터베이스 인스턴스를 초기화하고
//! 이름으로 조회할 수 있게 하는 모듈입니다. MySQL과 PostgreSQL을 지원하며,
//! 인스턴스마다 primary 하나와 여러 replica를 둘 수 있습니다.
//!
//! # 설정 예시
//!
//! ```ini
//! [orm]
//! prepare_stmt = true
//! trace_sql = false
//! slow_threshold = 1s
//!
//! [database.orders.master]
//! drive = mysql
//! host = 10.0.0.1
//! port = 3306
//! username = app
//! password = secret
//! db = orders
//! charset = utf8mb4
//! max_open = 32
//! max_idle = 8
//!
//! [database.orders.replica1]
//! drive = mysql
//! host = 10.0.0.2
//! port = 3306
//! username = app
//! password = secret
//! db = orders
//!
//! [database.reports]
//! drive = postgres
//! host = 10.0.1.1
//! port = 5432
//! username = report
//! db = reports
//! ssl_mode = require
//! ```
//!
//! # 기본 사용법
//!
//! ```rust,ignore
//! use backend_utils::db::init_databases;
//! use backend_utils::core::PassthroughResolver;
//!
//! let databases = init_databases(&store, &PassthroughResolver).await?;
//! let orders = databases.get("orders");
//! ```

pub mod config;
pub mod database;
pub mod pool;

pub use config::{DbConfig, Driver, OrmConfig};
pub use database::Database;
pub use pool::{DbPool, PoolSettings};

use async_trait::async_trait;
use log::info;

use crate::config::{ConfigStore, Section};
use crate::core::errors::AppResult;
use crate::core::instance::InstanceGroup;
use crate::core::policy::{RandomPolicy, Replicated};
use crate::core::registry::{init_registry, PooledClientFactory, Registry};
use crate::core::secret::SecretResolver;

/// 설정 파일의 데이터베이스 루트 섹션
pub const ROOT_SECTION: &str = "database";

/// `[database.*]` 섹션용 풀 생성기
pub struct DatabaseFactory {
    orm: OrmConfig,
}

impl DatabaseFactory {
    pub fn new(orm: OrmConfig) -> Self {
        Self { orm }
    }

    pub fn from_store(store: &ConfigStore) -> Self {
        Self::new(OrmConfig::from_store(store))
    }

    /// 연결된 primary 풀에 replica 풀을 붙여 [`Database`]를 만듭니다.
    ///
    /// replica는 첫 사용 시 연결되며 풀 크기는 모두 primary 레코드의 `settings`를 따릅니다.
    fn assemble(
        &self,
        name: String,
        primary_pool: DbPool,
        replicas: &[DbConfig],
        settings: PoolSettings,
    ) -> AppResult<Database> {
        let mut replica_pools = Vec::with_capacity(replicas.len());
        for replica in replicas {
            replica_pools.push(DbPool::connect_lazy(replica, &settings, &self.orm)?);
            info!("📖 replica 등록: {} ({})", name, replica.endpoint());
        }

        Ok(Database::new(
            name,
            Replicated::new(primary_pool, replica_pools, Box::new(RandomPolicy)),
            settings,
        ))
    }
}

#[async_trait]
impl PooledClientFactory for DatabaseFactory {
    type Record = DbConfig;
    type Handle = Database;

    const KIND: &'static str = "db";
    const CREDENTIAL_KEY: &'static str = "password";

    fn parse(&self, section: &Section<'_>, credential: String) -> AppResult<DbConfig> {
        let config = DbConfig::from_section(section, credential)?;
        // 포트 형식 오류는 연결 전에 드러나야 함
        config.port_number()?;
        Ok(config)
    }

    async fn build(&self, group: InstanceGroup<DbConfig>) -> AppResult<Database> {
        let name = group.name().to_string();
        let (primary, replicas) = group.into_parts();
        let settings = PoolSettings::from_primary(&primary);

        let primary_pool = DbPool::connect(&primary, &settings, &self.orm).await?;
        info!("✅ {} 연결 성공: {} ({})", primary.driver.as_str(), name, primary.endpoint());

        self.assemble(name, primary_pool, &replicas, settings)
    }
}

/// `[database.*]` 섹션으로 데이터베이스 레지스트리를 초기화합니다.
///
/// 실패 시 `db init failed. name: <instance>, error: <cause>.` 형태의
/// `AppError::InitFailed`를 반환합니다.
pub async fn init_databases(store: &ConfigStore, secrets: &dyn SecretResolver) -> AppResult<Registry<Database>> {
    init_registry(store, ROOT_SECTION, &DatabaseFactory::from_store(store), secrets).await
}
