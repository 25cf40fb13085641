//! 레지스트리 컨테이너
//!
//! 데이터베이스와 Redis 레지스트리를 기동 시점에 한 번 초기화해 묶어 두는 구조체입니다.
//! 전역 맵 대신 `web::Data<Backends>`로 핸들러에 주입합니다.

use std::sync::Arc;

use crate::caching::redis::{init_redis, RedisClient};
use crate::config::ConfigStore;
use crate::core::errors::AppResult;
use crate::core::registry::Registry;
use crate::core::secret::SecretResolver;
use crate::db::{init_databases, Database};
use crate::utils::display_terminal::{
    print_boxed_title, print_final_summary, print_step_complete, print_step_start,
};

/// 초기화가 끝난 백엔드 레지스트리 묶음
pub struct Backends {
    pub databases: Registry<Database>,
    pub redis: Registry<RedisClient>,
}

impl Backends {
    /// `[database.*]`, `[redis.*]` 순서로 레지스트리를 초기화합니다.
    ///
    /// 섹션이 하나도 없는 백엔드는 빈 레지스트리가 됩니다.
    /// 어느 인스턴스든 실패하면 `AppError::InitFailed`를 그대로 반환합니다.
    ///
    /// ```rust,ignore
    /// let backends = Backends::init(store, &PassthroughResolver).await?;
    /// let orders = backends.database("orders");
    /// let sessions = backends.redis("sessions");
    /// ```
    pub async fn init(store: &ConfigStore, secrets: &dyn SecretResolver) -> AppResult<Self> {
        print_boxed_title("BACKEND REGISTRY");

        print_step_start(1, "Initializing databases");
        let databases = init_databases(store, secrets).await?;
        print_step_complete(1, "Databases registered", databases.len());

        print_step_start(2, "Initializing redis");
        let redis = init_redis(store, secrets).await?;
        print_step_complete(2, "Redis registered", redis.len());

        print_final_summary(databases.len(), redis.len());

        Ok(Self { databases, redis })
    }

    /// 이름으로 데이터베이스를 조회합니다. 없으면 `db not found: <name>` 패닉.
    pub fn database(&self, name: &str) -> Arc<Database> {
        self.databases.get(name)
    }

    /// 이름으로 Redis 클라이언트를 조회합니다. 없으면 `redis not found: <name>` 패닉.
    pub fn redis(&self, name: &str) -> Arc<RedisClient> {
        self.redis.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::AppError;
    use crate::core::secret::PassthroughResolver;

    #[tokio::test]
    async fn test_empty_config_yields_empty_registries() {
        let store = ConfigStore::from_str("[app]\nname = demo\n").unwrap();
        let backends = Backends::init(&store, &PassthroughResolver).await.unwrap();

        assert!(backends.databases.is_empty());
        assert!(backends.redis.is_empty());
    }

    #[tokio::test]
    async fn test_redis_failure_aborts_init() {
        let store = ConfigStore::from_str("[redis.sessions]\nport = 6379\n").unwrap();

        match Backends::init(&store, &PassthroughResolver).await {
            Err(e) => {
                assert!(e.to_string().starts_with("redis init failed. name: sessions"));
                assert!(matches!(e.root_cause(), AppError::ValidationError(_)));
            }
            Ok(_) => panic!("Expected InitFailed"),
        }
    }

    #[tokio::test]
    #[should_panic(expected = "db not found: orders")]
    async fn test_unknown_database_panics() {
        let store = ConfigStore::from_str("").unwrap();
        let backends = Backends::init(&store, &PassthroughResolver).await.unwrap();

        backends.database("orders");
    }
}
