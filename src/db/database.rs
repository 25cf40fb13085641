//! 인스턴스 단위 데이터베이스 핸들

use crate::core::policy::Replicated;
use crate::db::pool::{DbPool, PoolSettings};

/// 이름이 붙은 데이터베이스 인스턴스
///
/// primary 풀 하나와 replica 풀 목록을 가지며, 쓰기는 primary로
/// 읽기는 무작위 replica(없으면 primary)로 보냅니다.
///
/// ```rust,ignore
/// let orders = backends.database("orders");
///
/// if let Some(pool) = orders.writer().as_mysql() {
///     sqlx::query("UPDATE orders SET state = ? WHERE id = ?")
///         .bind("paid")
///         .bind(order_id)
///         .execute(pool)
///         .await?;
/// }
///
/// let pool = orders.reader().as_mysql();
/// ```
pub struct Database {
    name: String,
    pools: Replicated<DbPool>,
    settings: PoolSettings,
}

impl Database {
    pub fn new(name: impl Into<String>, pools: Replicated<DbPool>, settings: PoolSettings) -> Self {
        Self {
            name: name.into(),
            pools,
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 쓰기용 풀 (primary)
    pub fn writer(&self) -> &DbPool {
        self.pools.writer()
    }

    /// 읽기용 풀
    pub fn reader(&self) -> &DbPool {
        self.pools.reader()
    }

    pub fn replica_count(&self) -> usize {
        self.pools.replicas().len()
    }

    pub fn replicas(&self) -> &[DbPool] {
        self.pools.replicas()
    }

    /// 모든 풀에 적용된 설정
    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// primary를 포함한 모든 풀을 닫습니다.
    pub async fn close(&self) {
        for pool in self.pools.all() {
            pool.close().await;
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("driver", &self.writer().driver())
            .field("replicas", &self.replica_count())
            .field("settings", &self.settings)
            .finish()
    }
}
