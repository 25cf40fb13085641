//! # Redis 캐시 클라이언트 구현
//!
//! 이 모듈은 설정 파일에 선언된 Redis 인스턴스마다 커넥션 풀을 만들고,
//! 인스턴스 이름으로 조회할 수 있는 [`RedisClient`]를 제공합니다.
//!
//! ## 설계 철학
//!
//! - **풀 기반 연결**: `deadpool-redis` 풀에서 커넥션을 빌려 사용
//! - **짧은 타임아웃**: 연결 100ms, 명령 1000ms. 느린 Redis가 요청 전체를 붙잡지 않음
//! - **기동 시 검증**: 풀 생성 직후 PING, 실패하면 초기화 중단 (재시도 없음)
//! - **자동 직렬화**: Serde를 통한 투명한 JSON 변환
//!
//! ## 설정
//!
//! ```ini
//! [redis.sessions]
//! host = 10.0.0.5
//! port = 6379
//! auth = secret
//! max_open = 16
//! max_idle = 4
//!
//! ; 읽기 전용 복제본 (선택)
//! [redis.sessions.replica1]
//! host = 10.0.0.6
//! port = 6379
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime, Timeouts};
use futures_util::future::join_all;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::config::{ConfigStore, Section};
use crate::core::errors::{AppError, AppResult};
use crate::core::instance::InstanceGroup;
use crate::core::policy::{RandomPolicy, Replicated};
use crate::core::registry::{default_pool_limits, init_registry, PooledClientFactory, Registry};
use crate::core::secret::SecretResolver;

/// 연결 수립 타임아웃
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(100);
/// 명령 응답 타임아웃
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(1000);

/// 설정 파일의 Redis 루트 섹션
pub const ROOT_SECTION: &str = "redis";

/// Redis 엔드포인트 하나의 연결 정보
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct RedisConfig {
    #[validate(length(min = 1, message = "host or port is empty"))]
    pub host: String,
    #[validate(length(min = 1, message = "host or port is empty"))]
    pub port: String,
    pub auth: String,
    /// 풀 최대 커넥션 수
    pub max_open: u32,
    /// 기동 시 미리 열어 두는 커넥션 수
    pub max_idle: u32,
}

impl RedisConfig {
    /// 섹션에서 연결 정보를 읽습니다. `auth`는 복호화된 값을 받습니다.
    pub fn from_section(section: &Section<'_>, auth: String) -> Self {
        let (default_max_open, default_max_idle) = default_pool_limits();
        Self {
            host: section.key("host").string(),
            port: section.key("port").string(),
            auth,
            max_open: section.key("max_open").as_u32(default_max_open),
            max_idle: section.key("max_idle").as_u32(default_max_idle),
        }
    }

    /// host, port 필수 여부 검증
    pub fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|_| AppError::ValidationError("host or port is empty".to_string()))
    }

    /// `redis://[:auth@]host:port` 형식의 접속 URL
    pub fn url(&self) -> String {
        if self.auth.is_empty() {
            format!("redis://{}:{}", self.host, self.port)
        } else {
            format!("redis://:{}@{}:{}", urlencoding::encode(&self.auth), self.host, self.port)
        }
    }

    /// 풀 설정 (크기, 타임아웃)
    pub fn pool_config(&self) -> PoolConfig {
        let mut timeouts = Timeouts::default();
        timeouts.create = Some(DEFAULT_CONNECT_TIMEOUT);
        timeouts.wait = Some(DEFAULT_COMMAND_TIMEOUT);
        timeouts.recycle = Some(DEFAULT_COMMAND_TIMEOUT);

        let mut pool = PoolConfig::new(self.max_open.max(1) as usize);
        pool.timeouts = timeouts;
        pool
    }

    /// 기동 시 미리 열어 둘 커넥션 수
    pub fn warm_connections(&self) -> usize {
        self.max_idle.min(self.max_open.max(1)) as usize
    }
}

/// Redis 캐시 클라이언트
///
/// 인스턴스 하나에 대한 primary 풀과 replica 풀을 보관합니다.
/// 쓰기 명령은 primary로, 읽기 명령은 무작위 replica(없으면 primary)로 보냅니다.
///
/// ## 사용 예제
///
/// ```rust,ignore
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Session {
///     user_id: String,
///     roles: Vec<String>,
/// }
///
/// let sessions = backends.redis("sessions");
///
/// // 세션 정보 저장 (30분 TTL)
/// sessions.set_with_expiry("session:abc", &session, 1800).await?;
///
/// // 캐시된 데이터 조회
/// let cached: Option<Session> = sessions.get("session:abc").await?;
/// ```
pub struct RedisClient {
    name: String,
    pools: Replicated<Pool>,
    command_timeout: Duration,
}

impl RedisClient {
    /// 풀을 만들고 PING으로 연결을 확인합니다.
    ///
    /// host 또는 port가 비어 있으면 `ValidationError`, PING이 실패하면
    /// `ConnectivityError`를 반환합니다.
    pub async fn connect(name: &str, primary: &RedisConfig, replicas: &[RedisConfig]) -> AppResult<Self> {
        primary.check()?;
        for replica in replicas {
            replica.check()?;
        }

        let primary_pool = create_pool(primary, primary)?;
        ping(&primary_pool)
            .await
            .map_err(|e| AppError::ConnectivityError(format!("[redis] {}:{} {}", primary.host, primary.port, e)))?;
        warm_up(&primary_pool, primary.warm_connections()).await;
        info!("✅ Redis 연결 성공: {} ({}:{})", name, primary.host, primary.port);

        let mut replica_pools = Vec::with_capacity(replicas.len());
        for replica in replicas {
            // 풀 크기는 primary 설정을 따름
            let pool = create_pool(replica, primary)?;
            ping(&pool)
                .await
                .map_err(|e| AppError::ConnectivityError(format!("[redis] {}:{} {}", replica.host, replica.port, e)))?;
            info!("📖 Redis replica 연결 성공: {} ({}:{})", name, replica.host, replica.port);
            replica_pools.push(pool);
        }

        Ok(Self {
            name: name.to_string(),
            pools: Replicated::new(primary_pool, replica_pools, Box::new(RandomPolicy)),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// primary 풀 (쓰기)
    pub fn writer(&self) -> &Pool {
        self.pools.writer()
    }

    /// 읽기용 풀
    pub fn reader(&self) -> &Pool {
        self.pools.reader()
    }

    pub fn replica_count(&self) -> usize {
        self.pools.replicas().len()
    }

    /// 임의 명령용 primary 커넥션을 빌립니다.
    pub async fn connection(&self) -> AppResult<Connection> {
        Ok(self.writer().get().await?)
    }

    /// 명령 타임아웃을 적용해 실행합니다.
    async fn run<T, F>(&self, command: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.command_timeout, command).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::RedisError(format!(
                "command timed out after {}ms",
                self.command_timeout.as_millis()
            ))),
        }
    }

    /// 지정된 키에서 값을 조회합니다.
    ///
    /// JSON 으로 직렬화된 데이터를 역직렬화하여 반환합니다.
    ///
    /// ## 반환값
    ///
    /// - `Ok(Some(T))` - 키가 존재하고 역직렬화 성공
    /// - `Ok(None)` - 키가 존재하지 않음
    /// - `Err(AppError)` - Redis 오류, 타임아웃 또는 역직렬화 실패
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.reader().get().await?;
        let value: Option<String> = self.run(conn.get(key)).await?;

        match value {
            Some(json) => {
                let deserialized = serde_json::from_str(&json)
                    .map_err(|e| AppError::RedisError(format!("Deserialization failed: {}", e)))?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// 지정된 키에 값을 저장합니다. (TTL 없음)
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::RedisError(format!("Serialization failed: {}", e)))?;
        let mut conn = self.writer().get().await?;
        self.run(conn.set::<_, _, ()>(key, json)).await
    }

    /// 만료 시간(초)과 함께 값을 저장합니다.
    ///
    /// | 용도 | 권장 TTL | 예제 |
    /// |------|----------|------|
    /// | 세션 | 1-24시간 | `3600 * 8` |
    /// | API 응답 캐시 | 5-60분 | `300` |
    /// | 임시 토큰 | 10-30분 | `900` |
    pub async fn set_with_expiry<T: Serialize>(&self, key: &str, value: &T, seconds: u64) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::RedisError(format!("Serialization failed: {}", e)))?;
        let mut conn = self.writer().get().await?;
        self.run(conn.set_ex::<_, _, ()>(key, json, seconds)).await
    }

    /// 지정된 키를 삭제합니다. 키가 없어도 성공으로 처리합니다.
    pub async fn del(&self, key: &str) -> AppResult<()> {
        let mut conn = self.writer().get().await?;
        self.run(conn.del::<_, ()>(key)).await
    }

    /// 여러 키를 한 번에 삭제합니다. 빈 목록은 즉시 성공합니다.
    pub async fn del_multiple(&self, keys: &[String]) -> AppResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.writer().get().await?;
        self.run(conn.del::<_, ()>(keys)).await
    }

    /// 패턴과 일치하는 키들을 검색합니다.
    ///
    /// ## ⚠️ 프로덕션 주의사항
    ///
    /// KEYS 명령은 블로킹 연산으로 Redis 서버 전체 성능에
    /// 영향을 줄 수 있습니다. 대량 키 공간에서는 SCAN을 사용하세요.
    pub async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut conn = self.reader().get().await?;
        self.run(conn.keys(pattern)).await
    }

    /// primary에 PING을 보냅니다.
    pub async fn ping(&self) -> AppResult<()> {
        ping(self.writer()).await
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("name", &self.name)
            .field("replicas", &self.replica_count())
            .field("max_size", &self.writer().status().max_size)
            .finish()
    }
}

/// `endpoint`로 접속하고 `sizing`의 풀 크기를 사용하는 풀을 만듭니다.
fn create_pool(endpoint: &RedisConfig, sizing: &RedisConfig) -> AppResult<Pool> {
    let mut config = Config::from_url(endpoint.url());
    config.pool = Some(sizing.pool_config());
    config
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| AppError::RedisError(format!("Failed to create Redis pool: {}", e)))
}

async fn ping(pool: &Pool) -> AppResult<()> {
    let mut conn = pool.get().await?;
    match tokio::time::timeout(DEFAULT_COMMAND_TIMEOUT, redis::cmd("PING").query_async::<()>(&mut conn)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(AppError::RedisError("PING timed out".to_string())),
    }
}

/// 유휴 커넥션을 미리 열어 풀에 돌려 둡니다.
async fn warm_up(pool: &Pool, count: usize) {
    let connections = join_all((0..count).map(|_| pool.get())).await;
    let opened = connections.iter().filter(|c| c.is_ok()).count();
    if opened < count {
        log::warn!("⚠️ Redis 커넥션 예열 일부 실패: {}/{}", opened, count);
    }
    // 커넥션은 drop 시 풀로 반환됨
    drop(connections);
}

/// `[redis.*]` 섹션용 풀 생성기
#[derive(Debug, Default)]
pub struct RedisFactory;

#[async_trait]
impl PooledClientFactory for RedisFactory {
    type Record = RedisConfig;
    type Handle = RedisClient;

    const KIND: &'static str = "redis";
    const CREDENTIAL_KEY: &'static str = "auth";

    fn parse(&self, section: &Section<'_>, credential: String) -> AppResult<RedisConfig> {
        let config = RedisConfig::from_section(section, credential);
        config.check()?;
        Ok(config)
    }

    async fn build(&self, group: InstanceGroup<RedisConfig>) -> AppResult<RedisClient> {
        let name = group.name().to_string();
        let (primary, replicas) = group.into_parts();
        RedisClient::connect(&name, &primary, &replicas).await
    }
}

/// `[redis.*]` 섹션으로 Redis 레지스트리를 초기화합니다.
///
/// 실패 시 `redis init failed. name: <instance>, error: <cause>.` 형태의
/// `AppError::InitFailed`를 반환합니다.
pub async fn init_redis(store: &ConfigStore, secrets: &dyn SecretResolver) -> AppResult<Registry<RedisClient>> {
    init_registry(store, ROOT_SECTION, &RedisFactory, secrets).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::secret::PassthroughResolver;

    fn config(host: &str, port: &str) -> RedisConfig {
        RedisConfig {
            host: host.to_string(),
            port: port.to_string(),
            auth: String::new(),
            max_open: 16,
            max_idle: 4,
        }
    }

    #[test]
    fn test_empty_host_or_port_rejected() {
        assert!(config("10.0.0.5", "6379").check().is_ok());

        for bad in [config("", "6379"), config("10.0.0.5", "")] {
            match bad.check() {
                Err(AppError::ValidationError(msg)) => assert_eq!(msg, "host or port is empty"),
                _ => panic!("Expected ValidationError"),
            }
        }
    }

    #[test]
    fn test_defaults_from_section() {
        let store = ConfigStore::from_str("[redis.sessions]\nhost = h\nport = 6379\n").unwrap();
        let config = RedisConfig::from_section(&store.section("redis.sessions"), String::new());
        let (max_open, max_idle) = default_pool_limits();

        assert_eq!(config.max_open, max_open);
        assert_eq!(config.max_idle, max_idle);
    }

    #[test]
    fn test_url_encodes_auth() {
        assert_eq!(config("h", "6379").url(), "redis://h:6379");

        let mut with_auth = config("h", "6379");
        with_auth.auth = "p@ss:w/rd".to_string();
        assert_eq!(with_auth.url(), "redis://:p%40ss%3Aw%2Frd@h:6379");

        with_auth.auth = "a b#c~d".to_string();
        assert_eq!(with_auth.url(), "redis://:a%20b%23c~d@h:6379");
    }

    #[test]
    fn test_pool_config_uses_timeouts() {
        let pool = config("h", "6379").pool_config();

        assert_eq!(pool.max_size, 16);
        assert_eq!(pool.timeouts.create, Some(Duration::from_millis(100)));
        assert_eq!(pool.timeouts.wait, Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_warm_connections_bounded_by_pool_size() {
        let mut c = config("h", "6379");
        c.max_idle = 32;
        assert_eq!(c.warm_connections(), 16);
    }

    #[tokio::test]
    async fn test_empty_host_aborts_init_without_publishing() {
        let store = ConfigStore::from_str("[redis.sessions]\nhost =\nport = 6379\n").unwrap();

        let result = init_redis(&store, &PassthroughResolver).await;

        match result {
            Err(AppError::InitFailed { backend, name, source }) => {
                assert_eq!(backend, "redis");
                assert_eq!(name, "sessions");
                assert!(matches!(*source, AppError::ValidationError(_)));
            }
            _ => panic!("Expected InitFailed"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_redis_is_connectivity_error() {
        // 닫힌 포트로의 접속은 즉시 거부됨
        let result = RedisClient::connect("sessions", &config("127.0.0.1", "1"), &[]).await;

        assert!(matches!(
            result,
            Err(AppError::ConnectivityError(_)) | Err(AppError::RedisError(_))
        ));
    }
}
