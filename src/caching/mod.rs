//! 캐싱 계층 모듈
//!
//! Redis 기반 분산 캐시와 프로세스 내 인메모리 캐시를 제공합니다.
//!
//! # 주요 기능
//!
//! - [`redis`] - 이름별 Redis 풀 레지스트리, JSON 자동 직렬화, TTL 지원
//! - [`memory`] - 용량 제한 인메모리 캐시 (오래된 항목부터 제거)
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use backend_utils::caching::redis::init_redis;
//! use backend_utils::core::PassthroughResolver;
//!
//! let redis = init_redis(&store, &PassthroughResolver).await?;
//! let sessions = redis.get("sessions");
//! sessions.set_with_expiry("session:abc", &session, 3600).await?;
//!
//! let cached: Option<Session> = sessions.get("session:abc").await?;
//! ```

pub mod memory;
pub mod redis;

pub use memory::MemoryCache;
pub use redis::{init_redis, RedisClient, RedisConfig};
