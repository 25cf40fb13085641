//! 인메모리 캐시
//!
//! 용량(MB)이 고정된 프로세스 내 캐시입니다. `moka` 캐시 위에 키와 값의 바이트 합으로
//! 무게를 매기고, 용량을 넘으면 가장 오래 쓰이지 않은 항목부터 제거합니다.
//! TTL은 항목마다 따로 지정합니다.
//!
//! **주의**: 분산 캐시가 아닙니다. 프로세스마다 독립된 상태를 가집니다.
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use backend_utils::caching::memory::MemoryCache;
//!
//! let cache = MemoryCache::new(64).expect("cache size too small");
//! cache.set("user:1", b"{\"name\":\"kim\"}".to_vec(), Some(Duration::from_secs(60)))?;
//! let hit = cache.get("user:1");
//! ```

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use crate::core::errors::{AppError, AppResult};
use crate::utils::display_terminal::print_cache_initialized;

/// 허용되는 최소 용량 (MB)
pub const MIN_SIZE_MB: usize = 4;

#[derive(Clone)]
struct Entry {
    value: Vec<u8>,
    ttl: Option<Duration>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            ttl,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|exp| now < exp)
    }
}

/// 항목별 TTL. 덮어쓰면 새 값의 TTL로 다시 계산
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

#[allow(clippy::ptr_arg)]
fn weigh(key: &String, entry: &Entry) -> u32 {
    (key.len() + entry.value.len()).try_into().unwrap_or(u32::MAX)
}

/// 용량 제한 인메모리 캐시
pub struct MemoryCache {
    capacity: usize,
    cache: Cache<String, Entry>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("capacity", &self.capacity)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl MemoryCache {
    /// `size_mb` 용량의 캐시를 만듭니다.
    ///
    /// 4MB 미만이면 경고를 남기고 `None`을 반환합니다.
    pub fn new(size_mb: usize) -> Option<Self> {
        if size_mb < MIN_SIZE_MB {
            log::warn!("memory cache size is too small: size={}", size_mb);
            return None;
        }

        let capacity = size_mb << 20;
        let cache = Cache::builder()
            .max_capacity(capacity as u64)
            .weigher(weigh)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(EntryTtl)
            .build();

        print_cache_initialized("Memory", size_mb);
        Some(Self { capacity, cache })
    }

    /// 용량 (바이트)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 항목 하나의 최대 크기 (용량의 1/1024)
    pub fn max_entry_size(&self) -> usize {
        self.capacity / 1024
    }

    /// 현재 사용 중인 바이트 수
    pub fn used(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.weighted_size() as usize
    }

    /// 값을 조회합니다. 만료된 항목은 제거 후 `None`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.cache.get(key)?;
        if !entry.is_live(Instant::now()) {
            self.cache.invalidate(key);
            return None;
        }
        Some(entry.value)
    }

    /// 남은 TTL. TTL 없는 항목은 `Some(None)`, 없는 키는 `None`.
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        let entry = self.cache.get(key).filter(|e| e.is_live(now))?;
        Some(entry.expires_at.map(|exp| exp.saturating_duration_since(now)))
    }

    /// 값을 저장합니다.
    ///
    /// 키와 값의 합이 [`max_entry_size`](Self::max_entry_size)를 넘으면 `ValidationError`.
    pub fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> AppResult<()> {
        let size = key.len() + value.len();
        if size > self.max_entry_size() {
            return Err(AppError::ValidationError(format!(
                "entry too large: {} bytes (max {})",
                size,
                self.max_entry_size()
            )));
        }

        self.cache.insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    /// 키를 삭제합니다. 존재했으면 `true`.
    pub fn del(&self, key: &str) -> bool {
        self.cache
            .remove(key)
            .is_some_and(|e| e.is_live(Instant::now()))
    }

    pub fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_small_returns_none() {
        assert!(MemoryCache::new(3).is_none());
        assert!(MemoryCache::new(0).is_none());
        assert!(MemoryCache::new(4).is_some());
    }

    #[test]
    fn test_set_get_del() {
        let cache = MemoryCache::new(4).unwrap();

        cache.set("a", b"1".to_vec(), None).unwrap();
        assert_eq!(cache.get("a"), Some(b"1".to_vec()));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used(), 2);

        assert!(cache.del("a"));
        assert!(!cache.del("a"));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.used(), 0);
    }

    #[test]
    fn test_overwrite_replaces_size() {
        let cache = MemoryCache::new(4).unwrap();

        cache.set("k", vec![0; 100], None).unwrap();
        cache.set("k", vec![0; 10], None).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used(), 11);
    }

    #[test]
    fn test_repeated_overwrite_and_delete_keep_size_flat() {
        let cache = MemoryCache::new(4).unwrap();

        for i in 0..100_000u32 {
            cache.set("k", i.to_le_bytes().to_vec(), None).unwrap();
        }
        for _ in 0..50_000 {
            cache.set("d", b"v".to_vec(), None).unwrap();
            cache.del("d");
        }

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used(), 5);
        assert_eq!(cache.get("k"), Some(99_999u32.to_le_bytes().to_vec()));
    }

    #[test]
    fn test_expired_entry_dropped_on_access() {
        let cache = MemoryCache::new(4).unwrap();

        cache.set("k", b"v".to_vec(), Some(Duration::ZERO)).unwrap();
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_resets_ttl() {
        let cache = MemoryCache::new(4).unwrap();

        cache.set("k", b"v".to_vec(), Some(Duration::ZERO)).unwrap();
        cache.set("k", b"v".to_vec(), None).unwrap();

        assert_eq!(cache.ttl("k"), Some(None));
        assert_eq!(cache.get("k"), Some(b"v".to_vec()));
    }

    #[test]
    fn test_ttl() {
        let cache = MemoryCache::new(4).unwrap();
        cache.set("forever", b"v".to_vec(), None).unwrap();
        cache.set("soon", b"v".to_vec(), Some(Duration::from_secs(60))).unwrap();

        assert_eq!(cache.ttl("forever"), Some(None));
        assert!(cache.ttl("soon").unwrap().unwrap() <= Duration::from_secs(60));
        assert_eq!(cache.ttl("missing"), None);
    }

    #[test]
    fn test_entry_larger_than_limit_rejected() {
        let cache = MemoryCache::new(4).unwrap();
        let too_big = vec![0u8; cache.max_entry_size() + 1];

        assert!(matches!(cache.set("k", too_big, None), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_oldest_entries_evicted_when_full() {
        let cache = MemoryCache::new(4).unwrap();
        let chunk = cache.max_entry_size() - 8;
        let fits = cache.capacity() / (chunk + 8);

        for i in 0..fits + 2 {
            cache.set(&format!("key{:04}", i), vec![0u8; chunk], None).unwrap();
        }

        assert!(cache.used() <= cache.capacity());
        assert_eq!(cache.get("key0000"), None);
        assert_eq!(cache.get("key0001"), None);
        assert!(cache.get(&format!("key{:04}", fits + 1)).is_some());
    }

    #[test]
    fn test_clear() {
        let cache = MemoryCache::new(4).unwrap();
        cache.set("a", b"1".to_vec(), None).unwrap();
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.used(), 0);
    }
}
