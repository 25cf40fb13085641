//! 복제본 선택 정책
//!
//! 하나의 인스턴스는 primary 풀 하나와 0개 이상의 replica 풀로 구성됩니다.
//! 쓰기는 항상 primary로, 읽기는 [`ReplicaPolicy`]가 고른 replica로 향하며
//! replica가 없으면 primary로 대체됩니다.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// replica 목록에서 하나를 고르는 전략
pub trait ReplicaPolicy: Send + Sync {
    /// `count`개의 replica 중 사용할 인덱스를 반환합니다. 비어 있으면 `None`.
    fn select(&self, count: usize) -> Option<usize>;
}

/// 무작위 선택 (기본 정책)
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPolicy;

impl ReplicaPolicy for RandomPolicy {
    fn select(&self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        Some(rand::rng().random_range(0..count))
    }
}

/// 순환 선택
#[derive(Debug, Default)]
pub struct RoundRobinPolicy {
    counter: AtomicUsize,
}

impl RoundRobinPolicy {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }
}

impl ReplicaPolicy for RoundRobinPolicy {
    fn select(&self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        Some(self.counter.fetch_add(1, Ordering::Relaxed) % count)
    }
}

/// primary와 replica 목록을 정책과 함께 묶은 핸들
///
/// ```rust,ignore
/// let pools = Replicated::new(primary, replicas, Box::new(RandomPolicy));
/// let writer = pools.writer();   // 항상 primary
/// let reader = pools.reader();   // replica 중 하나, 없으면 primary
/// ```
pub struct Replicated<T> {
    primary: T,
    replicas: Vec<T>,
    policy: Box<dyn ReplicaPolicy>,
}

impl<T> Replicated<T> {
    pub fn new(primary: T, replicas: Vec<T>, policy: Box<dyn ReplicaPolicy>) -> Self {
        Self {
            primary,
            replicas,
            policy,
        }
    }

    /// 쓰기 대상 (primary)
    pub fn writer(&self) -> &T {
        &self.primary
    }

    /// 읽기 대상
    pub fn reader(&self) -> &T {
        self.policy
            .select(self.replicas.len())
            .and_then(|idx| self.replicas.get(idx))
            .unwrap_or(&self.primary)
    }

    pub fn replicas(&self) -> &[T] {
        &self.replicas
    }

    /// primary를 포함한 모든 풀
    pub fn all(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.primary).chain(self.replicas.iter())
    }
}
