//! # Connection Registry - 이름 기반 커넥션 레지스트리
//!
//! 설정 파일에 선언된 백엔드 인스턴스(데이터베이스, Redis)를 한 번에 초기화하고
//! 인스턴스 이름으로 공유 핸들을 조회할 수 있게 하는 모듈입니다.
//! 데이터베이스와 Redis는 같은 레지스트리 구현을 공유하며, 백엔드마다 다른 부분은
//! [`PooledClientFactory`] 구현으로 분리됩니다.
//!
//! ## 초기화 흐름
//!
//! ```text
//! 1. 섹션 수집
//!    ├─ [<root>.*] 자식 섹션을 파일 순서대로 수집
//!    └─ "<root>." 접두사 제거
//!
//! 2. 레코드 생성 (연결 시도 전 전체 검증)
//!    ├─ sid 가 있으면 자격 증명 복호화
//!    ├─ PooledClientFactory::parse() 로 타입별 레코드 생성
//!    └─ 인스턴스 이름별 그룹핑, primary 우선 정렬
//!
//! 3. 연결 (인스턴스 단위로 순차 진행)
//!    ├─ PooledClientFactory::build() 로 primary + replica 풀 생성
//!    └─ Registry::publish() 로 이름 등록
//! ```
//!
//! 어느 단계에서든 실패하면 전체 초기화가 중단되고 `AppError::InitFailed`가
//! 반환됩니다. 부분적으로 채워진 레지스트리는 호출자에게 전달되지 않습니다.
//!
//! ## 조회
//!
//! | 메서드 | 미등록 이름 | 용도 |
//! |--------|-------------|------|
//! | [`Registry::get`] | 패닉 | 설정에 반드시 존재해야 하는 인스턴스 |
//! | [`Registry::try_get`] | `AppError::NotFound` | 선택적 인스턴스 |
//!
//! ```rust,ignore
//! let registry = init_registry(&store, "database", &DatabaseFactory::new(&store), &PassthroughResolver).await?;
//! let orders = registry.get("orders");          // Arc<Database>
//! let audit = registry.try_get("audit")?;       // Result<Arc<Database>, AppError>
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::config::{ConfigStore, Section};
use crate::core::errors::{AppError, AppResult};
use crate::core::instance::{group_instances, split_instance_name, InstanceGroup};
use crate::core::secret::{resolve_credential, SecretResolver};
use crate::utils::display_terminal::print_sub_task;

/// 백엔드별 풀 클라이언트 생성기
///
/// 레지스트리는 섹션 수집, 그룹핑, 등록만 담당하고
/// 레코드 해석과 실제 연결은 이 trait의 구현체에 위임합니다.
#[async_trait]
pub trait PooledClientFactory: Send + Sync {
    /// 섹션 하나에서 읽어 낸 연결 정보
    type Record: Send + Sync;
    /// 인스턴스 하나에 대해 등록되는 공유 핸들
    type Handle: Send + Sync + 'static;

    /// 에러 메시지와 조회 패닉에 쓰이는 백엔드 이름 (`db`, `redis`)
    const KIND: &'static str;
    /// `sid`가 있을 때 복호화 대상이 되는 키
    const CREDENTIAL_KEY: &'static str;

    /// 섹션을 레코드로 변환합니다. `credential`은 이미 복호화된 값입니다.
    ///
    /// 이 단계에서는 네트워크 연결을 시도하지 않아야 합니다.
    fn parse(&self, section: &Section<'_>, credential: String) -> AppResult<Self::Record>;

    /// primary가 맨 앞에 정렬된 그룹으로 풀 핸들을 만듭니다.
    async fn build(&self, group: InstanceGroup<Self::Record>) -> AppResult<Self::Handle>;
}

/// 논리 CPU 수 기반 풀 크기 기본값 `(max_open, max_idle)`
///
/// `max_open = 2·cpus + 1`, `max_idle = cpus + 1`
pub fn default_pool_limits() -> (u32, u32) {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1);
    (cpus * 2 + 1, cpus + 1)
}

/// 인스턴스 이름 → 공유 핸들 맵
///
/// 등록은 초기화 중에만 일어나며 쓰기 락으로 직렬화됩니다.
/// 초기화 이후의 조회는 읽기 락만 사용하므로 경합이 없습니다.
pub struct Registry<H> {
    kind: &'static str,
    entries: RwLock<HashMap<String, Arc<H>>>,
}

impl<H> Registry<H> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// 핸들을 등록합니다. 같은 이름이 이미 있으면 `DuplicateInstance`.
    pub fn publish(&self, name: &str, handle: H) -> AppResult<Arc<H>> {
        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            return Err(AppError::DuplicateInstance(format!("{}.{}", self.kind, name)));
        }
        let handle = Arc::new(handle);
        entries.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// 등록된 핸들을 반환합니다.
    ///
    /// # Panics
    ///
    /// 등록되지 않은 이름이면 `"<kind> not found: <name>"` 메시지로 패닉합니다.
    /// 설정 누락은 프로그래머 오류로 취급합니다.
    pub fn get(&self, name: &str) -> Arc<H> {
        match self.entries.read().get(name) {
            Some(handle) => handle.clone(),
            None => panic!("{} not found: {}", self.kind, name),
        }
    }

    /// 등록된 핸들을 반환합니다. 없으면 `NotFound`.
    pub fn try_get(&self, name: &str) -> AppResult<Arc<H>> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} not found: {}", self.kind, name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// 등록된 인스턴스 이름 (정렬됨)
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// `[<root>.*]` 섹션들로 레지스트리를 초기화합니다.
///
/// 모든 섹션을 먼저 레코드로 변환하고 검증한 뒤에 연결을 시작합니다.
/// 실패 시 `AppError::InitFailed { backend, name, source }`를 반환합니다.
pub async fn init_registry<F>(
    store: &ConfigStore,
    root: &str,
    factory: &F,
    secrets: &dyn SecretResolver,
) -> AppResult<Registry<F::Handle>>
where
    F: PooledClientFactory,
{
    let prefix = format!("{}.", root);
    let sections = store.section(root).child_sections();

    let mut records = Vec::with_capacity(sections.len());
    for section in &sections {
        let suffix = section
            .name()
            .strip_prefix(&prefix)
            .unwrap_or(section.name())
            .to_string();
        let instance = match split_instance_name(&suffix) {
            Ok((instance, _)) => instance.to_string(),
            Err(e) => return Err(AppError::init_failed(F::KIND, suffix, e)),
        };

        let credential = resolve_credential(
            secrets,
            &section.key("sid").string(),
            section.key(F::CREDENTIAL_KEY).string(),
        )
        .map_err(|e| AppError::init_failed(F::KIND, instance.as_str(), e))?;

        let record = factory
            .parse(section, credential)
            .map_err(|e| AppError::init_failed(F::KIND, instance.as_str(), e))?;
        records.push((suffix, record));
    }

    let groups = group_instances(records).map_err(|e| {
        let name = match &e {
            AppError::MultiplePrimaries { instance, .. } => instance.clone(),
            _ => root.to_string(),
        };
        AppError::init_failed(F::KIND, name, e)
    })?;

    let registry = Registry::new(F::KIND);
    for group in groups {
        let name = group.name().to_string();
        let replicas = group.replicas().len();

        let handle = factory
            .build(group)
            .await
            .map_err(|e| AppError::init_failed(F::KIND, name.as_str(), e))?;
        registry
            .publish(&name, handle)
            .map_err(|e| AppError::init_failed(F::KIND, name.as_str(), e))?;

        log::info!("✅ {} 인스턴스 등록: {} (replica {}개)", F::KIND, name, replicas);
        print_sub_task(&format!("{}.{}", root, name), &format!("primary + {} replica(s)", replicas));
    }

    Ok(registry)
}
