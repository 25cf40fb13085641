//! # Logging Module
//!
//! `log` 파사드 뒤에 설치되는 서비스 로거입니다.
//!
//! - 파일 싱크: `<dir>/<app name>.log`, `[log] maxsize` MB 단위 회전, 선택적 gzip 압축
//! - 형식: `[log] encode_type` 이 `mis`면 MIS 접두사 형식, 그 외에는 JSON
//! - `[app] mode = debug` 이면 `env_logger` 콘솔 싱크가 추가됨
//! - 레벨은 실행 모드(`debug`, `info`, `warn`, `error`)에서 결정되며 그 외 값은 `info`
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use backend_utils::{config, logging};
//!
//! let store = config::set_default("conf/app.ini")?;
//! logging::init_logger("/var/log/orders", store)?;
//!
//! log::info!(order_id = 42; "주문 생성");
//!
//! // 이름별 로거: <dir>/audit.log
//! let audit = logging::named("audit")?;
//! audit.write(log::Level::Info, format_args!("권한 변경"));
//! ```

pub mod context;
pub mod encoder;
pub mod rotation;

pub use context::ContextLogger;
pub use encoder::{EncodeType, Encoder};
pub use rotation::RotatingFile;

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};

use crate::config::{AppConfig, ConfigStore};
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::utils::string_utils::validate_required_string;

/// 회전 기준 기본값 (MB)
pub const DEFAULT_MAX_SIZE_MB: u64 = 1024;

static LOG_PATH: OnceCell<PathBuf> = OnceCell::new();
static REGISTRY: OnceCell<LoggerRegistry> = OnceCell::new();

/// `[log]` 섹션 설정
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub max_size_mb: u64,
    pub compress: bool,
    pub encode_type: EncodeType,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            compress: true,
            encode_type: EncodeType::Json,
        }
    }
}

impl LogConfig {
    pub fn from_store(store: &ConfigStore) -> Self {
        let section = store.section("log");
        let max_size = section.key("maxsize").as_int(DEFAULT_MAX_SIZE_MB as i64);

        Self {
            max_size_mb: if max_size > 0 { max_size as u64 } else { DEFAULT_MAX_SIZE_MB },
            compress: section.key("compress").as_bool(true),
            encode_type: EncodeType::from_str(&section.key("encode_type").string()),
        }
    }
}

/// 파일 싱크와 (디버그 모드의) 콘솔 싱크를 묶은 로거
pub struct ServiceLogger {
    name: String,
    level: LevelFilter,
    encoder: Encoder,
    file: Mutex<RotatingFile>,
    console: Option<env_logger::Logger>,
}

impl ServiceLogger {
    /// `dir` 아래에 `<app name>.log` 파일을 열어 로거를 만듭니다.
    pub fn new(dir: &Path, app: &AppConfig, config: &LogConfig) -> AppResult<Self> {
        Self::open(dir, &app.name, app, config)
    }

    /// `dir` 아래에 `<name>.log` 파일을 여는 로거. 레벨과 형식, 콘솔 여부는 `app`, `config`를 따릅니다.
    pub fn open(dir: &Path, name: &str, app: &AppConfig, config: &LogConfig) -> AppResult<Self> {
        let level = app.mode.log_level();
        let path = dir.join(format!("{}.log", name));
        let file = RotatingFile::open(&path, config.max_size_mb, config.compress)
            .with_context(|| format!("failed to open log file {}", path.display()))?;

        let console = app.is_debug().then(|| {
            env_logger::Builder::new()
                .filter_level(level)
                .target(env_logger::Target::Stdout)
                .build()
        });

        Ok(Self {
            name: name.to_string(),
            level,
            encoder: Encoder::new(config.encode_type, app.name.clone()),
            file: Mutex::new(file),
            console,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn path(&self) -> PathBuf {
        self.file.lock().path().to_path_buf()
    }

    pub fn has_console(&self) -> bool {
        self.console.is_some()
    }

    /// `log` 파사드를 거치지 않고 이 로거에 직접 기록합니다.
    pub fn write(&self, level: Level, args: fmt::Arguments<'_>) {
        self.log(
            &Record::builder()
                .args(args)
                .level(level)
                .target(&self.name)
                .build(),
        );
    }
}

impl Log for ServiceLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.encoder.encode(record, Local::now());
        if let Err(e) = self.file.lock().write_all(line.as_bytes()) {
            eprintln!("❌ 로그 파일 기록 실패: {}", e);
        }

        if let Some(console) = &self.console {
            console.log(record);
        }
    }

    fn flush(&self) {
        let _ = self.file.lock().flush();
        if let Some(console) = &self.console {
            console.flush();
        }
    }
}

/// 이름별 로거 캐시
///
/// 같은 이름은 같은 인스턴스를 돌려주며 모든 로거가 디렉터리와 `[app]`, `[log]` 설정을 공유합니다.
pub struct LoggerRegistry {
    dir: PathBuf,
    app: AppConfig,
    config: LogConfig,
    loggers: RwLock<HashMap<String, Arc<ServiceLogger>>>,
}

impl LoggerRegistry {
    pub fn new(dir: impl Into<PathBuf>, app: AppConfig, config: LogConfig) -> Self {
        Self {
            dir: dir.into(),
            app,
            config,
            loggers: RwLock::new(HashMap::new()),
        }
    }

    /// `<dir>/<name>.log` 로거를 돌려줍니다. 처음 요청된 이름이면 파일을 엽니다.
    pub fn get(&self, name: &str) -> AppResult<Arc<ServiceLogger>> {
        if let Some(logger) = self.loggers.read().get(name) {
            return Ok(logger.clone());
        }

        let mut loggers = self.loggers.write();
        if let Some(logger) = loggers.get(name) {
            return Ok(logger.clone());
        }

        let name = validate_required_string(name, "logger name")?;
        let logger = Arc::new(ServiceLogger::open(&self.dir, &name, &self.app, &self.config)?);
        loggers.insert(name, logger.clone());
        Ok(logger)
    }

    /// 기본 로거 (`[app] name`)
    pub fn default_logger(&self) -> AppResult<Arc<ServiceLogger>> {
        self.get(&self.app.name)
    }

    pub fn len(&self) -> usize {
        self.loggers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 전역 `log` 파사드에 설치되는 기본 로거
struct FacadeLogger(Arc<ServiceLogger>);

impl Log for FacadeLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.0.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        self.0.log(record)
    }

    fn flush(&self) {
        self.0.flush()
    }
}

/// 프로세스 로거를 설치하고 로그 파일 경로를 반환합니다.
///
/// # Errors
///
/// * `ValidationError` - `dir`이 비어 있는 경우
/// * `InternalError` - 디렉터리 생성이나 파일 열기에 실패한 경우
/// * `ConfigError` - 이미 로거가 설치된 경우
pub fn init_logger(dir: &str, store: &ConfigStore) -> AppResult<PathBuf> {
    let dir = validate_required_string(dir, "log directory")?;
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create log directory {}", dir))?;

    if REGISTRY.get().is_some() {
        return Err(AppError::ConfigError("logger already initialized".to_string()));
    }

    let registry = LoggerRegistry::new(&dir, AppConfig::from_store(store), LogConfig::from_store(store));
    let logger = registry.default_logger()?;
    let level = logger.level();
    let path = logger.path();

    log::set_boxed_logger(Box::new(FacadeLogger(logger)))
        .map_err(|e| AppError::ConfigError(format!("logger already initialized: {}", e)))?;
    log::set_max_level(level);
    let _ = REGISTRY.set(registry);
    let _ = LOG_PATH.set(path.clone());

    log::info!("✅ 로거 초기화 완료: {} (level: {})", path.display(), level);
    Ok(path)
}

/// 설치된 로그 파일 경로
pub fn log_path() -> Option<&'static Path> {
    LOG_PATH.get().map(|p| p.as_path())
}

/// [`init_logger`]로 설치된 디렉터리에 `<name>.log`로 기록하는 로거를 돌려줍니다.
///
/// # Errors
///
/// * `ConfigError` - 아직 [`init_logger`]가 호출되지 않은 경우
pub fn named(name: &str) -> AppResult<Arc<ServiceLogger>> {
    REGISTRY
        .get()
        .ok_or_else(|| AppError::ConfigError("logger not initialized".to_string()))?
        .get(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(src: &str) -> ConfigStore {
        ConfigStore::from_str(src).unwrap()
    }

    #[test]
    fn test_log_config_defaults() {
        assert_eq!(LogConfig::from_store(&store("")), LogConfig::default());
    }

    #[test]
    fn test_log_config_from_section() {
        let config = LogConfig::from_store(&store("[log]\nmaxsize = 64\ncompress = false\nencode_type = mis\n"));

        assert_eq!(config.max_size_mb, 64);
        assert!(!config.compress);
        assert_eq!(config.encode_type, EncodeType::Mis);
    }

    #[test]
    fn test_non_positive_maxsize_falls_back() {
        let config = LogConfig::from_store(&store("[log]\nmaxsize = 0\n"));
        assert_eq!(config.max_size_mb, DEFAULT_MAX_SIZE_MB);
    }

    #[test]
    fn test_service_logger_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppConfig::from_store(&store("[app]\nname = orders\nmode = warn\n"));
        let logger = ServiceLogger::new(dir.path(), &app, &LogConfig::default()).unwrap();

        assert_eq!(logger.level(), LevelFilter::Warn);
        assert!(!logger.has_console());
        assert_eq!(logger.path(), dir.path().join("orders.log"));

        logger.log(
            &Record::builder()
                .args(format_args!("dropped"))
                .level(Level::Info)
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("slow query"))
                .level(Level::Warn)
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(dir.path().join("orders.log")).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("\"msg\":\"slow query\""));
    }

    #[test]
    fn test_debug_mode_adds_console() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppConfig::from_store(&store("[app]\nmode = debug\n"));
        let logger = ServiceLogger::new(dir.path(), &app, &LogConfig::default()).unwrap();

        assert!(logger.has_console());
        assert_eq!(logger.level(), LevelFilter::Debug);
        assert_eq!(logger.path(), dir.path().join("app.log"));
    }

    #[test]
    fn test_init_logger_rejects_empty_dir() {
        let result = init_logger("  ", &store(""));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_registry_opens_one_file_per_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppConfig::from_store(&store("[app]\nname = orders\n"));
        let registry = LoggerRegistry::new(dir.path(), app, LogConfig::default());

        let audit = registry.get("audit").unwrap();
        let access = registry.get("access").unwrap();
        assert!(Arc::ptr_eq(&audit, &registry.get("audit").unwrap()));
        assert_eq!(registry.len(), 2);

        audit.write(Level::Info, format_args!("role changed"));
        access.write(Level::Warn, format_args!("GET /orders"));
        audit.flush();
        access.flush();

        let audit_log = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
        let access_log = std::fs::read_to_string(dir.path().join("access.log")).unwrap();
        assert!(audit_log.contains("\"msg\":\"role changed\""));
        assert!(!audit_log.contains("GET /orders"));
        assert!(access_log.contains("\"msg\":\"GET /orders\""));
    }

    #[test]
    fn test_registry_default_logger_uses_app_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppConfig::from_store(&store("[app]\nname = orders\nmode = error\n"));
        let registry = LoggerRegistry::new(dir.path(), app, LogConfig::default());

        let logger = registry.default_logger().unwrap();
        assert_eq!(logger.name(), "orders");
        assert_eq!(logger.path(), dir.path().join("orders.log"));
        assert_eq!(logger.level(), LevelFilter::Error);
    }

    #[test]
    fn test_registry_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LoggerRegistry::new(dir.path(), AppConfig::from_store(&store("")), LogConfig::default());

        assert!(matches!(registry.get(" "), Err(AppError::ValidationError(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_named_requires_init() {
        assert!(matches!(named("audit"), Err(AppError::ConfigError(_))));
    }
}
