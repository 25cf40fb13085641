//! 애플리케이션 기본 설정
//!
//! `[app]` 섹션에서 서비스 이름과 실행 모드를 읽습니다.

use std::path::PathBuf;

use crate::config::store::ConfigStore;

/// 애플리케이션 실행 모드
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    /// 디버그 모드 - 콘솔 로그 출력, debug 레벨
    Debug,
    /// 그 외 모드 (`release`, `info`, `warn`, `error` 등)
    Release(String),
}

impl AppMode {
    /// 문자열에서 AppMode를 생성합니다.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// assert_eq!(AppMode::from_str("debug"), AppMode::Debug);
    /// assert!(!AppMode::from_str("release").is_debug());
    /// ```
    pub fn from_str(s: &str) -> Self {
        match s {
            "debug" => AppMode::Debug,
            other => AppMode::Release(other.to_string()),
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, AppMode::Debug)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppMode::Debug => "debug",
            AppMode::Release(mode) => mode,
        }
    }

    /// 실행 모드에서 로그 레벨을 결정합니다.
    ///
    /// 레벨 이름이 아닌 모드(`release` 등)는 `Info`로 취급합니다.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.as_str().to_ascii_lowercase().as_str() {
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        }
    }
}

/// `[app]` 섹션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 실행 파일이 위치한 디렉터리
    pub path: PathBuf,
    /// 서비스 이름 (기본값 `app`), 로그 파일 이름으로도 사용
    pub name: String,
    /// 실행 모드 (기본값 `release`)
    pub mode: AppMode,
}

impl AppConfig {
    pub fn from_store(store: &ConfigStore) -> Self {
        let section = store.section("app");
        Self {
            path: executable_dir(),
            name: section.key("name").as_string("app"),
            mode: AppMode::from_str(&section.key("mode").as_string("release")),
        }
    }

    pub fn is_debug(&self) -> bool {
        self.mode.is_debug()
    }
}

fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}
