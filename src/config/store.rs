//! INI 설정 저장소
//!
//! INI 파일을 섹션 단위로 파싱해 보관하고, 섹션/키 조회를 제공합니다.
//! 모든 키 접근자는 실패하지 않으며, 값이 비었거나 파싱할 수 없으면
//! 호출자가 넘긴 기본값을 돌려줍니다.
//!
//! ## 섹션 계층
//!
//! 섹션 이름의 `.`은 계층 구분자로 취급합니다. `database.orders.master`는
//! `database`의 자식 섹션이며 [`Section::child_sections`]로 찾을 수 있습니다.
//!
//! ```ini
//! [database.orders.master]
//! drive = mysql
//! host = 10.0.0.1
//!
//! [database.orders.replica1]
//! drive = mysql
//! host = 10.0.0.2
//! ```
//!
//! ```rust,ignore
//! let store = ConfigStore::load("conf/app.ini")?;
//! for section in store.section("database").child_sections() {
//!     println!("{} -> {}", section.name(), section.key("host").string());
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use ini::{Ini, ParseOption, Properties};

use crate::config::duration::parse_duration;
use crate::core::errors::{AppError, AppResult};

/// 파싱된 INI 설정
pub struct ConfigStore {
    ini: Ini,
}

impl ConfigStore {
    /// 파일에서 설정을 읽습니다.
    ///
    /// 파일이 없거나 문법이 잘못되면 `ConfigError`를 반환합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let ini = Ini::load_from_file_opt(path, parse_option())
            .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;
        Ok(Self { ini })
    }

    /// 메모리상의 INI 문자열에서 설정을 읽습니다.
    pub fn from_str(source: &str) -> AppResult<Self> {
        let ini = Ini::load_from_str_opt(source, parse_option())
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        Ok(Self { ini })
    }

    /// 섹션 뷰를 반환합니다. 섹션이 없으면 빈 뷰가 반환됩니다.
    pub fn section(&self, name: &str) -> Section<'_> {
        Section {
            store: self,
            name: name.to_string(),
            props: self.ini.section(Some(name)),
        }
    }

    /// 파일에 등장한 순서대로 섹션 이름을 반환합니다. (중복 제거)
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.ini.sections().flatten() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

fn parse_option() -> ParseOption {
    // 비밀번호의 역슬래시를 그대로 보존
    ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// 하나의 INI 섹션에 대한 읽기 전용 뷰
pub struct Section<'a> {
    store: &'a ConfigStore,
    name: String,
    props: Option<&'a Properties>,
}

impl<'a> Section<'a> {
    /// 섹션 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 섹션이 실제로 파일에 존재하는지 여부
    pub fn exists(&self) -> bool {
        self.props.is_some()
    }

    /// 키 뷰를 반환합니다. 키가 없으면 값이 비어 있는 뷰가 반환됩니다.
    pub fn key(&self, name: &str) -> Key<'a> {
        Key {
            name: name.to_string(),
            value: self.props.and_then(|p| p.get(name)).map(strip_inline_comment),
        }
    }

    /// `<섹션이름>.`으로 시작하는 모든 섹션을 파일 순서대로 반환합니다.
    pub fn child_sections(&self) -> Vec<Section<'a>> {
        let prefix = format!("{}.", self.name);
        self.store
            .section_names()
            .into_iter()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| self.store.section(name))
            .collect()
    }
}

/// `value ; comment` 형태의 인라인 주석을 제거합니다.
fn strip_inline_comment(value: &str) -> &str {
    let cut = [" ;", " #", "\t;", "\t#"]
        .iter()
        .filter_map(|marker| value.find(marker))
        .min()
        .unwrap_or(value.len());
    value[..cut].trim()
}

/// 하나의 설정 키에 대한 타입별 접근자
///
/// ```rust,ignore
/// let section = store.section("redis.sessions");
/// let port = section.key("port").string();
/// let max_open = section.key("max_open").as_u32(17);
/// let compress = store.section("log").key("compress").as_bool(true);
/// ```
#[derive(Debug, Clone)]
pub struct Key<'a> {
    name: String,
    value: Option<&'a str>,
}

impl<'a> Key<'a> {
    /// 키 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 원본 문자열 (없으면 빈 문자열)
    pub fn string(&self) -> String {
        self.value.unwrap_or_default().to_string()
    }

    /// 값이 비어 있으면 `default`를 반환합니다.
    pub fn as_string(&self, default: &str) -> String {
        match self.value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => default.to_string(),
        }
    }

    pub fn as_int(&self, default: i64) -> i64 {
        self.value
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default)
    }

    pub fn as_u32(&self, default: u32) -> u32 {
        self.value
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(default)
    }

    /// 불리언 값
    ///
    /// `1/t/true/yes/y/on`과 `0/f/false/no/n/off`를 대소문자 구분 없이 허용합니다.
    pub fn as_bool(&self, default: bool) -> bool {
        match self.value.map(|v| v.to_ascii_lowercase()) {
            Some(v) => match v.as_str() {
                "1" | "t" | "true" | "yes" | "y" | "on" => true,
                "0" | "f" | "false" | "no" | "n" | "off" => false,
                _ => default,
            },
            None => default,
        }
    }

    /// 기간 값 (`300ms`, `1m30s` 등)
    pub fn as_duration(&self, default: Duration) -> Duration {
        self.value.and_then(parse_duration).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[app]
name = orders-api
mode = debug

[database.orders.replica1]
drive = mysql
host = 10.0.0.2

[log]
maxsize = 512   ; MB
compress = off

[database.orders.master]
drive = mysql
host = 10.0.0.1
password = p\ss

[databases]
host = ignored
"#;

    #[test]
    fn test_missing_file_is_config_error() {
        let result = ConfigStore::load("/nonexistent/app.ini");
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.ini");
        std::fs::write(&path, SAMPLE).unwrap();

        let store = ConfigStore::load(&path).unwrap();
        assert_eq!(store.section("app").key("name").string(), "orders-api");
    }

    #[test]
    fn test_typed_accessors_fall_back_to_defaults() {
        let store = ConfigStore::from_str(SAMPLE).unwrap();
        let log = store.section("log");

        assert_eq!(log.key("maxsize").as_int(1024), 512);
        assert!(!log.key("compress").as_bool(true));
        assert_eq!(log.key("encode_type").as_string("json"), "json");
        assert_eq!(log.key("missing").as_u32(7), 7);
        assert_eq!(
            log.key("missing").as_duration(Duration::from_secs(1)),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_bool_accepts_all_spellings() {
        let store = ConfigStore::from_str("[f]\na = Yes\nb = T\nc = n\nd = maybe\n").unwrap();
        let section = store.section("f");

        assert!(section.key("a").as_bool(false));
        assert!(section.key("b").as_bool(false));
        assert!(!section.key("c").as_bool(true));
        assert!(section.key("d").as_bool(true));
    }

    #[test]
    fn test_absent_section_is_empty_view() {
        let store = ConfigStore::from_str(SAMPLE).unwrap();
        let section = store.section("nope");

        assert!(!section.exists());
        assert_eq!(section.key("host").string(), "");
        assert!(section.child_sections().is_empty());
    }

    #[test]
    fn test_child_sections_in_file_order() {
        let store = ConfigStore::from_str(SAMPLE).unwrap();
        let names: Vec<String> = store
            .section("database")
            .child_sections()
            .iter()
            .map(|s| s.name().to_string())
            .collect();

        assert_eq!(names, vec!["database.orders.replica1", "database.orders.master"]);
    }

    #[test]
    fn test_backslashes_are_preserved() {
        let store = ConfigStore::from_str(SAMPLE).unwrap();
        assert_eq!(store.section("database.orders.master").key("password").string(), "p\\ss");
    }
}
