//! 파일 경로 유틸리티

use std::path::{Path, MAIN_SEPARATOR};

/// 경로가 존재하는지 확인합니다.
///
/// 권한 문제 등으로 메타데이터를 읽을 수 없으면 `Err`를 반환합니다.
pub fn file_exists<P: AsRef<Path>>(path: P) -> std::io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// 마지막 경로 구분자 앞까지를 부모 디렉터리로 반환합니다.
///
/// 구분자가 없으면 빈 문자열을 반환합니다.
///
/// ```rust,ignore
/// assert_eq!(parent_directory("/srv/app/conf"), "/srv/app");
/// assert_eq!(parent_directory("conf"), "");
/// ```
pub fn parent_directory(directory: &str) -> &str {
    match directory.rfind(MAIN_SEPARATOR) {
        Some(idx) => &directory[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.ini");

        assert!(!file_exists(&path).unwrap());
        std::fs::write(&path, "[app]\n").unwrap();
        assert!(file_exists(&path).unwrap());
        assert!(file_exists(dir.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_directory() {
        assert_eq!(parent_directory("/srv/app/conf"), "/srv/app");
        assert_eq!(parent_directory("/srv"), "");
        assert_eq!(parent_directory("conf"), "");
        assert_eq!(parent_directory("/srv/서비스/conf"), "/srv/서비스");
    }
}
