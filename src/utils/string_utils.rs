//! # 문자열 유틸리티
//!
//! 문자열 처리와 관련된 공통 유틸리티 함수들입니다.

use crate::core::errors::AppError;

/// 필수 문자열 필드 검증 및 정리
///
/// 빈 문자열이나 공백만 있는 경우 ValidationError를 반환하고,
/// 유효한 문자열인 경우 앞뒤 공백을 제거한 문자열을 반환합니다.
///
/// # 인자
/// * `value` - 검증할 문자열
/// * `field_name` - 필드명 (에러 메시지용)
///
/// # 반환값
/// * `Ok(String)` - 정리된 유효한 문자열
/// * `Err(AppError)` - 빈 문자열이거나 공백만 있는 경우
///
/// # 예제
/// ```rust,ignore
/// use crate::utils::string_utils::validate_required_string;
///
/// // 성공 케이스
/// assert_eq!(validate_required_string("  logs  ", "log directory").unwrap(), "logs");
///
/// // 실패 케이스
/// assert!(validate_required_string("   ", "log directory").is_err());
/// ```
pub fn validate_required_string(value: &str, field_name: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            format!("{}은(는) 필수입니다", field_name)
        ));
    }
    Ok(trimmed.to_string())
}

/// 문자 단위 부분 문자열
///
/// 바이트가 아닌 `char` 기준으로 `pos`부터 최대 `len`개 문자를 잘라냅니다.
/// 범위를 벗어나면 가능한 만큼만 반환합니다.
///
/// # 예제
/// ```rust,ignore
/// use crate::utils::string_utils::sub_str;
///
/// assert_eq!(sub_str("안녕하세요", 1, 2), "녕하");
/// assert_eq!(sub_str("hello", 3, 10), "lo");
/// ```
pub fn sub_str(value: &str, pos: usize, len: usize) -> String {
    value.chars().skip(pos).take(len).collect()
}

/// 문자열 길이가 `max_chars`를 넘으면 잘라내고 `...`을 붙입니다.
///
/// 로그에 응답 본문을 남길 때 사용합니다.
pub fn truncate_for_log(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    format!("{}...", sub_str(value, 0, max_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_string() {
        // 성공 케이스
        assert_eq!(validate_required_string("Hello", "name").unwrap(), "Hello");
        assert_eq!(validate_required_string("  World  ", "name").unwrap(), "World");

        // 실패 케이스
        assert!(validate_required_string("", "name").is_err());
        assert!(validate_required_string("   ", "name").is_err());
        assert!(validate_required_string("\t\n", "name").is_err());
    }

    #[test]
    fn test_sub_str() {
        assert_eq!(sub_str("hello", 0, 2), "he");
        assert_eq!(sub_str("hello", 3, 10), "lo");
        assert_eq!(sub_str("hello", 10, 2), "");
        assert_eq!(sub_str("hello", 1, 0), "");
    }

    #[test]
    fn test_sub_str_with_korean() {
        // 한글은 문자 단위로 잘림
        assert_eq!(sub_str("안녕하세요", 1, 2), "녕하");
        assert_eq!(sub_str("Hello 안녕", 6, 5), "안녕");
        assert_eq!(sub_str("😀👍🎉", 1, 1), "👍");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("안녕하세요", 2), "안녕...");
    }
}
