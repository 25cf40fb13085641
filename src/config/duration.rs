//! 기간 문자열 파서
//!
//! INI 값으로 적힌 `300ms`, `1m30s`, `1.5s` 같은 기간 표기를
//! `std::time::Duration`으로 변환합니다.
//!
//! | 단위 | 의미 |
//! |------|------|
//! | `ns` | 나노초 |
//! | `us`, `µs`, `μs` | 마이크로초 |
//! | `ms` | 밀리초 |
//! | `s` | 초 |
//! | `m` | 분 |
//! | `h` | 시간 |

use std::time::Duration;

const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1_000.0),
    ("µs", 1_000.0),
    ("μs", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
    ("h", 3_600_000_000_000.0),
];

/// 기간 문자열을 파싱합니다.
///
/// 숫자와 단위의 연속(`1h15m30.5s`)을 허용하며, 단독 `0`은 0으로 취급합니다.
/// 음수, 단위 누락, 알 수 없는 단위는 `None`을 반환합니다.
///
/// # 예제
///
/// ```rust,ignore
/// use backend_utils::config::duration::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("10"), None);
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let mut rest = input.trim();
    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    let mut total_nanos = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let value: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)?;
        rest = &rest[unit_len..];

        total_nanos += value * scale;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total_nanos.round() as u64))
}
