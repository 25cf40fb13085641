//! 로그 레코드 인코더
//!
//! 파일 싱크에 쓰는 한 줄 형식을 정의합니다.
//!
//! - `json`: `{"level":"info","ts":"...","caller":"src/db/mod.rs:42","msg":"...", ...kv}`
//! - `mis`: `[2024-05-01 10:00:00] [orders] [host-1] [INFO] [0] {json}`

use chrono::{DateTime, Local};
use log::kv::{self, Key, Value, VisitSource};
use log::Record;
use serde_json::Value as JsonValue;

/// `ts` 필드 형식 (ISO8601, 밀리초, 오프셋 포함)
const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";
/// `mis` 접두사의 시각 형식
const MIS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 파일 로그 형식 (`[log] encode_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeType {
    Json,
    Mis,
}

impl EncodeType {
    /// 알 수 없는 값은 `Json`으로 취급합니다.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "mis" => EncodeType::Mis,
            _ => EncodeType::Json,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Encoder {
    kind: EncodeType,
    app_name: String,
    host: String,
}

impl Encoder {
    pub fn new(kind: EncodeType, app_name: impl Into<String>) -> Self {
        Self {
            kind,
            app_name: app_name.into(),
            host: hostname(),
        }
    }

    pub fn kind(&self) -> EncodeType {
        self.kind
    }

    /// 레코드를 개행 문자를 포함한 한 줄로 인코딩합니다.
    pub fn encode(&self, record: &Record<'_>, now: DateTime<Local>) -> String {
        let body = encode_json(record, now);
        match self.kind {
            EncodeType::Json => format!("{}\n", body),
            EncodeType::Mis => format!(
                "[{}] [{}] [{}] [{}] [0] {}\n",
                now.format(MIS_TIME_FORMAT),
                self.app_name,
                self.host,
                record.level(),
                body
            ),
        }
    }
}

fn encode_json(record: &Record<'_>, now: DateTime<Local>) -> String {
    // serde_json::Map은 키를 정렬하므로 필드 순서를 유지하려고 직접 조립
    let mut out = String::with_capacity(128);
    out.push('{');
    push_field(&mut out, "level", &JsonValue::from(record.level().as_str().to_ascii_lowercase()));
    out.push(',');
    push_field(&mut out, "ts", &JsonValue::from(now.format(TS_FORMAT).to_string()));
    if let Some(caller) = caller(record) {
        out.push(',');
        push_field(&mut out, "caller", &JsonValue::from(caller));
    }
    out.push(',');
    push_field(&mut out, "msg", &JsonValue::from(record.args().to_string()));

    let mut visitor = JsonFields { out: &mut out };
    // 방문 중 에러는 필드 일부 누락일 뿐이므로 무시
    let _ = record.key_values().visit(&mut visitor);

    out.push('}');
    out
}

fn caller(record: &Record<'_>) -> Option<String> {
    let file = record.file()?;
    Some(match record.line() {
        Some(line) => format!("{}:{}", file, line),
        None => file.to_string(),
    })
}

fn push_field(out: &mut String, key: &str, value: &JsonValue) {
    out.push_str(&JsonValue::from(key).to_string());
    out.push(':');
    out.push_str(&value.to_string());
}

struct JsonFields<'a> {
    out: &'a mut String,
}

impl<'kvs> VisitSource<'kvs> for JsonFields<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.out.push(',');
        push_field(self.out, key.as_str(), &to_json(&value));
        Ok(())
    }
}

fn to_json(value: &Value<'_>) -> JsonValue {
    if let Some(b) = value.to_bool() {
        return JsonValue::from(b);
    }
    if let Some(n) = value.to_i64() {
        return JsonValue::from(n);
    }
    if let Some(n) = value.to_u64() {
        return JsonValue::from(n);
    }
    if let Some(n) = value.to_f64().and_then(serde_json::Number::from_f64) {
        return JsonValue::Number(n);
    }
    JsonValue::from(value.to_string())
}

/// `HOSTNAME` → `/proc/sys/kernel/hostname` → `localhost`
pub fn hostname() -> String {
    if let Ok(host) = std::env::var("HOSTNAME") {
        if !host.trim().is_empty() {
            return host.trim().to_string();
        }
    }
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use log::Level;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_encode_type_from_str() {
        assert_eq!(EncodeType::from_str("mis"), EncodeType::Mis);
        assert_eq!(EncodeType::from_str(" MIS "), EncodeType::Mis);
        assert_eq!(EncodeType::from_str("json"), EncodeType::Json);
        assert_eq!(EncodeType::from_str(""), EncodeType::Json);
    }

    #[test]
    fn test_json_line_with_fields() {
        let encoder = Encoder::new(EncodeType::Json, "orders");
        let kvs: &[(&str, i64)] = &[("rows", 3)];

        let line = encoder.encode(
            &Record::builder()
                .args(format_args!("query done"))
                .level(Level::Warn)
                .file(Some("src/db/pool.rs"))
                .line(Some(42))
                .key_values(&kvs)
                .build(),
            fixed_now(),
        );

        assert!(line.ends_with("}\n"));
        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["level"], "warn");
        assert_eq!(parsed["caller"], "src/db/pool.rs:42");
        assert_eq!(parsed["msg"], "query done");
        assert_eq!(parsed["rows"], 3);
        assert!(parsed["ts"].as_str().unwrap().starts_with("2024-05-01T10:00:00.000"));

        // 필드 순서 유지
        assert!(line.starts_with("{\"level\":\"warn\",\"ts\":"));
    }

    #[test]
    fn test_string_field_is_escaped() {
        let encoder = Encoder::new(EncodeType::Json, "orders");
        let kvs: &[(&str, &str)] = &[("trace_id", "a\"b")];

        let line = encoder.encode(
            &Record::builder()
                .args(format_args!("hi"))
                .level(Level::Info)
                .key_values(&kvs)
                .build(),
            fixed_now(),
        );

        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["trace_id"], "a\"b");
        assert!(parsed.get("caller").is_none());
    }

    #[test]
    fn test_mis_prefix() {
        let encoder = Encoder::new(EncodeType::Mis, "orders");

        let line = encoder.encode(
            &Record::builder()
                .args(format_args!("started"))
                .level(Level::Info)
                .build(),
            fixed_now(),
        );

        let expected_prefix = format!("[2024-05-01 10:00:00] [orders] [{}] [INFO] [0] {{", hostname());
        assert!(line.starts_with(&expected_prefix), "{}", line);
        assert!(line.contains("\"msg\":\"started\""));
    }
}
