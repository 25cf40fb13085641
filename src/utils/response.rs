//! HTTP 응답 헬퍼
//!
//! 응답 본문을 만들면서 같은 문자열을 요청 extension([`ResponseBody`])에 남겨,
//! 접근 로그나 복구 미들웨어가 실제로 내려간 본문을 기록할 수 있게 합니다.
//!
//! ```rust,ignore
//! use actix_web::{get, HttpRequest};
//! use backend_utils::core::AppResult;
//! use backend_utils::utils::response::{response_json, JsonOptions};
//!
//! #[get("/orders/{id}")]
//! async fn order(req: HttpRequest) -> AppResult<HttpResponse> {
//!     let order = load_order(&req).await?;
//!     response_json(&req, &order, &JsonOptions::default())
//! }
//! ```

use actix_web::http::header::ContentType;
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::core::errors::{AppError, AppResult};

/// 마지막으로 기록된 응답 본문
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBody(pub String);

impl ResponseBody {
    /// 요청에 기록된 응답 본문을 꺼냅니다.
    pub fn of(req: &HttpRequest) -> Option<String> {
        req.extensions().get::<ResponseBody>().map(|b| b.0.clone())
    }
}

fn record(req: &HttpRequest, body: &str) {
    req.extensions_mut().insert(ResponseBody(body.to_string()));
}

/// JSON 응답 옵션
#[derive(Debug, Clone, Default)]
pub struct JsonOptions {
    /// 들여쓰기 문자열. 비어 있으면 한 줄로 출력
    pub indent: String,
    /// 본문 앞에 붙일 문자열 (예: `)]}',\n`)
    pub prefix: String,
    /// `<`, `>`, `&`를 `\u003c` 형태로 이스케이프
    pub escape_html: bool,
}

/// XML 응답 옵션
#[derive(Debug, Clone, Default)]
pub struct XmlOptions {
    /// 들여쓰기 공백 수. 0이면 한 줄로 출력
    pub indent: usize,
    /// 본문 앞에 붙일 문자열 (예: XML 선언)
    pub prefix: String,
}

/// `text/plain` 응답
pub fn response_text(req: &HttpRequest, body: impl Into<String>) -> HttpResponse {
    let body = body.into();
    record(req, &body);
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(body)
}

/// `application/json` 응답
///
/// 직렬화에 실패하면 `InternalError`를 반환하며, `ResponseError` 구현에 의해 500으로 변환됩니다.
pub fn response_json<T: Serialize>(req: &HttpRequest, value: &T, options: &JsonOptions) -> AppResult<HttpResponse> {
    let mut body = encode_json(value, options)?;
    if !options.prefix.is_empty() {
        body.insert_str(0, &options.prefix);
    }
    record(req, &body);
    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

/// `application/xml` 응답
pub fn response_xml<T: Serialize>(req: &HttpRequest, value: &T, options: &XmlOptions) -> AppResult<HttpResponse> {
    let mut body = options.prefix.clone();
    body.push_str(&encode_xml(value, options)?);
    record(req, &body);
    Ok(HttpResponse::Ok()
        .content_type(ContentType::xml())
        .body(body))
}

fn encode_json<T: Serialize>(value: &T, options: &JsonOptions) -> AppResult<String> {
    let body = if options.indent.is_empty() {
        serde_json::to_string(value).map_err(|e| AppError::InternalError(format!("JSON: {}", e)))?
    } else {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(options.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| AppError::InternalError(format!("JSON: {}", e)))?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| AppError::InternalError(format!("JSON: {}", e)))?
    };

    if options.escape_html {
        // JSON 문법에서 <, >, & 는 문자열 안에서만 등장
        return Ok(body
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026"));
    }
    Ok(body)
}

fn encode_xml<T: Serialize>(value: &T, options: &XmlOptions) -> AppResult<String> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    if options.indent > 0 {
        serializer.indent(' ', options.indent);
    }
    value
        .serialize(serializer)
        .map_err(|e| AppError::InternalError(format!("XML: {}", e)))?;
    if options.indent > 0 {
        body.push('\n');
    }
    Ok(body)
}
