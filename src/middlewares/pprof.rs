//! 프로파일링 엔드포인트
//!
//! `/debug/pprof` 아래에 다음 경로를 등록합니다.
//!
//! | 경로 | 내용 |
//! |------|------|
//! | `/` | 사용 가능한 프로파일 목록 (HTML) |
//! | `/cmdline` | 실행 인자 (NUL 구분) |
//! | `/profile?seconds=N` | CPU 프로파일 (pprof protobuf) |
//! | `/flamegraph?seconds=N` | CPU 프로파일 플레임그래프 (SVG) |
//!
//! ```bash
//! go tool pprof http://127.0.0.1:6060/debug/pprof/profile?seconds=10
//! ```

use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::header::ContentType;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Scope};
use pprof::protos::Message;
use serde::Deserialize;

use crate::core::errors::{AppError, AppResult};

pub const DEFAULT_PREFIX: &str = "/debug/pprof";

/// `seconds` 파라미터가 없을 때의 수집 시간
const DEFAULT_SECONDS: u64 = 30;
const MAX_SECONDS: u64 = 300;
/// 샘플링 주파수 (Hz)
const FREQUENCY: i32 = 100;

const PROFILES: &[(&str, &str)] = &[
    ("cmdline", "The command line invocation of the current program"),
    (
        "flamegraph",
        "CPU profile rendered as an SVG flame graph. You can specify the duration in the seconds GET parameter.",
    ),
    (
        "profile",
        "CPU profile. You can specify the duration in the seconds GET parameter. After you get the profile file, use the pprof tool to investigate the profile.",
    ),
];

#[derive(Debug, Deserialize)]
pub struct ProfileParams {
    pub seconds: Option<u64>,
}

impl ProfileParams {
    fn duration(&self) -> Duration {
        let seconds = self.seconds.unwrap_or(DEFAULT_SECONDS).clamp(1, MAX_SECONDS);
        Duration::from_secs(seconds)
    }
}

/// 기본 경로(`/debug/pprof`)에 프로파일링 엔드포인트를 등록합니다.
///
/// ```rust,ignore
/// App::new().configure(backend_utils::middlewares::pprof::configure)
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(scope(DEFAULT_PREFIX));
}

/// 지정한 경로에 프로파일링 엔드포인트 스코프를 만듭니다.
pub fn scope(prefix: &str) -> Scope {
    web::scope(prefix)
        .route("", web::get().to(index))
        .route("/", web::get().to(index))
        .route("/cmdline", web::get().to(cmdline))
        .route("/profile", web::get().to(profile))
        .route("/flamegraph", web::get().to(flamegraph))
}

/// 별도 포트에 프로파일링 전용 서버를 띄웁니다.
///
/// actix 런타임 안에서 호출해야 하며, 서버는 백그라운드에서 실행됩니다.
pub fn listen(addr: &str) -> std::io::Result<ServerHandle> {
    let server = HttpServer::new(|| App::new().configure(configure))
        .workers(1)
        .bind(addr)?
        .run();
    let handle = server.handle();

    actix_web::rt::spawn(async move {
        if let Err(e) = server.await {
            log::error!("[pprof] {}", e);
        }
    });

    log::info!("📊 pprof 서버 시작: http://{}{}/", addr, DEFAULT_PREFIX);
    Ok(handle)
}

async fn index(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_end_matches('/');
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render_index(path))
}

fn render_index(path: &str) -> String {
    let mut rows = String::new();
    let mut descriptions = String::new();
    for (name, desc) in PROFILES {
        rows.push_str(&format!("<tr><td><a href=\"{}/{}\">{}</a></td></tr>\n", path, name, name));
        descriptions.push_str(&format!(
            "<li><div class=profile-name>{}:</div> {}</li>\n",
            name, desc
        ));
    }

    format!(
        "<html>\n<head>\n<title>{path}</title>\n<style>\n.profile-name{{display:inline-block;width:6rem;}}\n</style>\n</head>\n<body>\n{path}<br>\n<br>\nTypes of profiles available:\n<table>\n{rows}</table>\n<p>\nProfile Descriptions:\n<ul>\n{descriptions}</ul>\n</p>\n</body>\n</html>\n"
    )
}

async fn cmdline() -> HttpResponse {
    let args: Vec<String> = std::env::args().collect();
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(args.join("\x00"))
}

async fn profile(params: web::Query<ProfileParams>) -> AppResult<HttpResponse> {
    let report = collect(params.duration()).await?;
    let profile = report
        .pprof()
        .map_err(|e| AppError::InternalError(format!("pprof: {}", e)))?;

    let mut body = Vec::new();
    profile
        .encode(&mut body)
        .map_err(|e| AppError::InternalError(format!("pprof encode: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::octet_stream())
        .insert_header(("Content-Disposition", "attachment; filename=\"profile\""))
        .body(body))
}

async fn flamegraph(params: web::Query<ProfileParams>) -> AppResult<HttpResponse> {
    let report = collect(params.duration()).await?;

    let mut body = Vec::new();
    report
        .flamegraph(&mut body)
        .map_err(|e| AppError::InternalError(format!("flamegraph: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type("image/svg+xml")
        .body(body))
}

/// `duration` 동안 CPU 샘플을 수집합니다. 동시에 하나의 수집만 가능합니다.
async fn collect(duration: Duration) -> AppResult<pprof::Report> {
    let guard = pprof::ProfilerGuardBuilder::default()
        .frequency(FREQUENCY)
        .blocklist(&["libc", "libgcc", "pthread", "vdso"])
        .build()
        .map_err(|e| AppError::InternalError(format!("profiler busy or unavailable: {}", e)))?;

    log::info!("📊 CPU 프로파일 수집 시작 ({:?})", duration);
    actix_web::rt::time::sleep(duration).await;

    guard
        .report()
        .build()
        .map_err(|e| AppError::InternalError(format!("pprof report: {}", e)))
}
