//! 백엔드 유틸리티 데모 서버
//!
//! 설정 로드, 로거 설치, 레지스트리 초기화 순서로 기동한 뒤
//! 요청 로거/패닉 복구/pprof 미들웨어를 붙인 Actix-web 서버를 실행합니다.

use std::sync::Arc;

use actix_web::{web, App, HttpRequest, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use serde::Serialize;

use backend_utils::caching::MemoryCache;
use backend_utils::config::{self, ConfigStore};
use backend_utils::core::{AppResult, Backends, PassthroughResolver};
use backend_utils::logging::{self, ContextLogger};
use backend_utils::middlewares::{pprof, Recover, RequestLogger};
use backend_utils::utils::net::local_ip;
use backend_utils::utils::response::{response_json, JsonOptions};

/// 헬스 체크 응답
#[derive(Debug, Serialize)]
struct HealthResponse {
    app: String,
    ip: String,
    databases: Vec<String>,
    redis: Vec<String>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정
    load_env_file();

    let config_path = std::env::var("APP_CONFIG").unwrap_or_else(|_| "conf/app.ini".to_string());
    let store = match config::set_default(&config_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ 설정 로드 실패 ({}): {}", config_path, e);
            std::process::exit(1);
        }
    };

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    if let Err(e) = logging::init_logger(&log_dir, store) {
        eprintln!("❌ 로거 초기화 실패: {}", e);
        std::process::exit(1);
    }

    info!("🚀 서비스 시작중...");

    // 데이터 스토어 초기화
    let backends = match Backends::init(store, &PassthroughResolver).await {
        Ok(backends) => Arc::new(backends),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let cache = init_memory_cache(store);

    info!("✅ 모든 백엔드가 성공적으로 초기화되었습니다!");

    if let Ok(addr) = std::env::var("PPROF_ADDRESS") {
        pprof::listen(&addr)?;
    }

    start_http_server(backends, cache).await
}

/// HTTP 서버를 구성하고 실행합니다
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server(backends: Arc<Backends>, cache: Option<Arc<MemoryCache>>) -> std::io::Result<()> {
    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 pprof: http://{}{}/", bind_address, pprof::DEFAULT_PREFIX);

    let backends = web::Data::from(backends);
    let cache = cache.map(web::Data::from);

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(backends.clone())
            .wrap(RequestLogger)
            .wrap(Recover::new())
            .configure(pprof::configure)
            .route("/health", web::get().to(health));
        if let Some(cache) = &cache {
            app = app.app_data(cache.clone());
        }
        app
    })
        .bind(bind_address)?
        .run()
        .await
}

async fn health(req: HttpRequest, backends: web::Data<Backends>) -> AppResult<actix_web::HttpResponse> {
    let app = config::app()?;
    ContextLogger::from_request(&req).debug("health check");

    let body = HealthResponse {
        app: app.name,
        ip: local_ip(),
        databases: backends.databases.names(),
        redis: backends.redis.names(),
    };
    response_json(&req, &body, &JsonOptions::default())
}

/// `[cache] size_mb` 가 설정되어 있으면 인메모리 캐시를 만듭니다.
fn init_memory_cache(store: &ConfigStore) -> Option<Arc<MemoryCache>> {
    let size_mb = store.section("cache").key("size_mb").as_int(0);
    if size_mb <= 0 {
        return None;
    }
    MemoryCache::new(size_mb as usize).map(Arc::new)
}

/// 환경별 설정 파일을 로드합니다
///
/// PROFILE 환경변수에 따라 적절한 .env 파일을 로드합니다.
/// 로거 설치 전이므로 결과는 표준 출력에 남깁니다.
///
/// # Environment Variables
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    println!("Current profile: {}", profile);

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => println!(".env.prod 파일 로드 됨"),
            Err(e) => eprintln!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => println!(".env.dev 파일 로드 됨"),
            Err(e) => eprintln!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            // 기본 .env 파일 로드
            dotenv().ok();
            println!("기본 .env 파일 로드");
        }
    }
}
