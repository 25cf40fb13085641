//! 기동 화면 출력
//!
//! [`Backends::init`](crate::core::backends::Backends::init)이 인스턴스를 등록하는 동안
//! 표준 출력에 남기는 배너와 진행 줄입니다. 로거 설치 전에도 보이도록 `println!`을 씁니다.
//!
//! ```text
//! ╔══════════════════════════════════════════════════╗
//! ║                 BACKEND REGISTRY                 ║
//! ╚══════════════════════════════════════════════════╝
//! → Step 1: Initializing databases
//!    ├─ database.orders: primary + 1 replica(s)
//! ✓ Step 1: Databases registered (1 items)
//! ```

/// 배너 내부 폭 (문자 수)
const BANNER_WIDTH: usize = 50;

/// 제목을 가운데 정렬한 세 줄짜리 배너
pub fn boxed_title(title: &str) -> String {
    let border = "═".repeat(BANNER_WIDTH);
    format!("╔{border}╗\n║{title:^width$}║\n╚{border}╝", width = BANNER_WIDTH - 1)
}

pub fn print_boxed_title(title: &str) {
    println!("{}", boxed_title(title));
}

pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

/// `count`는 해당 단계에서 등록된 인스턴스 수
pub fn print_step_complete(step: u8, description: &str, count: usize) {
    println!("✓ Step {}: {} ({} items)", step, description, count);
}

/// 인스턴스 하나의 등록 결과. `name`은 `database.orders`처럼 섹션 전체 이름
pub fn sub_task_line(name: &str, status: &str) -> String {
    format!("   ├─ {}: {}", name, status)
}

pub fn print_sub_task(name: &str, status: &str) {
    println!("{}", sub_task_line(name, status));
}

/// 레지스트리 초기화가 끝난 뒤의 인스턴스 수 요약
pub fn final_summary(databases: usize, redis: usize) -> String {
    format!(
        "{}\n   🗄️ Databases: {}\n   🧰 Redis: {}\n   🚀 Total Instances: {}",
        boxed_title("🎉 BACKEND REGISTRY INITIALIZED"),
        databases,
        redis,
        databases + redis
    )
}

pub fn print_final_summary(databases: usize, redis: usize) {
    println!();
    println!("{}", final_summary(databases, redis));
    println!();
}

/// 인메모리 캐시 할당 줄 (`Memory Cache: 64MB allocated`)
pub fn print_cache_initialized(cache_type: &str, size_mb: usize) {
    print_sub_task(&format!("{} Cache", cache_type), &format!("{}MB allocated", size_mb));
}
