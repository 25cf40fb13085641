//! 네트워크 유틸리티

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// 로컬 IP를 결정하는 환경 변수 (Kubernetes downward API)
pub const POD_IP_ENV: &str = "POD_IP";

/// 이 프로세스의 로컬 IPv4 주소를 반환합니다.
///
/// 1. `POD_IP` 환경 변수가 있으면 그 값을 그대로 사용
/// 2. 외부로 나가는 경로의 비루프백 IPv4 주소
/// 3. 모두 실패하면 `127.0.0.1`
///
/// ```rust,ignore
/// let ip = backend_utils::utils::net::local_ip();
/// log::info!("🌐 instance ip: {}", ip);
/// ```
pub fn local_ip() -> String {
    if let Ok(ip) = std::env::var(POD_IP_ENV) {
        if !ip.is_empty() {
            return ip;
        }
    }

    outbound_ipv4()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| Ipv4Addr::LOCALHOST.to_string())
}

/// UDP 소켓을 연결만 해서(패킷 전송 없음) 커널이 고른 출발 주소를 얻습니다.
fn outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}
