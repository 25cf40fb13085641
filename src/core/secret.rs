//! 자격 증명 복호화
//!
//! 설정 섹션에 `sid`가 지정되면 자격 증명 키(`password`, `auth`)의 값은
//! 암호문으로 취급되어 [`SecretResolver`]를 통해 평문으로 바뀝니다.
//!
//! ```ini
//! [database.orders.master]
//! sid = keycenter-orders
//! password = 9a8f...e1
//! ```

use crate::core::errors::AppResult;

/// 외부 키 관리 시스템과의 접점
///
/// 구현체는 `(sid, 암호문)`을 받아 평문을 반환합니다.
/// 실패는 `AppError::SecretError`로 보고해야 하며, 레지스트리 초기화를 중단시킵니다.
pub trait SecretResolver: Send + Sync {
    fn decrypt(&self, sid: &str, value: &str) -> AppResult<String>;
}

/// 값을 그대로 돌려주는 기본 구현
///
/// 키 관리 시스템이 없는 환경(로컬 개발, 테스트)에서 사용합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughResolver;

impl SecretResolver for PassthroughResolver {
    fn decrypt(&self, _sid: &str, value: &str) -> AppResult<String> {
        Ok(value.to_string())
    }
}

/// 섹션 값과 `sid`로부터 평문 자격 증명을 얻습니다.
///
/// `sid`가 비어 있으면 원래 값을 그대로 사용합니다.
pub fn resolve_credential(secrets: &dyn SecretResolver, sid: &str, value: String) -> AppResult<String> {
    if sid.is_empty() {
        return Ok(value);
    }
    log::debug!("🔑 자격 증명 복호화: sid={}", sid);
    secrets.decrypt(sid, &value)
}
