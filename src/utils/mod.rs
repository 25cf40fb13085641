//! 공통 유틸리티 함수 모듈
//! 
//! 애플리케이션 전체에서 사용되는 공통 유틸리티 함수들을 제공합니다.
//! 문자열 처리, 터미널 출력, HTTP 응답 작성 등의 기능을 포함합니다.
//!
//! # Modules
//!
//! - [`string_utils`] - 문자열 검증, 문자 단위 자르기
//! - [`display_terminal`] - 터미널 출력 포맷팅 함수들
//! - [`response`] - 본문을 요청 extension에 기록하는 text/JSON/XML 응답
//! - [`net`] - 로컬 IP 조회
//! - [`batch`] - 슬라이스 배치 처리
//! - [`file`] - 파일 존재 여부, 부모 디렉터리
//!
//! # Examples
//!
//! ```rust,ignore
//! use backend_utils::utils::string_utils::validate_required_string;
//! use backend_utils::utils::display_terminal::print_boxed_title;
//!
//! // 문자열 검증
//! let log_dir = validate_required_string("  /var/log/app  ", "log directory")?;
//!
//! // 터미널 출력
//! print_boxed_title("BACKEND REGISTRY");
//! ```

pub mod batch;
pub mod display_terminal;
pub mod file;
pub mod net;
pub mod response;
pub mod string_utils;
