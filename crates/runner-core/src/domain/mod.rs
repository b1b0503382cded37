//! 도메인 모델.
//!
//! 러너가 외부 엔진과 주고받는 모든 패스스루 레코드를 정의합니다.

pub mod market;
pub mod order;
pub mod provider;
pub mod record;
