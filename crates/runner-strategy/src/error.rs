//! 전략 계층 에러 타입.

use thiserror::Error;

/// 전략 생성/실행 에러.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// 레지스트리에 등록되지 않은 전략 키
    #[error("등록되지 않은 전략: {key}")]
    UnknownStrategy {
        /// 요청된 전략 키
        key: String,
    },

    /// 이미 등록된 전략 키로 재등록 시도
    #[error("이미 등록된 전략: {key}")]
    DuplicateStrategy {
        /// 중복된 전략 키
        key: String,
    },

    /// 전략 설정 에러 (필수 키 누락, 형식 오류 등)
    #[error("전략 설정 에러: {0}")]
    Config(String),

    /// 데이터 구독 요청 실패
    #[error("구독 요청 실패: {0}")]
    Subscription(String),

    /// 주문 요청 실패
    #[error("주문 요청 실패: {0}")]
    OrderRequest(String),

    /// 전략 콜백 내부 에러
    #[error("전략 콜백 에러: {0}")]
    Callback(String),
}
