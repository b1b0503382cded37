//! 대시보드 계층 에러 타입.

use thiserror::Error;

/// 프로바이더/대시보드 서비스 에러.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// 설정 로드 실패
    #[error("프로바이더 카탈로그 로드 실패: {0}")]
    Catalog(#[from] config::ConfigError),

    /// 컬렉션에 없는 프로바이더
    #[error("알 수 없는 프로바이더: {name}")]
    UnknownProvider { name: String },

    /// 대시보드에 없는 종목
    #[error("알 수 없는 종목: {ticker}")]
    UnknownInstrument { ticker: String },

    /// 현재 상태에서 실행할 수 없는 명령
    #[error("명령 실행 불가: {reason}")]
    CommandUnavailable { reason: String },
}
