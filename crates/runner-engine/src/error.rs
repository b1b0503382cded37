//! 엔진 에러 타입.

use runner_strategy::StrategyError;
use thiserror::Error;

/// 실행기/시뮬레이션 거래소 에러.
#[derive(Debug, Error)]
pub enum EngineError {
    /// 전략 계층 에러
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// 데이터 소스에 요청한 종목/간격의 데이터 없음
    #[error("데이터 없음: {ticker}")]
    NoData {
        /// 요청된 종목
        ticker: String,
    },

    /// 이벤트 채널 닫힘
    #[error("이벤트 채널 닫힘: {0}")]
    ChannelClosed(String),

    /// CSV 파싱 에러
    #[error("CSV 파싱 에러: {0}")]
    Csv(#[from] csv::Error),

    /// I/O 에러
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
