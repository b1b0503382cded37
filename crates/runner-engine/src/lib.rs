//! 전략 실행 엔진.
//!
//! 이 crate는 다음을 제공합니다:
//! - 전략 수명주기를 소유하는 `StrategyExecutor`와 이벤트 펌프
//! - 로컬 매칭 엔진 `SimulatedExchange`
//! - 기록 데이터 재생용 `DataHandler`와 데이터 소스 trait
//! - 시뮬레이션 배선용 요청 리스너
//! - 주문/체결/전략 레코드 영속화 경계 (`PersistenceSink`)
//! - 체결 기반 실행 통계 (`StrategyStatistics`)

pub mod data_handler;
pub mod error;
pub mod exchange;
pub mod executor;
pub mod listeners;
pub mod persistence;
pub mod stats;

// 주요 타입 재내보내기
pub use data_handler::{
    CsvDataSource, DataHandler, HistoricalDataSource, MarketDataEvent, RecordedDataSource,
};
pub use error::EngineError;
pub use exchange::{OrderEvent, SimulatedExchange};
pub use executor::{ExecutorEvent, StrategyExecutor};
pub use listeners::{MarketRequestListener, OrderRequestListener};
pub use persistence::{MemorySink, PersistedRecord, PersistenceSink, TracingSink};
pub use stats::StrategyStatistics;
