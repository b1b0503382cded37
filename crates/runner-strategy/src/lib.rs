//! 전략 추상화 계층.
//!
//! 이 crate는 다음을 제공합니다:
//! - 사용자 전략이 구현하는 `Strategy` trait (run/stop/onTick/onBar/onExecution)
//! - 데이터/주문 요청 경계인 `StrategyContext`와 핸들러 trait
//! - 전략 식별자 → 팩토리 매핑인 `StrategyRegistry` (플러그인 레지스트리)
//! - 내장 전략 구현 (`strategies`)

pub mod context;
pub mod error;
pub mod registry;
pub mod strategies;
pub mod traits;

// 주요 타입 재내보내기
pub use context::{MarketRequestHandler, OrderRequestHandler, StrategyContext};
pub use error::StrategyError;
pub use registry::{StrategyFactory, StrategyMetadata, StrategyRegistry};
pub use strategies::builtin_registry;
pub use traits::Strategy;
