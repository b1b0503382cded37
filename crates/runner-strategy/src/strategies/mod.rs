//! 내장 트레이딩 전략.
//!
//! - **SMA Crossover**: 단기/장기 이동평균 교차 전략.

pub mod sma_crossover;

pub use sma_crossover::SmaCrossover;

use crate::error::StrategyError;
use crate::registry::StrategyRegistry;
use crate::traits::Strategy;

/// 내장 전략이 모두 등록된 레지스트리 생성.
pub fn builtin_registry() -> Result<StrategyRegistry, StrategyError> {
    let mut registry = StrategyRegistry::new();
    registry.register("sma-crossover", SmaCrossover::metadata(), || {
        Box::new(SmaCrossover::default()) as Box<dyn Strategy>
    })?;
    Ok(registry)
}
