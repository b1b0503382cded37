//! 영속화 경계.
//!
//! 실행기가 주문/체결/전략 레코드를 내보내는 싱크입니다. 운영에서는
//! 외부 저장소 구현이 주입되고, 기본 구성은 구조화 로그로만 남깁니다.

use async_trait::async_trait;
use runner_core::{Fill, Order, StrategyRecord};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::EngineError;

/// 영속 대상 레코드.
#[derive(Debug, Clone)]
pub enum PersistedRecord {
    /// 주문 상태 변화
    Order(Order),
    /// 체결
    Fill(Fill),
    /// 전략 실행 기록
    Strategy(StrategyRecord),
}

/// 레코드 싱크.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// 레코드 하나 기록.
    async fn persist(&self, record: PersistedRecord) -> Result<(), EngineError>;
}

/// 구조화 로그로만 기록하는 기본 싱크.
#[derive(Default)]
pub struct TracingSink;

#[async_trait]
impl PersistenceSink for TracingSink {
    async fn persist(&self, record: PersistedRecord) -> Result<(), EngineError> {
        match record {
            PersistedRecord::Order(order) => {
                info!(order_id = %order.order_id, ticker = %order.ticker, status = ?order.status, "주문 기록");
            }
            PersistedRecord::Fill(fill) => {
                info!(execution_id = %fill.execution_id, order_id = %fill.order_id, price = %fill.price, quantity = %fill.quantity, "체결 기록");
            }
            PersistedRecord::Strategy(record) => {
                info!(id = %record.id, name = %record.name, "전략 기록");
            }
        }
        Ok(())
    }
}

/// 인메모리 싱크 (테스트용).
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<PersistedRecord>>,
}

impl MemorySink {
    /// 지금까지 기록된 레코드 스냅샷.
    pub async fn records(&self) -> Vec<PersistedRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn persist(&self, record: PersistedRecord) -> Result<(), EngineError> {
        self.records.lock().await.push(record);
        Ok(())
    }
}
