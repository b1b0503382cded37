//! 전략 영속성 레코드 및 실행 상태.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 전략 실행 시작 시 영속화되는 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRecord {
    /// 레코드 ID
    pub id: Uuid,
    /// 전략 이름
    pub name: String,
    /// 실행 시작 시각
    pub started_at: DateTime<Utc>,
}

impl StrategyRecord {
    /// 지금 시작한 전략의 레코드 생성.
    pub fn started_now(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            started_at: Utc::now(),
        }
    }
}

/// 전략 실행 상태.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyStatus {
    /// 아직 실행된 적 없음
    #[default]
    Idle,
    /// 실행 중
    Executing,
    /// 실행 완료
    Executed,
}
