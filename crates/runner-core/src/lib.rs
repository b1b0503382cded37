//! 전략 러너 핵심 도메인 타입.
//!
//! 이 crate는 다음을 제공합니다:
//! - 주문/체결/거부 도메인 레코드 (`Order`, `Execution`, `Rejection`)
//! - 시장 데이터 레코드 (`Tick`, `Bar`) 및 구독 요청 타입
//! - 프로바이더 모델 (`Provider`, 연결 상태, 시뮬레이션 거래소 센티널)
//! - 컴포넌트 간 이벤트 버스 (`EventBus`)

pub mod domain;
pub mod events;

// 주요 타입 재내보내기
pub use domain::market::{Bar, BarSubscription, Tick, TickSubscription};
pub use domain::order::{Execution, Fill, Order, OrderStatus, OrderType, Rejection, Side};
pub use domain::provider::{
    is_simulated, ConnectionStatus, Provider, ProviderCredentials, ProviderKind,
    SIMULATED_EXCHANGE,
};
pub use domain::record::{StrategyRecord, StrategyStatus};
pub use events::EventBus;
