//! 전략 실행 컨텍스트.
//!
//! 전략이 데이터 구독과 주문을 발행하는 요청 경계입니다.
//! 실행기는 전략의 프로바이더 이름에 따라 이 컨텍스트의 핸들러를
//! 교체합니다 — 시뮬레이션 거래소 센티널이면 로컬 리스너가,
//! 그 외에는 외부 엔진의 게이트웨이가 설치됩니다.

use std::sync::Arc;

use async_trait::async_trait;
use runner_core::{BarSubscription, Order, TickSubscription};
use uuid::Uuid;

use crate::error::StrategyError;

// =============================================================================
// 요청 핸들러 trait
// =============================================================================

/// 시장 데이터 요청 핸들러 (데이터 플레인 경계).
#[async_trait]
pub trait MarketRequestHandler: Send + Sync {
    /// 틱 구독 요청.
    async fn subscribe_ticks(&self, subscription: TickSubscription) -> Result<(), StrategyError>;

    /// 틱 구독 해제 요청.
    async fn unsubscribe_ticks(&self, subscription_id: &str) -> Result<(), StrategyError>;

    /// 바 구독 요청.
    async fn subscribe_bars(&self, subscription: BarSubscription) -> Result<(), StrategyError>;

    /// 바 구독 해제 요청.
    async fn unsubscribe_bars(&self, subscription_id: &str) -> Result<(), StrategyError>;
}

/// 주문 요청 핸들러 (주문 플레인 경계).
#[async_trait]
pub trait OrderRequestHandler: Send + Sync {
    /// 시장가 주문 제출.
    async fn submit_market_order(&self, order: Order) -> Result<(), StrategyError>;

    /// 지정가 주문 제출.
    async fn submit_limit_order(&self, order: Order) -> Result<(), StrategyError>;

    /// 주문 취소 요청.
    async fn cancel_order(&self, order_id: Uuid) -> Result<(), StrategyError>;
}

// =============================================================================
// 전략 컨텍스트
// =============================================================================

/// 전략에 주입되는 요청 컨텍스트.
///
/// 핸들러 교체는 실행기만 수행합니다. 전략 코드는 편의 메서드를 통해
/// 현재 설치된 핸들러로 요청을 전달할 뿐입니다.
pub struct StrategyContext {
    /// 시장 데이터 요청 핸들러
    market_requests: Arc<dyn MarketRequestHandler>,
    /// 주문 요청 핸들러
    order_requests: Arc<dyn OrderRequestHandler>,
}

impl StrategyContext {
    /// 핸들러 쌍으로 새 컨텍스트 생성.
    pub fn new(
        market_requests: Arc<dyn MarketRequestHandler>,
        order_requests: Arc<dyn OrderRequestHandler>,
    ) -> Self {
        Self {
            market_requests,
            order_requests,
        }
    }

    /// 시장 데이터 요청 핸들러 교체 (실행기 전용).
    pub fn override_market_requests(&mut self, handler: Arc<dyn MarketRequestHandler>) {
        self.market_requests = handler;
    }

    /// 주문 요청 핸들러 교체 (실행기 전용).
    pub fn override_order_requests(&mut self, handler: Arc<dyn OrderRequestHandler>) {
        self.order_requests = handler;
    }

    /// 틱 구독.
    pub async fn subscribe_ticks(
        &self,
        subscription: TickSubscription,
    ) -> Result<(), StrategyError> {
        self.market_requests.subscribe_ticks(subscription).await
    }

    /// 틱 구독 해제.
    pub async fn unsubscribe_ticks(&self, subscription_id: &str) -> Result<(), StrategyError> {
        self.market_requests.unsubscribe_ticks(subscription_id).await
    }

    /// 바 구독.
    pub async fn subscribe_bars(
        &self,
        subscription: BarSubscription,
    ) -> Result<(), StrategyError> {
        self.market_requests.subscribe_bars(subscription).await
    }

    /// 바 구독 해제.
    pub async fn unsubscribe_bars(&self, subscription_id: &str) -> Result<(), StrategyError> {
        self.market_requests.unsubscribe_bars(subscription_id).await
    }

    /// 시장가 주문 제출.
    pub async fn submit_market_order(&self, order: Order) -> Result<(), StrategyError> {
        self.order_requests.submit_market_order(order).await
    }

    /// 지정가 주문 제출.
    pub async fn submit_limit_order(&self, order: Order) -> Result<(), StrategyError> {
        self.order_requests.submit_limit_order(order).await
    }

    /// 주문 취소.
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<(), StrategyError> {
        self.order_requests.cancel_order(order_id).await
    }
}
