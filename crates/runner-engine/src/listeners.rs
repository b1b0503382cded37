//! 로컬 요청 리스너.
//!
//! 전략의 프로바이더가 시뮬레이션 거래소 센티널일 때 실행기가
//! `StrategyContext`에 설치하는 핸들러 구현입니다. 시장 데이터 요청은
//! 데이터 핸들러로, 주문 요청은 로컬 매칭 엔진으로 라우팅됩니다.

use std::sync::Arc;

use async_trait::async_trait;
use runner_core::{BarSubscription, Order, TickSubscription};
use runner_strategy::{MarketRequestHandler, OrderRequestHandler, StrategyError};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::data_handler::DataHandler;
use crate::exchange::{OrderEvent, SimulatedExchange};

/// 데이터 핸들러로 구독 요청을 전달하는 리스너.
pub struct MarketRequestListener {
    handler: Arc<DataHandler>,
}

impl MarketRequestListener {
    /// 데이터 핸들러를 감싸는 새 리스너 생성.
    pub fn new(handler: Arc<DataHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl MarketRequestHandler for MarketRequestListener {
    async fn subscribe_ticks(&self, subscription: TickSubscription) -> Result<(), StrategyError> {
        self.handler
            .subscribe_ticks(subscription)
            .await
            .map_err(|error| StrategyError::Subscription(error.to_string()))
    }

    async fn unsubscribe_ticks(&self, subscription_id: &str) -> Result<(), StrategyError> {
        self.handler
            .unsubscribe_ticks(subscription_id)
            .await
            .map_err(|error| StrategyError::Subscription(error.to_string()))
    }

    async fn subscribe_bars(&self, subscription: BarSubscription) -> Result<(), StrategyError> {
        self.handler
            .subscribe_bars(subscription)
            .await
            .map_err(|error| StrategyError::Subscription(error.to_string()))
    }

    async fn unsubscribe_bars(&self, subscription_id: &str) -> Result<(), StrategyError> {
        self.handler
            .unsubscribe_bars(subscription_id)
            .await
            .map_err(|error| StrategyError::Subscription(error.to_string()))
    }
}

/// 로컬 매칭 엔진으로 주문 요청을 전달하는 리스너.
///
/// 매칭 결과 이벤트는 실행기의 주문 이벤트 채널로 발행됩니다.
/// 송신측은 약한 핸들만 보유합니다 - 실행기가 자신의 송신측을 드롭하면
/// 채널이 닫히고 이벤트 펌프가 잔여 이벤트를 소진한 뒤 종료될 수
/// 있어야 하기 때문입니다.
pub struct OrderRequestListener {
    exchange: Arc<Mutex<SimulatedExchange>>,
    event_tx: mpsc::WeakSender<OrderEvent>,
}

impl OrderRequestListener {
    /// 매칭 엔진과 이벤트 송신측으로 새 리스너 생성.
    pub fn new(
        exchange: Arc<Mutex<SimulatedExchange>>,
        event_tx: mpsc::WeakSender<OrderEvent>,
    ) -> Self {
        Self { exchange, event_tx }
    }

    /// 매칭 결과 이벤트를 주문 이벤트 채널로 발행.
    async fn emit(&self, events: Vec<OrderEvent>) -> Result<(), StrategyError> {
        let Some(tx) = self.event_tx.upgrade() else {
            return Err(StrategyError::OrderRequest(
                "주문 이벤트 채널 닫힘".to_string(),
            ));
        };
        for event in events {
            debug!(?event, "주문 이벤트 발행");
            tx.send(event)
                .await
                .map_err(|_| StrategyError::OrderRequest("주문 이벤트 채널 닫힘".to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRequestHandler for OrderRequestListener {
    async fn submit_market_order(&self, order: Order) -> Result<(), StrategyError> {
        let events = self.exchange.lock().await.submit_market(order);
        self.emit(events).await
    }

    async fn submit_limit_order(&self, order: Order) -> Result<(), StrategyError> {
        let events = self.exchange.lock().await.submit_limit(order);
        self.emit(events).await
    }

    async fn cancel_order(&self, order_id: Uuid) -> Result<(), StrategyError> {
        let events = self.exchange.lock().await.cancel(order_id);
        self.emit(events).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use runner_core::{Side, Tick, SIMULATED_EXCHANGE};

    use super::*;

    #[tokio::test]
    async fn market_order_against_quote_emits_accept_and_fill() {
        let mut exchange = SimulatedExchange::new();
        exchange.on_tick(&Tick::from_last(
            "005930",
            dec!(70000),
            dec!(10),
            SIMULATED_EXCHANGE,
            Utc::now(),
        ));
        let exchange = Arc::new(Mutex::new(exchange));
        let (tx, mut rx) = mpsc::channel(16);
        let listener = OrderRequestListener::new(exchange, tx.downgrade());

        listener
            .submit_market_order(Order::market("005930", Side::Buy, dec!(5), SIMULATED_EXCHANGE))
            .await
            .unwrap();

        assert!(matches!(rx.recv().await.unwrap(), OrderEvent::Accepted(_)));
        assert!(matches!(rx.recv().await.unwrap(), OrderEvent::Executed(_)));
    }

    #[tokio::test]
    async fn closed_channel_surfaces_order_request_error() {
        let exchange = Arc::new(Mutex::new(SimulatedExchange::new()));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let listener = OrderRequestListener::new(exchange, tx.downgrade());

        let result = listener
            .submit_market_order(Order::market("005930", Side::Buy, dec!(1), SIMULATED_EXCHANGE))
            .await;
        assert!(matches!(result.unwrap_err(), StrategyError::OrderRequest(_)));
    }

    #[tokio::test]
    async fn dropped_sender_surfaces_order_request_error() {
        let exchange = Arc::new(Mutex::new(SimulatedExchange::new()));
        let (tx, _rx) = mpsc::channel::<OrderEvent>(1);
        let weak = tx.downgrade();
        drop(tx);
        let listener = OrderRequestListener::new(exchange, weak);

        let result = listener
            .submit_market_order(Order::market("005930", Side::Buy, dec!(1), SIMULATED_EXCHANGE))
            .await;
        assert!(matches!(result.unwrap_err(), StrategyError::OrderRequest(_)));
    }
}
