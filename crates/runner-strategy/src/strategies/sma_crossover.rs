//! SMA 교차 전략.
//!
//! 단기 SMA가 장기 SMA를 상향 돌파하면 매수, 하향 돌파하면 포지션을
//! 청산합니다. 바 구독 기반 롱 온리 전략입니다.

use async_trait::async_trait;
use rust_decimal::Decimal;
use runner_core::{Bar, BarSubscription, Execution, Order, Side, Tick, SIMULATED_EXCHANGE};
use serde_json::Value;
use tracing::{debug, info};

use crate::context::StrategyContext;
use crate::error::StrategyError;
use crate::registry::StrategyMetadata;
use crate::traits::Strategy;

/// 바 구독 ID.
const BAR_SUBSCRIPTION_ID: &str = "sma-crossover-bars";

/// SMA 교차 전략.
pub struct SmaCrossover {
    /// 대상 종목
    ticker: String,
    /// 단기 SMA 기간
    fast_period: usize,
    /// 장기 SMA 기간
    slow_period: usize,
    /// 주문 수량
    quantity: Decimal,
    /// 바 간격 (초)
    interval_secs: u64,
    /// 시장 데이터 프로바이더 이름
    market_data_provider: String,
    /// 주문 실행 프로바이더 이름
    order_execution_provider: String,
    /// 종가 히스토리 (slow_period개 유지)
    closes: Vec<Decimal>,
    /// 직전 바 기준 단기 SMA가 장기 SMA 위에 있었는지 여부
    fast_was_above: Option<bool>,
    /// 현재 보유 수량
    position: Decimal,
}

impl Default for SmaCrossover {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            fast_period: 5,
            slow_period: 20,
            quantity: Decimal::ONE,
            interval_secs: 60,
            market_data_provider: SIMULATED_EXCHANGE.to_string(),
            order_execution_provider: SIMULATED_EXCHANGE.to_string(),
            closes: Vec::new(),
            fast_was_above: None,
            position: Decimal::ZERO,
        }
    }
}

impl SmaCrossover {
    /// 레지스트리 등록용 메타데이터.
    pub fn metadata() -> StrategyMetadata {
        StrategyMetadata::new(
            "SmaCrossover",
            "0.3.0",
            "단기/장기 이동평균 교차 롱 온리 전략",
        )
        .with_required_config(&["ticker"])
    }

    /// 현재 보유 수량.
    pub fn position(&self) -> Decimal {
        self.position
    }

    /// 마지막 `period`개 종가의 단순 이동평균.
    fn sma(&self, period: usize) -> Option<Decimal> {
        if self.closes.len() < period {
            return None;
        }
        let window = &self.closes[self.closes.len() - period..];
        let sum: Decimal = window.iter().copied().sum();
        Some(sum / Decimal::from(period))
    }

    /// 설정에서 문자열 키 추출.
    fn config_str(config: &Value, key: &str) -> Option<String> {
        config.get(key).and_then(Value::as_str).map(String::from)
    }
}

#[async_trait]
impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "SmaCrossover"
    }

    fn market_data_provider(&self) -> &str {
        &self.market_data_provider
    }

    fn order_execution_provider(&self) -> &str {
        &self.order_execution_provider
    }

    async fn initialize(&mut self, config: Value) -> Result<(), StrategyError> {
        self.ticker = Self::config_str(&config, "ticker")
            .ok_or_else(|| StrategyError::Config("필수 키 누락: ticker".to_string()))?;

        if let Some(fast) = config.get("fast_period").and_then(Value::as_u64) {
            self.fast_period = fast as usize;
        }
        if let Some(slow) = config.get("slow_period").and_then(Value::as_u64) {
            self.slow_period = slow as usize;
        }
        if let Some(interval) = config.get("interval_secs").and_then(Value::as_u64) {
            self.interval_secs = interval;
        }
        if let Some(quantity) = config.get("quantity").and_then(Value::as_str) {
            self.quantity = quantity
                .parse()
                .map_err(|_| StrategyError::Config(format!("잘못된 수량: {}", quantity)))?;
        }
        if let Some(provider) = Self::config_str(&config, "market_data_provider") {
            self.market_data_provider = provider;
        }
        if let Some(provider) = Self::config_str(&config, "order_execution_provider") {
            self.order_execution_provider = provider;
        }

        if self.fast_period == 0 || self.fast_period >= self.slow_period {
            return Err(StrategyError::Config(format!(
                "기간 설정 오류: fast({}) < slow({}) 조건 위반",
                self.fast_period, self.slow_period
            )));
        }

        Ok(())
    }

    async fn on_start(&mut self, ctx: &StrategyContext) -> Result<(), StrategyError> {
        info!(ticker = %self.ticker, fast = self.fast_period, slow = self.slow_period, "SMA 교차 전략 시작");
        ctx.subscribe_bars(BarSubscription::new(
            BAR_SUBSCRIPTION_ID,
            self.ticker.clone(),
            self.interval_secs,
        ))
        .await
    }

    async fn on_tick(&mut self, _tick: &Tick, _ctx: &StrategyContext) -> Result<(), StrategyError> {
        // 바 기반 전략 - 틱은 사용하지 않음
        Ok(())
    }

    async fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Result<(), StrategyError> {
        if bar.ticker != self.ticker {
            return Ok(());
        }

        self.closes.push(bar.close);
        if self.closes.len() > self.slow_period {
            self.closes.remove(0);
        }

        let (fast, slow) = match (self.sma(self.fast_period), self.sma(self.slow_period)) {
            (Some(fast), Some(slow)) => (fast, slow),
            _ => return Ok(()),
        };

        let fast_is_above = fast > slow;
        let crossed = self
            .fast_was_above
            .map(|was_above| was_above != fast_is_above)
            .unwrap_or(false);
        self.fast_was_above = Some(fast_is_above);

        if !crossed {
            return Ok(());
        }

        if fast_is_above && self.position.is_zero() {
            debug!(ticker = %bar.ticker, close = %bar.close, "상향 돌파 - 매수");
            ctx.submit_market_order(Order::market(
                self.ticker.clone(),
                Side::Buy,
                self.quantity,
                self.order_execution_provider.clone(),
            ))
            .await?;
        } else if !fast_is_above && self.position > Decimal::ZERO {
            debug!(ticker = %bar.ticker, close = %bar.close, "하향 돌파 - 청산");
            ctx.submit_market_order(Order::market(
                self.ticker.clone(),
                Side::Sell,
                self.position,
                self.order_execution_provider.clone(),
            ))
            .await?;
        }

        Ok(())
    }

    async fn on_execution(
        &mut self,
        execution: &Execution,
        _ctx: &StrategyContext,
    ) -> Result<(), StrategyError> {
        match execution.fill.side {
            Side::Buy => self.position += execution.fill.quantity,
            Side::Sell | Side::Cover => self.position -= execution.fill.quantity,
            Side::Short => self.position -= execution.fill.quantity,
        }
        debug!(ticker = %execution.fill.ticker, position = %self.position, "체결 반영");
        Ok(())
    }

    async fn on_stop(&mut self, ctx: &StrategyContext) -> Result<(), StrategyError> {
        info!(ticker = %self.ticker, "SMA 교차 전략 중지");
        ctx.unsubscribe_bars(BAR_SUBSCRIPTION_ID).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use rust_decimal_macros::dec;
    use runner_core::{Fill, TickSubscription};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::context::{MarketRequestHandler, OrderRequestHandler};

    /// 제출된 주문을 기록하는 테스트 핸들러.
    #[derive(Default)]
    struct RecordingHandler {
        orders: Mutex<Vec<Order>>,
    }

    #[async_trait]
    impl MarketRequestHandler for RecordingHandler {
        async fn subscribe_ticks(&self, _s: TickSubscription) -> Result<(), StrategyError> {
            Ok(())
        }
        async fn unsubscribe_ticks(&self, _id: &str) -> Result<(), StrategyError> {
            Ok(())
        }
        async fn subscribe_bars(&self, _s: BarSubscription) -> Result<(), StrategyError> {
            Ok(())
        }
        async fn unsubscribe_bars(&self, _id: &str) -> Result<(), StrategyError> {
            Ok(())
        }
    }

    #[async_trait]
    impl OrderRequestHandler for RecordingHandler {
        async fn submit_market_order(&self, order: Order) -> Result<(), StrategyError> {
            self.orders.lock().unwrap().push(order);
            Ok(())
        }
        async fn submit_limit_order(&self, order: Order) -> Result<(), StrategyError> {
            self.orders.lock().unwrap().push(order);
            Ok(())
        }
        async fn cancel_order(&self, _order_id: Uuid) -> Result<(), StrategyError> {
            Ok(())
        }
    }

    fn test_context() -> (Arc<RecordingHandler>, StrategyContext) {
        let handler = Arc::new(RecordingHandler::default());
        let ctx = StrategyContext::new(handler.clone(), handler.clone());
        (handler, ctx)
    }

    fn bar(close: Decimal) -> Bar {
        Bar::new(
            "005930",
            close,
            close,
            close,
            close,
            dec!(1000),
            60,
            SIMULATED_EXCHANGE,
            Utc::now(),
        )
    }

    async fn initialized_strategy() -> SmaCrossover {
        let mut strategy = SmaCrossover::default();
        strategy
            .initialize(json!({
                "ticker": "005930",
                "fast_period": 2,
                "slow_period": 3,
            }))
            .await
            .unwrap();
        strategy
    }

    #[tokio::test]
    async fn initialize_requires_ticker() {
        let mut strategy = SmaCrossover::default();
        let result = strategy.initialize(json!({})).await;
        assert!(matches!(result.unwrap_err(), StrategyError::Config(_)));
    }

    #[tokio::test]
    async fn initialize_rejects_inverted_periods() {
        let mut strategy = SmaCrossover::default();
        let result = strategy
            .initialize(json!({"ticker": "005930", "fast_period": 20, "slow_period": 5}))
            .await;
        assert!(matches!(result.unwrap_err(), StrategyError::Config(_)));
    }

    #[tokio::test]
    async fn golden_cross_buys_once() {
        let mut strategy = initialized_strategy().await;
        let (handler, ctx) = test_context();

        // 하락 구간: fast < slow 확립
        for close in [dec!(100), dec!(90), dec!(80)] {
            strategy.on_bar(&bar(close), &ctx).await.unwrap();
        }
        assert!(handler.orders.lock().unwrap().is_empty());

        // 반등: 상향 돌파
        for close in [dec!(95), dec!(110)] {
            strategy.on_bar(&bar(close), &ctx).await.unwrap();
        }

        let orders = handler.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Buy);
    }

    #[tokio::test]
    async fn death_cross_exits_position() {
        let mut strategy = initialized_strategy().await;
        let (handler, ctx) = test_context();

        // 상향 돌파 유도 후 체결 반영
        for close in [dec!(100), dec!(90), dec!(80), dec!(95), dec!(110)] {
            strategy.on_bar(&bar(close), &ctx).await.unwrap();
        }
        let buy = handler.orders.lock().unwrap()[0].clone();
        let fill = Fill::new(&buy, buy.quantity, dec!(110), dec!(0), Utc::now());
        strategy
            .on_execution(&Execution::new(buy, fill), &ctx)
            .await
            .unwrap();
        assert_eq!(strategy.position(), dec!(1));

        // 하향 돌파
        for close in [dec!(80), dec!(60)] {
            strategy.on_bar(&bar(close), &ctx).await.unwrap();
        }

        let orders = handler.orders.lock().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].side, Side::Sell);
        assert_eq!(orders[1].quantity, dec!(1));
    }

    #[tokio::test]
    async fn foreign_ticker_bars_are_ignored() {
        let mut strategy = initialized_strategy().await;
        let (handler, ctx) = test_context();

        let mut other = bar(dec!(100));
        other.ticker = "GOOG".to_string();
        for _ in 0..10 {
            strategy.on_bar(&other, &ctx).await.unwrap();
        }
        assert!(handler.orders.lock().unwrap().is_empty());
    }
}
