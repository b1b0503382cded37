//! 실행기 수명주기 통합 테스트.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use runner_core::{
    Bar, BarSubscription, Execution, Order, Side, StrategyStatus, Tick, TickSubscription,
    SIMULATED_EXCHANGE,
};
use runner_engine::{
    ExecutorEvent, MemorySink, PersistedRecord, RecordedDataSource, StrategyExecutor,
};
use runner_strategy::{
    MarketRequestHandler, OrderRequestHandler, Strategy, StrategyContext, StrategyError,
};
use serde_json::json;
use uuid::Uuid;

/// 첫 바에서 시장가 매수 하나를 내는 테스트 전략.
struct BuyOnFirstBar {
    market_provider: String,
    order_provider: String,
    started: Arc<AtomicUsize>,
    bars_seen: Arc<AtomicUsize>,
    executions: Arc<AtomicUsize>,
}

#[async_trait]
impl Strategy for BuyOnFirstBar {
    fn name(&self) -> &str {
        "BuyOnFirstBar"
    }

    fn market_data_provider(&self) -> &str {
        &self.market_provider
    }

    fn order_execution_provider(&self) -> &str {
        &self.order_provider
    }

    async fn initialize(&mut self, _config: serde_json::Value) -> Result<(), StrategyError> {
        Ok(())
    }

    async fn on_start(&mut self, ctx: &StrategyContext) -> Result<(), StrategyError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        ctx.subscribe_bars(BarSubscription::new("test-bars", "005930", 60))
            .await
    }

    async fn on_tick(&mut self, _tick: &Tick, _ctx: &StrategyContext) -> Result<(), StrategyError> {
        Ok(())
    }

    async fn on_bar(&mut self, _bar: &Bar, ctx: &StrategyContext) -> Result<(), StrategyError> {
        if self.bars_seen.fetch_add(1, Ordering::SeqCst) == 0 {
            ctx.submit_market_order(Order::market(
                "005930",
                Side::Buy,
                dec!(3),
                SIMULATED_EXCHANGE,
            ))
            .await?;
        }
        Ok(())
    }

    async fn on_execution(
        &mut self,
        _execution: &Execution,
        _ctx: &StrategyContext,
    ) -> Result<(), StrategyError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_stop(&mut self, ctx: &StrategyContext) -> Result<(), StrategyError> {
        ctx.unsubscribe_bars("test-bars").await
    }
}

fn sample_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            Bar::new(
                "005930",
                dec!(70000),
                dec!(70500),
                dec!(69500),
                Decimal::from(70000 + 100 * i as i64),
                dec!(1000),
                60,
                SIMULATED_EXCHANGE,
                Utc::now() + chrono::Duration::seconds(60 * i as i64),
            )
        })
        .collect()
}

struct TestHarness {
    executor: StrategyExecutor,
    sink: Arc<MemorySink>,
    instantiated: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
    executions: Arc<AtomicUsize>,
}

fn harness(market_provider: &str, order_provider: &str) -> TestHarness {
    let instantiated = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(AtomicUsize::new(0));
    let executions = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(MemorySink::default());

    let factory = {
        let instantiated = instantiated.clone();
        let started = started.clone();
        let executions = executions.clone();
        let market_provider = market_provider.to_string();
        let order_provider = order_provider.to_string();
        Arc::new(move || {
            instantiated.fetch_add(1, Ordering::SeqCst);
            Box::new(BuyOnFirstBar {
                market_provider: market_provider.clone(),
                order_provider: order_provider.clone(),
                started: started.clone(),
                bars_seen: Arc::new(AtomicUsize::new(0)),
                executions: executions.clone(),
            }) as Box<dyn Strategy>
        }) as runner_strategy::StrategyFactory
    };

    let source = Arc::new(RecordedDataSource::new().with_bars("005930", sample_bars(4)));
    let executor = StrategyExecutor::new("buy-on-first-bar", factory, json!({}), source, sink.clone());

    TestHarness {
        executor,
        sink,
        instantiated,
        started,
        executions,
    }
}

#[tokio::test]
async fn execute_twice_creates_one_instance() {
    let mut h = harness(SIMULATED_EXCHANGE, SIMULATED_EXCHANGE);

    h.executor.execute().await.unwrap();
    h.executor.execute().await.unwrap();

    assert_eq!(h.instantiated.load(Ordering::SeqCst), 1);
    assert_eq!(h.started.load(Ordering::SeqCst), 2);
    assert_eq!(h.executor.status(), StrategyStatus::Executing);

    h.executor.close().await.unwrap();
}

#[tokio::test]
async fn stop_without_instance_is_a_logged_noop() {
    let mut h = harness(SIMULATED_EXCHANGE, SIMULATED_EXCHANGE);
    h.executor.stop().await.unwrap();
    assert_eq!(h.executor.status(), StrategyStatus::Idle);
}

#[tokio::test]
async fn close_returns_promptly_after_execute() {
    let mut h = harness(SIMULATED_EXCHANGE, SIMULATED_EXCHANGE);

    h.executor.execute().await.unwrap();
    h.executor.data_handler().join_feeds().await;

    // 주문 채널의 유일한 강한 송신측은 실행기 자신이므로 close()가
    // 이를 드롭하면 펌프가 소진 후 종료되어야 함
    tokio::time::timeout(Duration::from_secs(5), h.executor.close())
        .await
        .expect("close()가 제한 시간 안에 반환해야 함")
        .unwrap();
}

#[tokio::test]
async fn close_without_instance_is_safe() {
    let mut h = harness(SIMULATED_EXCHANGE, SIMULATED_EXCHANGE);
    h.executor.close().await.unwrap();
    assert_eq!(h.instantiated.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn recorded_run_fills_and_republishes() {
    let mut h = harness(SIMULATED_EXCHANGE, SIMULATED_EXCHANGE);
    let mut events = h.executor.subscribe_events();

    h.executor.execute().await.unwrap();
    h.executor.data_handler().join_feeds().await;
    h.executor.stop().await.unwrap();
    h.executor.close().await.unwrap();

    // 첫 바에서 주문, 해당 바 종가 호가로 체결
    assert_eq!(h.executions.load(Ordering::SeqCst), 1);

    let stats = h.executor.statistics().await;
    assert_eq!(stats.position, dec!(3));
    assert_eq!(stats.fill_count, 1);

    // 상태 변화 + 전략에 전달된 체결이 재발행됨
    let mut saw_running = false;
    let mut saw_execution = false;
    while let Ok(event) = events.try_recv() {
        match event {
            ExecutorEvent::StatusChanged { running: true, .. } => saw_running = true,
            ExecutorEvent::ExecutionReceived { key, execution } => {
                saw_execution = true;
                assert_eq!(key, "buy-on-first-bar");
                assert_eq!(execution.fill.quantity, dec!(3));
            }
            _ => {}
        }
    }
    assert!(saw_running);
    assert!(saw_execution);

    // 영속화: 전략 레코드 + 주문 상태 + 체결
    let records = h.sink.records().await;
    assert!(matches!(records[0], PersistedRecord::Strategy(_)));
    assert!(records.iter().any(|r| matches!(r, PersistedRecord::Fill(_))));
    assert!(records.iter().any(|r| matches!(r, PersistedRecord::Order(_))));
}

/// 요청 횟수만 세는 외부 게이트웨이.
#[derive(Default)]
struct CountingGateway {
    market_calls: AtomicUsize,
    order_calls: AtomicUsize,
}

#[async_trait]
impl MarketRequestHandler for CountingGateway {
    async fn subscribe_ticks(&self, _s: TickSubscription) -> Result<(), StrategyError> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unsubscribe_ticks(&self, _id: &str) -> Result<(), StrategyError> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe_bars(&self, _s: BarSubscription) -> Result<(), StrategyError> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unsubscribe_bars(&self, _id: &str) -> Result<(), StrategyError> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl OrderRequestHandler for CountingGateway {
    async fn submit_market_order(&self, _order: Order) -> Result<(), StrategyError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn submit_limit_order(&self, _order: Order) -> Result<(), StrategyError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn cancel_order(&self, _order_id: Uuid) -> Result<(), StrategyError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn live_provider_keeps_injected_gateways() {
    let gateway = Arc::new(CountingGateway::default());
    let h = harness("LiveBroker", "LiveBroker");
    let mut executor = h
        .executor
        .with_external_handlers(gateway.clone(), gateway.clone());

    executor.execute().await.unwrap();

    // 구독 요청이 로컬 데이터 핸들러가 아닌 외부 게이트웨이로 전달됨
    assert_eq!(h.started.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.market_calls.load(Ordering::SeqCst), 1);

    executor.close().await.unwrap();
}

#[tokio::test]
async fn live_provider_without_gateway_fails_on_start() {
    let mut h = harness("LiveBroker", "LiveBroker");
    let result = h.executor.execute().await;
    assert!(result.is_err());
}
