//! 전략 실행기.
//!
//! 단일 전략의 수명주기(생성 → 실행 → 중지 → 종료)를 소유합니다.
//! 전략 인스턴스는 `execute()` 최초 호출 시 한 번만 생성되고,
//! 프로바이더 이름이 시뮬레이션 거래소 센티널일 때만 로컬 리스너가
//! 컨텍스트에 설치됩니다. 이벤트 펌프는 시장 데이터와 주문 이벤트를
//! 전략 콜백으로 전달하며, 콜백 오류는 로그로 남기고 계속 진행합니다.

use std::sync::Arc;

use async_trait::async_trait;
use runner_core::{
    is_simulated, BarSubscription, EventBus, Execution, Order, StrategyRecord, StrategyStatus,
    TickSubscription,
};
use runner_strategy::{
    MarketRequestHandler, OrderRequestHandler, Strategy, StrategyContext, StrategyError,
    StrategyFactory,
};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::data_handler::{DataHandler, HistoricalDataSource, MarketDataEvent};
use crate::error::EngineError;
use crate::exchange::{OrderEvent, SimulatedExchange};
use crate::listeners::{MarketRequestListener, OrderRequestListener};
use crate::persistence::{PersistedRecord, PersistenceSink};
use crate::stats::StrategyStatistics;

/// 실행기가 외부 관찰자에게 재발행하는 이벤트.
#[derive(Debug, Clone)]
pub enum ExecutorEvent {
    /// 전략 실행 상태 변화
    StatusChanged { key: String, running: bool },
    /// 전략에 전달된 체결
    ExecutionReceived { key: String, execution: Execution },
}

/// 외부 프로바이더가 배선되지 않았을 때의 기본 핸들러.
///
/// 센티널이 아닌 프로바이더를 지정한 전략에 외부 게이트웨이가 주입되지
/// 않으면 모든 요청이 오류로 반환됩니다.
struct UnroutedHandler;

#[async_trait]
impl MarketRequestHandler for UnroutedHandler {
    async fn subscribe_ticks(&self, s: TickSubscription) -> Result<(), StrategyError> {
        Err(StrategyError::Subscription(format!(
            "프로바이더 미배선: 틱 구독 {} 처리 불가",
            s.id
        )))
    }

    async fn unsubscribe_ticks(&self, id: &str) -> Result<(), StrategyError> {
        Err(StrategyError::Subscription(format!(
            "프로바이더 미배선: 틱 구독 해제 {} 처리 불가",
            id
        )))
    }

    async fn subscribe_bars(&self, s: BarSubscription) -> Result<(), StrategyError> {
        Err(StrategyError::Subscription(format!(
            "프로바이더 미배선: 바 구독 {} 처리 불가",
            s.id
        )))
    }

    async fn unsubscribe_bars(&self, id: &str) -> Result<(), StrategyError> {
        Err(StrategyError::Subscription(format!(
            "프로바이더 미배선: 바 구독 해제 {} 처리 불가",
            id
        )))
    }
}

#[async_trait]
impl OrderRequestHandler for UnroutedHandler {
    async fn submit_market_order(&self, order: Order) -> Result<(), StrategyError> {
        Err(StrategyError::OrderRequest(format!(
            "프로바이더 미배선: 주문 {} 처리 불가",
            order.order_id
        )))
    }

    async fn submit_limit_order(&self, order: Order) -> Result<(), StrategyError> {
        Err(StrategyError::OrderRequest(format!(
            "프로바이더 미배선: 주문 {} 처리 불가",
            order.order_id
        )))
    }

    async fn cancel_order(&self, order_id: Uuid) -> Result<(), StrategyError> {
        Err(StrategyError::OrderRequest(format!(
            "프로바이더 미배선: 취소 {} 처리 불가",
            order_id
        )))
    }
}

/// 단일 전략의 실행기.
pub struct StrategyExecutor {
    /// 레지스트리 키
    key: String,
    /// 전략 팩토리 (지연 생성용)
    factory: StrategyFactory,
    /// 전략 JSON 설정
    config: Value,
    /// 전략 인스턴스 (execute 최초 호출 시 생성)
    strategy: Option<Arc<Mutex<Box<dyn Strategy>>>>,
    /// 현재 컨텍스트 (인스턴스와 함께 생성)
    context: Option<Arc<StrategyContext>>,
    /// 외부 시장 데이터 게이트웨이
    external_market: Arc<dyn MarketRequestHandler>,
    /// 외부 주문 게이트웨이
    external_orders: Arc<dyn OrderRequestHandler>,
    /// 로컬 데이터 핸들러
    data_handler: Arc<DataHandler>,
    /// 로컬 매칭 엔진
    exchange: Arc<Mutex<SimulatedExchange>>,
    /// 시장 데이터 수신측 (펌프 시작 시 이동)
    market_rx: Option<mpsc::Receiver<MarketDataEvent>>,
    /// 주문 이벤트 채널
    order_tx: Option<mpsc::Sender<OrderEvent>>,
    order_rx: Option<mpsc::Receiver<OrderEvent>>,
    /// 영속화 싱크
    persistence: Arc<dyn PersistenceSink>,
    /// 실행 통계 (펌프와 공유)
    stats: Arc<Mutex<StrategyStatistics>>,
    /// 재발행 버스
    events: EventBus<ExecutorEvent>,
    /// 이벤트 펌프 핸들
    pump: Option<JoinHandle<()>>,
    /// 현재 실행 상태
    status: StrategyStatus,
}

impl StrategyExecutor {
    /// 새 실행기 생성. 리스너/매칭 엔진은 여기서 미리 구성됩니다.
    pub fn new(
        key: impl Into<String>,
        factory: StrategyFactory,
        config: Value,
        source: Arc<dyn HistoricalDataSource>,
        persistence: Arc<dyn PersistenceSink>,
    ) -> Self {
        let (data_handler, market_rx) = DataHandler::new(source, 256);
        let (order_tx, order_rx) = mpsc::channel(256);
        Self {
            key: key.into(),
            factory,
            config,
            strategy: None,
            context: None,
            external_market: Arc::new(UnroutedHandler),
            external_orders: Arc::new(UnroutedHandler),
            data_handler: Arc::new(data_handler),
            exchange: Arc::new(Mutex::new(SimulatedExchange::new())),
            market_rx: Some(market_rx),
            order_tx: Some(order_tx),
            order_rx: Some(order_rx),
            persistence,
            stats: Arc::new(Mutex::new(StrategyStatistics::new())),
            events: EventBus::default(),
            pump: None,
            status: StrategyStatus::Idle,
        }
    }

    /// 실거래 프로바이더용 외부 게이트웨이 주입.
    pub fn with_external_handlers(
        mut self,
        market: Arc<dyn MarketRequestHandler>,
        orders: Arc<dyn OrderRequestHandler>,
    ) -> Self {
        self.external_market = market;
        self.external_orders = orders;
        self
    }

    /// 레지스트리 키.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 현재 실행 상태.
    pub fn status(&self) -> StrategyStatus {
        self.status
    }

    /// 재발행 이벤트 구독.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ExecutorEvent> {
        self.events.subscribe()
    }

    /// 현재 통계 스냅샷.
    pub async fn statistics(&self) -> StrategyStatistics {
        self.stats.lock().await.clone()
    }

    /// 로컬 데이터 핸들러 핸들 (피드 완료 대기용).
    pub fn data_handler(&self) -> Arc<DataHandler> {
        self.data_handler.clone()
    }

    /// 전략 실행.
    ///
    /// 최초 호출에서만 전략 인스턴스를 생성하고 배선합니다. 이후
    /// 호출은 동일 인스턴스의 `on_start`를 다시 실행합니다.
    pub async fn execute(&mut self) -> Result<(), EngineError> {
        if self.strategy.is_none() {
            self.instantiate().await?;
        }

        let (strategy, context) = match (&self.strategy, &self.context) {
            (Some(strategy), Some(context)) => (strategy.clone(), context.clone()),
            _ => {
                return Err(EngineError::ChannelClosed(
                    "전략 인스턴스 구성 실패".to_string(),
                ))
            }
        };

        strategy.lock().await.on_start(&context).await?;
        self.status = StrategyStatus::Executing;
        self.events.publish(ExecutorEvent::StatusChanged {
            key: self.key.clone(),
            running: true,
        });
        info!(key = %self.key, "전략 실행 시작");
        Ok(())
    }

    /// 전략 중지. 인스턴스가 없으면 로그만 남기고 성공합니다.
    pub async fn stop(&mut self) -> Result<(), EngineError> {
        let Some(strategy) = self.strategy.clone() else {
            info!(key = %self.key, "전략 미초기화, 중지 생략");
            return Ok(());
        };
        let Some(context) = self.context.clone() else {
            info!(key = %self.key, "컨텍스트 없음, 중지 생략");
            return Ok(());
        };

        strategy.lock().await.on_stop(&context).await?;
        self.status = StrategyStatus::Executed;
        self.events.publish(ExecutorEvent::StatusChanged {
            key: self.key.clone(),
            running: false,
        });
        self.stats.lock().await.log_summary(&self.key);
        info!(key = %self.key, "전략 중지");
        Ok(())
    }

    /// 실행기 종료. 데이터 핸들러와 펌프를 내리고 인스턴스를 해제합니다.
    ///
    /// 인스턴스가 생성된 적 없어도 안전합니다.
    pub async fn close(&mut self) -> Result<(), EngineError> {
        self.data_handler.shutdown().await;
        // 주문 송신측 드롭 - 펌프가 잔여 이벤트 소진 후 종료됨
        self.context = None;
        self.order_tx.take();

        if let Some(pump) = self.pump.take() {
            if let Err(join_error) = pump.await {
                warn!(%join_error, "이벤트 펌프 join 실패");
            }
        }

        self.strategy = None;
        if self.status == StrategyStatus::Executing {
            self.status = StrategyStatus::Executed;
            self.events.publish(ExecutorEvent::StatusChanged {
                key: self.key.clone(),
                running: false,
            });
        }
        info!(key = %self.key, "실행기 종료");
        Ok(())
    }

    /// 전략 인스턴스 생성과 배선 (execute 최초 호출 전용).
    async fn instantiate(&mut self) -> Result<(), EngineError> {
        let mut strategy = (self.factory)();
        strategy.initialize(self.config.clone()).await?;

        let mut context =
            StrategyContext::new(self.external_market.clone(), self.external_orders.clone());

        // 센티널 프로바이더에만 로컬 리스너 설치
        if is_simulated(strategy.market_data_provider()) {
            context.override_market_requests(Arc::new(MarketRequestListener::new(
                self.data_handler.clone(),
            )));
            info!(key = %self.key, "시뮬레이션 데이터 플레인 배선");
        }
        if is_simulated(strategy.order_execution_provider()) {
            // 리스너에는 약한 송신측만 전달 - close()가 실행기의 송신측을
            // 드롭하면 펌프의 주문 채널이 닫혀야 합니다.
            let order_tx = self
                .order_tx
                .as_ref()
                .ok_or_else(|| EngineError::ChannelClosed("주문 채널 닫힘".to_string()))?
                .downgrade();
            context.override_order_requests(Arc::new(OrderRequestListener::new(
                self.exchange.clone(),
                order_tx,
            )));
            info!(key = %self.key, "시뮬레이션 주문 플레인 배선");
        }

        let context = Arc::new(context);
        let strategy = Arc::new(Mutex::new(strategy));

        self.persistence
            .persist(PersistedRecord::Strategy(StrategyRecord::started_now(
                &self.key,
            )))
            .await?;

        // on_start가 구독을 발행하기 전에 펌프가 돌고 있어야
        // 채널 적체로 인한 교착이 없습니다.
        self.spawn_pump(strategy.clone(), context.clone())?;

        self.strategy = Some(strategy);
        self.context = Some(context);
        Ok(())
    }

    /// 이벤트 펌프 시작.
    fn spawn_pump(
        &mut self,
        strategy: Arc<Mutex<Box<dyn Strategy>>>,
        context: Arc<StrategyContext>,
    ) -> Result<(), EngineError> {
        let mut market_rx = self
            .market_rx
            .take()
            .ok_or_else(|| EngineError::ChannelClosed("시장 데이터 채널 없음".to_string()))?;
        let mut order_rx = self
            .order_rx
            .take()
            .ok_or_else(|| EngineError::ChannelClosed("주문 이벤트 채널 없음".to_string()))?;

        let pump = EventPump {
            key: self.key.clone(),
            strategy,
            context,
            exchange: self.exchange.clone(),
            persistence: self.persistence.clone(),
            stats: self.stats.clone(),
            events: self.events.clone(),
        };

        self.pump = Some(tokio::spawn(async move {
            let mut market_open = true;
            let mut order_open = true;
            while market_open || order_open {
                tokio::select! {
                    event = market_rx.recv(), if market_open => match event {
                        Some(event) => pump.handle_market(event).await,
                        None => market_open = false,
                    },
                    event = order_rx.recv(), if order_open => match event {
                        Some(event) => pump.handle_order(event).await,
                        None => order_open = false,
                    },
                }
            }
            info!(key = %pump.key, "이벤트 펌프 종료");
        }));
        Ok(())
    }
}

/// 펌프 태스크가 소유하는 디스패치 상태.
struct EventPump {
    key: String,
    strategy: Arc<Mutex<Box<dyn Strategy>>>,
    context: Arc<StrategyContext>,
    exchange: Arc<Mutex<SimulatedExchange>>,
    persistence: Arc<dyn PersistenceSink>,
    stats: Arc<Mutex<StrategyStatistics>>,
    events: EventBus<ExecutorEvent>,
}

impl EventPump {
    /// 시장 데이터 이벤트 처리: 매칭 엔진 → 전략 콜백 → 파생 주문 이벤트.
    async fn handle_market(&self, event: MarketDataEvent) {
        let derived = match &event {
            MarketDataEvent::Tick(tick) => self.exchange.lock().await.on_tick(tick),
            MarketDataEvent::Bar(bar) => self.exchange.lock().await.on_bar(bar),
        };

        let callback = match &event {
            MarketDataEvent::Tick(tick) => {
                self.strategy.lock().await.on_tick(tick, &self.context).await
            }
            MarketDataEvent::Bar(bar) => {
                self.strategy.lock().await.on_bar(bar, &self.context).await
            }
        };
        if let Err(callback_error) = callback {
            error!(key = %self.key, %callback_error, ticker = event.ticker(), "시장 데이터 콜백 오류");
        }

        for order_event in derived {
            self.handle_order(order_event).await;
        }
    }

    /// 주문 이벤트 처리: 영속화 → 통계 → 전략 콜백 → 재발행.
    async fn handle_order(&self, event: OrderEvent) {
        match event {
            OrderEvent::Accepted(order) => {
                self.persist(PersistedRecord::Order(order.clone())).await;
                let result = self
                    .strategy
                    .lock()
                    .await
                    .on_order_accepted(&order, &self.context)
                    .await;
                if let Err(callback_error) = result {
                    error!(key = %self.key, %callback_error, order_id = %order.order_id, "주문 접수 콜백 오류");
                }
            }
            OrderEvent::Executed(execution) => {
                self.persist(PersistedRecord::Order(execution.order.clone()))
                    .await;
                self.persist(PersistedRecord::Fill(execution.fill.clone()))
                    .await;
                self.stats.lock().await.update(&execution.fill);

                let result = self
                    .strategy
                    .lock()
                    .await
                    .on_execution(&execution, &self.context)
                    .await;
                if let Err(callback_error) = result {
                    error!(key = %self.key, %callback_error, execution_id = %execution.fill.execution_id, "체결 콜백 오류");
                }
                // 전략에 전달된 체결만 재발행됨
                self.events.publish(ExecutorEvent::ExecutionReceived {
                    key: self.key.clone(),
                    execution,
                });
            }
            OrderEvent::Cancelled(order) => {
                self.persist(PersistedRecord::Order(order.clone())).await;
                let result = self
                    .strategy
                    .lock()
                    .await
                    .on_cancellation(&order, &self.context)
                    .await;
                if let Err(callback_error) = result {
                    error!(key = %self.key, %callback_error, order_id = %order.order_id, "취소 콜백 오류");
                }
            }
            OrderEvent::Rejected(rejection) => {
                warn!(key = %self.key, order_id = %rejection.order_id, reason = %rejection.reason, "주문 거부");
                let result = self
                    .strategy
                    .lock()
                    .await
                    .on_rejection(&rejection, &self.context)
                    .await;
                if let Err(callback_error) = result {
                    error!(key = %self.key, %callback_error, order_id = %rejection.order_id, "거부 콜백 오류");
                }
            }
        }
    }

    /// 영속화 오류는 펌프를 죽이지 않고 로그로만 남깁니다.
    async fn persist(&self, record: PersistedRecord) {
        if let Err(persist_error) = self.persistence.persist(record).await {
            error!(key = %self.key, %persist_error, "레코드 영속화 실패");
        }
    }
}
