//! 시뮬레이션 데이터 핸들러.
//!
//! 구독 요청을 받아 기록된 시장 데이터를 이벤트 채널로 펌핑합니다.
//! 구독 목록은 리스너 측과 공유되며(원본의 구독 리스트 공유 구조),
//! `shutdown()`은 CancellationToken으로 모든 펌프를 중단시키고
//! 이벤트 채널을 닫습니다.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use runner_core::{Bar, BarSubscription, Tick, TickSubscription, SIMULATED_EXCHANGE};
use serde::Deserialize;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// 데이터 플레인 이벤트.
#[derive(Debug, Clone)]
pub enum MarketDataEvent {
    /// 틱 도착
    Tick(Tick),
    /// 바 도착
    Bar(Bar),
}

impl MarketDataEvent {
    /// 이벤트의 종목 심볼.
    pub fn ticker(&self) -> &str {
        match self {
            MarketDataEvent::Tick(tick) => &tick.ticker,
            MarketDataEvent::Bar(bar) => &bar.ticker,
        }
    }
}

// =============================================================================
// 히스토리 데이터 소스
// =============================================================================

/// 기록된 시장 데이터 소스.
#[async_trait]
pub trait HistoricalDataSource: Send + Sync {
    /// 종목의 전체 틱 시퀀스.
    async fn ticks(&self, ticker: &str) -> Result<Vec<Tick>, EngineError>;

    /// 종목/간격의 전체 바 시퀀스.
    async fn bars(&self, ticker: &str, interval_secs: u64) -> Result<Vec<Bar>, EngineError>;
}

/// 인메모리 데이터 소스 (테스트/데모용).
#[derive(Default)]
pub struct RecordedDataSource {
    ticks: HashMap<String, Vec<Tick>>,
    bars: HashMap<String, Vec<Bar>>,
}

impl RecordedDataSource {
    /// 빈 소스 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목의 틱 시퀀스 등록.
    pub fn with_ticks(mut self, ticker: impl Into<String>, ticks: Vec<Tick>) -> Self {
        self.ticks.insert(ticker.into(), ticks);
        self
    }

    /// 종목의 바 시퀀스 등록. 간격은 바 자체의 `interval_secs`를 따릅니다.
    pub fn with_bars(mut self, ticker: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.bars.insert(ticker.into(), bars);
        self
    }

    /// 등록된 종목 목록.
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.ticks.keys().chain(self.bars.keys()).cloned().collect();
        tickers.sort();
        tickers.dedup();
        tickers
    }
}

#[async_trait]
impl HistoricalDataSource for RecordedDataSource {
    async fn ticks(&self, ticker: &str) -> Result<Vec<Tick>, EngineError> {
        self.ticks
            .get(ticker)
            .cloned()
            .ok_or_else(|| EngineError::NoData {
                ticker: ticker.to_string(),
            })
    }

    async fn bars(&self, ticker: &str, interval_secs: u64) -> Result<Vec<Bar>, EngineError> {
        let bars = self.bars.get(ticker).ok_or_else(|| EngineError::NoData {
            ticker: ticker.to_string(),
        })?;
        Ok(bars
            .iter()
            .filter(|bar| bar.interval_secs == interval_secs)
            .cloned()
            .collect())
    }
}

/// CSV 바 레코드 행.
#[derive(Debug, Deserialize)]
struct CsvBarRow {
    /// 유닉스 타임스탬프 (초)
    timestamp: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

/// CSV 파일 기반 데이터 소스.
///
/// `<디렉터리>/<종목>.csv`에서 바를 읽습니다. 헤더는
/// `timestamp,open,high,low,close,volume` 입니다. 틱은 바 종가로
/// 합성됩니다.
pub struct CsvDataSource {
    /// CSV 파일이 위치한 디렉터리
    dir: PathBuf,
    /// 파일이 기록된 바 간격 (초)
    interval_secs: u64,
}

impl CsvDataSource {
    /// 디렉터리와 기록 간격으로 새 소스 생성.
    pub fn new(dir: impl Into<PathBuf>, interval_secs: u64) -> Self {
        Self {
            dir: dir.into(),
            interval_secs,
        }
    }

    /// 종목 CSV 파일에서 바 목록 로드.
    fn load_bars(&self, ticker: &str) -> Result<Vec<Bar>, EngineError> {
        let path = self.dir.join(format!("{}.csv", ticker));
        if !path.exists() {
            return Err(EngineError::NoData {
                ticker: ticker.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut bars = Vec::new();
        for row in reader.deserialize() {
            let row: CsvBarRow = row?;
            let timestamp = Utc
                .timestamp_opt(row.timestamp, 0)
                .single()
                .unwrap_or_else(Utc::now);
            bars.push(Bar::new(
                ticker,
                row.open,
                row.high,
                row.low,
                row.close,
                row.volume,
                self.interval_secs,
                SIMULATED_EXCHANGE,
                timestamp,
            ));
        }
        Ok(bars)
    }
}

#[async_trait]
impl HistoricalDataSource for CsvDataSource {
    async fn ticks(&self, ticker: &str) -> Result<Vec<Tick>, EngineError> {
        // 바 종가 기반 틱 합성
        let bars = self.load_bars(ticker)?;
        Ok(bars
            .into_iter()
            .map(|bar| {
                Tick::from_last(
                    bar.ticker.clone(),
                    bar.close,
                    bar.volume,
                    bar.provider.clone(),
                    bar.timestamp,
                )
            })
            .collect())
    }

    async fn bars(&self, ticker: &str, _interval_secs: u64) -> Result<Vec<Bar>, EngineError> {
        self.load_bars(ticker)
    }
}

// =============================================================================
// 데이터 핸들러
// =============================================================================

/// 구독 기반 데이터 펌프.
pub struct DataHandler {
    /// 데이터 소스
    source: Arc<dyn HistoricalDataSource>,
    /// 이벤트 송신측 (shutdown 시 드롭되어 채널을 닫음)
    event_tx: Mutex<Option<mpsc::Sender<MarketDataEvent>>>,
    /// 활성 틱 구독 (리스너 측과 공유)
    tick_subscriptions: Arc<RwLock<HashMap<String, TickSubscription>>>,
    /// 활성 바 구독 (리스너 측과 공유)
    bar_subscriptions: Arc<RwLock<HashMap<String, BarSubscription>>>,
    /// 구독 ID별 펌프 취소 토큰
    pump_tokens: Mutex<HashMap<String, CancellationToken>>,
    /// 실행 중인 펌프 핸들
    pump_handles: Mutex<Vec<JoinHandle<()>>>,
    /// 전체 종료 토큰
    shutdown_token: CancellationToken,
}

impl DataHandler {
    /// 새 데이터 핸들러와 이벤트 수신측 생성.
    pub fn new(
        source: Arc<dyn HistoricalDataSource>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<MarketDataEvent>) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let handler = Self {
            source,
            event_tx: Mutex::new(Some(event_tx)),
            tick_subscriptions: Arc::new(RwLock::new(HashMap::new())),
            bar_subscriptions: Arc::new(RwLock::new(HashMap::new())),
            pump_tokens: Mutex::new(HashMap::new()),
            pump_handles: Mutex::new(Vec::new()),
            shutdown_token: CancellationToken::new(),
        };
        (handler, event_rx)
    }

    /// 활성 틱 구독 목록 핸들.
    pub fn tick_subscriptions(&self) -> Arc<RwLock<HashMap<String, TickSubscription>>> {
        self.tick_subscriptions.clone()
    }

    /// 활성 바 구독 목록 핸들.
    pub fn bar_subscriptions(&self) -> Arc<RwLock<HashMap<String, BarSubscription>>> {
        self.bar_subscriptions.clone()
    }

    /// 틱 구독. 기록된 틱 전체를 펌핑하는 태스크를 시작합니다.
    pub async fn subscribe_ticks(&self, subscription: TickSubscription) -> Result<(), EngineError> {
        let ticks = self.source.ticks(&subscription.ticker).await?;
        info!(id = %subscription.id, ticker = %subscription.ticker, count = ticks.len(), "틱 구독 시작");

        self.tick_subscriptions
            .write()
            .await
            .insert(subscription.id.clone(), subscription.clone());

        let events = ticks.into_iter().map(MarketDataEvent::Tick).collect();
        self.spawn_pump(subscription.id, events).await
    }

    /// 틱 구독 해제.
    pub async fn unsubscribe_ticks(&self, subscription_id: &str) -> Result<(), EngineError> {
        self.tick_subscriptions.write().await.remove(subscription_id);
        self.cancel_pump(subscription_id).await;
        Ok(())
    }

    /// 바 구독. 기록된 바 전체를 펌핑하는 태스크를 시작합니다.
    pub async fn subscribe_bars(&self, subscription: BarSubscription) -> Result<(), EngineError> {
        let bars = self
            .source
            .bars(&subscription.ticker, subscription.interval_secs)
            .await?;
        info!(id = %subscription.id, ticker = %subscription.ticker, count = bars.len(), "바 구독 시작");

        self.bar_subscriptions
            .write()
            .await
            .insert(subscription.id.clone(), subscription.clone());

        let events = bars.into_iter().map(MarketDataEvent::Bar).collect();
        self.spawn_pump(subscription.id, events).await
    }

    /// 바 구독 해제.
    pub async fn unsubscribe_bars(&self, subscription_id: &str) -> Result<(), EngineError> {
        self.bar_subscriptions.write().await.remove(subscription_id);
        self.cancel_pump(subscription_id).await;
        Ok(())
    }

    /// 현재 실행 중인 펌프가 모두 피드를 소진할 때까지 대기.
    pub async fn join_feeds(&self) {
        let handles: Vec<JoinHandle<()>> = self.pump_handles.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(error) = handle.await {
                warn!(%error, "펌프 태스크 join 실패");
            }
        }
    }

    /// 모든 펌프 중단 및 이벤트 채널 닫기.
    pub async fn shutdown(&self) {
        info!("데이터 핸들러 종료");
        self.shutdown_token.cancel();
        self.pump_tokens.lock().await.clear();
        self.tick_subscriptions.write().await.clear();
        self.bar_subscriptions.write().await.clear();
        // 송신측 드롭 - 수신측 recv()가 None을 반환하게 됨
        self.event_tx.lock().await.take();
    }

    /// 이벤트 시퀀스를 펌핑하는 태스크 시작.
    async fn spawn_pump(
        &self,
        subscription_id: String,
        events: Vec<MarketDataEvent>,
    ) -> Result<(), EngineError> {
        let tx = self
            .event_tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| EngineError::ChannelClosed("데이터 핸들러 종료됨".to_string()))?;

        let token = self.shutdown_token.child_token();
        // 같은 ID로 재구독하면 이전 펌프를 취소하고 교체
        if let Some(previous) = self
            .pump_tokens
            .lock()
            .await
            .insert(subscription_id.clone(), token.clone())
        {
            debug!(id = %subscription_id, "재구독, 기존 펌프 취소");
            previous.cancel();
        }

        let handle = tokio::spawn(async move {
            for event in events {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!(id = %subscription_id, "펌프 취소");
                        return;
                    }
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            debug!(id = %subscription_id, "이벤트 수신측 닫힘, 펌프 중단");
                            return;
                        }
                    }
                }
            }
            debug!(id = %subscription_id, "피드 소진");
        });
        self.pump_handles.lock().await.push(handle);
        Ok(())
    }

    /// 구독 ID의 펌프 취소.
    async fn cancel_pump(&self, subscription_id: &str) {
        if let Some(token) = self.pump_tokens.lock().await.remove(subscription_id) {
            token.cancel();
        }
    }
}
