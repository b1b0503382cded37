//! 대시보드 상태 서비스.
//!
//! 틱에서 갱신되는 종목 시세 행, 실행기 이벤트에서 갱신되는 전략 상태
//! 행, 그리고 프로바이더 컬렉션의 읽기 전용 뷰를 제공합니다. 표시
//! 레이어(TUI/웹)는 이 서비스의 스냅샷만 읽습니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use runner_core::{Provider, ProviderKind, Tick};
use runner_engine::ExecutorEvent;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::DashboardError;
use crate::providers::ProvidersService;

/// 종목 시세 행.
#[derive(Debug, Clone)]
pub struct InstrumentRow {
    /// 종목 심볼
    pub ticker: String,
    /// 매수 호가
    pub bid: Decimal,
    /// 매도 호가
    pub ask: Decimal,
    /// 최근 체결가
    pub last: Decimal,
    /// 마지막 갱신 시각
    pub updated_at: DateTime<Utc>,
}

/// 전략 상태 행.
#[derive(Debug, Clone, Default)]
pub struct StrategyRow {
    /// 레지스트리 키
    pub key: String,
    /// 실행 중 여부
    pub running: bool,
    /// 수신한 체결 수
    pub executions: u64,
    /// 마지막 체결가
    pub last_fill_price: Option<Decimal>,
}

/// 대시보드 서비스.
pub struct DashboardService {
    providers: Arc<RwLock<ProvidersService>>,
    instruments: BTreeMap<String, InstrumentRow>,
    strategies: BTreeMap<String, StrategyRow>,
    selected_instrument: Option<String>,
}

impl DashboardService {
    /// 프로바이더 서비스를 공유하는 새 대시보드 생성.
    pub fn new(providers: Arc<RwLock<ProvidersService>>) -> Self {
        Self {
            providers,
            instruments: BTreeMap::new(),
            strategies: BTreeMap::new(),
            selected_instrument: None,
        }
    }

    /// 틱으로 종목 행 갱신 (없으면 생성).
    pub fn on_tick(&mut self, tick: &Tick) {
        let row = self
            .instruments
            .entry(tick.ticker.clone())
            .or_insert_with(|| InstrumentRow {
                ticker: tick.ticker.clone(),
                bid: tick.bid,
                ask: tick.ask,
                last: tick.last,
                updated_at: tick.timestamp,
            });
        row.bid = tick.bid;
        row.ask = tick.ask;
        row.last = tick.last;
        row.updated_at = tick.timestamp;
        debug!(ticker = %tick.ticker, last = %tick.last, "종목 행 갱신");
    }

    /// 실행기 이벤트로 전략 행 갱신.
    pub fn on_executor_event(&mut self, event: &ExecutorEvent) {
        match event {
            ExecutorEvent::StatusChanged { key, running } => {
                let row = self.strategies.entry(key.clone()).or_insert_with(|| {
                    StrategyRow {
                        key: key.clone(),
                        ..StrategyRow::default()
                    }
                });
                row.running = *running;
            }
            ExecutorEvent::ExecutionReceived { key, execution } => {
                let row = self.strategies.entry(key.clone()).or_insert_with(|| {
                    StrategyRow {
                        key: key.clone(),
                        ..StrategyRow::default()
                    }
                });
                row.executions += 1;
                row.last_fill_price = Some(execution.fill.price);
            }
        }
    }

    /// 종목 행 스냅샷 (티커 순).
    pub fn instruments(&self) -> Vec<InstrumentRow> {
        self.instruments.values().cloned().collect()
    }

    /// 전략 행 스냅샷 (키 순).
    pub fn strategies(&self) -> Vec<StrategyRow> {
        self.strategies.values().cloned().collect()
    }

    /// 종목 선택.
    pub fn select_instrument(&mut self, ticker: &str) -> Result<(), DashboardError> {
        if !self.instruments.contains_key(ticker) {
            return Err(DashboardError::UnknownInstrument {
                ticker: ticker.to_string(),
            });
        }
        self.selected_instrument = Some(ticker.to_string());
        Ok(())
    }

    /// 현재 선택된 종목.
    pub fn selected_instrument(&self) -> Option<&str> {
        self.selected_instrument.as_deref()
    }

    /// 종목 선택 해제.
    pub fn clear_instrument_selection(&mut self) {
        self.selected_instrument = None;
    }

    /// 프로바이더 컬렉션의 읽기 전용 뷰.
    pub async fn provider_view(&self, kind: ProviderKind) -> Vec<Provider> {
        self.providers.read().await.providers(kind).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use runner_core::{Fill, Order, Side, SIMULATED_EXCHANGE};

    use super::*;

    fn service() -> DashboardService {
        DashboardService::new(Arc::new(RwLock::new(ProvidersService::new())))
    }

    fn tick(ticker: &str, last: Decimal) -> Tick {
        Tick::from_last(ticker, last, dec!(10), SIMULATED_EXCHANGE, Utc::now())
    }

    #[test]
    fn ticks_create_and_update_rows() {
        let mut dashboard = service();
        dashboard.on_tick(&tick("005930", dec!(70000)));
        dashboard.on_tick(&tick("005930", dec!(70100)));
        dashboard.on_tick(&tick("000660", dec!(120000)));

        let rows = dashboard.instruments();
        assert_eq!(rows.len(), 2);
        // BTreeMap이므로 티커 순
        assert_eq!(rows[0].ticker, "000660");
        assert_eq!(rows[1].last, dec!(70100));
    }

    #[test]
    fn executor_events_drive_strategy_rows() {
        let mut dashboard = service();
        dashboard.on_executor_event(&ExecutorEvent::StatusChanged {
            key: "sma-crossover".to_string(),
            running: true,
        });

        let order = Order::market("005930", Side::Buy, dec!(2), SIMULATED_EXCHANGE);
        let fill = Fill::new(&order, dec!(2), dec!(70000), dec!(0), Utc::now());
        dashboard.on_executor_event(&ExecutorEvent::ExecutionReceived {
            key: "sma-crossover".to_string(),
            execution: runner_core::Execution::new(order, fill),
        });

        let rows = dashboard.strategies();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].running);
        assert_eq!(rows[0].executions, 1);
        assert_eq!(rows[0].last_fill_price, Some(dec!(70000)));
    }

    #[test]
    fn execution_updates_only_its_own_strategy_row() {
        let mut dashboard = service();
        for key in ["alpha", "beta"] {
            dashboard.on_executor_event(&ExecutorEvent::StatusChanged {
                key: key.to_string(),
                running: true,
            });
        }

        let order = Order::market("005930", Side::Buy, dec!(1), SIMULATED_EXCHANGE);
        let fill = Fill::new(&order, dec!(1), dec!(70000), dec!(0), Utc::now());
        dashboard.on_executor_event(&ExecutorEvent::ExecutionReceived {
            key: "beta".to_string(),
            execution: runner_core::Execution::new(order, fill),
        });

        let rows = dashboard.strategies();
        assert_eq!(rows[0].key, "alpha");
        assert_eq!(rows[0].executions, 0);
        assert_eq!(rows[0].last_fill_price, None);
        assert_eq!(rows[1].key, "beta");
        assert_eq!(rows[1].executions, 1);
        assert_eq!(rows[1].last_fill_price, Some(dec!(70000)));
    }

    #[test]
    fn instrument_selection_requires_known_ticker() {
        let mut dashboard = service();
        assert!(dashboard.select_instrument("005930").is_err());

        dashboard.on_tick(&tick("005930", dec!(70000)));
        dashboard.select_instrument("005930").unwrap();
        assert_eq!(dashboard.selected_instrument(), Some("005930"));

        dashboard.clear_instrument_selection();
        assert!(dashboard.selected_instrument().is_none());
    }
}
