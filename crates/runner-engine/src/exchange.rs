//! 시뮬레이션 거래소 매칭 엔진.
//!
//! 백테스팅에서 주문 체결을 로컬로 수행합니다:
//! - 시장가 주문: 현재 호가(매수=ask, 매도=bid)로 즉시 체결, 시세가
//!   아직 없으면 큐에 대기 후 첫 시세에 체결
//! - 지정가 주문: 즉시 체결 가능하면 체결, 아니면 큐 등록 후
//!   틱/바가 지정가를 교차할 때 체결
//! - 취소: 큐에서 제거, 알 수 없는 주문 ID는 거부 통지
//!
//! 엔진은 동기 상태 기계이며 이벤트 목록을 반환합니다. 잠금과 채널
//! 배선은 호출자(리스너/펌프) 책임입니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use runner_core::{Bar, Execution, Fill, Order, OrderStatus, OrderType, Rejection, Side, Tick};
use tracing::debug;
use uuid::Uuid;

// =============================================================================
// 주문 이벤트
// =============================================================================

/// 매칭 엔진이 발생시키는 주문 이벤트.
#[derive(Debug, Clone)]
pub enum OrderEvent {
    /// 주문 접수됨
    Accepted(Order),
    /// 체결 발생
    Executed(Execution),
    /// 주문 취소됨
    Cancelled(Order),
    /// 주문 거부됨
    Rejected(Rejection),
}

// =============================================================================
// 매칭 엔진
// =============================================================================

/// 시뮬레이션 거래소.
#[derive(Default)]
pub struct SimulatedExchange {
    /// 미체결 주문 (시장가 대기 + 지정가 큐)
    pending: HashMap<Uuid, Order>,
    /// 종목별 최근 틱 호가 (bid, ask)
    quotes: HashMap<String, (Decimal, Decimal)>,
}

impl SimulatedExchange {
    /// 새 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 미체결 주문 수.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// 시장가 주문 제출.
    pub fn submit_market(&mut self, mut order: Order) -> Vec<OrderEvent> {
        if let Some(rejection) = Self::validate(&order) {
            return vec![OrderEvent::Rejected(rejection)];
        }

        order.status = OrderStatus::Open;
        let mut events = vec![OrderEvent::Accepted(order.clone())];

        match self.quotes.get(&order.ticker).copied() {
            Some((bid, ask)) => {
                let price = Self::market_price(order.side, bid, ask);
                events.push(Self::fill(order, price, Utc::now()));
            }
            None => {
                // 시세 도착 전 - 첫 틱/바에서 체결
                debug!(order_id = %order.order_id, ticker = %order.ticker, "시세 대기, 주문 큐 등록");
                self.pending.insert(order.order_id, order);
            }
        }

        events
    }

    /// 지정가 주문 제출.
    pub fn submit_limit(&mut self, mut order: Order) -> Vec<OrderEvent> {
        if let Some(rejection) = Self::validate(&order) {
            return vec![OrderEvent::Rejected(rejection)];
        }
        let limit = match order.limit_price {
            Some(limit) if limit > Decimal::ZERO => limit,
            _ => {
                return vec![OrderEvent::Rejected(Rejection::for_order(
                    &order,
                    "지정가 없음 또는 0 이하",
                ))]
            }
        };

        order.status = OrderStatus::Open;
        let mut events = vec![OrderEvent::Accepted(order.clone())];

        if let Some((bid, ask)) = self.quotes.get(&order.ticker).copied() {
            if let Some(price) = Self::limit_cross(order.side, limit, bid, ask) {
                events.push(Self::fill(order, price, Utc::now()));
                return events;
            }
        }

        self.pending.insert(order.order_id, order);
        events
    }

    /// 주문 취소.
    pub fn cancel(&mut self, order_id: Uuid) -> Vec<OrderEvent> {
        match self.pending.remove(&order_id) {
            Some(order) => {
                debug!(order_id = %order_id, "주문 취소");
                vec![OrderEvent::Cancelled(order.with_status(OrderStatus::Cancelled))]
            }
            None => vec![OrderEvent::Rejected(Rejection {
                order_id,
                ticker: String::new(),
                reason: "미체결 주문 아님".to_string(),
                timestamp: Utc::now(),
            })],
        }
    }

    /// 새 틱 반영. 트리거된 체결 이벤트를 반환합니다.
    pub fn on_tick(&mut self, tick: &Tick) -> Vec<OrderEvent> {
        self.quotes
            .insert(tick.ticker.clone(), (tick.bid, tick.ask));
        self.match_pending(&tick.ticker, tick.bid, tick.ask, tick.timestamp)
    }

    /// 새 바 반영. 바 범위(low..high)로 지정가 교차를 확인합니다.
    pub fn on_bar(&mut self, bar: &Bar) -> Vec<OrderEvent> {
        self.quotes.insert(bar.ticker.clone(), (bar.close, bar.close));

        let mut events = Vec::new();
        let triggered: Vec<Uuid> = self
            .pending
            .values()
            .filter(|order| order.ticker == bar.ticker)
            .filter(|order| match order.order_type {
                OrderType::Market => true,
                OrderType::Limit => {
                    let limit = order.limit_price.unwrap_or(Decimal::ZERO);
                    match order.side {
                        // 매수: 바 저가가 지정가 이하로 내려오면 체결
                        Side::Buy | Side::Cover => bar.low <= limit,
                        // 매도: 바 고가가 지정가 이상으로 올라가면 체결
                        Side::Sell | Side::Short => bar.high >= limit,
                    }
                }
            })
            .map(|order| order.order_id)
            .collect();

        for order_id in triggered {
            if let Some(order) = self.pending.remove(&order_id) {
                let price = match order.order_type {
                    OrderType::Market => bar.close,
                    // 지정가 주문은 지정가에 체결
                    OrderType::Limit => order.limit_price.unwrap_or(bar.close),
                };
                events.push(Self::fill(order, price, bar.timestamp));
            }
        }
        events
    }

    /// 수량 검증. 문제가 있으면 거부 통지를 반환합니다.
    fn validate(order: &Order) -> Option<Rejection> {
        if order.quantity <= Decimal::ZERO {
            return Some(Rejection::for_order(order, "수량이 0 이하"));
        }
        None
    }

    /// 방향별 시장가 체결 가격.
    fn market_price(side: Side, bid: Decimal, ask: Decimal) -> Decimal {
        match side {
            Side::Buy | Side::Cover => ask,
            Side::Sell | Side::Short => bid,
        }
    }

    /// 지정가 교차 확인. 체결 가능하면 체결 가격을 반환합니다.
    fn limit_cross(side: Side, limit: Decimal, bid: Decimal, ask: Decimal) -> Option<Decimal> {
        match side {
            Side::Buy | Side::Cover if ask <= limit => Some(ask),
            Side::Sell | Side::Short if bid >= limit => Some(bid),
            _ => None,
        }
    }

    /// 호가 갱신 후 미체결 주문 매칭.
    fn match_pending(
        &mut self,
        ticker: &str,
        bid: Decimal,
        ask: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Vec<OrderEvent> {
        let triggered: Vec<(Uuid, Decimal)> = self
            .pending
            .values()
            .filter(|order| order.ticker == ticker)
            .filter_map(|order| match order.order_type {
                OrderType::Market => Some((order.order_id, Self::market_price(order.side, bid, ask))),
                OrderType::Limit => {
                    let limit = order.limit_price.unwrap_or(Decimal::ZERO);
                    Self::limit_cross(order.side, limit, bid, ask)
                        .map(|price| (order.order_id, price))
                }
            })
            .collect();

        triggered
            .into_iter()
            .filter_map(|(order_id, price)| {
                self.pending
                    .remove(&order_id)
                    .map(|order| Self::fill(order, price, timestamp))
            })
            .collect()
    }

    /// 전량 체결 이벤트 생성.
    fn fill(order: Order, price: Decimal, timestamp: DateTime<Utc>) -> OrderEvent {
        let filled = order.clone().with_status(OrderStatus::Filled);
        let fill = Fill::new(&filled, filled.quantity, price, Decimal::ZERO, timestamp);
        debug!(order_id = %filled.order_id, ticker = %filled.ticker, price = %price, "체결");
        OrderEvent::Executed(Execution::new(filled, fill))
    }
}
