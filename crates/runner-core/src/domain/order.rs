//! 주문 도메인 레코드.
//!
//! 주문 플레인에서 흐르는 레코드들을 정의합니다:
//! `Order`(주문), `Fill`(개별 체결), `Execution`(주문+체결 쌍),
//! `Rejection`(거부 통지). 모든 가격/수량은 `Decimal`을 사용합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// 기본 열거형
// =============================================================================

/// 주문/체결 방향.
///
/// `Cover`는 기존 오픈 포지션을 닫는 전용 주문 방향입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
    /// 공매도
    Short,
    /// 포지션 청산 (커버)
    Cover,
}

impl Side {
    /// 이 방향이 포지션을 여는 방향인지 여부.
    pub fn is_opening(&self) -> bool {
        matches!(self, Side::Buy | Side::Short)
    }
}

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// 시장가
    Market,
    /// 지정가
    Limit,
}

/// 주문 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// 접수 대기
    New,
    /// 접수됨 (미체결)
    Open,
    /// 부분 체결
    PartiallyFilled,
    /// 전량 체결
    Filled,
    /// 취소됨
    Cancelled,
    /// 거부됨
    Rejected,
}

// =============================================================================
// 주문 레코드
// =============================================================================

/// 주문 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 주문 ID
    pub order_id: Uuid,
    /// 종목 심볼
    pub ticker: String,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 주문 수량
    pub quantity: Decimal,
    /// 지정가 (시장가 주문이면 None)
    pub limit_price: Option<Decimal>,
    /// 주문 상태
    pub status: OrderStatus,
    /// 주문 실행 프로바이더 이름
    pub provider: String,
    /// 주문 생성 시각
    pub timestamp: DateTime<Utc>,
}

impl Order {
    /// 새 시장가 주문 생성.
    pub fn market(
        ticker: impl Into<String>,
        side: Side,
        quantity: Decimal,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            ticker: ticker.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            limit_price: None,
            status: OrderStatus::New,
            provider: provider.into(),
            timestamp: Utc::now(),
        }
    }

    /// 새 지정가 주문 생성.
    pub fn limit(
        ticker: impl Into<String>,
        side: Side,
        quantity: Decimal,
        limit_price: Decimal,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            ticker: ticker.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            limit_price: Some(limit_price),
            status: OrderStatus::New,
            provider: provider.into(),
            timestamp: Utc::now(),
        }
    }

    /// 상태를 변경한 사본 반환.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }
}

// =============================================================================
// 체결 레코드
// =============================================================================

/// 개별 체결 정보.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    /// 체결 ID
    pub execution_id: Uuid,
    /// 체결된 주문 ID
    pub order_id: Uuid,
    /// 종목 심볼
    pub ticker: String,
    /// 체결 방향
    pub side: Side,
    /// 체결 수량
    pub quantity: Decimal,
    /// 체결 가격
    pub price: Decimal,
    /// 잔여 수량 (0이면 전량 체결)
    pub leaves_quantity: Decimal,
    /// 체결 시각
    pub timestamp: DateTime<Utc>,
}

impl Fill {
    /// 새 체결 생성.
    pub fn new(
        order: &Order,
        quantity: Decimal,
        price: Decimal,
        leaves_quantity: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            order_id: order.order_id,
            ticker: order.ticker.clone(),
            side: order.side,
            quantity,
            price,
            leaves_quantity,
            timestamp,
        }
    }

    /// 전량 체결 여부.
    pub fn is_complete(&self) -> bool {
        self.leaves_quantity.is_zero()
    }
}

/// 주문+체결 쌍.
///
/// 전략 콜백과 UI 레이어에 재발행되는 체결 단위입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    /// 체결 시점의 주문 스냅샷
    pub order: Order,
    /// 체결 정보
    pub fill: Fill,
}

impl Execution {
    /// 새 체결 쌍 생성.
    pub fn new(order: Order, fill: Fill) -> Self {
        Self { order, fill }
    }
}

// =============================================================================
// 거부 레코드
// =============================================================================

/// 주문 거부 통지.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rejection {
    /// 거부된 주문 ID
    pub order_id: Uuid,
    /// 종목 심볼
    pub ticker: String,
    /// 거부 사유
    pub reason: String,
    /// 거부 시각
    pub timestamp: DateTime<Utc>,
}

impl Rejection {
    /// 주문에 대한 거부 통지 생성.
    pub fn for_order(order: &Order, reason: impl Into<String>) -> Self {
        Self {
            order_id: order.order_id,
            ticker: order.ticker.clone(),
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}
