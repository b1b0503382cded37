//! 시장 데이터 레코드.
//!
//! 데이터 플레인에서 흐르는 `Tick`/`Bar` 레코드와
//! 전략이 발행하는 구독 요청 타입을 정의합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// 시세 레코드
// =============================================================================

/// 호가/체결 틱.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    /// 종목 심볼
    pub ticker: String,
    /// 매수 호가
    pub bid: Decimal,
    /// 매수 호가 잔량
    pub bid_size: Decimal,
    /// 매도 호가
    pub ask: Decimal,
    /// 매도 호가 잔량
    pub ask_size: Decimal,
    /// 최근 체결가
    pub last: Decimal,
    /// 최근 체결량
    pub last_size: Decimal,
    /// 데이터 프로바이더 이름
    pub provider: String,
    /// 틱 시각
    pub timestamp: DateTime<Utc>,
}

impl Tick {
    /// 체결가 중심의 간단한 틱 생성 (호가는 체결가로 대체).
    pub fn from_last(
        ticker: impl Into<String>,
        last: Decimal,
        last_size: Decimal,
        provider: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            bid: last,
            bid_size: Decimal::ZERO,
            ask: last,
            ask_size: Decimal::ZERO,
            last,
            last_size,
            provider: provider.into(),
            timestamp,
        }
    }
}

/// OHLCV 바.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    /// 종목 심볼
    pub ticker: String,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: Decimal,
    /// 바 간격 (초)
    pub interval_secs: u64,
    /// 데이터 프로바이더 이름
    pub provider: String,
    /// 바 종료 시각
    pub timestamp: DateTime<Utc>,
}

impl Bar {
    /// 새 바 생성.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: impl Into<String>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        interval_secs: u64,
        provider: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            open,
            high,
            low,
            close,
            volume,
            interval_secs,
            provider: provider.into(),
            timestamp,
        }
    }
}

// =============================================================================
// 구독 요청
// =============================================================================

/// 틱 구독 요청.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSubscription {
    /// 구독 ID (요청자가 부여)
    pub id: String,
    /// 종목 심볼
    pub ticker: String,
}

impl TickSubscription {
    /// 새 틱 구독 요청 생성.
    pub fn new(id: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ticker: ticker.into(),
        }
    }
}

/// 바 구독 요청.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarSubscription {
    /// 구독 ID (요청자가 부여)
    pub id: String,
    /// 종목 심볼
    pub ticker: String,
    /// 바 간격 (초)
    pub interval_secs: u64,
}

impl BarSubscription {
    /// 새 바 구독 요청 생성.
    pub fn new(id: impl Into<String>, ticker: impl Into<String>, interval_secs: u64) -> Self {
        Self {
            id: id.into(),
            ticker: ticker.into(),
            interval_secs,
        }
    }
}
