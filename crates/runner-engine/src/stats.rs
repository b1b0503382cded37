//! 전략 실행 통계.
//!
//! 체결 스트림에서 포지션/손익을 집계합니다. 평균 단가 기반의
//! 실현 손익만 추적하며, 미실현 평가는 대시보드 계층의 몫입니다.

use rust_decimal::prelude::Signed;
use rust_decimal::Decimal;
use runner_core::{Fill, Side};
use tracing::info;

/// 체결 기반 실행 통계.
#[derive(Debug, Default, Clone)]
pub struct StrategyStatistics {
    /// 체결 건수
    pub fill_count: u64,
    /// 매수측 체결 수량 합계 (Buy + Cover)
    pub bought_quantity: Decimal,
    /// 매도측 체결 수량 합계 (Sell + Short)
    pub sold_quantity: Decimal,
    /// 현재 순포지션 (양수 = 롱)
    pub position: Decimal,
    /// 보유 포지션 평균 단가
    pub average_entry: Decimal,
    /// 실현 손익
    pub realized_pnl: Decimal,
}

impl StrategyStatistics {
    /// 빈 통계 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 체결 하나 반영.
    pub fn update(&mut self, fill: &Fill) {
        self.fill_count += 1;

        let signed = match fill.side {
            Side::Buy | Side::Cover => {
                self.bought_quantity += fill.quantity;
                fill.quantity
            }
            Side::Sell | Side::Short => {
                self.sold_quantity += fill.quantity;
                -fill.quantity
            }
        };

        let previous = self.position;
        let next = previous + signed;

        if previous.is_zero() || previous.signum() == signed.signum() {
            // 신규 진입 또는 증량: 평균 단가 갱신
            let total_cost = self.average_entry * previous.abs() + fill.price * fill.quantity;
            if !next.is_zero() {
                self.average_entry = total_cost / next.abs();
            }
        } else {
            // 청산 (일부 또는 전부): 청산분만큼 손익 실현
            let closed = fill.quantity.min(previous.abs());
            let direction = previous.signum();
            self.realized_pnl += (fill.price - self.average_entry) * closed * direction;

            if next.is_zero() {
                self.average_entry = Decimal::ZERO;
            } else if next.signum() != previous.signum() {
                // 반전: 초과분이 새 포지션의 진입가
                self.average_entry = fill.price;
            }
        }

        self.position = next;
    }

    /// 총 체결 수량.
    pub fn traded_quantity(&self) -> Decimal {
        self.bought_quantity + self.sold_quantity
    }

    /// 요약을 구조화 로그로 출력.
    pub fn log_summary(&self, strategy: &str) {
        info!(
            strategy = %strategy,
            fills = self.fill_count,
            bought = %self.bought_quantity,
            sold = %self.sold_quantity,
            position = %self.position,
            realized_pnl = %self.realized_pnl,
            "전략 실행 통계"
        );
    }
}
