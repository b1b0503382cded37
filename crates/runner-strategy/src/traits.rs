//! Strategy trait 정의.
//!
//! 사용자 전략은 이 trait를 구현하여 러너에 등록됩니다.
//! 실행기는 전략의 프로바이더 이름을 읽어 데이터/주문 플레인을
//! 배선하고, 시장 데이터와 주문 이벤트를 콜백으로 전달합니다.

use async_trait::async_trait;
use runner_core::{Bar, Execution, Order, Rejection, Tick};
use serde_json::Value;

use crate::context::StrategyContext;
use crate::error::StrategyError;

/// 트레이딩 전략 구현을 위한 Strategy trait.
///
/// 필수 콜백은 시장 데이터(`on_tick`/`on_bar`)와 체결(`on_execution`)이며,
/// 주문 접수/거부/취소 콜백은 기본 no-op 구현을 갖습니다.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// 전략 이름 반환.
    fn name(&self) -> &str;

    /// 시장 데이터 프로바이더 이름 반환.
    ///
    /// [`runner_core::SIMULATED_EXCHANGE`]와 같으면 실행기가 데이터 요청을
    /// 로컬 시뮬레이션 거래소로 우회시킵니다.
    fn market_data_provider(&self) -> &str;

    /// 주문 실행 프로바이더 이름 반환.
    fn order_execution_provider(&self) -> &str;

    /// 설정으로 전략 초기화.
    async fn initialize(&mut self, config: Value) -> Result<(), StrategyError>;

    /// 실행 시작 시 호출. 여기서 데이터 구독을 발행합니다.
    async fn on_start(&mut self, ctx: &StrategyContext) -> Result<(), StrategyError>;

    /// 새 틱 수신 시 호출.
    async fn on_tick(&mut self, tick: &Tick, ctx: &StrategyContext) -> Result<(), StrategyError>;

    /// 새 바 수신 시 호출.
    async fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Result<(), StrategyError>;

    /// 주문 접수 통지 수신 시 호출.
    async fn on_order_accepted(
        &mut self,
        _order: &Order,
        _ctx: &StrategyContext,
    ) -> Result<(), StrategyError> {
        Ok(())
    }

    /// 체결 수신 시 호출.
    async fn on_execution(
        &mut self,
        execution: &Execution,
        ctx: &StrategyContext,
    ) -> Result<(), StrategyError>;

    /// 주문 거부 수신 시 호출.
    async fn on_rejection(
        &mut self,
        _rejection: &Rejection,
        _ctx: &StrategyContext,
    ) -> Result<(), StrategyError> {
        Ok(())
    }

    /// 주문 취소 통지 수신 시 호출.
    async fn on_cancellation(
        &mut self,
        _order: &Order,
        _ctx: &StrategyContext,
    ) -> Result<(), StrategyError> {
        Ok(())
    }

    /// 실행 중지 시 호출. 구독 해제 등 정리를 수행합니다.
    async fn on_stop(&mut self, ctx: &StrategyContext) -> Result<(), StrategyError>;
}
