//! `run` 서브커맨드: 기록 데이터에 대해 전략 실행.

use std::sync::Arc;

use anyhow::{Context, Result};
use runner_engine::{CsvDataSource, StrategyExecutor, TracingSink};
use runner_strategy::builtin_registry;
use tracing::info;

/// `run` 서브커맨드 인자.
pub struct RunArgs {
    /// 전략 레지스트리 키
    pub strategy: String,
    /// 전략 설정 JSON 파일 경로
    pub config: String,
    /// CSV 바 파일 디렉토리
    pub data: String,
    /// 기록 바 간격 (초)
    pub interval: u64,
}

/// 전략을 실행하고 피드 소진 후 통계를 출력.
pub async fn run_strategy(args: RunArgs) -> Result<()> {
    let registry = builtin_registry()?;
    let factory = registry
        .factory(&args.strategy)
        .with_context(|| format!("전략을 찾을 수 없음: {}", args.strategy))?;

    let raw = std::fs::read_to_string(&args.config)
        .with_context(|| format!("설정 파일 읽기 실패: {}", args.config))?;
    let config: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("잘못된 설정 JSON: {}", args.config))?;

    let source = Arc::new(CsvDataSource::new(&args.data, args.interval));
    let mut executor = StrategyExecutor::new(
        args.strategy.clone(),
        factory,
        config,
        source,
        Arc::new(TracingSink),
    );

    info!(strategy = %args.strategy, data = %args.data, "전략 실행");
    executor.execute().await?;

    // 기록 피드가 모두 재생될 때까지 대기
    executor.data_handler().join_feeds().await;
    executor.stop().await?;
    executor.close().await?;

    let stats = executor.statistics().await;
    println!("실행 결과: {}", args.strategy);
    println!("  체결 수     : {}", stats.fill_count);
    println!("  매수 수량   : {}", stats.bought_quantity);
    println!("  매도 수량   : {}", stats.sold_quantity);
    println!("  최종 포지션 : {}", stats.position);
    println!("  실현 손익   : {}", stats.realized_pnl);

    Ok(())
}
