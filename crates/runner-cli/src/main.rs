//! 전략 러너 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 등록된 전략 목록 보기
//! runner list
//!
//! # 설정된 프로바이더 보기
//! runner providers --config providers.toml
//!
//! # 기록 데이터에 대해 전략 실행
//! runner run -s sma-crossover -c strategy.json -d data/bars -i 60
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::{
    list::run_list,
    providers::{run_providers, ProvidersArgs},
    run::{run_strategy, RunArgs},
};

#[derive(Parser)]
#[command(name = "runner")]
#[command(about = "Strategy runner CLI - 시뮬레이션 거래소 기반 전략 실행기", long_about = None)]
#[command(version)]
struct Cli {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 등록된 전략 목록 보기
    List,

    /// 설정된 프로바이더 목록 보기
    Providers {
        /// 프로바이더 카탈로그 TOML 경로
        #[arg(short, long)]
        config: Option<String>,
    },

    /// 기록 데이터에 대해 전략 실행
    Run {
        /// 전략 레지스트리 키
        #[arg(short, long)]
        strategy: String,

        /// 전략 설정 JSON 파일 경로
        #[arg(short, long)]
        config: String,

        /// CSV 바 파일 디렉토리
        #[arg(short, long)]
        data: String,

        /// 기록 바 간격 (초)
        #[arg(short, long, default_value = "60")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (없어도 에러 안남)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "runner_cli={},runner_engine={},runner_strategy={},runner_dashboard={}",
                    cli.log_level, cli.log_level, cli.log_level, cli.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::List => run_list()?,
        Commands::Providers { config } => {
            run_providers(ProvidersArgs { config }).await?;
        }
        Commands::Run {
            strategy,
            config,
            data,
            interval,
        } => {
            run_strategy(RunArgs {
                strategy,
                config,
                data,
                interval,
            })
            .await?;
        }
    }

    Ok(())
}
