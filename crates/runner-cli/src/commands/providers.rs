//! `providers` 서브커맨드: 설정된 프로바이더 목록 출력.

use std::path::Path;

use anyhow::Result;
use runner_core::ProviderKind;
use runner_dashboard::{ConfigProviderCatalog, ProvidersService};

/// `providers` 서브커맨드 인자.
pub struct ProvidersArgs {
    /// 카탈로그 TOML 경로 (없으면 환경변수만)
    pub config: Option<String>,
}

/// 카탈로그를 로드하고 종류별 프로바이더와 선택 상태를 출력.
pub async fn run_providers(args: ProvidersArgs) -> Result<()> {
    let catalog = ConfigProviderCatalog::load(args.config.as_deref().map(Path::new))?;

    let mut service = ProvidersService::new();
    service.initialize(&catalog).await?;

    for (label, kind) in [
        ("시장 데이터 프로바이더", ProviderKind::MarketData),
        ("주문 실행 프로바이더", ProviderKind::OrderExecution),
    ] {
        println!("{}:", label);
        let selected = service.selected(kind).map(|p| p.name.clone());
        for provider in service.providers(kind) {
            let marker = if Some(&provider.name) == selected.as_ref() {
                "*"
            } else {
                " "
            };
            println!("  {} {:<24} {:?}", marker, provider.name, provider.status);
        }
        println!();
    }

    Ok(())
}
