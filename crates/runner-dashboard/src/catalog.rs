//! 프로바이더 카탈로그.
//!
//! 사용 가능한 시장 데이터/주문 실행 프로바이더를 발견하는 경계입니다.
//! 기본 구현은 TOML 설정 파일과 `RUNNER_` 환경변수 오버라이드를 읽으며,
//! 시뮬레이션 거래소는 설정이 전혀 없어도 항상 포함됩니다.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use runner_core::{Provider, ProviderCredentials, ProviderKind, SIMULATED_EXCHANGE};
use serde::Deserialize;
use tracing::info;

use crate::error::DashboardError;

/// 프로바이더 발견 경계.
#[async_trait]
pub trait ProviderCatalog: Send + Sync {
    /// 시장 데이터 프로바이더 목록.
    async fn market_data_providers(&self) -> Result<Vec<Provider>, DashboardError>;

    /// 주문 실행 프로바이더 목록.
    async fn order_execution_providers(&self) -> Result<Vec<Provider>, DashboardError>;
}

/// 카탈로그 파일의 프로바이더 항목.
#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogEntry {
    username: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

impl CatalogEntry {
    fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// 카탈로그 파일 전체 구조.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    market_data: HashMap<String, CatalogEntry>,
    #[serde(default)]
    order_execution: HashMap<String, CatalogEntry>,
}

/// `config` crate 기반 카탈로그.
///
/// TOML 예시:
///
/// ```toml
/// [market_data.Kiwoom]
/// host = "localhost"
/// port = 8100
///
/// [order_execution.Kiwoom]
/// username = "user"
/// ```
///
/// 환경변수 `RUNNER_MARKET_DATA__<이름>__HOST` 형태로 오버라이드됩니다.
pub struct ConfigProviderCatalog {
    file: CatalogFile,
}

impl ConfigProviderCatalog {
    /// 설정 파일(선택)과 환경변수에서 카탈로그 로드.
    pub fn load(config_path: Option<&Path>) -> Result<Self, DashboardError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(
                config::File::from(path).required(false),
            );
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("RUNNER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let file: CatalogFile = settings.try_deserialize()?;
        info!(
            market_data = file.market_data.len(),
            order_execution = file.order_execution.len(),
            "프로바이더 카탈로그 로드"
        );
        Ok(Self { file })
    }

    /// 항목 맵을 프로바이더 목록으로 변환. 센티널이 항상 선두에 옵니다.
    fn to_providers(entries: &HashMap<String, CatalogEntry>, kind: ProviderKind) -> Vec<Provider> {
        let mut providers = vec![Provider::new(SIMULATED_EXCHANGE, kind)];
        let mut names: Vec<&String> = entries
            .keys()
            .filter(|name| name.as_str() != SIMULATED_EXCHANGE)
            .collect();
        names.sort();
        for name in names {
            let entry = &entries[name];
            providers.push(Provider::new(name.clone(), kind).with_credentials(entry.credentials()));
        }
        providers
    }
}

#[async_trait]
impl ProviderCatalog for ConfigProviderCatalog {
    async fn market_data_providers(&self) -> Result<Vec<Provider>, DashboardError> {
        Ok(Self::to_providers(
            &self.file.market_data,
            ProviderKind::MarketData,
        ))
    }

    async fn order_execution_providers(&self) -> Result<Vec<Provider>, DashboardError> {
        Ok(Self::to_providers(
            &self.file.order_execution,
            ProviderKind::OrderExecution,
        ))
    }
}

/// 고정 목록 카탈로그 (테스트/데모용).
#[derive(Default)]
pub struct StaticCatalog {
    market_data: Vec<Provider>,
    order_execution: Vec<Provider>,
}

impl StaticCatalog {
    /// 시장 데이터 프로바이더 추가.
    pub fn with_market_data(mut self, provider: Provider) -> Self {
        self.market_data.push(provider);
        self
    }

    /// 주문 실행 프로바이더 추가.
    pub fn with_order_execution(mut self, provider: Provider) -> Self {
        self.order_execution.push(provider);
        self
    }
}

#[async_trait]
impl ProviderCatalog for StaticCatalog {
    async fn market_data_providers(&self) -> Result<Vec<Provider>, DashboardError> {
        Ok(self.market_data.clone())
    }

    async fn order_execution_providers(&self) -> Result<Vec<Provider>, DashboardError> {
        Ok(self.order_execution.clone())
    }
}
