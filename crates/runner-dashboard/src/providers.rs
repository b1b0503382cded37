//! 프로바이더 상태 서비스.
//!
//! 시장 데이터/주문 실행 프로바이더 컬렉션과 종류별 선택 상태를
//! 관리합니다. 선택은 항상 None이거나 컬렉션의 멤버이며, 연결/해제
//! 명령은 가드를 통과한 경우에만 이벤트 버스로 발행됩니다. 실제 연결
//! 수행은 게이트웨이 측의 몫이고, 결과는 `apply_status`로 반영됩니다.

use runner_core::{ConnectionStatus, EventBus, Provider, ProviderKind};
use tokio::sync::broadcast;
use tracing::info;

use crate::catalog::ProviderCatalog;
use crate::error::DashboardError;

/// 프로바이더 연결 명령.
#[derive(Debug, Clone)]
pub enum ProviderCommand {
    /// 연결 요청
    Connect(Provider),
    /// 연결 해제 요청
    Disconnect(Provider),
}

/// 종류별 컬렉션 + 선택 상태.
#[derive(Debug, Default)]
struct ProviderCollection {
    providers: Vec<Provider>,
    selected: Option<String>,
}

impl ProviderCollection {
    fn replace(&mut self, providers: Vec<Provider>) {
        self.providers = providers;
        // 초기화는 첫 프로바이더를 선택
        self.selected = self.providers.first().map(|p| p.name.clone());
    }

    fn selected_provider(&self) -> Option<&Provider> {
        let name = self.selected.as_deref()?;
        self.providers.iter().find(|p| p.name == name)
    }

    fn select(&mut self, name: &str) -> Result<(), DashboardError> {
        if !self.providers.iter().any(|p| p.name == name) {
            return Err(DashboardError::UnknownProvider {
                name: name.to_string(),
            });
        }
        self.selected = Some(name.to_string());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), DashboardError> {
        let position = self
            .providers
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| DashboardError::UnknownProvider {
                name: name.to_string(),
            })?;
        self.providers.remove(position);

        // 선택된 프로바이더 제거 시 남은 첫 프로바이더로 재선택
        if self.selected.as_deref() == Some(name) {
            self.selected = self.providers.first().map(|p| p.name.clone());
        }
        Ok(())
    }

    fn apply_status(&mut self, name: &str, status: ConnectionStatus) {
        if let Some(provider) = self.providers.iter_mut().find(|p| p.name == name) {
            provider.status = status;
        }
    }
}

/// 프로바이더 서비스.
pub struct ProvidersService {
    market_data: ProviderCollection,
    order_execution: ProviderCollection,
    commands: EventBus<ProviderCommand>,
}

impl Default for ProvidersService {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvidersService {
    /// 빈 서비스 생성.
    pub fn new() -> Self {
        Self {
            market_data: ProviderCollection::default(),
            order_execution: ProviderCollection::default(),
            commands: EventBus::default(),
        }
    }

    /// 카탈로그에서 컬렉션 로드 및 첫 프로바이더 선택.
    ///
    /// 스폰된 태스크에서 호출해도 안전하도록 async입니다.
    pub async fn initialize(&mut self, catalog: &dyn ProviderCatalog) -> Result<(), DashboardError> {
        self.market_data.replace(catalog.market_data_providers().await?);
        self.order_execution
            .replace(catalog.order_execution_providers().await?);
        info!(
            market_data = self.market_data.providers.len(),
            order_execution = self.order_execution.providers.len(),
            "프로바이더 서비스 초기화"
        );
        Ok(())
    }

    fn collection(&self, kind: ProviderKind) -> &ProviderCollection {
        match kind {
            ProviderKind::MarketData => &self.market_data,
            ProviderKind::OrderExecution => &self.order_execution,
        }
    }

    fn collection_mut(&mut self, kind: ProviderKind) -> &mut ProviderCollection {
        match kind {
            ProviderKind::MarketData => &mut self.market_data,
            ProviderKind::OrderExecution => &mut self.order_execution,
        }
    }

    /// 종류별 프로바이더 목록.
    pub fn providers(&self, kind: ProviderKind) -> &[Provider] {
        &self.collection(kind).providers
    }

    /// 현재 선택된 프로바이더.
    pub fn selected(&self, kind: ProviderKind) -> Option<&Provider> {
        self.collection(kind).selected_provider()
    }

    /// 프로바이더 선택. 컬렉션 멤버가 아니면 오류.
    pub fn select(&mut self, kind: ProviderKind, name: &str) -> Result<(), DashboardError> {
        self.collection_mut(kind).select(name)
    }

    /// 프로바이더 제거. 선택된 프로바이더였다면 첫 남은 항목으로 재선택.
    pub fn remove(&mut self, kind: ProviderKind, name: &str) -> Result<(), DashboardError> {
        self.collection_mut(kind).remove(name)
    }

    /// 연결 명령 가드: 선택된 프로바이더가 Disconnected일 때만.
    pub fn can_connect(&self, kind: ProviderKind) -> bool {
        matches!(
            self.selected(kind).map(|p| p.status),
            Some(ConnectionStatus::Disconnected)
        )
    }

    /// 해제 명령 가드: 선택된 프로바이더가 Connected일 때만.
    pub fn can_disconnect(&self, kind: ProviderKind) -> bool {
        matches!(
            self.selected(kind).map(|p| p.status),
            Some(ConnectionStatus::Connected)
        )
    }

    /// 선택된 프로바이더 연결 요청 발행.
    pub fn connect_selected(&mut self, kind: ProviderKind) -> Result<(), DashboardError> {
        if !self.can_connect(kind) {
            return Err(DashboardError::CommandUnavailable {
                reason: "연결 가능한 선택 프로바이더 없음".to_string(),
            });
        }
        let provider = self
            .selected(kind)
            .cloned()
            .ok_or_else(|| DashboardError::CommandUnavailable {
                reason: "선택된 프로바이더 없음".to_string(),
            })?;
        info!(provider = %provider.name, "프로바이더 연결 요청");
        self.commands.publish(ProviderCommand::Connect(provider));
        Ok(())
    }

    /// 선택된 프로바이더 해제 요청 발행.
    pub fn disconnect_selected(&mut self, kind: ProviderKind) -> Result<(), DashboardError> {
        if !self.can_disconnect(kind) {
            return Err(DashboardError::CommandUnavailable {
                reason: "해제 가능한 선택 프로바이더 없음".to_string(),
            });
        }
        let provider = self
            .selected(kind)
            .cloned()
            .ok_or_else(|| DashboardError::CommandUnavailable {
                reason: "선택된 프로바이더 없음".to_string(),
            })?;
        info!(provider = %provider.name, "프로바이더 해제 요청");
        self.commands.publish(ProviderCommand::Disconnect(provider));
        Ok(())
    }

    /// 게이트웨이가 보고한 연결 상태 반영.
    pub fn apply_status(&mut self, kind: ProviderKind, name: &str, status: ConnectionStatus) {
        self.collection_mut(kind).apply_status(name, status);
    }

    /// 연결 명령 구독.
    pub fn subscribe_commands(&self) -> broadcast::Receiver<ProviderCommand> {
        self.commands.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use runner_core::SIMULATED_EXCHANGE;

    use crate::catalog::StaticCatalog;

    use super::*;

    fn catalog() -> StaticCatalog {
        StaticCatalog::default()
            .with_market_data(Provider::new(SIMULATED_EXCHANGE, ProviderKind::MarketData))
            .with_market_data(Provider::new("Kiwoom", ProviderKind::MarketData))
            .with_order_execution(Provider::new(
                SIMULATED_EXCHANGE,
                ProviderKind::OrderExecution,
            ))
    }

    #[tokio::test]
    async fn initialize_selects_first_provider() {
        let mut service = ProvidersService::new();
        service.initialize(&catalog()).await.unwrap();

        assert_eq!(
            service.selected(ProviderKind::MarketData).unwrap().name,
            SIMULATED_EXCHANGE
        );
        assert_eq!(
            service.selected(ProviderKind::OrderExecution).unwrap().name,
            SIMULATED_EXCHANGE
        );
    }

    #[tokio::test]
    async fn selection_is_always_a_member() {
        let mut service = ProvidersService::new();
        service.initialize(&catalog()).await.unwrap();

        assert!(service.select(ProviderKind::MarketData, "Nope").is_err());
        service.select(ProviderKind::MarketData, "Kiwoom").unwrap();
        assert_eq!(
            service.selected(ProviderKind::MarketData).unwrap().name,
            "Kiwoom"
        );
    }

    #[tokio::test]
    async fn removing_selected_reselects_first_remaining() {
        let mut service = ProvidersService::new();
        service.initialize(&catalog()).await.unwrap();
        service.select(ProviderKind::MarketData, "Kiwoom").unwrap();

        service.remove(ProviderKind::MarketData, "Kiwoom").unwrap();
        assert_eq!(
            service.selected(ProviderKind::MarketData).unwrap().name,
            SIMULATED_EXCHANGE
        );

        service
            .remove(ProviderKind::MarketData, SIMULATED_EXCHANGE)
            .unwrap();
        assert!(service.selected(ProviderKind::MarketData).is_none());
    }

    #[tokio::test]
    async fn connect_guard_requires_disconnected_selection() {
        let mut service = ProvidersService::new();
        service.initialize(&catalog()).await.unwrap();
        let mut commands = service.subscribe_commands();

        assert!(service.can_connect(ProviderKind::MarketData));
        service.connect_selected(ProviderKind::MarketData).unwrap();
        assert!(matches!(
            commands.recv().await.unwrap(),
            ProviderCommand::Connect(_)
        ));

        // 연결 완료 반영 후에는 해제만 가능
        service.apply_status(
            ProviderKind::MarketData,
            SIMULATED_EXCHANGE,
            ConnectionStatus::Connected,
        );
        assert!(!service.can_connect(ProviderKind::MarketData));
        assert!(service.connect_selected(ProviderKind::MarketData).is_err());
        assert!(service.can_disconnect(ProviderKind::MarketData));
        service
            .disconnect_selected(ProviderKind::MarketData)
            .unwrap();
        assert!(matches!(
            commands.recv().await.unwrap(),
            ProviderCommand::Disconnect(_)
        ));
    }
}
