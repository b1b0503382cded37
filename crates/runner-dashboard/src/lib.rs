//! 프로바이더/대시보드 상태 계층.
//!
//! 이 crate는 다음을 제공합니다:
//! - 프로바이더 발견 경계 `ProviderCatalog`와 설정 기반 구현
//! - 컬렉션/선택/연결 가드를 관리하는 `ProvidersService`
//! - 종목 시세와 전략 상태 행을 유지하는 `DashboardService`

pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod providers;

// 주요 타입 재내보내기
pub use catalog::{ConfigProviderCatalog, ProviderCatalog, StaticCatalog};
pub use dashboard::{DashboardService, InstrumentRow, StrategyRow};
pub use error::DashboardError;
pub use providers::{ProviderCommand, ProvidersService};
