//! 프로바이더 모델.
//!
//! 시장 데이터/주문 실행 연결 엔드포인트를 이름과 연결 상태로 표현합니다.
//! 프로바이더 이름이 [`SIMULATED_EXCHANGE`]와 같으면 러너가 데이터/주문
//! 요청을 로컬 시뮬레이션 거래소로 우회시킵니다.

use serde::{Deserialize, Serialize};

/// 백테스팅용 로컬 우회를 트리거하는 센티널 프로바이더 이름.
pub const SIMULATED_EXCHANGE: &str = "SimulatedExchange";

/// 프로바이더 이름이 시뮬레이션 거래소 센티널인지 확인.
pub fn is_simulated(provider_name: &str) -> bool {
    provider_name == SIMULATED_EXCHANGE
}

/// 프로바이더 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// 시장 데이터 프로바이더
    MarketData,
    /// 주문 실행 프로바이더
    OrderExecution,
}

/// 프로바이더 연결 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// 연결됨
    Connected,
    /// 연결 끊김
    Disconnected,
}

/// 프로바이더 접속 자격 증명.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// 사용자 이름
    pub username: Option<String>,
    /// 비밀번호
    pub password: Option<String>,
    /// 접속 호스트
    pub host: Option<String>,
    /// 접속 포트
    pub port: Option<u16>,
}

impl ProviderCredentials {
    /// 자격 증명이 비어 있는지 여부.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.host.is_none() && self.port.is_none()
    }
}

/// 연결 엔드포인트 프로바이더.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// 프로바이더 이름
    pub name: String,
    /// 프로바이더 분류
    pub kind: ProviderKind,
    /// 연결 상태
    pub status: ConnectionStatus,
    /// 접속 자격 증명
    pub credentials: ProviderCredentials,
}

impl Provider {
    /// 연결 끊김 상태의 새 프로바이더 생성.
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            status: ConnectionStatus::Disconnected,
            credentials: ProviderCredentials::default(),
        }
    }

    /// 자격 증명 설정.
    pub fn with_credentials(mut self, credentials: ProviderCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// 시뮬레이션 거래소 여부.
    pub fn is_simulated(&self) -> bool {
        is_simulated(&self.name)
    }
}
