//! 전략 플러그인 레지스트리.
//!
//! 전략 식별자 → 팩토리 매핑입니다. 리플렉션 기반 클래스 로딩 대신
//! 등록된 팩토리가 다형적 전략 핸들을 생성합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! let mut registry = StrategyRegistry::new();
//! registry.register(
//!     "sma_crossover",
//!     SmaCrossover::metadata(),
//!     || Box::new(SmaCrossover::default()),
//! )?;
//!
//! let strategy = registry.create("sma_crossover")?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::StrategyError;
use crate::traits::Strategy;

/// 전략 인스턴스를 생성하는 팩토리.
pub type StrategyFactory = Arc<dyn Fn() -> Box<dyn Strategy> + Send + Sync>;

/// 등록을 위한 전략 메타데이터.
#[derive(Debug, Clone)]
pub struct StrategyMetadata {
    /// 전략 이름
    pub name: String,
    /// 전략 버전
    pub version: String,
    /// 전략 설명
    pub description: String,
    /// 필수 설정 키
    pub required_config: Vec<String>,
}

impl StrategyMetadata {
    /// 새 메타데이터 생성.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            required_config: Vec::new(),
        }
    }

    /// 필수 설정 키 추가.
    pub fn with_required_config(mut self, keys: &[&str]) -> Self {
        self.required_config = keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

/// 레지스트리 엔트리 (메타데이터 + 팩토리).
struct RegistryEntry {
    metadata: StrategyMetadata,
    factory: StrategyFactory,
}

/// 전략 식별자 기반 플러그인 레지스트리.
#[derive(Default)]
pub struct StrategyRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl StrategyRegistry {
    /// 빈 레지스트리 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 전략 등록. 중복 키는 에러입니다.
    pub fn register<F>(
        &mut self,
        key: impl Into<String>,
        metadata: StrategyMetadata,
        factory: F,
    ) -> Result<(), StrategyError>
    where
        F: Fn() -> Box<dyn Strategy> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(StrategyError::DuplicateStrategy { key });
        }

        debug!(key = %key, name = %metadata.name, "전략 등록");
        self.entries.insert(
            key,
            RegistryEntry {
                metadata,
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    /// 키에 해당하는 새 전략 인스턴스 생성.
    pub fn create(&self, key: &str) -> Result<Box<dyn Strategy>, StrategyError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| StrategyError::UnknownStrategy {
                key: key.to_string(),
            })?;
        Ok((entry.factory)())
    }

    /// 키에 해당하는 팩토리 핸들 반환 (실행기가 지연 생성에 사용).
    pub fn factory(&self, key: &str) -> Result<StrategyFactory, StrategyError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| StrategyError::UnknownStrategy {
                key: key.to_string(),
            })?;
        Ok(entry.factory.clone())
    }

    /// 키에 해당하는 메타데이터 반환.
    pub fn metadata(&self, key: &str) -> Option<&StrategyMetadata> {
        self.entries.get(key).map(|e| &e.metadata)
    }

    /// 등록된 전략 키 목록 (정렬됨).
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// 등록된 전략 수.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 레지스트리가 비어 있는지 여부.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
