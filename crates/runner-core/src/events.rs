//! 컴포넌트 간 이벤트 버스.
//!
//! broadcast 채널 기반의 publish/subscribe 버스입니다.
//! 프로바이더 연결 요청, 실행기 상태 변경 등 컴포넌트 경계를 넘는
//! 이벤트를 명시적 구독자 등록으로 전달합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! let bus: EventBus<ProviderCommand> = EventBus::new(64);
//! let mut rx = bus.subscribe();
//!
//! bus.publish(ProviderCommand::Connect(provider));
//!
//! let command = rx.recv().await?;
//! ```

use tokio::sync::broadcast;
use tracing::debug;

/// broadcast 기반 이벤트 버스.
///
/// 구독자가 없을 때의 publish는 에러가 아니며 이벤트는 버려집니다.
/// 느린 구독자는 버퍼 용량을 초과하면 lagged 이벤트를 잃습니다.
#[derive(Debug, Clone)]
pub struct EventBus<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// 지정된 버퍼 용량으로 새 버스 생성.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 이벤트 발행. 수신한 구독자 수를 반환합니다.
    pub fn publish(&self, event: T) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(_) => {
                // 구독자 없음
                debug!("이벤트 버스 구독자 없음, 이벤트 폐기");
                0
            }
        }
    }

    /// 새 구독자 등록.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    /// 현재 구독자 수.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(128)
    }
}
