use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::common::ChatMessage;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("realtime transport failure: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("channel join rejected: {0}")]
    JoinRejected(String),
    #[error("notification channel dropped")]
    Dropped,
}

/// Thay đổi đẩy từ kênh notification về.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Một hàng mới vừa được insert vào log.
    Inserted(ChatMessage),
    /// Kênh đã join xong, thay đổi mới sẽ tới trực tiếp.
    Live,
    /// Mất kết nối, feed đang tự kết nối lại.
    Lost,
}

/// Nguồn notification đẩy thay đổi của log về client.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(&self) -> Result<Subscription, ChannelError>;
}

/// Một lần subscribe đang sống. Drop là hủy đăng ký: guard bên trong
/// báo cho task của feed dừng lại.
pub struct Subscription {
    events: mpsc::Receiver<FeedEvent>,
    _guard: FeedGuard,
}

impl Subscription {
    pub fn new(events: mpsc::Receiver<FeedEvent>, guard: FeedGuard) -> Self {
        Self {
            events,
            _guard: guard,
        }
    }

    /// `None` nghĩa là phía feed đã dừng hẳn, không còn sự kiện nào nữa.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }
}

pub struct FeedGuard {
    shutdown: Option<oneshot::Sender<()>>,
}

impl FeedGuard {
    pub fn new(shutdown: oneshot::Sender<()>) -> Self {
        Self {
            shutdown: Some(shutdown),
        }
    }
}

impl Drop for FeedGuard {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // Bên nhận có thể đã chết sẵn, bỏ qua lỗi gửi.
            let _ = shutdown.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guard_drop_signals_shutdown() {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let guard = FeedGuard::new(shutdown_tx);

        drop(guard);

        assert!(shutdown_rx.await.is_ok());
    }

    #[tokio::test]
    async fn subscription_drop_releases_channel() {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (_event_tx, event_rx) = mpsc::channel(8);
        let subscription = Subscription::new(event_rx, FeedGuard::new(shutdown_tx));

        drop(subscription);

        assert!(shutdown_rx.await.is_ok());
    }
}
