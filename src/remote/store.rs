use async_trait::async_trait;
use thiserror::Error;

use crate::common::ChatMessage;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("remote store unreachable: {0}")]
    RemoteUnavailable(#[from] reqwest::Error),
    #[error("remote store returned status {0}")]
    BadStatus(u16),
    #[error("malformed row from remote store: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Kho tin nhắn phía server. Hàng insert phải giữ nguyên `id` do client
/// sinh ra, vì toàn bộ dedup dựa trên `id` đó.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Tải toàn bộ log, đã sắp theo `created_at` tăng dần.
    async fn fetch_all(&self) -> Result<Vec<ChatMessage>, StoreError>;

    /// Ghi một tin nhắn mới vào cuối log.
    async fn insert(&self, message: &ChatMessage) -> Result<(), StoreError>;
}
