use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain model đại diện một tin nhắn chat.
///
/// `id` sinh ở client (UUID v4) và được remote store giữ nguyên, nên
/// dedup theo `id` là đủ để nhận ra echo của chính mình.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
