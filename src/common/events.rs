use super::types::ChatMessage;

/// Sự kiện từ tầng đồng bộ gửi lên UI.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Lịch sử đã merge xong, UI thay toàn bộ danh sách đang hiển thị.
    HistorySynced(Vec<ChatMessage>),
    /// Một tin nhắn mới (local hoặc remote) vừa được nối vào cuối.
    MessageAppended(ChatMessage),
    /// Kênh notification đang nhận thay đổi trực tiếp.
    ChannelLive,
    /// Kênh notification bị mất, chờ kết nối lại.
    ChannelOffline,
}
