/// Lệnh UI gửi xuống tầng đồng bộ.
#[derive(Debug, Clone)]
pub enum SyncCommand {
    /// Đặt username cho phiên này, kích hoạt subscribe + load lịch sử.
    SetAuthor(String),
    /// Gửi một tin nhắn mới với nội dung kèm theo.
    Submit(String),
}
