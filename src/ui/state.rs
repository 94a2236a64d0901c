use crate::common::ChatMessage;

/// Trạng thái cục bộ của UI.
///
/// `messages` chỉ là bản chiếu của timeline bên synchronizer, UI không
/// tự sửa thứ tự hay khử trùng lặp.
pub struct AppState {
    pub messages: Vec<ChatMessage>,
    pub input_text: String,
    pub username_input: String,
    pub username: Option<String>,
    pub join_error: Option<String>,
    pub channel_live: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input_text: String::new(),
            username_input: String::new(),
            username: None,
            join_error: None,
            channel_live: false,
        }
    }

    pub fn joined(&self) -> bool {
        self.username.is_some()
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn replace_history(&mut self, history: Vec<ChatMessage>) {
        self.messages = history;
    }

    pub fn set_channel_live(&mut self, live: bool) {
        self.channel_live = live;
    }
}
