use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::common::ChatMessage;

pub const MESSAGES_TOPIC: &str = "realtime:public:messages";
pub const HEARTBEAT_TOPIC: &str = "phoenix";

const EVENT_JOIN: &str = "phx_join";
const EVENT_LEAVE: &str = "phx_leave";
const EVENT_REPLY: &str = "phx_reply";
const EVENT_HEARTBEAT: &str = "heartbeat";
const EVENT_CHANGES: &str = "postgres_changes";
const EVENT_INSERT: &str = "INSERT";

/// Một khung tin theo giao thức Phoenix channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Frame {
    pub fn join(reference: u64) -> Self {
        Self {
            topic: MESSAGES_TOPIC.to_string(),
            event: EVENT_JOIN.to_string(),
            payload: json!({
                "config": {
                    "postgres_changes": [
                        { "event": EVENT_INSERT, "schema": "public", "table": "messages" }
                    ]
                }
            }),
            reference: Some(reference.to_string()),
        }
    }

    pub fn heartbeat(reference: u64) -> Self {
        Self {
            topic: HEARTBEAT_TOPIC.to_string(),
            event: EVENT_HEARTBEAT.to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    pub fn leave(reference: u64) -> Self {
        Self {
            topic: MESSAGES_TOPIC.to_string(),
            event: EVENT_LEAVE.to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn is_reply_to(&self, reference: u64) -> bool {
        let expected = reference.to_string();
        self.event == EVENT_REPLY && self.reference.as_deref() == Some(expected.as_str())
    }

    pub fn reply_status_ok(&self) -> bool {
        self.payload.get("status").and_then(Value::as_str) == Some("ok")
    }

    /// Lấy hàng vừa insert ra khỏi khung tin, nếu có.
    ///
    /// Server mới gói thay đổi trong event `postgres_changes` với
    /// `payload.data`, server cũ đẩy thẳng event `INSERT`; hàng nằm dưới
    /// khóa `record` hoặc `new` tùy phiên bản.
    pub fn inserted_row(&self) -> Option<ChatMessage> {
        let row = match self.event.as_str() {
            EVENT_CHANGES => {
                let data = self.payload.get("data")?;
                if data.get("type").and_then(Value::as_str) != Some(EVENT_INSERT) {
                    return None;
                }
                data.get("record").or_else(|| data.get("new"))?
            }
            EVENT_INSERT => self
                .payload
                .get("record")
                .or_else(|| self.payload.get("new"))?,
            _ => return None,
        };

        match serde_json::from_value(row.clone()) {
            Ok(message) => Some(message),
            Err(err) => {
                log::warn!("Dropping malformed row from notification channel: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_json() -> Value {
        json!({
            "id": "02c9f409-8f0f-4d0e-bb2f-0a720ad4dfc3",
            "username": "an",
            "content": "xin chào",
            "created_at": "2024-05-01T10:00:00Z"
        })
    }

    #[test]
    fn join_frame_carries_insert_filter() {
        let frame = Frame::join(1);
        let encoded = frame.encode().unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();

        assert_eq!(value["topic"], MESSAGES_TOPIC);
        assert_eq!(value["event"], "phx_join");
        assert_eq!(value["ref"], "1");
        assert_eq!(
            value["payload"]["config"]["postgres_changes"][0]["event"],
            "INSERT"
        );
        assert_eq!(
            value["payload"]["config"]["postgres_changes"][0]["table"],
            "messages"
        );
    }

    #[test]
    fn reply_frame_matches_join_reference() {
        let raw = json!({
            "topic": MESSAGES_TOPIC,
            "event": "phx_reply",
            "payload": { "status": "ok", "response": {} },
            "ref": "1"
        })
        .to_string();

        let frame = Frame::decode(&raw).unwrap();
        assert!(frame.is_reply_to(1));
        assert!(!frame.is_reply_to(2));
        assert!(frame.reply_status_ok());
    }

    #[test]
    fn inserted_row_from_postgres_changes_frame() {
        let raw = json!({
            "topic": MESSAGES_TOPIC,
            "event": "postgres_changes",
            "payload": {
                "ids": [1234],
                "data": {
                    "type": "INSERT",
                    "schema": "public",
                    "table": "messages",
                    "record": row_json()
                }
            },
            "ref": null
        })
        .to_string();

        let frame = Frame::decode(&raw).unwrap();
        let message = frame.inserted_row().expect("row should decode");
        assert_eq!(message.id, "02c9f409-8f0f-4d0e-bb2f-0a720ad4dfc3");
        assert_eq!(message.username, "an");
        assert_eq!(message.content, "xin chào");
    }

    #[test]
    fn inserted_row_from_legacy_insert_frame() {
        let raw = json!({
            "topic": MESSAGES_TOPIC,
            "event": "INSERT",
            "payload": { "new": row_json() },
            "ref": null
        })
        .to_string();

        let frame = Frame::decode(&raw).unwrap();
        assert!(frame.inserted_row().is_some());
    }

    #[test]
    fn update_frames_are_ignored() {
        let raw = json!({
            "topic": MESSAGES_TOPIC,
            "event": "postgres_changes",
            "payload": {
                "data": { "type": "UPDATE", "record": row_json() }
            }
        })
        .to_string();

        let frame = Frame::decode(&raw).unwrap();
        assert!(frame.inserted_row().is_none());
    }

    #[test]
    fn malformed_row_is_dropped() {
        let raw = json!({
            "topic": MESSAGES_TOPIC,
            "event": "postgres_changes",
            "payload": {
                "data": {
                    "type": "INSERT",
                    "record": { "id": "x", "username": "an" }
                }
            }
        })
        .to_string();

        let frame = Frame::decode(&raw).unwrap();
        assert!(frame.inserted_row().is_none());
    }
}
