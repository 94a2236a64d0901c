use std::collections::HashSet;
use std::mem;

use chrono::{DateTime, Duration, Utc};

use crate::common::ChatMessage;

/// Dãy tin nhắn đã hội tụ: có thứ tự, không trùng lặp, chỉ mọc thêm.
#[derive(Debug, Default)]
pub struct Timeline {
    entries: Vec<ChatMessage>,
    seen: HashSet<String>,
    last_issued: Option<DateTime<Utc>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Merge lịch sử từ store vào, trả về số hàng mới.
    ///
    /// Hàng đã có (tin optimistic vừa gửi chẳng hạn) không bị nhân đôi,
    /// phần đuôi local chưa xuất hiện trong lịch sử vẫn giữ chỗ sau cùng.
    /// Gọi lại với cùng dữ liệu là no-op.
    pub fn absorb_history(&mut self, mut rows: Vec<ChatMessage>) -> usize {
        let before = self.entries.len();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let tail = mem::take(&mut self.entries);
        self.seen.clear();
        for row in rows {
            self.push_unseen(row);
        }
        for row in tail {
            self.push_unseen(row);
        }
        self.entries.len() - before
    }

    /// Nối một hàng từ kênh notification. Trả về `false` nếu hàng đã có
    /// rồi (echo của chính mình hoặc replay sau khi reconnect).
    pub fn merge_remote(&mut self, row: ChatMessage) -> bool {
        self.push_unseen(row)
    }

    /// Nối tin optimistic phía local vào cuối dãy.
    pub fn append_local(&mut self, row: ChatMessage) -> bool {
        self.push_unseen(row)
    }

    /// Cấp `created_at` cho tin local mới. Không bao giờ lùi so với tem
    /// đã cấp trước đó, kể cả khi đồng hồ hệ thống chạy lùi.
    pub fn next_stamp(&mut self, wall: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.last_issued {
            Some(last) if wall <= last => last + Duration::milliseconds(1),
            _ => wall,
        };
        self.last_issued = Some(stamp);
        stamp
    }

    fn push_unseen(&mut self, row: ChatMessage) -> bool {
        if !self.seen.insert(row.id.clone()) {
            return false;
        }
        self.entries.push(row);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn msg(id: &str, secs: i64) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            username: "an".to_string(),
            content: format!("msg-{id}"),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn ids(timeline: &Timeline) -> Vec<&str> {
        timeline.entries().iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn history_is_sorted_by_created_at() {
        let mut timeline = Timeline::new();
        let added = timeline.absorb_history(vec![msg("c", 30), msg("a", 10), msg("b", 20)]);

        assert_eq!(added, 3);
        assert_eq!(ids(&timeline), ["a", "b", "c"]);
    }

    #[test]
    fn double_absorb_is_idempotent() {
        let mut timeline = Timeline::new();
        let rows = vec![msg("a", 10), msg("b", 20)];

        timeline.absorb_history(rows.clone());
        let added = timeline.absorb_history(rows);

        assert_eq!(added, 0);
        assert_eq!(ids(&timeline), ["a", "b"]);
    }

    #[test]
    fn optimistic_tail_survives_history_load() {
        let mut timeline = Timeline::new();
        assert!(timeline.append_local(msg("local", 100)));

        timeline.absorb_history(vec![msg("a", 10), msg("b", 20)]);

        assert_eq!(ids(&timeline), ["a", "b", "local"]);
        assert!(timeline.contains("local"));
    }

    #[test]
    fn persisted_optimistic_row_is_not_doubled() {
        let mut timeline = Timeline::new();
        timeline.append_local(msg("mine", 15));

        // Store đã ghi xong tin optimistic nên lịch sử cũng chứa nó.
        let added = timeline.absorb_history(vec![msg("a", 10), msg("mine", 15), msg("b", 20)]);

        assert_eq!(added, 2);
        assert_eq!(ids(&timeline), ["a", "mine", "b"]);
    }

    #[test]
    fn duplicate_remote_row_is_rejected() {
        let mut timeline = Timeline::new();
        assert!(timeline.merge_remote(msg("a", 10)));
        assert!(!timeline.merge_remote(msg("a", 10)));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn own_echo_is_rejected_after_local_append() {
        let mut timeline = Timeline::new();
        timeline.append_local(msg("mine", 10));

        assert!(!timeline.merge_remote(msg("mine", 10)));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn merge_grows_by_one() {
        let mut timeline = Timeline::new();
        timeline.absorb_history(vec![msg("a", 10)]);

        assert!(timeline.merge_remote(msg("b", 20)));
        assert_eq!(ids(&timeline), ["a", "b"]);
    }

    #[test]
    fn stamps_stay_monotonic_when_clock_goes_backwards() {
        let mut timeline = Timeline::new();
        let t100 = Utc.timestamp_opt(100, 0).unwrap();
        let t50 = Utc.timestamp_opt(50, 0).unwrap();

        let first = timeline.next_stamp(t100);
        let second = timeline.next_stamp(t50);
        let third = timeline.next_stamp(t50);

        assert_eq!(first, t100);
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn stamps_follow_wall_clock_when_it_moves_forward() {
        let mut timeline = Timeline::new();
        let t100 = Utc.timestamp_opt(100, 0).unwrap();
        let t200 = Utc.timestamp_opt(200, 0).unwrap();

        timeline.next_stamp(t100);
        assert_eq!(timeline.next_stamp(t200), t200);
    }
}
