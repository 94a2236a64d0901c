use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::common::{ChatMessage, SyncCommand, SyncEvent};
use crate::remote::{ChangeFeed, FeedEvent, MessageStore, Subscription};

use super::timeline::Timeline;

/// Actor đồng bộ: nguồn sự thật duy nhất cho dãy tin nhắn hiển thị.
///
/// Nhận [`SyncCommand`] từ UI rồi phát [`SyncEvent`] ngược lên; mọi trao
/// đổi với store và kênh notification đều đi qua đây. UI không bao giờ
/// đụng trực tiếp vào timeline.
pub struct Synchronizer {
    event_sender: mpsc::Sender<SyncEvent>,
    command_receiver: mpsc::Receiver<SyncCommand>,
    store: Arc<dyn MessageStore>,
    feed: Arc<dyn ChangeFeed>,
    timeline: Timeline,
    author: Option<String>,
}

impl Synchronizer {
    pub fn new(
        event_sender: mpsc::Sender<SyncEvent>,
        command_receiver: mpsc::Receiver<SyncCommand>,
        store: Arc<dyn MessageStore>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            store,
            feed,
            timeline: Timeline::new(),
            author: None,
        }
    }

    pub async fn run(mut self) {
        log::info!("Sync event loop started");
        let mut subscription: Option<Subscription> = None;

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command, &mut subscription).await,
                        None => break,
                    }
                }
                event = next_feed_event(&mut subscription) => {
                    match event {
                        Some(event) => self.handle_feed_event(event).await,
                        None => {
                            log::warn!("Notification channel task stopped");
                            subscription = None;
                            self.emit(SyncEvent::ChannelOffline).await;
                        }
                    }
                }
            }
        }

        log::info!("Sync event loop stopped");
    }

    async fn handle_command(
        &mut self,
        command: SyncCommand,
        subscription: &mut Option<Subscription>,
    ) {
        match command {
            SyncCommand::SetAuthor(name) => self.handle_set_author(name, subscription).await,
            SyncCommand::Submit(content) => self.handle_submit(content).await,
        }
    }

    async fn handle_set_author(&mut self, name: String, subscription: &mut Option<Subscription>) {
        let name = name.trim().to_string();
        if name.is_empty() {
            log::warn!("Ignoring empty username");
            return;
        }
        if self.author.is_some() {
            log::warn!("Username already set; ignoring SetAuthor command");
            return;
        }
        log::info!("Joining chat as {name}");
        self.author = Some(name);

        // Subscribe trước rồi mới load: hàng insert trong lúc load đang
        // chạy sẽ tới như sự kiện, bước merge tự khử phần trùng.
        match self.feed.subscribe().await {
            Ok(active) => *subscription = Some(active),
            Err(err) => {
                log::error!("Failed to join notification channel: {err}");
                self.emit(SyncEvent::ChannelOffline).await;
            }
        }

        self.load_history().await;
    }

    async fn load_history(&mut self) {
        match self.store.fetch_all().await {
            Ok(rows) => {
                let added = self.timeline.absorb_history(rows);
                log::info!(
                    "Loaded history: {} messages ({added} new)",
                    self.timeline.len()
                );
                self.emit(SyncEvent::HistorySynced(self.timeline.entries().to_vec()))
                    .await;
            }
            Err(err) => {
                log::error!("Failed to load message history: {err}");
            }
        }
    }

    async fn handle_submit(&mut self, content: String) {
        let content = content.trim().to_string();
        if content.is_empty() {
            return;
        }
        let Some(author) = self.author.clone() else {
            log::warn!("Dropping Submit command before username is set");
            return;
        };

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            username: author,
            content,
            created_at: self.timeline.next_stamp(Utc::now()),
        };

        if self.timeline.append_local(message.clone()) {
            self.emit(SyncEvent::MessageAppended(message.clone())).await;
        }

        // Ghi nền: UI đã thấy tin rồi, lỗi ghi chỉ log lại.
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(err) = store.insert(&message).await {
                log::error!("Failed to persist message {}: {err}", message.id);
            }
        });
    }

    async fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Inserted(message) => {
                if self.timeline.merge_remote(message.clone()) {
                    self.emit(SyncEvent::MessageAppended(message)).await;
                } else {
                    log::debug!("Skipping duplicate row {}", message.id);
                }
            }
            FeedEvent::Live => self.emit(SyncEvent::ChannelLive).await,
            FeedEvent::Lost => self.emit(SyncEvent::ChannelOffline).await,
        }
    }

    async fn emit(&self, event: SyncEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to notify UI: {err}");
        }
    }
}

async fn next_feed_event(subscription: &mut Option<Subscription>) -> Option<FeedEvent> {
    match subscription {
        Some(active) => active.recv().await,
        None => std::future::pending::<Option<FeedEvent>>().await,
    }
}
