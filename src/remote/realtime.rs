use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::RemoteConfig;

use super::feed::{ChangeFeed, ChannelError, FeedEvent, FeedGuard, Subscription};
use super::protocol::{Frame, MESSAGES_TOPIC};

const JOIN_TIMEOUT: Duration = Duration::from_secs(10);
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const RECONNECT_DELAY: Duration = Duration::from_secs(3);
const EVENT_BUFFER: usize = 256;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Link {
    writer: SplitSink<WsStream, Message>,
    reader: SplitStream<WsStream>,
    next_ref: u64,
}

impl Link {
    fn next_reference(&mut self) -> u64 {
        self.next_ref += 1;
        self.next_ref
    }

    async fn send(&mut self, frame: &Frame) -> Result<(), ChannelError> {
        let text = match frame.encode() {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Failed to encode outgoing frame: {err}");
                return Ok(());
            }
        };
        self.writer.send(Message::Text(text.into())).await?;
        Ok(())
    }
}

async fn establish(url: &str) -> Result<Link, ChannelError> {
    let (stream, _response) = connect_async(url).await?;
    let (writer, reader) = stream.split();
    let mut link = Link {
        writer,
        reader,
        next_ref: 0,
    };

    let join_ref = link.next_reference();
    link.send(&Frame::join(join_ref)).await?;

    match timeout(JOIN_TIMEOUT, wait_for_join_reply(&mut link, join_ref)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ChannelError::JoinRejected(
                "join reply timed out".to_string(),
            ));
        }
    }
    Ok(link)
}

async fn wait_for_join_reply(link: &mut Link, join_ref: u64) -> Result<(), ChannelError> {
    while let Some(message) = link.reader.next().await {
        let message = message?;
        let Some(text) = frame_text(&message) else {
            continue;
        };
        let frame = match Frame::decode(text) {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("Ignoring undecodable frame during join: {err}");
                continue;
            }
        };
        if !frame.is_reply_to(join_ref) {
            continue;
        }
        if frame.reply_status_ok() {
            return Ok(());
        }
        return Err(ChannelError::JoinRejected(frame.payload.to_string()));
    }
    Err(ChannelError::Dropped)
}

fn frame_text(message: &Message) -> Option<&str> {
    match message {
        Message::Text(text) => Some(text.as_str()),
        _ => None,
    }
}

async fn handle_frame(text: &str, events: &mpsc::Sender<FeedEvent>) -> bool {
    let frame = match Frame::decode(text) {
        Ok(frame) => frame,
        Err(err) => {
            log::debug!("Ignoring undecodable frame: {err}");
            return true;
        }
    };

    if let Some(message) = frame.inserted_row() {
        if events.send(FeedEvent::Inserted(message)).await.is_err() {
            // Subscription đã bị drop, dừng task.
            return false;
        }
    }
    true
}

async fn recover(
    url: &str,
    events: &mpsc::Sender<FeedEvent>,
    shutdown: &mut oneshot::Receiver<()>,
) -> Option<Link> {
    let _ = events.send(FeedEvent::Lost).await;
    loop {
        tokio::select! {
            _ = sleep(RECONNECT_DELAY) => {}
            _ = &mut *shutdown => return None,
        }
        match establish(url).await {
            Ok(link) => {
                let _ = events.send(FeedEvent::Live).await;
                return Some(link);
            }
            Err(err) => log::warn!("Reconnect attempt failed: {err}"),
        }
    }
}

async fn pump(
    mut link: Link,
    url: String,
    events: mpsc::Sender<FeedEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let _ = events.send(FeedEvent::Live).await;

    let mut heartbeat = interval(HEARTBEAT_INTERVAL);
    // Tick đầu tiên trả về ngay, bỏ qua để khỏi gửi heartbeat sớm.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                let leave_ref = link.next_reference();
                if let Err(err) = link.send(&Frame::leave(leave_ref)).await {
                    log::debug!("Failed to send leave frame: {err}");
                }
                let _ = link.writer.close().await;
                log::info!("Notification channel closed");
                return;
            }
            _ = heartbeat.tick() => {
                let reference = link.next_reference();
                if let Err(err) = link.send(&Frame::heartbeat(reference)).await {
                    log::warn!("Heartbeat failed ({err}); reconnecting");
                    match recover(&url, &events, &mut shutdown).await {
                        Some(next) => link = next,
                        None => return,
                    }
                }
            }
            incoming = link.reader.next() => {
                match incoming {
                    Some(Ok(message)) => {
                        if let Some(text) = frame_text(&message) {
                            if !handle_frame(text, &events).await {
                                return;
                            }
                        } else if matches!(message, Message::Close(_)) {
                            log::warn!("Server closed the notification channel; reconnecting");
                            match recover(&url, &events, &mut shutdown).await {
                                Some(next) => link = next,
                                None => return,
                            }
                        }
                    }
                    Some(Err(err)) => {
                        log::warn!("Notification channel error ({err}); reconnecting");
                        match recover(&url, &events, &mut shutdown).await {
                            Some(next) => link = next,
                            None => return,
                        }
                    }
                    None => {
                        log::warn!("Notification channel ended; reconnecting");
                        match recover(&url, &events, &mut shutdown).await {
                            Some(next) => link = next,
                            None => return,
                        }
                    }
                }
            }
        }
    }
}

/// Kênh notification thật, nói giao thức Phoenix channel qua websocket.
pub struct RealtimeFeed {
    url: String,
}

impl RealtimeFeed {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            url: config.websocket_url(),
        }
    }
}

#[async_trait]
impl ChangeFeed for RealtimeFeed {
    async fn subscribe(&self) -> Result<Subscription, ChannelError> {
        let link = establish(&self.url).await?;
        log::info!("Joined notification channel {MESSAGES_TOPIC}");

        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(pump(link, self.url.clone(), event_tx, shutdown_rx));

        Ok(Subscription::new(event_rx, FeedGuard::new(shutdown_tx)))
    }
}
