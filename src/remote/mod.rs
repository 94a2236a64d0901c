pub mod feed;
pub mod protocol;
pub mod realtime;
pub mod rest;
pub mod store;

pub use feed::{ChangeFeed, ChannelError, FeedEvent, FeedGuard, Subscription};
pub use realtime::RealtimeFeed;
pub use rest::RestStore;
pub use store::{MessageStore, StoreError};
