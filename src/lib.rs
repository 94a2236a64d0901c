//! Realtime chat client backed by a shared remote message log.
//!
//! The heart of the crate is [`sync::Synchronizer`]: it owns the session's
//! ordered, duplicate-free message sequence. Everything that can change the
//! sequence goes through its merge path, from the initial history load down
//! to single live insert notifications and locally submitted messages. The
//! egui presentation layer in [`ui`] only mirrors that sequence and forwards
//! user intents over a command channel.

pub mod common;
pub mod config;
pub mod remote;
pub mod sync;
pub mod ui;
