//! Notification bus for the store engine.
//!
//! Tracks live client connections and fans typed [`StoreEvent`]s out to them
//! on a best-effort basis: a slow or disconnected client is evicted, never
//! waited on, and never fails the sender.

pub mod event;
pub mod hub;

pub use event::StoreEvent;
pub use hub::{ConnectionId, DeliveryError, EVENT_BUFFER, NotificationHub};
