//! Connection registry and broadcast fan-out.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::event::StoreEvent;

/// Per-connection event buffer size used by [`NotificationHub::subscribe`].
///
/// A connection that falls this many undelivered events behind is considered
/// dead and evicted on the next broadcast.
pub const EVENT_BUFFER: usize = 16;

/// Opaque handle identifying one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why an event could not be handed to a connection.
///
/// Delivery failures are terminal for the connection (it is unregistered on
/// the spot) but never propagate to the broadcast caller.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The receiving end of the connection channel was dropped.
    #[error("connection {0} is closed")]
    Closed(ConnectionId),

    /// The connection's event buffer is full; the client is not keeping up.
    #[error("connection {0} has a full event buffer")]
    Backlogged(ConnectionId),
}

struct HubInner {
    connections: Mutex<BTreeMap<ConnectionId, mpsc::Sender<StoreEvent>>>,
    next_id: AtomicU64,
}

/// Registry of live client connections with best-effort broadcast.
///
/// Registration and removal never contend with the order engine's lock, and
/// [`broadcast`](NotificationHub::broadcast) never blocks: each send is a
/// `try_send` into the connection's bounded buffer, so a stalled client
/// cannot hold up a checkout. Events broadcast by sequential commits reach
/// every surviving connection in commit order.
///
/// Cloning the hub is cheap and shares the same registry.
#[derive(Clone)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl NotificationHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                connections: Mutex::new(BTreeMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Registers an event sender and returns its connection handle.
    pub fn register(&self, sender: mpsc::Sender<StoreEvent>) -> ConnectionId {
        let id = ConnectionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut connections = self.lock_connections();
        connections.insert(id, sender);
        metrics::gauge!("websocket_active_connections").set(connections.len() as f64);
        tracing::debug!(connection = %id, total = connections.len(), "connection registered");
        id
    }

    /// Creates a bounded event channel, registers its sender, and returns the
    /// receiving half together with the connection handle.
    pub fn subscribe(&self) -> (ConnectionId, mpsc::Receiver<StoreEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        (self.register(tx), rx)
    }

    /// Removes a connection. Removing an already-gone connection is a no-op.
    pub fn unregister(&self, id: ConnectionId) {
        let mut connections = self.lock_connections();
        if connections.remove(&id).is_some() {
            metrics::gauge!("websocket_active_connections").set(connections.len() as f64);
            tracing::debug!(connection = %id, total = connections.len(), "connection unregistered");
        }
    }

    /// Number of currently registered connections.
    pub fn connection_count(&self) -> usize {
        self.lock_connections().len()
    }

    /// Sends an event to every registered connection, in registration order.
    ///
    /// Connections whose channel is closed or whose buffer is full are
    /// evicted and the loop continues; the failure is logged and counted but
    /// never surfaced to the caller. Returns the number of successful sends.
    pub fn broadcast(&self, event: &StoreEvent) -> usize {
        let mut connections = self.lock_connections();
        let mut delivered: usize = 0;
        let mut evicted: Vec<(ConnectionId, DeliveryError)> = Vec::new();

        for (&id, sender) in connections.iter() {
            match sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Closed(_)) => evicted.push((id, DeliveryError::Closed(id))),
                Err(TrySendError::Full(_)) => evicted.push((id, DeliveryError::Backlogged(id))),
            }
        }

        for (id, reason) in &evicted {
            connections.remove(id);
            metrics::counter!("notifications_dropped_total").increment(1);
            tracing::warn!(connection = %id, %reason, "evicting connection after failed delivery");
        }
        if !evicted.is_empty() {
            metrics::gauge!("websocket_active_connections").set(connections.len() as f64);
        }

        metrics::counter!("notifications_sent_total").increment(delivered as u64);
        tracing::debug!(
            event = event.kind(),
            delivered,
            evicted = evicted.len(),
            "broadcast complete"
        );
        delivered
    }

    fn lock_connections(
        &self,
    ) -> std::sync::MutexGuard<'_, BTreeMap<ConnectionId, mpsc::Sender<StoreEvent>>> {
        // Never held across an await; a poisoned guard still holds valid data.
        self.inner
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
