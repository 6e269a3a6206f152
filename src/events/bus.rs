//! # Event bus for broadcasting link lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The
//! supervisor and the link worker publish from wherever they run; the
//! observer listener (and tests) subscribe.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or fails; with no
//!   receivers the event is dropped.
//! - **Bounded capacity**: one ring buffer holds the most recent events.
//! - **Lag handling**: a receiver that falls more than `capacity` events
//!   behind observes `RecvError::Lagged(n)` and skips the `n` oldest.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for lifecycle events.
///
/// Cheap to clone (holds an `Arc`-backed sender); every publisher keeps
/// its own clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// Fire-and-forget: if nobody is subscribed the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver observing subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
