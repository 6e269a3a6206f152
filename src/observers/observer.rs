//! # Observer trait for lifecycle events.
//!
//! An [`Observer`] receives every event published on the bus, in order, from
//! the supervisor's listener task. Implementations should return quickly:
//! they run sequentially on the listener, and a slow observer delays the
//! ones after it (and can eventually lag the bus).

use async_trait::async_trait;

use crate::events::Event;

/// Receives lifecycle events (logging, metrics, alerting, test capture).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tether::{Event, EventKind, Observer};
///
/// struct FailureCounter;
///
/// #[async_trait]
/// impl Observer for FailureCounter {
///     async fn handle(&self, event: &Event) {
///         if event.kind == EventKind::LinkDown {
///             // increment a counter
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    /// Handles one event.
    async fn handle(&self, event: &Event);
}
