//! # Lifecycle events emitted by the supervisor and the link worker.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (timestamp, endpoint, failure reason, retry delay). Everything the
//! original control flow would have written to a log — connection
//! established, link down, "waiting N ms before retrying", warnings on
//! misused start/stop — is expressed as an event on the bus, and observers
//! decide what to do with it.
//!
//! ## Ordering
//! Each event gets a globally unique, monotonically increasing `seq`.
//! Observers that receive events out of order can use `seq` to restore it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of link lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Link lifecycle ===
    /// A connect attempt is starting.
    ///
    /// Sets: `endpoint`.
    Connecting,

    /// The connect attempt succeeded; the read loop is running.
    ///
    /// Sets: `endpoint`.
    Established,

    /// The connection died on its own (connect timeout/failure, EOF, or
    /// read error) and a reschedule will follow.
    ///
    /// Sets: `endpoint`, `reason`.
    LinkDown,

    /// The connection was closed by a deliberate `stop()`. No retry follows.
    ///
    /// Sets: `endpoint`.
    LinkClosed,

    // === Probe path ===
    /// The liveness probe payload was written.
    ProbeSent,

    /// The probe write raised an I/O error; the supervisor swallowed it
    /// and left the connection untouched.
    ///
    /// Sets: `reason`.
    ProbeFailed,

    /// The probe trigger fired with no active link. Trace-level no-op.
    ProbeSkipped,

    // === Retry path ===
    /// The backoff was recomputed and a one-shot restart is armed.
    ///
    /// Sets: `delay_ms`.
    RetryScheduled,

    // === Control-surface warnings ===
    /// `start()` was called while a link is already active.
    StartIgnored,

    /// `stop()` was called with no active link.
    StopIgnored,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - remaining fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Remote endpoint (`host:port`), if applicable.
    pub endpoint: Option<Arc<str>>,
    /// Human-readable failure reason.
    pub reason: Option<Arc<str>>,
    /// Delay before the next connect attempt, in milliseconds.
    pub delay_ms: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next global sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            endpoint: None,
            reason: None,
            delay_ms: None,
        }
    }

    /// Attaches the remote endpoint.
    #[inline]
    pub fn with_endpoint(mut self, endpoint: impl Into<Arc<str>>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// True for the control-surface warning kinds.
    #[inline]
    pub fn is_warning(&self) -> bool {
        matches!(self.kind, EventKind::StartIgnored | EventKind::StopIgnored)
    }
}
