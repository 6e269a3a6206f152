//! # Connection lifecycle states.
//!
//! One connection walks `Idle → Connecting → Connected → Closed(reason)`
//! and never leaves `Closed`; the supervisor launches a fresh
//! [`Connection`](crate::Connection) for every attempt.
//!
//! The close reason is the whole point of the state machine: a
//! [`CloseReason::Failure`] triggers exactly one reschedule, a
//! [`CloseReason::Shutdown`] is silently discarded.

/// Why a connection reached [`LinkState::Closed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Deliberately aborted by `stop()`. No retry follows.
    Shutdown,
    /// Died on its own: connect timeout/failure, EOF, or read error.
    /// Triggers a reschedule.
    Failure,
}

/// Lifecycle state of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Created, worker not yet connecting.
    Idle,
    /// Connect attempt in flight (bounded by the configured timeout).
    Connecting,
    /// Connected; read loop parked on the socket.
    Connected,
    /// Terminal. The reason decides retry vs silence.
    Closed(CloseReason),
}

impl LinkState {
    /// True once the connection has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LinkState::Closed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_closed_is_terminal() {
        assert!(!LinkState::Idle.is_terminal());
        assert!(!LinkState::Connecting.is_terminal());
        assert!(!LinkState::Connected.is_terminal());
        assert!(LinkState::Closed(CloseReason::Shutdown).is_terminal());
        assert!(LinkState::Closed(CloseReason::Failure).is_terminal());
    }
}
