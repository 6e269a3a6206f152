//! Error types used by the tether runtime.
//!
//! This module defines two error enums:
//!
//! - [`ControlError`] — caller-misuse conditions on the control surface
//!   (`start` / `stop`). The operation is a no-op; a warning event is
//!   published on the bus.
//! - [`LinkError`] — failures of the connection itself (connect, read,
//!   probe write). None of these are fatal to the hosting process: every
//!   one resolves into either the reschedule path or the silent-shutdown
//!   path.
//!
//! Both types provide `as_label()` for short stable identifiers in
//! logs/metrics.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// # Errors raised by the link worker and the probe path.
///
/// Connect-phase errors ([`LinkError::ConnectTimeout`], [`LinkError::Connect`])
/// and read-phase errors ([`LinkError::PeerClosed`], [`LinkError::Read`])
/// terminate the connection on the failure path and trigger a reschedule,
/// unless a concurrent abort already claimed the socket. Probe errors
/// ([`LinkError::Probe`]) are surfaced to the supervisor, which swallows
/// them and leaves the connection untouched.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LinkError {
    /// The connect attempt did not complete within the configured bound.
    #[error("connect timed out after {timeout:?}")]
    ConnectTimeout {
        /// The configured connect timeout that was exceeded.
        timeout: Duration,
    },

    /// The connect attempt failed outright (refused, unreachable, ...).
    #[error("connect failed: {source}")]
    Connect {
        #[source]
        source: io::Error,
    },

    /// The peer closed the connection (read returned end-of-stream).
    #[error("peer closed the connection")]
    PeerClosed,

    /// The read loop hit an I/O error with the socket still open.
    #[error("read failed: {source}")]
    Read {
        #[source]
        source: io::Error,
    },

    /// Writing the liveness probe failed.
    #[error("probe write failed: {source}")]
    Probe {
        #[source]
        source: io::Error,
    },
}

impl LinkError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LinkError::ConnectTimeout { .. } => "connect_timeout",
            LinkError::Connect { .. } => "connect_failed",
            LinkError::PeerClosed => "peer_closed",
            LinkError::Read { .. } => "read_failed",
            LinkError::Probe { .. } => "probe_failed",
        }
    }
}

/// # Caller-misuse conditions on the control surface.
///
/// `start` while a link is active, or `stop` while none is. Both are
/// no-ops for the supervisor state; the caller gets the error and a
/// warning event is published for observers.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ControlError {
    /// `start()` was called while a connection is already active.
    #[error("link is already active")]
    AlreadyActive,

    /// `stop()` was called with no active connection.
    #[error("no active link")]
    NotActive,
}

impl ControlError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ControlError::AlreadyActive => "already_active",
            ControlError::NotActive => "not_active",
        }
    }
}
