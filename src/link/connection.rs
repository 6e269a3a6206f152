//! # Connection: one socket, one worker, one terminal verdict.
//!
//! A [`Connection`] owns a single TCP socket for its whole life. A spawned
//! worker task performs the bounded connect and then parks on an unbounded
//! read; the control path reaches in only through [`Connection::send_probe`]
//! and [`Connection::abort`].
//!
//! ## State machine
//! ```text
//! Idle ──launch──► Connecting ──connect ok──► Connected ──EOF/error──► Closed(?)
//!                      │                                                  ▲
//!                      └──timeout/refused──► Closed(Failure)              │
//!                                                                         │
//!                abort() at any point: set aborted, drop writer, ─────────┘
//!                cancel token (verdict becomes Closed(Shutdown))
//! ```
//!
//! ## Shutdown vs. Failure
//! Whether the terminal state reports to the supervisor is decided by the
//! `aborted` flag, inspected under the same per-connection lock that
//! `abort()` takes to set it and close the handle:
//!
//! - flag already set → `Closed(Shutdown)`: a concurrent `abort()` claimed
//!   the socket; the worker exits silently (no reschedule).
//! - flag clear → the worker closes the handle itself, reaches
//!   `Closed(Failure)` and reports **exactly once** through the failure
//!   hook.
//!
//! Because flag and handle move together under one lock, a `stop()` racing
//! the read loop can never produce a double reschedule or a missed one.
//!
//! ## Unblocking the read
//! The read has no deadline. `abort()` unblocks it by cancelling the
//! worker's [`CancellationToken`], which the worker races against the read
//! future — the async-runtime equivalent of closing a handle under a
//! blocking read.
//!
//! Inbound bytes are discarded: the read loop is purely a liveness/EOF
//! detector.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::LinkError;
use crate::events::{Bus, Event, EventKind};
use crate::link::state::{CloseReason, LinkState};

/// Liveness probe payload, written verbatim on each probe trigger.
pub const PROBE: &[u8] = b"NOOP\n";

/// Invoked by the worker when the connection reaches `Closed(Failure)`.
/// Carries the connection's generation so stale reports can be discarded.
pub(crate) type FailureHook = Arc<dyn Fn(u64) + Send + Sync>;

/// Socket side shared between the worker and the control path.
struct Io {
    /// Write half of the socket; `None` until connected and after close.
    writer: Option<OwnedWriteHalf>,
    /// Set by whichever side closes the socket first.
    aborted: bool,
}

/// Handle to one supervised connection.
///
/// Created by the supervisor; the worker runs until the connection reaches
/// a terminal [`LinkState::Closed`]. Never reused.
pub struct Connection {
    endpoint: Arc<str>,
    generation: u64,
    io: Arc<Mutex<Io>>,
    token: CancellationToken,
    state_rx: watch::Receiver<LinkState>,
}

impl Connection {
    /// Spawns the worker for one connect-and-read lifecycle.
    pub(crate) fn launch(
        endpoint: impl Into<Arc<str>>,
        connect_timeout: Duration,
        generation: u64,
        bus: Bus,
        on_failure: FailureHook,
    ) -> Self {
        let endpoint: Arc<str> = endpoint.into();
        let (state_tx, state_rx) = watch::channel(LinkState::Idle);
        let io = Arc::new(Mutex::new(Io {
            writer: None,
            aborted: false,
        }));
        let token = CancellationToken::new();

        let worker = Worker {
            endpoint: endpoint.clone(),
            connect_timeout,
            generation,
            io: io.clone(),
            token: token.clone(),
            state: state_tx,
            bus,
            on_failure,
        };
        tokio::spawn(worker.run());

        Self {
            endpoint,
            generation,
            io,
            token,
            state_rx,
        }
    }

    /// Remote endpoint this connection dials.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LinkState {
        *self.state_rx.borrow()
    }

    /// Watch channel over the lifecycle state, for awaiting transitions.
    pub fn watch_state(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Writes the liveness probe on the open socket.
    ///
    /// A no-op `Ok` while no write half is installed (still connecting, or
    /// already closed). I/O errors surface to the caller, which must treat
    /// them as non-fatal to the connection.
    pub async fn send_probe(&self) -> Result<(), LinkError> {
        let mut io = self.io.lock().await;
        match io.writer.as_mut() {
            Some(writer) => writer
                .write_all(PROBE)
                .await
                .map_err(|source| LinkError::Probe { source }),
            None => Ok(()),
        }
    }

    /// Aborts the connection: marks it closed, drops the write half, and
    /// cancels the worker's token to unblock the read. Idempotent, safe
    /// against the worker's own teardown.
    pub async fn abort(&self) {
        let mut io = self.io.lock().await;
        io.aborted = true;
        io.writer = None;
        // Cancelled while the lock is held, so the worker cannot observe
        // the token before the flag.
        self.token.cancel();
    }
}

/// The spawned half: connect, read, classify, report.
struct Worker {
    endpoint: Arc<str>,
    connect_timeout: Duration,
    generation: u64,
    io: Arc<Mutex<Io>>,
    token: CancellationToken,
    state: watch::Sender<LinkState>,
    bus: Bus,
    on_failure: FailureHook,
}

impl Worker {
    async fn run(self) {
        let _ = self.state.send(LinkState::Connecting);
        self.bus.publish(
            Event::new(EventKind::Connecting).with_endpoint(self.endpoint.clone()),
        );

        let outcome = tokio::select! {
            res = self.establish_and_read() => res,
            _ = self.token.cancelled() => Ok(()),
        };

        // Terminal verdict. Flag check and handle close happen under the
        // same lock abort() takes, so exactly one side closes the socket.
        let aborted = {
            let mut io = self.io.lock().await;
            if io.aborted {
                true
            } else {
                io.aborted = true;
                io.writer = None;
                false
            }
        };

        if aborted {
            let _ = self.state.send(LinkState::Closed(CloseReason::Shutdown));
            self.bus.publish(
                Event::new(EventKind::LinkClosed).with_endpoint(self.endpoint.clone()),
            );
        } else {
            let reason = outcome
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "worker exited".to_string());
            let _ = self.state.send(LinkState::Closed(CloseReason::Failure));
            self.bus.publish(
                Event::new(EventKind::LinkDown)
                    .with_endpoint(self.endpoint.clone())
                    .with_reason(reason),
            );
            (self.on_failure)(self.generation);
        }
    }

    /// Bounded connect, writer installation, then the unbounded read.
    ///
    /// Returns `Ok` only when a concurrent abort claimed the socket before
    /// the writer was installed; every other exit is an error describing
    /// why the connection died.
    async fn establish_and_read(&self) -> Result<(), LinkError> {
        let dial = TcpStream::connect(self.endpoint.as_ref());
        let stream = match time::timeout(self.connect_timeout, dial).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(LinkError::Connect { source }),
            Err(_) => {
                return Err(LinkError::ConnectTimeout {
                    timeout: self.connect_timeout,
                });
            }
        };

        let (mut reader, writer) = stream.into_split();
        {
            let mut io = self.io.lock().await;
            if io.aborted {
                return Ok(());
            }
            io.writer = Some(writer);
        }

        let _ = self.state.send(LinkState::Connected);
        self.bus.publish(
            Event::new(EventKind::Established).with_endpoint(self.endpoint.clone()),
        );

        // Inbound bytes carry no protocol; only EOF and errors matter.
        let mut buf = [0u8; 1024];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => return Err(LinkError::PeerClosed),
                Ok(_) => {}
                Err(source) => return Err(LinkError::Read { source }),
            }
        }
    }
}
