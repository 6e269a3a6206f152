//! # tether
//!
//! **Tether** keeps a single long-lived TCP connection alive: it probes the
//! link on an externally driven timer, and when the link drops on its own
//! it reconnects with an exponential backoff that survives process
//! restarts.
//!
//! ## Architecture
//! ```text
//!                   ┌────────────────────────────────────────────────┐
//!                   │  Supervisor (control path, one mutex)          │
//!   start()/stop() ─►  - active: Option<Connection>                  │
//!                   │  - BackoffScheduler (RetryPolicy + RetryStore) │
//!                   │  - probe / retry timers (TimerCapability)      │
//!                   └───────┬──────────────────────────┬─────────────┘
//!                           │ launches                 │ publishes
//!                           ▼                          ▼
//!                   ┌──────────────────┐        ┌─────────────┐
//!                   │ Connection worker│        │     Bus     │
//!                   │ connect ─► read  │──────► │ (broadcast) │
//!                   └──────────────────┘        └──────┬──────┘
//!                                                      ▼
//!                                            observer listener
//!                                            ┌──────┴───────┐
//!                                            ▼              ▼
//!                                        LogWriter      custom...
//! ```
//!
//! ## Lifecycle
//! ```text
//! start() ─► Connection: Idle ─► Connecting ─► Connected ─► Closed(reason)
//!
//!   reason = Failure  (timeout, refused, EOF, read error)
//!     ├─► BackoffScheduler::reschedule(lived)
//!     │     fast death  ─► interval × 10, capped at max, persisted
//!     │     lived long  ─► reset to initial, persisted
//!     └─► TimerCapability::schedule_once(interval, start)
//!
//!   reason = Shutdown  (stop() aborted the link)
//!     └─► nothing: no report, no reschedule
//!
//! probe trigger (repeating, injected):
//!     link up   ─► write "NOOP\n"; write errors logged, never fatal
//!     link idle ─► trace no-op
//! ```
//!
//! The Shutdown/Failure verdict is decided under the per-connection lock by
//! whichever side closes the socket first — a link aborted by `stop()`
//! never retries; a link that dies on its own retries exactly once per
//! death.
//!
//! ## Capabilities
//! The supervisor consumes its environment through two injected interfaces:
//! [`TimerCapability`] (wake-ups; [`TokioTimer`] is the production impl)
//! and [`RetryStore`] (persisted retry interval; [`MemoryStore`] for
//! tests/demos).
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use tether::{Config, LogWriter, MemoryStore, Supervisor, TokioTimer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.host = "127.0.0.1".into();
//!     cfg.port = 5545;
//!
//!     let sup = Supervisor::new(
//!         cfg,
//!         Arc::new(TokioTimer),
//!         Arc::new(MemoryStore::new()),
//!         vec![Arc::new(LogWriter)],
//!     );
//!
//!     sup.start().await?;
//!     // ... the link now probes and reconnects on its own ...
//!     sup.stop().await?;
//!     Ok(())
//! }
//! ```

mod caps;
mod config;
mod error;
mod events;
mod link;
mod observers;
mod retry;

// ---- Public re-exports ----

pub use caps::{MemoryStore, RetryStore, TimerCallback, TimerCapability, TimerHandle, TokioTimer};
pub use config::Config;
pub use error::{ControlError, LinkError};
pub use events::{Bus, Event, EventKind};
pub use link::{CloseReason, Connection, LinkState, PROBE, Supervisor};
pub use observers::{LogWriter, Observer};
pub use retry::{BackoffScheduler, RETRY_INTERVAL_KEY, RetryPolicy};
