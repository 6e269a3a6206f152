//! Lifecycle events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! Publishers: [`Supervisor`](crate::Supervisor) (control surface, probe
//! and retry paths) and the connection worker (connect/read outcomes).
//! Consumer: the supervisor's observer listener, which forwards each event
//! to every registered [`Observer`](crate::Observer).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
