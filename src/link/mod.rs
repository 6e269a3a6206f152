//! The link core: connection lifecycle and its control path.
//!
//! Internal split:
//! - [`state`]: the `Idle → Connecting → Connected → Closed(reason)` enum;
//! - [`connection`]: one socket + worker, abort/failure disambiguation;
//! - [`supervisor`]: start/stop/probe control surface, reschedule wiring.

mod connection;
mod state;
mod supervisor;

pub use connection::{Connection, PROBE};
pub use state::{CloseReason, LinkState};
pub use supervisor::Supervisor;
