//! # Event observers.
//!
//! This module provides the [`Observer`] trait and the built-in stdout
//! [`LogWriter`].
//!
//! ```text
//! Supervisor / worker ── publish(Event) ──► Bus ──► observer listener
//!                                                        │
//!                                                  ┌─────┴─────┐
//!                                                  ▼           ▼
//!                                              LogWriter    custom...
//! ```

mod log;
mod observer;

pub use log::LogWriter;
pub use observer::Observer;
