//! Capability interfaces the supervisor consumes, with reference
//! implementations.
//!
//! The core never talks to a clock or a disk directly; both concerns are
//! injected:
//! - [`TimerCapability`] — periodic/one-shot wake source
//!   ([`TokioTimer`] is the production impl);
//! - [`RetryStore`] — persisted integer store for the retry interval
//!   ([`MemoryStore`] is the in-process reference impl).

mod store;
mod timer;

pub use store::{MemoryStore, RetryStore};
pub use timer::{TimerCallback, TimerCapability, TimerHandle, TokioTimer};
