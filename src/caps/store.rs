//! # Injected persisted integer store.
//!
//! The retry interval must survive process restarts, but the crate does not
//! pick a persistence mechanism: it consumes a [`RetryStore`] capability and
//! the hosting process decides where the values live (preferences file,
//! database row, env-backed config, ...).
//!
//! [`MemoryStore`] is the in-process reference implementation, sufficient
//! for tests and demos.

use std::collections::HashMap;
use std::sync::RwLock;

/// Persisted integer key-value store consumed by the backoff scheduler.
///
/// The scheduler uses a single key (`"retryInterval"`, milliseconds); the
/// interface stays generic so one store can serve several supervisors under
/// different keys.
pub trait RetryStore: Send + Sync + 'static {
    /// Returns the stored value for `key`, or `default` if absent.
    fn get(&self, key: &str, default: u64) -> u64;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: u64);
}

/// Process-local [`RetryStore`] for tests and demos. Nothing survives a
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, u64>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RetryStore for MemoryStore {
    fn get(&self, key: &str, default: u64) -> u64 {
        self.values
            .read()
            .expect("store lock poisoned")
            .get(key)
            .copied()
            .unwrap_or(default)
    }

    fn put(&self, key: &str, value: u64) {
        self.values
            .write()
            .expect("store lock poisoned")
            .insert(key.to_string(), value);
    }
}
