//! # Store-backed backoff scheduling.
//!
//! [`BackoffScheduler`] wires [`RetryPolicy`] to the injected
//! [`RetryStore`]: each reschedule reads the current interval, applies the
//! grow-or-reset decision, and persists the result **before** it is used to
//! arm the one-shot restart — so a process restart in between resumes with
//! the right delay.

use std::sync::Arc;
use std::time::Duration;

use crate::caps::RetryStore;
use crate::retry::RetryPolicy;

/// Store key under which the retry interval is persisted (milliseconds).
pub const RETRY_INTERVAL_KEY: &str = "retryInterval";

/// Computes and persists the delay before the next connect attempt.
pub struct BackoffScheduler {
    policy: RetryPolicy,
    store: Arc<dyn RetryStore>,
}

impl BackoffScheduler {
    /// Creates a scheduler over the given policy and store.
    pub fn new(policy: RetryPolicy, store: Arc<dyn RetryStore>) -> Self {
        Self { policy, store }
    }

    /// Returns the currently persisted interval, clamped into the policy
    /// bounds. Absent key reads as `policy.initial`.
    pub fn current(&self) -> Duration {
        let stored = self
            .store
            .get(RETRY_INTERVAL_KEY, self.policy.initial.as_millis() as u64);
        self.policy.clamp(Duration::from_millis(stored))
    }

    /// Recomputes the interval after a failed connection that lived for
    /// `connected_for`, persists it, and returns it.
    pub fn reschedule(&self, connected_for: Duration) -> Duration {
        let next = self.policy.next(connected_for, self.current());
        self.store.put(RETRY_INTERVAL_KEY, next.as_millis() as u64);
        next
    }
}
