//! # Reconnect backoff policy.
//!
//! [`RetryPolicy`] decides the delay before the next connect attempt from
//! two inputs: how long the previous connection lived, and the current
//! persisted interval.
//!
//! A connection that dies faster than the current interval points at a
//! persistently unreachable endpoint, so the interval grows geometrically
//! (× [`RetryPolicy::growth`], capped at [`RetryPolicy::max`]). A
//! connection that outlives the current interval counts as recovery and
//! resets the interval to [`RetryPolicy::initial`].
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use tether::RetryPolicy;
//!
//! let policy = RetryPolicy::default();
//!
//! // Died after 1s with the interval at its 5s default: grow tenfold.
//! let next = policy.next(Duration::from_secs(1), Duration::from_secs(5));
//! assert_eq!(next, Duration::from_secs(50));
//!
//! // Survived past the interval: back to the fast initial retry.
//! let next = policy.next(Duration::from_secs(60), Duration::from_secs(50));
//! assert_eq!(next, Duration::from_secs(5));
//! ```

use std::time::Duration;

/// Grow-or-reset parameters for the reconnect delay.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Delay after a connection that lived long enough (also the floor).
    pub initial: Duration,
    /// Cap on the grown delay.
    pub max: Duration,
    /// Multiplicative growth factor applied on fast failures.
    pub growth: u32,
}

impl Default for RetryPolicy {
    /// Reference parameters: `initial = 5s`, `max = 120s`, `growth = 10`.
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(5),
            max: Duration::from_secs(120),
            growth: 10,
        }
    }
}

impl RetryPolicy {
    /// Computes the next delay from the lifetime of the previous connection
    /// and the current interval.
    ///
    /// `connected_for < current` → `min(current × growth, max)`; otherwise
    /// the policy resets to `initial`.
    pub fn next(&self, connected_for: Duration, current: Duration) -> Duration {
        if connected_for < current {
            (current * self.growth).min(self.max)
        } else {
            self.initial
        }
    }

    /// Clamps a stored interval into `[initial, max]`.
    ///
    /// Values outside the bounds can only come from an outside writer to
    /// the store; the invariant `initial ≤ interval ≤ max` is restored on
    /// read.
    pub fn clamp(&self, interval: Duration) -> Duration {
        interval.clamp(self.initial, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_fast_failure_grows_tenfold() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next(ms(100), ms(5000)), ms(50_000));
    }

    #[test]
    fn test_growth_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next(ms(100), ms(50_000)), ms(120_000));
        assert_eq!(policy.next(ms(100), ms(120_000)), ms(120_000));
    }

    #[test]
    fn test_reference_sequence_from_default() {
        let policy = RetryPolicy::default();
        let mut current = ms(5000);
        let mut seen = Vec::new();
        for _ in 0..4 {
            current = policy.next(ms(1), current);
            seen.push(current.as_millis() as u64);
        }
        assert_eq!(seen, vec![50_000, 120_000, 120_000, 120_000]);
    }

    #[test]
    fn test_survival_resets_to_initial() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next(ms(120_000), ms(120_000)), ms(5000));
        assert_eq!(policy.next(ms(5000), ms(5000)), ms(5000));
    }

    #[test]
    fn test_boundary_elapsed_equal_to_current_resets() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next(ms(50_000), ms(50_000)), ms(5000));
    }

    #[test]
    fn test_clamp_restores_bounds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.clamp(ms(1)), ms(5000));
        assert_eq!(policy.clamp(ms(500_000)), ms(120_000));
        assert_eq!(policy.clamp(ms(50_000)), ms(50_000));
    }
}
