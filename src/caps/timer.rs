//! # Injected wake source: repeating and one-shot timers.
//!
//! The supervisor never owns a clock. Both wake-ups it needs — the
//! repeating probe trigger and the one-shot reconnect — come from a
//! [`TimerCapability`] passed in at construction, so hosting processes can
//! substitute whatever alarm service they have (and tests can substitute a
//! hand-cranked fake).
//!
//! [`TokioTimer`] is the production implementation: each schedule spawns a
//! task that races the delay against a [`CancellationToken`] carried by the
//! returned [`TimerHandle`].
//!
//! ## Rules
//! - Callbacks run on the timer's task; they must not block. The supervisor
//!   registers callbacks that spawn the real async handler.
//! - A [`TimerHandle`] cancels **explicitly**, never on drop: an armed
//!   reconnect must survive the scope that scheduled it.
//! - Cancelling an already-fired one-shot is a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Callback invoked on each timer fire.
pub type TimerCallback = Arc<dyn Fn() + Send + Sync>;

/// Abstract periodic/one-shot wake source consumed by the supervisor.
pub trait TimerCapability: Send + Sync + 'static {
    /// Arms a repeating timer: first fire after `period`, then every `period`.
    fn schedule_repeating(&self, period: Duration, callback: TimerCallback) -> TimerHandle;

    /// Arms a one-shot timer that fires once after `delay`.
    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancellation handle for a scheduled timer.
///
/// Dropping the handle does **not** cancel the timer.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Wraps a cancellation token controlling one scheduled timer.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Cancels the timer. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once [`TimerHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Production [`TimerCapability`] backed by the tokio time driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

impl TimerCapability for TokioTimer {
    fn schedule_repeating(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
        let token = CancellationToken::new();
        let fired = token.clone();
        tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = ticks.tick() => callback(),
                    _ = fired.cancelled() => break,
                }
            }
        });
        TimerHandle::new(token)
    }

    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let token = CancellationToken::new();
        let fired = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => callback(),
                _ = fired.cancelled() => {}
            }
        });
        TimerHandle::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counter_cb(counter: Arc<AtomicU32>) -> TimerCallback {
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_fires_once() {
        let count = Arc::new(AtomicU32::new(0));
        let _h = TokioTimer.schedule_once(Duration::from_millis(100), counter_cb(count.clone()));

        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1, "one-shot fired again");
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_cancel_prevents_fire() {
        let count = Arc::new(AtomicU32::new(0));
        let h = TokioTimer.schedule_once(Duration::from_millis(100), counter_cb(count.clone()));
        h.cancel();

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(h.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_fires_each_period() {
        let count = Arc::new(AtomicU32::new(0));
        let _h =
            TokioTimer.schedule_repeating(Duration::from_millis(100), counter_cb(count.clone()));

        time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_stops_on_cancel() {
        let count = Arc::new(AtomicU32::new(0));
        let h =
            TokioTimer.schedule_repeating(Duration::from_millis(100), counter_cb(count.clone()));

        time::sleep(Duration::from_millis(150)).await;
        h.cancel();
        let fired = count.load(Ordering::SeqCst);
        assert_eq!(fired, 1);

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), fired, "tick after cancel");
    }
}
