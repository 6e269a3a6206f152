//! # Supervisor: the control path over one keep-alive link.
//!
//! The [`Supervisor`] owns at most one live [`Connection`] and everything
//! around it: the event bus, the injected timer and store capabilities, and
//! the backoff scheduler.
//!
//! ## Control flow
//! ```text
//! start() ──► Connection::launch ──► worker: connect ──► read (parked)
//!    │                                          │
//!    └─► TimerCapability::schedule_repeating    │ EOF / error / timeout
//!            (probe trigger, every period)      ▼
//!                                     Closed(Failure) ── failure hook ──┐
//!                                                                       ▼
//!                              handle_link_failure(generation):
//!                                ├─ stale generation? drop report
//!                                ├─ clear active, cancel probe timer
//!                                ├─ delay = BackoffScheduler::reschedule(lived)
//!                                └─ TimerCapability::schedule_once(delay, start)
//!
//! stop() ──► cancel probe timer ──► Connection::abort() ──► worker exits
//!            (clears active first;     Closed(Shutdown), no report,
//!             never waits for the      no reschedule
//!             worker to unwind)
//! ```
//!
//! ## Rules
//! - One `Mutex<Control>` serialises `start`, `stop`, the probe tick and
//!   the failure handler; `active` and the timers are touched only under
//!   it.
//! - A failure report from a superseded connection (stale generation) is
//!   discarded: only the current connection may trigger a reschedule.
//! - Probe write errors are published and swallowed; they never tear the
//!   link down.
//! - Misused `start`/`stop` are warned no-ops ([`ControlError`]).

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, broadcast};

use crate::caps::{RetryStore, TimerCallback, TimerCapability, TimerHandle};
use crate::config::Config;
use crate::error::ControlError;
use crate::events::{Bus, Event, EventKind};
use crate::link::connection::{Connection, FailureHook};
use crate::link::state::LinkState;
use crate::observers::Observer;
use crate::retry::BackoffScheduler;

/// Serialised control state. Guarded by the supervisor mutex.
#[derive(Default)]
struct Control {
    /// The one non-terminal connection, if any.
    active: Option<Connection>,
    /// Handle on the repeating probe trigger while a link is up.
    probe_timer: Option<TimerHandle>,
    /// When the current connect attempt began; feeds the backoff decision.
    started_at: Option<Instant>,
    /// Bumped per launch; lets stale failure reports be recognised.
    generation: u64,
}

struct Inner {
    cfg: Config,
    bus: Bus,
    timer: Arc<dyn TimerCapability>,
    scheduler: BackoffScheduler,
    control: Mutex<Control>,
}

/// Control surface over one supervised link.
///
/// Cheap to clone; all clones share the same control state.
///
/// Must be created inside a tokio runtime (the observer listener and the
/// connection workers are spawned tasks).
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<Inner>,
}

impl Supervisor {
    /// Creates a supervisor over the given capabilities and observers.
    ///
    /// Nothing connects until [`Supervisor::start`] is called.
    pub fn new(
        cfg: Config,
        timer: Arc<dyn TimerCapability>,
        store: Arc<dyn RetryStore>,
        observers: Vec<Arc<dyn Observer>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        Self::observer_listener(&bus, observers);
        let scheduler = BackoffScheduler::new(cfg.retry, store);
        Self {
            inner: Arc::new(Inner {
                cfg,
                bus,
                timer,
                scheduler,
                control: Mutex::new(Control::default()),
            }),
        }
    }

    /// Forwards bus events to the observers, in order, from one task.
    fn observer_listener(bus: &Bus, observers: Vec<Arc<dyn Observer>>) {
        if observers.is_empty() {
            return;
        }
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        for obs in &observers {
                            obs.handle(&ev).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Subscribes to the lifecycle event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Launches a connection and arms the repeating probe trigger.
    ///
    /// With a link already active this is a warned no-op:
    /// [`EventKind::StartIgnored`] is published and
    /// [`ControlError::AlreadyActive`] returned, state untouched.
    pub async fn start(&self) -> Result<(), ControlError> {
        let mut ctl = self.inner.control.lock().await;
        if ctl.active.is_some() {
            self.inner.bus.publish(Event::new(EventKind::StartIgnored));
            return Err(ControlError::AlreadyActive);
        }

        ctl.generation += 1;
        ctl.started_at = Some(Instant::now());
        ctl.active = Some(Connection::launch(
            self.inner.cfg.endpoint(),
            self.inner.cfg.connect_timeout,
            ctl.generation,
            self.inner.bus.clone(),
            self.failure_hook(),
        ));
        ctl.probe_timer = Some(
            self.inner
                .timer
                .schedule_repeating(self.inner.cfg.probe_period, self.probe_callback()),
        );
        Ok(())
    }

    /// Cancels the probe trigger and aborts the active connection.
    ///
    /// Fire-and-forget: initiates the close and returns without waiting
    /// for the worker to unwind. The aborted worker reaches
    /// `Closed(Shutdown)` and never reschedules.
    ///
    /// With no active link this is a warned no-op:
    /// [`EventKind::StopIgnored`] plus [`ControlError::NotActive`]. A
    /// one-shot retry armed by an earlier failure stays armed.
    pub async fn stop(&self) -> Result<(), ControlError> {
        let mut ctl = self.inner.control.lock().await;
        let Some(conn) = ctl.active.take() else {
            self.inner.bus.publish(Event::new(EventKind::StopIgnored));
            return Err(ControlError::NotActive);
        };
        if let Some(probe) = ctl.probe_timer.take() {
            probe.cancel();
        }
        ctl.started_at = None;
        conn.abort().await;
        Ok(())
    }

    /// Probe-trigger handler, invoked on each repeating timer fire.
    ///
    /// Writes the probe on the active link; a write error is published as
    /// [`EventKind::ProbeFailed`] and swallowed. With no active link the
    /// tick is a trace-level [`EventKind::ProbeSkipped`].
    pub async fn probe(&self) {
        let ctl = self.inner.control.lock().await;
        match ctl.active.as_ref() {
            Some(conn) => match conn.send_probe().await {
                Ok(()) => self.inner.bus.publish(Event::new(EventKind::ProbeSent)),
                Err(e) => self.inner.bus.publish(
                    Event::new(EventKind::ProbeFailed).with_reason(e.to_string()),
                ),
            },
            None => self.inner.bus.publish(Event::new(EventKind::ProbeSkipped)),
        }
    }

    /// True while a connection is registered as active.
    pub async fn is_active(&self) -> bool {
        self.inner.control.lock().await.active.is_some()
    }

    /// State of the active connection, if any.
    pub async fn link_state(&self) -> Option<LinkState> {
        let ctl = self.inner.control.lock().await;
        ctl.active.as_ref().map(Connection::state)
    }

    /// Failure-path handler: reschedule and arm the deferred restart.
    async fn handle_link_failure(&self, generation: u64) {
        let mut ctl = self.inner.control.lock().await;
        let current = ctl.active.as_ref().map(Connection::generation);
        if current != Some(generation) {
            // Stale report: the connection was already stopped or replaced.
            return;
        }
        ctl.active = None;
        if let Some(probe) = ctl.probe_timer.take() {
            probe.cancel();
        }
        let lived = ctl
            .started_at
            .take()
            .map(|t| t.elapsed())
            .unwrap_or_default();

        let delay = self.inner.scheduler.reschedule(lived);
        self.inner
            .bus
            .publish(Event::new(EventKind::RetryScheduled).with_delay(delay));
        // The armed restart outlives this scope; its handle is dropped
        // uncancelled so the retry fires even if nobody keeps it.
        let _armed = self
            .inner
            .timer
            .schedule_once(delay, self.restart_callback());
    }

    fn failure_hook(&self) -> FailureHook {
        let sup = self.clone();
        Arc::new(move |generation| {
            let sup = sup.clone();
            tokio::spawn(async move {
                sup.handle_link_failure(generation).await;
            });
        })
    }

    fn probe_callback(&self) -> TimerCallback {
        let sup = self.clone();
        Arc::new(move || {
            let sup = sup.clone();
            tokio::spawn(async move {
                sup.probe().await;
            });
        })
    }

    fn restart_callback(&self) -> TimerCallback {
        let sup = self.clone();
        Arc::new(move || {
            let sup = sup.clone();
            tokio::spawn(async move {
                // A restart that lost the race to a manual start publishes
                // its own StartIgnored warning.
                let _ = sup.start().await;
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::time;
    use tokio_util::sync::CancellationToken;

    use crate::caps::MemoryStore;
    use crate::retry::{RETRY_INTERVAL_KEY, RetryPolicy};

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Hand-cranked timer: records every schedule, fires only on demand.
    #[derive(Default)]
    struct ManualTimer {
        repeating: StdMutex<Vec<(Duration, TimerCallback)>>,
        one_shot: StdMutex<Vec<(Duration, TimerCallback)>>,
    }

    impl ManualTimer {
        fn repeating_count(&self) -> usize {
            self.repeating.lock().unwrap().len()
        }

        fn one_shot_delays(&self) -> Vec<Duration> {
            self.one_shot.lock().unwrap().iter().map(|(d, _)| *d).collect()
        }

        fn fire_last_one_shot(&self) {
            let cb = self
                .one_shot
                .lock()
                .unwrap()
                .last()
                .map(|(_, cb)| cb.clone())
                .expect("no one-shot armed");
            cb();
        }
    }

    impl TimerCapability for ManualTimer {
        fn schedule_repeating(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
            self.repeating.lock().unwrap().push((period, callback));
            TimerHandle::new(CancellationToken::new())
        }

        fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
            self.one_shot.lock().unwrap().push((delay, callback));
            TimerHandle::new(CancellationToken::new())
        }
    }

    struct Fixture {
        sup: Supervisor,
        timer: Arc<ManualTimer>,
        store: Arc<MemoryStore>,
    }

    fn fixture(port: u16) -> Fixture {
        let cfg = Config {
            host: "127.0.0.1".into(),
            port,
            connect_timeout: Duration::from_secs(2),
            probe_period: Duration::from_secs(120),
            retry: RetryPolicy::default(),
            bus_capacity: 256,
        };
        let timer = Arc::new(ManualTimer::default());
        let store = Arc::new(MemoryStore::new());
        let sup = Supervisor::new(cfg, timer.clone(), store.clone(), Vec::new());
        Fixture { sup, timer, store }
    }

    async fn bind() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    async fn next_event(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
        time::timeout(TIMEOUT, async {
            loop {
                let ev = rx.recv().await.expect("bus closed");
                if ev.kind == kind {
                    return ev;
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("event {kind:?} not observed in time"))
    }

    #[tokio::test]
    async fn test_second_start_is_warned_noop() {
        let (listener, port) = bind().await;
        let f = fixture(port);
        let mut rx = f.sup.subscribe();

        f.sup.start().await.expect("first start");
        let _server = listener.accept().await.unwrap();

        assert_eq!(f.sup.start().await, Err(ControlError::AlreadyActive));
        next_event(&mut rx, EventKind::StartIgnored).await;
        assert!(f.sup.is_active().await);
        // The second start must not have armed a second probe trigger.
        assert_eq!(f.timer.repeating_count(), 1);
    }

    #[tokio::test]
    async fn test_stop_without_link_is_warned_noop() {
        let f = fixture(1);
        let mut rx = f.sup.subscribe();

        assert_eq!(f.sup.stop().await, Err(ControlError::NotActive));
        next_event(&mut rx, EventKind::StopIgnored).await;
        assert!(!f.sup.is_active().await);
    }

    #[tokio::test]
    async fn test_stop_suppresses_reschedule() {
        let (listener, port) = bind().await;
        let f = fixture(port);
        let mut rx = f.sup.subscribe();

        f.sup.start().await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();
        next_event(&mut rx, EventKind::Established).await;

        f.sup.stop().await.expect("stop");
        assert!(!f.sup.is_active().await);

        // The worker winds down on the shutdown path: the peer sees EOF,
        // the retry state is untouched, no one-shot restart is armed.
        let mut buf = [0u8; 8];
        let n = time::timeout(TIMEOUT, server.read(&mut buf))
            .await
            .expect("no EOF after stop")
            .unwrap();
        assert_eq!(n, 0);
        next_event(&mut rx, EventKind::LinkClosed).await;
        assert_eq!(f.store.get(RETRY_INTERVAL_KEY, 0), 0);
        assert!(f.timer.one_shot_delays().is_empty());
    }

    #[tokio::test]
    async fn test_failure_reschedules_once_and_persists() {
        // Learn a free port, then release it so the connect is refused.
        let (listener, port) = bind().await;
        drop(listener);
        let f = fixture(port);
        let mut rx = f.sup.subscribe();

        f.sup.start().await.unwrap();

        let ev = next_event(&mut rx, EventKind::RetryScheduled).await;
        // Insta-failure with the interval at its 5s default: grow tenfold.
        assert_eq!(ev.delay_ms, Some(50_000));
        assert_eq!(f.store.get(RETRY_INTERVAL_KEY, 0), 50_000);
        assert_eq!(f.timer.one_shot_delays(), vec![Duration::from_secs(50)]);
        assert!(!f.sup.is_active().await);
    }

    #[tokio::test]
    async fn test_armed_restart_starts_again() {
        let (listener, port) = bind().await;
        drop(listener);
        let f = fixture(port);
        let mut rx = f.sup.subscribe();

        f.sup.start().await.unwrap();
        next_event(&mut rx, EventKind::RetryScheduled).await;

        // Crank the armed one-shot: a fresh connect attempt begins.
        f.timer.fire_last_one_shot();
        next_event(&mut rx, EventKind::Connecting).await;
        next_event(&mut rx, EventKind::RetryScheduled).await;
        assert_eq!(f.store.get(RETRY_INTERVAL_KEY, 0), 120_000);
    }

    #[tokio::test]
    async fn test_probe_writes_payload_each_tick() {
        let (listener, port) = bind().await;
        let f = fixture(port);
        let mut rx = f.sup.subscribe();

        f.sup.start().await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();
        next_event(&mut rx, EventKind::Established).await;

        for _ in 0..3 {
            f.sup.probe().await;
        }
        let mut got = [0u8; 15];
        time::timeout(TIMEOUT, server.read_exact(&mut got))
            .await
            .expect("probes not received")
            .unwrap();
        assert_eq!(&got, b"NOOP\nNOOP\nNOOP\n");

        // Probing causes no state transition.
        assert_eq!(f.sup.link_state().await, Some(LinkState::Connected));
    }

    #[tokio::test]
    async fn test_probe_while_idle_is_traced_noop() {
        let f = fixture(1);
        let mut rx = f.sup.subscribe();

        f.sup.probe().await;
        next_event(&mut rx, EventKind::ProbeSkipped).await;
        assert!(!f.sup.is_active().await);
    }

    #[tokio::test]
    async fn test_stale_failure_report_is_discarded() {
        let (listener, port) = bind().await;
        let f = fixture(port);
        let mut rx = f.sup.subscribe();

        f.sup.start().await.unwrap();
        let _server = listener.accept().await.unwrap();
        next_event(&mut rx, EventKind::Established).await;

        // A report carrying a superseded generation must not disturb the
        // live link or the retry state.
        f.sup.handle_link_failure(0).await;
        assert!(f.sup.is_active().await);
        assert_eq!(f.store.get(RETRY_INTERVAL_KEY, 0), 0);
        assert!(f.timer.one_shot_delays().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_then_late_eof_never_double_reports() {
        let (listener, port) = bind().await;
        let f = fixture(port);
        let mut rx = f.sup.subscribe();

        f.sup.start().await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        next_event(&mut rx, EventKind::Established).await;

        // Stop and peer-close race: whatever order the worker observes,
        // the abort already claimed the socket, so only the shutdown
        // verdict is possible.
        f.sup.stop().await.unwrap();
        drop(server);

        next_event(&mut rx, EventKind::LinkClosed).await;
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(f.store.get(RETRY_INTERVAL_KEY, 0), 0);
        assert!(f.timer.one_shot_delays().is_empty());
    }
}
