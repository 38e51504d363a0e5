//! The engine manager (component C11): owns the [`WorldLoop`], runs it on
//! a background thread at a configured cadence, and publishes the
//! latest [`Snapshot`] and [`EventLog`] for external readers.
//!
//! Styled after this workspace's usual operator control plane --
//! `start`/`pause`/`resume`/`stop` over atomics, plus a `single_step` for
//! driving the loop manually (tests, a debugger, a turn-based embedder)
//! without a background thread at all.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tickforge_events::EventLog;
use tickforge_world::{Snapshot, WorldState};

use crate::error::EngineError;
use crate::tick::{TickSummary, WorldLoop};

/// Reason a run ended and will not resume without a [`EngineManager::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// An operator issued a stop command; the world is left as-is.
    OperatorStop,
    /// A tick panicked on a broken invariant. The world at the moment of
    /// the panic is no longer trusted and is not published.
    InvariantViolation,
}

/// Coarse run state a reader can poll without touching the world lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// No background loop has ever run, or it was stopped cleanly.
    Idle,
    Running,
    Paused,
    /// Terminal: the world is frozen and `start` will refuse until
    /// [`EngineManager::reset`] rebuilds it.
    Stopped(SimulationEndReason),
}

/// Owns one simulation run's [`WorldLoop`] and the background thread
/// that advances it.
pub struct EngineManager {
    world_loop: Mutex<WorldLoop>,
    event_log: Arc<EventLog>,
    latest_snapshot: Mutex<Option<Snapshot>>,
    paused: AtomicBool,
    stop_requested: AtomicBool,
    fatal: AtomicBool,
    tick_interval_ms: AtomicU64,
    handle: Mutex<Option<JoinHandle<()>>>,
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl EngineManager {
    /// Builds a manager around `world_loop`, not yet running.
    #[must_use]
    pub fn new(world_loop: WorldLoop, tick_interval_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            world_loop: Mutex::new(world_loop),
            event_log: Arc::new(EventLog::new()),
            latest_snapshot: Mutex::new(None),
            paused: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            fatal: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            handle: Mutex::new(None),
            end_reason: Mutex::new(None),
        })
    }

    /// Starts the background tick loop at the current tick interval.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyRunning`] if a loop is already
    /// running, [`EngineError::InvariantViolationStopped`] if a prior
    /// tick panicked and the run has not been [`Self::reset`], or
    /// [`EngineError::WorkerLost`] if the control lock is poisoned by a
    /// prior panic.
    pub fn start(self: &Arc<Self>) -> Result<(), EngineError> {
        if self.fatal.load(Ordering::SeqCst) {
            return Err(EngineError::InvariantViolationStopped);
        }
        let Ok(mut handle) = self.handle.lock() else {
            return Err(EngineError::WorkerLost);
        };
        if handle.is_some() {
            return Err(EngineError::AlreadyRunning);
        }
        self.stop_requested.store(false, Ordering::SeqCst);
        let manager = Arc::clone(self);
        *handle = Some(std::thread::spawn(move || manager.run_loop()));
        Ok(())
    }

    /// Requests the background loop stop, then joins it. Blocks until
    /// the thread notices the stop flag, which happens between ticks.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRunning`] if no loop is running, or
    /// [`EngineError::WorkerLost`] if the background thread panicked.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.stop_requested.store(true, Ordering::SeqCst);
        let Ok(mut handle) = self.handle.lock() else {
            return Err(EngineError::WorkerLost);
        };
        let Some(thread) = handle.take() else {
            return Err(EngineError::NotRunning);
        };
        thread.join().map_err(|_| EngineError::WorkerLost)
    }

    /// Pauses the background loop in place; it keeps running but skips
    /// ticks until [`Self::resume`] is called.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.lock().is_ok_and(|handle| handle.is_some())
    }

    /// The current coarse run state, including the terminal reason once
    /// a run has stopped.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        if let Some(reason) = self.end_reason.lock().ok().and_then(|guard| guard.clone()) {
            return EngineStatus::Stopped(reason);
        }
        if !self.is_running() {
            return EngineStatus::Idle;
        }
        if self.is_paused() {
            EngineStatus::Paused
        } else {
            EngineStatus::Running
        }
    }

    pub fn set_tick_interval_ms(&self, ms: u64) {
        self.tick_interval_ms.store(ms, Ordering::SeqCst);
    }

    #[must_use]
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::SeqCst)
    }

    /// Runs exactly one tick synchronously. Intended for manual stepping
    /// (tests, a debugger, a turn-based embedder) while the background
    /// loop is not running; driving both at once would have them contend
    /// for the same lock, which the spec treats as misuse rather than
    /// something to silently tolerate.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RunningInBackground`] if the background
    /// loop is currently running, [`EngineError::InvariantViolationStopped`]
    /// if a prior tick panicked and the run has not been [`Self::reset`],
    /// [`EngineError::WorkerLost`] if the world lock is poisoned, or
    /// [`EngineError::Tick`] if the tick itself failed.
    pub fn single_step(&self) -> Result<TickSummary, EngineError> {
        if self.is_running() {
            return Err(EngineError::RunningInBackground);
        }
        if self.fatal.load(Ordering::SeqCst) {
            return Err(EngineError::InvariantViolationStopped);
        }
        let Ok(mut world_loop) = self.world_loop.lock() else {
            return Err(EngineError::WorkerLost);
        };
        let summary = self.step_guarded(&mut world_loop)?;
        self.event_log.push_batch(summary.events.clone());
        self.publish_snapshot(&world_loop);
        Ok(summary)
    }

    /// Replaces the live world and clears the event log, published
    /// snapshot, and any fatal status, for restarting a run from the same
    /// seed. Only valid while the background loop is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyRunning`] if the background loop is
    /// currently running.
    pub fn reset(&self, world: WorldState) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::AlreadyRunning);
        }
        let Ok(mut world_loop) = self.world_loop.lock() else {
            return Err(EngineError::WorkerLost);
        };
        world_loop.replace_world(world);
        drop(world_loop);
        self.event_log.clear();
        if let Ok(mut latest) = self.latest_snapshot.lock() {
            *latest = None;
        }
        if let Ok(mut reason) = self.end_reason.lock() {
            *reason = None;
        }
        self.fatal.store(false, Ordering::SeqCst);
        self.stop_requested.store(false, Ordering::SeqCst);
        Ok(())
    }

    #[must_use]
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Returns the most recently published snapshot, if any tick has
    /// run yet.
    #[must_use]
    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        self.latest_snapshot.lock().ok().and_then(|latest| latest.clone())
    }

    fn run_loop(self: Arc<Self>) {
        loop {
            if self.stop_requested.load(Ordering::SeqCst) {
                return;
            }
            if self.paused.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(20));
                continue;
            }
            self.run_one_tick();
            if self.fatal.load(Ordering::SeqCst) {
                return;
            }
            std::thread::sleep(Duration::from_millis(self.tick_interval_ms()));
        }
    }

    fn run_one_tick(&self) {
        let Ok(mut world_loop) = self.world_loop.lock() else {
            return;
        };
        match self.step_guarded(&mut world_loop) {
            Ok(summary) => {
                self.event_log.push_batch(summary.events);
                self.publish_snapshot(&world_loop);
            }
            Err(EngineError::InvariantViolationStopped) => {}
            Err(error) => {
                tracing::error!(%error, "world loop tick failed");
            }
        }
    }

    /// Runs one tick behind a panic boundary. A caught panic is treated
    /// as the invariant violation the spec's error taxonomy calls for: it
    /// is logged, the run is marked fatally stopped, and no snapshot for
    /// that tick is published. The world lock is not held across the
    /// `catch_unwind` by the caller beyond this call, so a poisoned
    /// `WorldLoop` never blocks later reads of `status`.
    fn step_guarded(&self, world_loop: &mut WorldLoop) -> Result<TickSummary, EngineError> {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| world_loop.step())) {
            Ok(Ok(summary)) => Ok(summary),
            Ok(Err(tick_error)) => Err(tick_error.into()),
            Err(payload) => {
                self.fail(&payload);
                Err(EngineError::InvariantViolationStopped)
            }
        }
    }

    /// Records a fatal stop: logs the panic payload, latches the run as
    /// stopped, and requests the background loop (if any) to exit.
    fn fail(&self, payload: &(dyn std::any::Any + Send)) {
        let message = panic_message(payload);
        tracing::error!(panic = %message, "tick panicked on an invariant violation; engine stopped");
        if let Ok(mut reason) = self.end_reason.lock() {
            *reason = Some(SimulationEndReason::InvariantViolation);
        }
        self.fatal.store(true, Ordering::SeqCst);
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    fn publish_snapshot(&self, world_loop: &WorldLoop) {
        let Ok(mut latest) = self.latest_snapshot.lock() else {
            return;
        };
        let grid = Arc::new(world_loop.world().grid.clone());
        *latest = Some(Snapshot::build(world_loop.world(), grid));
    }
}

/// Best-effort rendering of a `catch_unwind` payload; panics carry either
/// a `&'static str` or a `String` in the overwhelming majority of cases.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
