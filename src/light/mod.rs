//! The simulated traffic light.
//!
//! A [`TrafficLight`] owns its phase, a background thread that flips the
//! phase on a randomized timer, and a [`PhaseChannel`] every flip is
//! published to. Waiters block on a condition variable guarding the phase,
//! so every waiter observes every green phase.

mod config;
mod cycle;
mod error;

pub use config::{ConfigError, CycleConfig};
pub use error::LightError;

use crate::channel::PhaseChannel;
use crate::core::{Guard, Phase, PhaseTransition};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{error, info, trace, warn};
use uuid::Uuid;

/// A traffic light cycling between red and green on its own thread.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use stoplight::{CycleConfig, Phase, TrafficLight};
///
/// let config = CycleConfig::new(Duration::from_millis(20), Duration::from_millis(30)).unwrap();
/// let light = TrafficLight::with_config(config);
/// assert_eq!(light.current_phase(), Phase::Red);
///
/// light.simulate().unwrap();
/// light.wait_for_green().unwrap();
/// assert!(light.transition_count() >= 1);
///
/// light.stop();
/// ```
#[derive(Debug)]
pub struct TrafficLight {
    shared: Arc<Shared>,
    config: CycleConfig,
    started: AtomicBool,
    cycler: Mutex<Option<JoinHandle<()>>>,
}

/// State shared between the light's handle and its cycling thread.
#[derive(Debug)]
struct Shared {
    id: Uuid,
    /// Written only by the cycling thread, under the `run` lock.
    phase: AtomicU8,
    run: Mutex<RunState>,
    /// Signaled on every flip and on stop.
    changed: Condvar,
    events: PhaseChannel<Phase>,
}

#[derive(Debug, Default)]
struct RunState {
    transitions: u64,
    last: Option<PhaseTransition>,
    stopped: bool,
}

impl TrafficLight {
    /// Create a red light with the default 4 to 6 second cycle.
    pub fn new() -> Self {
        Self::with_config(CycleConfig::default())
    }

    /// Create a red light drawing its cycle durations from `config`.
    pub fn with_config(config: CycleConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                phase: AtomicU8::new(Phase::Red.as_u8()),
                run: Mutex::new(RunState::default()),
                changed: Condvar::new(),
                events: PhaseChannel::new(),
            }),
            config,
            started: AtomicBool::new(false),
            cycler: Mutex::new(None),
        }
    }

    /// Start cycling on a background thread and return immediately.
    ///
    /// A light cycles at most once: a second call fails with
    /// [`LightError::AlreadyStarted`], and calling it on a light that was
    /// stopped before it ever started fails with [`LightError::Stopped`].
    pub fn simulate(&self) -> Result<(), LightError> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(light = %self.shared.id, "simulate called on a light that already started");
            return Err(LightError::AlreadyStarted);
        }
        if self.shared.lock().stopped {
            return Err(LightError::Stopped);
        }

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let spawned = thread::Builder::new()
            .name(format!("traffic-light-{}", self.shared.id.simple()))
            .spawn(move || cycle::run(&shared, &config));

        match spawned {
            Ok(handle) => {
                *self.cycler.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.started.store(false, Ordering::Release);
                Err(LightError::Spawn(err))
            }
        }
    }

    /// Current phase. Never blocks.
    pub fn current_phase(&self) -> Phase {
        self.shared.phase()
    }

    /// Block until the light is green.
    ///
    /// Returns immediately if it already is. Every concurrent waiter is
    /// released by the same green phase. Fails with [`LightError::Stopped`]
    /// if the light is stopped before turning green; if the light was never
    /// started this blocks until it is started or stopped.
    pub fn wait_for_green(&self) -> Result<(), LightError> {
        self.wait_until(&green())
    }

    /// Like [`wait_for_green`](Self::wait_for_green), giving up after
    /// `timeout`. Returns `Ok(false)` on timeout.
    pub fn wait_for_green_timeout(&self, timeout: Duration) -> Result<bool, LightError> {
        self.wait_until_timeout(&green(), timeout)
    }

    /// Block until `guard` accepts a phase the light has held since the call.
    pub fn wait_until(&self, guard: &Guard<Phase>) -> Result<(), LightError> {
        self.shared.wait_until(guard, None).map(|_| ())
    }

    /// Like [`wait_until`](Self::wait_until), giving up after `timeout`.
    ///
    /// Returns `Ok(false)` on timeout. A timeout too large to represent as a
    /// deadline waits without one.
    pub fn wait_until_timeout(
        &self,
        guard: &Guard<Phase>,
        timeout: Duration,
    ) -> Result<bool, LightError> {
        self.shared
            .wait_until(guard, Instant::now().checked_add(timeout))
    }

    /// Channel every new phase is sent to, one event per flip.
    ///
    /// Each event is delivered to exactly one receiver.
    ///
    /// # Unread events accumulate
    ///
    /// The waits on this light do not read from the channel. Every flip
    /// queues one event whether or not anyone receives it, so a running
    /// light whose events are never drained grows its queue by one phase
    /// per cycle for as long as it runs. Callers that do not want discrete
    /// events can ignore the queue; its size is observable with
    /// [`PhaseChannel::len`].
    pub fn phase_events(&self) -> &PhaseChannel<Phase> {
        &self.shared.events
    }

    /// Stop cycling and release every waiter.
    ///
    /// Joins the cycling thread. Calling it again does nothing.
    pub fn stop(&self) {
        let was_stopped = {
            let mut run = self.shared.lock();
            let was_stopped = run.stopped;
            run.stopped = true;
            self.shared.changed.notify_all();
            was_stopped
        };
        if !was_stopped && self.started.load(Ordering::Acquire) {
            info!(light = %self.shared.id, "traffic light stopped");
        }

        let handle = self
            .cycler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!(light = %self.shared.id, "cycling thread panicked");
            }
        }
    }

    /// Whether the cycling thread has been started and not stopped.
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.shared.lock().stopped
    }

    /// Number of flips performed so far.
    pub fn transition_count(&self) -> u64 {
        self.shared.lock().transitions
    }

    /// The most recent flip, if the light has flipped yet.
    pub fn last_transition(&self) -> Option<PhaseTransition> {
        self.shared.lock().last.clone()
    }

    /// Unique id of this light, used in its log events and thread name.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Range the light draws its cycle durations from.
    pub fn config(&self) -> &CycleConfig {
        &self.config
    }
}

impl Default for TrafficLight {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TrafficLight {
    fn drop(&mut self) {
        self.stop();
    }
}

fn green() -> Guard<Phase> {
    Guard::new(|phase: &Phase| phase.is_green())
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Flip the phase, wake every waiter, then publish the new phase.
    fn flip(&self, held_for: Duration) -> PhaseTransition {
        let transition = {
            let mut run = self.lock();
            let from = self.phase();
            let to = from.flipped();
            self.phase.store(to.as_u8(), Ordering::Release);
            run.transitions += 1;

            let transition = PhaseTransition {
                from,
                to,
                timestamp: Utc::now(),
                cycle: run.transitions,
                duration: held_for,
            };
            run.last = Some(transition.clone());
            self.changed.notify_all();
            transition
        };
        self.events.send(transition.to);
        transition
    }

    /// Sleep until `deadline`, or until stopped if there is none.
    /// Returns `false` if the light was stopped.
    fn sleep_until(&self, deadline: Option<Instant>) -> bool {
        let mut run = self.lock();
        loop {
            if run.stopped {
                return false;
            }
            run = match deadline {
                None => self
                    .changed
                    .wait(run)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return true;
                    }
                    self.changed
                        .wait_timeout(run, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    /// Returns `Ok(false)` only when `deadline` passes first.
    fn wait_until(
        &self,
        guard: &Guard<Phase>,
        deadline: Option<Instant>,
    ) -> Result<bool, LightError> {
        let mut run = self.lock();
        let seen = run.transitions;
        loop {
            let phase = self.phase();
            if guard.check(&phase) {
                return Ok(true);
            }
            // Two or more flips since the call means both phases were held,
            // even if this waiter woke too late to see the other one.
            if run.transitions >= seen + 2 && guard.check(&phase.flipped()) {
                return Ok(true);
            }
            if run.stopped {
                return Err(LightError::Stopped);
            }

            run = match deadline {
                None => self
                    .changed
                    .wait(run)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(false);
                    }
                    self.changed
                        .wait_timeout(run, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
            trace!(light = %self.id, phase = %self.phase(), "waiter woke");
        }
    }
}
