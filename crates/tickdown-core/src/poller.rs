//! Fixed-cadence polling of the countdown engine.
//!
//! A single tokio task owns the cadence. Each poll takes the engine lock, asks
//! for an outcome, releases the lock and forwards the outcome over an
//! unbounded channel, so the receiver sees outcomes in exactly the order they
//! were produced and polls never overlap.
//!
//! Missed ticks are skipped rather than bursted: after a stall the next poll
//! simply recomputes time left from the monotonic clock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::timer::{Clock, CountdownEngine, EngineOutcome};

/// Poll cadence used when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Engine shared between the controller and its poller.
pub type SharedEngine = Arc<Mutex<CountdownEngine>>;

/// Receiving end of a poller's outcome stream.
pub type OutcomeReceiver = mpsc::UnboundedReceiver<EngineOutcome>;

/// Lock the shared engine, recovering from a poisoned lock.
///
/// Every engine mutation leaves it in a consistent state, so a panic on
/// another thread does not invalidate it.
pub fn lock_engine(engine: &SharedEngine) -> MutexGuard<'_, CountdownEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Poller {
    /// A zero interval is raised to one millisecond.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling the engine's current session.
    ///
    /// The poller is bound to the session that is current at spawn time; if
    /// the engine moves on to a newer session the poller terminates without
    /// touching it. Must be called from within a tokio runtime.
    pub fn spawn(&self, engine: SharedEngine, clock: Arc<dyn Clock>) -> (PollerHandle, OutcomeReceiver) {
        let generation = lock_engine(&engine).generation();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let task = tokio::spawn(run(
            Arc::clone(&engine),
            clock,
            generation,
            self.interval,
            outcome_tx,
            cancel_rx,
        ));
        tracing::debug!(generation, interval_ms = self.interval.as_millis() as u64, "poller started");

        let handle = PollerHandle {
            engine,
            generation,
            cancel: cancel_tx,
            task,
        };
        (handle, outcome_rx)
    }
}

/// Control handle for a running poller.
///
/// Dropping the handle detaches the poller; it keeps running until the
/// session terminates.
#[derive(Debug)]
pub struct PollerHandle {
    engine: SharedEngine,
    generation: u64,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the bound session and the polling task. Idempotent.
    ///
    /// The session is stopped under the engine lock before the task is told
    /// to exit, so any poll that still runs observes `AlreadyTerminated`.
    /// Returns whether a running session was stopped.
    pub fn cancel(&self) -> bool {
        let stopped = lock_engine(&self.engine).stop_session(self.generation);
        self.cancel.send_replace(true);
        stopped
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the polling task to exit.
    pub async fn join(self) {
        if let Err(err) = self.task.await {
            tracing::warn!(%err, "poller task ended abnormally");
        }
    }
}

async fn run(
    engine: SharedEngine,
    clock: Arc<dyn Clock>,
    generation: u64,
    period: Duration,
    outcomes: mpsc::UnboundedSender<EngineOutcome>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cancel_open = true;

    loop {
        tokio::select! {
            biased;
            changed = cancel.changed(), if cancel_open => {
                match changed {
                    Ok(()) if *cancel.borrow() => {
                        tracing::debug!(generation, "poller cancelled");
                        break;
                    }
                    Ok(()) => {}
                    // Handle dropped: keep polling until the session ends.
                    Err(_) => cancel_open = false,
                }
            }
            _ = ticker.tick() => {
                let outcome = lock_engine(&engine).poll_session(generation, clock.now());
                let terminal = outcome.is_terminal();
                if outcomes.send(outcome).is_err() {
                    // Nobody is listening any more; do not leave a session
                    // running that no one can see.
                    lock_engine(&engine).stop_session(generation);
                    tracing::debug!(generation, "outcome receiver dropped");
                    break;
                }
                if terminal {
                    break;
                }
            }
        }
    }
    tracing::debug!(generation, "poller stopped");
}
