//! Wires the engine to its collaborators.
//!
//! The controller turns user actions into engine commands, reports start
//! failures to the error sink and owns the poller of the running session.
//! Rendering and sound stay with whoever drives the returned [`CountdownRun`].

use std::sync::{Arc, Mutex};

use crate::error::{ConfigError, StartError};
use crate::poller::{lock_engine, OutcomeReceiver, Poller, PollerHandle, SharedEngine};
use crate::presenter::Presenter;
use crate::sound::{DisplaySink, ErrorSink, SoundPlayer};
use crate::storage::ConfigStore;
use crate::timer::{
    Clock, CountdownEngine, CountdownSession, EngineOutcome, MonotonicClock, Reply, UserAction,
};

pub struct TimerController<S> {
    engine: SharedEngine,
    store: S,
    clock: Arc<dyn Clock>,
    errors: Box<dyn ErrorSink>,
    active: Option<PollerHandle>,
}

impl<S: ConfigStore> TimerController<S> {
    pub fn new(store: S, errors: impl ErrorSink + 'static) -> Self {
        Self::with_clock(store, errors, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(store: S, errors: impl ErrorSink + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(CountdownEngine::new())),
            store,
            clock,
            errors: Box::new(errors),
            active: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    pub fn is_running(&self) -> bool {
        lock_engine(&self.engine).is_running()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tick_lead_seconds(&self) -> u32 {
        self.store.tick_lead_seconds()
    }

    pub fn display_decimals(&self) -> u8 {
        self.store.display_decimals()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Change the tick lead. Applies from the next countdown on.
    pub fn set_tick_lead_seconds(&mut self, seconds: u32) -> Result<(), ConfigError> {
        self.store.set_tick_lead_seconds(seconds)
    }

    /// Start a countdown from raw user input and begin polling it.
    ///
    /// On failure the error text goes to the error sink and the running state
    /// is untouched. Must be called from within a tokio runtime.
    pub fn start(&mut self, input: &str) -> Result<CountdownRun, StartError> {
        // Read the clock first; the countdown starts at the request.
        let now = self.clock.now();
        let lead = self.store.tick_lead_seconds();

        let (reply, generation) = {
            let mut engine = lock_engine(&self.engine);
            let reply = engine.handle(UserAction::Start(input.to_string()), lead, now);
            (reply, engine.generation())
        };

        let session = match reply {
            Reply::Started(session) => session,
            Reply::Rejected(err) => {
                self.errors.set_error(&err.to_string());
                return Err(err);
            }
            other => {
                // `handle(Start)` only answers Started or Rejected.
                tracing::error!(?other, "unexpected reply to start");
                self.errors.set_error(&StartError::AlreadyRunning.to_string());
                return Err(StartError::AlreadyRunning);
            }
        };
        self.errors.clear_error();

        let poller = Poller::new(self.store.poll_interval());
        let (handle, outcomes) = poller.spawn(Arc::clone(&self.engine), Arc::clone(&self.clock));
        debug_assert_eq!(handle.generation(), generation);
        self.active = Some(handle);

        Ok(CountdownRun {
            session,
            generation,
            outcomes,
        })
    }

    /// Cancel the running countdown, if any. Idempotent.
    pub fn stop(&mut self) -> bool {
        let now = self.clock.now();
        let lead = self.store.tick_lead_seconds();
        let reply = lock_engine(&self.engine).handle(UserAction::Stop, lead, now);
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
        matches!(reply, Reply::Stopped { was_running: true })
    }
}

/// A started countdown's outcome stream.
#[derive(Debug)]
pub struct CountdownRun {
    session: CountdownSession,
    generation: u64,
    outcomes: OutcomeReceiver,
}

impl CountdownRun {
    /// The session as it was when it started.
    pub fn session(&self) -> &CountdownSession {
        &self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Next outcome, or `None` once the poller has stopped.
    pub async fn next(&mut self) -> Option<EngineOutcome> {
        self.outcomes.recv().await
    }

    /// Apply every outcome to `presenter`, in order, until the session ends.
    ///
    /// `observe` sees each outcome after it has been applied. The presenter is
    /// finished before returning. Returns the last outcome received.
    pub async fn drive<P, D>(
        &mut self,
        presenter: &mut Presenter<P, D>,
        mut observe: impl FnMut(&EngineOutcome),
    ) -> Option<EngineOutcome>
    where
        P: SoundPlayer,
        D: DisplaySink,
    {
        let mut last = None;
        while let Some(outcome) = self.outcomes.recv().await {
            presenter.apply(&outcome);
            observe(&outcome);
            last = Some(outcome);
            if outcome.is_terminal() {
                break;
            }
        }
        presenter.finish();
        last
    }
}
