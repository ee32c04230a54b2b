//! Countdown engine.
//!
//! The engine owns at most one [`CountdownSession`]. It does not use internal
//! threads or read a clock itself - the caller passes a monotonic timestamp to
//! every command and is responsible for calling `poll()` periodically.
//!
//! ## Session Lifecycle
//!
//! ```text
//! Idle -> Running -> Terminal (finished or stopped) -> Running (next start)
//! ```
//!
//! ## Usage
//!
//! ```
//! use tickdown_core::timer::{CountdownEngine, EngineOutcome};
//!
//! let mut engine = CountdownEngine::new();
//! engine.start("5", 3, 0).unwrap();
//! assert_eq!(
//!     engine.poll(1_000_000_000),
//!     EngineOutcome::Continue { time_left: 4_000_000_000 }
//! );
//! engine.stop();
//! assert_eq!(engine.poll(2_000_000_000), EngineOutcome::AlreadyTerminated);
//! ```

use serde::{Deserialize, Serialize};

use super::clock::Nanos;
use super::outcome::EngineOutcome;
use super::session::{parse_duration, CountdownSession};
use crate::error::StartError;

/// Inputs the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Start a countdown from raw user input, in seconds.
    Start(String),
    /// Cancel the running countdown.
    Stop,
    /// Periodic poll from the scheduler.
    PollTick,
}

/// Result of handling a [`UserAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Started(CountdownSession),
    Rejected(StartError),
    /// `was_running` is false when there was nothing to stop.
    Stopped { was_running: bool },
    Polled(EngineOutcome),
}

/// Core countdown engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountdownEngine {
    session: Option<CountdownSession>,
    /// Bumped on every successful start so that a poller bound to an older
    /// session can never observe a newer one.
    #[serde(default)]
    generation: u64,
}

impl CountdownEngine {
    pub fn new() -> Self {
        Self {
            session: None,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// True while a session exists and has not reached its terminal state.
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_terminal())
    }

    pub fn session(&self) -> Option<&CountdownSession> {
        self.session.as_ref()
    }

    /// Identifier of the current session; changes on every successful start.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new session from user input.
    ///
    /// A running session is never replaced. A rejected start leaves the
    /// engine exactly as it was.
    pub fn start(
        &mut self,
        input: &str,
        tick_lead_seconds: u32,
        now: Nanos,
    ) -> Result<&CountdownSession, StartError> {
        if self.is_running() {
            tracing::debug!("start rejected: session already running");
            return Err(StartError::AlreadyRunning);
        }
        let duration = parse_duration(input).inspect_err(|err| {
            tracing::debug!(input, %err, "start rejected");
        })?;

        let session = CountdownSession::begin(duration, tick_lead_seconds, now);
        tracing::info!(
            duration_ns = duration,
            tick_lead_seconds,
            next_tick = ?session.next_tick(),
            preload = ?session.preload(),
            "countdown started"
        );
        self.generation += 1;
        Ok(&*self.session.insert(session))
    }

    /// Poll the active session. Without a session this is `AlreadyTerminated`.
    pub fn poll(&mut self, now: Nanos) -> EngineOutcome {
        let Some(session) = self.session.as_mut() else {
            return EngineOutcome::AlreadyTerminated;
        };
        let outcome = session.poll(now);
        match outcome {
            EngineOutcome::StartTicking { time_left } => {
                tracing::debug!(time_left_ns = time_left, "ticking started");
            }
            EngineOutcome::PreloadSilent { time_left } => {
                tracing::debug!(time_left_ns = time_left, "preloading tick sound");
            }
            EngineOutcome::PlayDone => tracing::info!("countdown finished"),
            _ => {}
        }
        outcome
    }

    /// Force the active session terminal. Safe to call at any time.
    ///
    /// Returns whether a running session was actually stopped.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
        if was_running {
            tracing::info!("countdown stopped");
        }
        was_running
    }

    /// Poll only if `generation` still names the current session.
    pub fn poll_session(&mut self, generation: u64, now: Nanos) -> EngineOutcome {
        if generation != self.generation {
            return EngineOutcome::AlreadyTerminated;
        }
        self.poll(now)
    }

    /// Stop only if `generation` still names the current session.
    pub fn stop_session(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.stop()
    }

    /// Drop the session entirely.
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Dispatch a [`UserAction`].
    pub fn handle(&mut self, action: UserAction, tick_lead_seconds: u32, now: Nanos) -> Reply {
        match action {
            UserAction::Start(input) => match self.start(&input, tick_lead_seconds, now) {
                Ok(session) => Reply::Started(session.clone()),
                Err(err) => Reply::Rejected(err),
            },
            UserAction::Stop => Reply::Stopped {
                was_running: self.stop(),
            },
            UserAction::PollTick => Reply::Polled(self.poll(now)),
        }
    }
}
