//! Timestamped countdown events, serialized one JSON object per line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StartError;
use crate::timer::{format_seconds, CountdownSession, EngineOutcome, Nanos, NextTick, Preload};

/// Every observable step of a countdown produces an Event.
/// Front ends render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CountdownStarted {
        duration_ns: Nanos,
        /// Time left at which ticking starts; zero means ding only.
        tick_at_ns: Option<Nanos>,
        preload_at_ns: Option<Nanos>,
        at: DateTime<Utc>,
    },
    StartRejected {
        reason: String,
        at: DateTime<Utc>,
    },
    Progress {
        time_left_ns: Nanos,
        display: String,
        at: DateTime<Utc>,
    },
    PreloadIssued {
        time_left_ns: Nanos,
        display: String,
        at: DateTime<Utc>,
    },
    TickingStarted {
        time_left_ns: Nanos,
        display: String,
        at: DateTime<Utc>,
    },
    CountdownFinished {
        at: DateTime<Utc>,
    },
    CountdownStopped {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn started(session: &CountdownSession) -> Self {
        let tick_at_ns = match session.next_tick() {
            NextTick::Pending(at) => Some(at),
            NextTick::Terminal => None,
        };
        let preload_at_ns = match session.preload() {
            Preload::Pending(at) => Some(at),
            Preload::Consumed => None,
        };
        Event::CountdownStarted {
            duration_ns: session.duration(),
            tick_at_ns,
            preload_at_ns,
            at: Utc::now(),
        }
    }

    pub fn rejected(err: StartError) -> Self {
        Event::StartRejected {
            reason: err.to_string(),
            at: Utc::now(),
        }
    }

    /// Map a poll outcome to its event.
    pub fn from_outcome(outcome: &EngineOutcome, decimals: u8) -> Self {
        let at = Utc::now();
        match *outcome {
            EngineOutcome::Continue { time_left } => Event::Progress {
                time_left_ns: time_left,
                display: format_seconds(time_left, decimals),
                at,
            },
            EngineOutcome::PreloadSilent { time_left } => Event::PreloadIssued {
                time_left_ns: time_left,
                display: format_seconds(time_left, decimals),
                at,
            },
            EngineOutcome::StartTicking { time_left } => Event::TickingStarted {
                time_left_ns: time_left,
                display: format_seconds(time_left, decimals),
                at,
            },
            EngineOutcome::PlayDone => Event::CountdownFinished { at },
            EngineOutcome::AlreadyTerminated => Event::CountdownStopped { at },
        }
    }

    pub fn is_progress(&self) -> bool {
        matches!(self, Event::Progress { .. })
    }
}
