//! A single countdown and its trigger points.
//!
//! All instants inside a session are "time left" values: nanoseconds remaining
//! until zero at which something should happen. A poll compares the freshly
//! computed time left against them.

use serde::{Deserialize, Serialize};

use super::clock::{Nanos, HALF_SECOND, NANOS_PER_SEC};
use super::outcome::EngineOutcome;
use crate::error::StartError;

/// Durations at or above this many nanoseconds are rejected.
pub const MAX_DURATION_NANOS: Nanos = 1_000_000_000_000;

/// Default tick lead, in whole seconds.
pub const DEFAULT_TICK_LEAD_SECONDS: u32 = 3;

/// When the next sound fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum NextTick {
    /// Fire once time left drops to this value. `Pending(0)` means the ding.
    Pending(Nanos),
    /// The ding has played or the session was stopped.
    Terminal,
}

/// When the muted priming tick fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum Preload {
    Pending(Nanos),
    Consumed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSession {
    duration: Nanos,
    started_at: Nanos,
    next_tick: NextTick,
    preload: Preload,
}

/// Parse a user-entered duration in seconds into nanoseconds.
///
/// Accepts any non-negative finite decimal (`"5"`, `"2.5"`, `".5"`, `"1e2"`)
/// surrounded by optional whitespace. The fractional nanosecond is truncated.
pub fn parse_duration(input: &str) -> Result<Nanos, StartError> {
    let seconds: f64 = input
        .trim()
        .parse()
        .map_err(|_| StartError::NotANumber)?;
    if seconds.is_nan() || seconds < 0.0 {
        return Err(StartError::NotANumber);
    }
    let nanos = seconds * NANOS_PER_SEC as f64;
    if !nanos.is_finite() || nanos >= MAX_DURATION_NANOS as f64 {
        return Err(StartError::TooLarge);
    }
    Ok(nanos as Nanos)
}

/// Time left at which ticking starts.
///
/// Uses the configured lead when there is at least half a second of countdown
/// before it. Otherwise picks the largest whole second that still leaves half
/// a second of warning, bottoming out at zero for very short countdowns.
pub fn first_tick_point(duration: Nanos, tick_lead_seconds: u32) -> Nanos {
    let lead = Nanos::from(tick_lead_seconds) * NANOS_PER_SEC;
    if duration >= lead + HALF_SECOND {
        lead
    } else {
        // Integer division truncates toward zero, which clamps sub-half-second
        // countdowns to zero instead of a negative second.
        ((duration - HALF_SECOND) / NANOS_PER_SEC).max(0) * NANOS_PER_SEC
    }
}

impl CountdownSession {
    /// Begin a countdown of `duration` nanoseconds at monotonic instant `now`.
    pub fn begin(duration: Nanos, tick_lead_seconds: u32, now: Nanos) -> Self {
        let tick_at = first_tick_point(duration, tick_lead_seconds);
        Self {
            duration,
            started_at: now,
            next_tick: NextTick::Pending(tick_at),
            preload: Preload::Pending(tick_at + HALF_SECOND),
        }
    }

    pub fn duration(&self) -> Nanos {
        self.duration
    }

    pub fn started_at(&self) -> Nanos {
        self.started_at
    }

    pub fn next_tick(&self) -> NextTick {
        self.next_tick
    }

    pub fn preload(&self) -> Preload {
        self.preload
    }

    pub fn is_terminal(&self) -> bool {
        self.next_tick == NextTick::Terminal
    }

    /// Nanoseconds left at `now`; negative once the deadline has passed.
    pub fn time_left(&self, now: Nanos) -> Nanos {
        self.duration
            .saturating_sub(now.saturating_sub(self.started_at))
    }

    /// Advance the session to `now` and decide what happens.
    ///
    /// The trigger check wins over the preload check. Starting the tick
    /// consumes the preload, so a poll that jumps past both points skips the
    /// muted priming play for good.
    pub fn poll(&mut self, now: Nanos) -> EngineOutcome {
        let tick_at = match self.next_tick {
            NextTick::Terminal => return EngineOutcome::AlreadyTerminated,
            NextTick::Pending(at) => at,
        };
        let time_left = self.time_left(now);

        if time_left <= tick_at {
            if tick_at == 0 {
                self.next_tick = NextTick::Terminal;
                return EngineOutcome::PlayDone;
            }
            self.next_tick = NextTick::Pending(0);
            self.preload = Preload::Consumed;
            return EngineOutcome::StartTicking { time_left };
        }

        if let Preload::Pending(at) = self.preload {
            if time_left <= at {
                self.preload = Preload::Consumed;
                return EngineOutcome::PreloadSilent { time_left };
            }
        }

        EngineOutcome::Continue { time_left }
    }

    /// Force the session terminal. Idempotent.
    pub fn stop(&mut self) {
        self.next_tick = NextTick::Terminal;
        self.preload = Preload::Consumed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const S: Nanos = NANOS_PER_SEC;

    #[test]
    fn five_seconds_with_default_lead() {
        assert_eq!(parse_duration("5"), Ok(5 * S));
        let session = CountdownSession::begin(5 * S, 3, 42);
        assert_eq!(session.duration(), 5 * S);
        assert_eq!(session.started_at(), 42);
        assert_eq!(session.next_tick(), NextTick::Pending(3 * S));
        assert_eq!(session.preload(), Preload::Pending(3 * S + HALF_SECOND));
    }

    #[test]
    fn lead_longer_than_duration_falls_back_to_whole_second() {
        let session = CountdownSession::begin(2 * S, 3, 0);
        assert_eq!(session.next_tick(), NextTick::Pending(S));
        assert_eq!(session.preload(), Preload::Pending(S + HALF_SECOND));
    }

    #[test]
    fn lead_without_half_second_margin_falls_back() {
        // 3.4s with lead 3: margin is only 0.4s.
        assert_eq!(first_tick_point(3 * S + 400_000_000, 3), 2 * S);
        // Exactly half a second of margin keeps the lead.
        assert_eq!(first_tick_point(3 * S + HALF_SECOND, 3), 3 * S);
    }

    #[test]
    fn very_short_countdowns_never_tick() {
        assert_eq!(first_tick_point(0, 3), 0);
        assert_eq!(first_tick_point(300_000_000, 3), 0);
        assert_eq!(first_tick_point(1_400_000_000, 3), 0);
        assert_eq!(first_tick_point(1_500_000_000, 3), S);
    }

    #[test]
    fn parse_rejects_garbage_and_negatives() {
        assert_eq!(parse_duration("abc"), Err(StartError::NotANumber));
        assert_eq!(parse_duration(""), Err(StartError::NotANumber));
        assert_eq!(parse_duration("-1"), Err(StartError::NotANumber));
        assert_eq!(parse_duration("NaN"), Err(StartError::NotANumber));
    }

    #[test]
    fn parse_rejects_huge_values() {
        assert_eq!(parse_duration("2000"), Err(StartError::TooLarge));
        assert_eq!(parse_duration("1000"), Err(StartError::TooLarge));
        assert_eq!(parse_duration("inf"), Err(StartError::TooLarge));
        assert_eq!(parse_duration("999.5"), Ok(999_500_000_000));
    }

    #[test]
    fn parse_accepts_decimal_forms() {
        assert_eq!(parse_duration(" 2.5 "), Ok(2_500_000_000));
        assert_eq!(parse_duration(".5"), Ok(HALF_SECOND));
        assert_eq!(parse_duration("1e2"), Ok(100 * S));
        assert_eq!(parse_duration("0"), Ok(0));
    }

    #[test]
    fn full_lifecycle_in_order() {
        let mut session = CountdownSession::begin(5 * S, 3, 0);
        assert_eq!(
            session.poll(S),
            EngineOutcome::Continue { time_left: 4 * S }
        );
        assert_eq!(
            session.poll(1_600_000_000),
            EngineOutcome::PreloadSilent {
                time_left: 3_400_000_000
            }
        );
        assert_eq!(
            session.poll(1_700_000_000),
            EngineOutcome::Continue {
                time_left: 3_300_000_000
            }
        );
        assert_eq!(
            session.poll(2 * S),
            EngineOutcome::StartTicking { time_left: 3 * S }
        );
        assert_eq!(session.next_tick(), NextTick::Pending(0));
        assert_eq!(
            session.poll(4 * S),
            EngineOutcome::Continue { time_left: S }
        );
        assert_eq!(session.poll(5 * S), EngineOutcome::PlayDone);
        assert!(session.is_terminal());
        assert_eq!(session.poll(6 * S), EngineOutcome::AlreadyTerminated);
    }

    #[test]
    fn zero_duration_finishes_on_first_poll() {
        let mut session = CountdownSession::begin(0, 3, 10);
        assert_eq!(session.poll(10), EngineOutcome::PlayDone);
    }

    #[test]
    fn jump_past_both_points_skips_preload() {
        let mut session = CountdownSession::begin(10 * S, 3, 0);
        assert_eq!(
            session.poll(8 * S),
            EngineOutcome::StartTicking { time_left: 2 * S }
        );
        assert_eq!(session.preload(), Preload::Consumed);
        assert_eq!(
            session.poll(9 * S),
            EngineOutcome::Continue { time_left: S }
        );
        assert_eq!(session.poll(10 * S), EngineOutcome::PlayDone);
    }

    #[test]
    fn jump_past_deadline_still_ticks_before_ding() {
        let mut session = CountdownSession::begin(5 * S, 3, 0);
        assert_eq!(
            session.poll(7 * S),
            EngineOutcome::StartTicking { time_left: -2 * S }
        );
        assert_eq!(session.poll(7 * S), EngineOutcome::PlayDone);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut session = CountdownSession::begin(5 * S, 3, 0);
        session.stop();
        session.stop();
        assert_eq!(session.poll(S), EngineOutcome::AlreadyTerminated);
        assert_eq!(session.preload(), Preload::Consumed);
    }

    proptest! {
        #[test]
        fn tick_point_leaves_half_second_warning(
            duration in 0..MAX_DURATION_NANOS,
            lead in 0u32..100_000,
        ) {
            let at = first_tick_point(duration, lead);
            prop_assert!(at >= 0);
            prop_assert!(at <= duration);
            if duration >= HALF_SECOND {
                prop_assert!(duration - at >= HALF_SECOND);
            }
            prop_assert_eq!(at % NANOS_PER_SEC, 0);
        }

        #[test]
        fn polls_after_terminal_stay_terminal(
            duration in 0..100 * S,
            lead in 0u32..10,
            later in proptest::collection::vec(0..200 * S, 1..20),
        ) {
            let mut session = CountdownSession::begin(duration, lead, 0);
            let mut now = 0;
            while !session.poll(now).is_terminal() {
                now += 10_000_000;
            }
            for offset in later {
                prop_assert_eq!(
                    session.poll(now + offset),
                    EngineOutcome::AlreadyTerminated
                );
            }
        }

        #[test]
        fn time_left_never_increases(
            duration in 0..100 * S,
            lead in 0u32..10,
            mut times in proptest::collection::vec(0..100 * S, 2..40),
        ) {
            times.sort_unstable();
            let mut session = CountdownSession::begin(duration, lead, 0);
            let mut previous: Option<Nanos> = None;
            for now in times {
                let outcome = session.poll(now);
                if outcome.is_terminal() {
                    break;
                }
                let left = outcome.time_left().unwrap();
                if let Some(prev) = previous {
                    prop_assert!(left <= prev);
                }
                previous = Some(left);
            }
        }

        #[test]
        fn stop_terminates_from_any_state(
            duration in 0..100 * S,
            lead in 0u32..10,
            polls in proptest::collection::vec(0..100 * S, 0..10),
            after in 0..200 * S,
        ) {
            let mut session = CountdownSession::begin(duration, lead, 0);
            for now in polls {
                session.poll(now);
            }
            session.stop();
            prop_assert_eq!(session.poll(after), EngineOutcome::AlreadyTerminated);
        }
    }
}
