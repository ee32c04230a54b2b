use serde::{Deserialize, Serialize};

use super::clock::Nanos;

/// Default number of fractional digits in the display text.
pub const DEFAULT_DISPLAY_DECIMALS: u8 = 2;
/// Nanosecond resolution caps the useful number of fractional digits.
pub const MAX_DISPLAY_DECIMALS: u8 = 9;

/// What a single poll decided.
///
/// At most one variant per poll. Over a session's lifetime the caller sees
/// any number of `Continue`, at most one `PreloadSilent`, at most one
/// `StartTicking` and exactly one terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineOutcome {
    /// Nothing to play; refresh the display.
    Continue { time_left: Nanos },
    /// The first trigger point was crossed; start the looping tick.
    StartTicking { time_left: Nanos },
    /// Prime the audio backend with a muted tick.
    PreloadSilent { time_left: Nanos },
    /// Zero reached. The session is now terminal; play the ding.
    PlayDone,
    /// The session was already terminal (finished, stopped, or never started).
    AlreadyTerminated,
}

impl EngineOutcome {
    /// Remaining nanoseconds carried by this outcome, if any.
    pub fn time_left(&self) -> Option<Nanos> {
        match *self {
            EngineOutcome::Continue { time_left }
            | EngineOutcome::StartTicking { time_left }
            | EngineOutcome::PreloadSilent { time_left } => Some(time_left),
            EngineOutcome::PlayDone => Some(0),
            EngineOutcome::AlreadyTerminated => None,
        }
    }

    /// True once polling should stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngineOutcome::PlayDone | EngineOutcome::AlreadyTerminated
        )
    }

    /// Display text with `decimals` fractional digits, or `None` when nothing
    /// should be shown.
    pub fn format_display(&self, decimals: u8) -> Option<String> {
        self.time_left().map(|ns| format_seconds(ns, decimals))
    }
}

/// Format nanoseconds as seconds with a fixed number of fractional digits.
///
/// Rounds half-up on the integer nanosecond value, so `1_005_000_000` renders
/// as `"1.01"` with two digits. Negative values render as zero.
pub fn format_seconds(nanos: Nanos, decimals: u8) -> String {
    let decimals = u32::from(decimals.min(MAX_DISPLAY_DECIMALS));
    let nanos = nanos.max(0);
    let unit = 10_i64.pow(9 - decimals);
    let rounded = nanos.saturating_add(unit / 2) / unit;
    if decimals == 0 {
        return rounded.to_string();
    }
    let scale = 10_i64.pow(decimals);
    format!(
        "{}.{:0width$}",
        rounded / scale,
        rounded % scale,
        width = decimals as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_to_two_decimals() {
        assert_eq!(format_seconds(1_005_000_000, 2), "1.01");
        assert_eq!(format_seconds(1_004_999_999, 2), "1.00");
        assert_eq!(format_seconds(3_500_000_000, 2), "3.50");
    }

    #[test]
    fn zero_and_negative_render_as_zero() {
        assert_eq!(format_seconds(0, 2), "0.00");
        assert_eq!(format_seconds(-250_000_000, 2), "0.00");
    }

    #[test]
    fn honours_decimal_count() {
        assert_eq!(format_seconds(2_499_000_000, 0), "2");
        assert_eq!(format_seconds(2_500_000_000, 0), "3");
        assert_eq!(format_seconds(1_234_567_891, 3), "1.235");
        assert_eq!(format_seconds(1_234_567_891, 9), "1.234567891");
        assert_eq!(format_seconds(1_234_567_891, 42), "1.234567891");
    }

    #[test]
    fn play_done_displays_zero_and_terminated_displays_nothing() {
        assert_eq!(
            EngineOutcome::PlayDone.format_display(2).as_deref(),
            Some("0.00")
        );
        assert_eq!(EngineOutcome::AlreadyTerminated.format_display(2), None);
        assert!(EngineOutcome::PlayDone.is_terminal());
        assert!(!EngineOutcome::Continue { time_left: 1 }.is_terminal());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(EngineOutcome::StartTicking {
            time_left: 2_990_000_000,
        })
        .unwrap();
        assert_eq!(json["type"], "start_ticking");
        assert_eq!(json["time_left"], 2_990_000_000_i64);
    }
}
