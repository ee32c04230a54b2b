//! Monotonic time sources.
//!
//! The engine never reads the wall clock. Every poll recomputes the time left
//! from two monotonic readings, so late or skipped polls do not accumulate drift.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Signed nanoseconds. Signed so that "time left" can go negative when a poll
/// arrives after the deadline.
pub type Nanos = i64;

pub const NANOS_PER_SEC: Nanos = 1_000_000_000;
pub const HALF_SECOND: Nanos = NANOS_PER_SEC / 2;

/// A monotonic nanosecond timestamp source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Nanos;
}

/// Clock backed by [`Instant`], measured from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Nanos {
        // i64 nanoseconds covers ~292 years of uptime.
        Nanos::try_from(self.origin.elapsed().as_nanos()).unwrap_or(Nanos::MAX)
    }
}

/// Manually driven clock for tests and simulations.
///
/// Clones share the same underlying time, so a test can hold one handle
/// while the poller reads another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: Nanos) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn set(&self, now: Nanos) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Nanos) {
        self.now.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Nanos {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a >= 0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(5);
        let other = clock.clone();
        clock.advance(10);
        assert_eq!(other.now(), 15);
        other.set(100);
        assert_eq!(clock.now(), 100);
    }
}
