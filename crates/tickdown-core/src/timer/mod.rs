mod clock;
mod engine;
mod outcome;
mod session;

pub use clock::{Clock, ManualClock, MonotonicClock, Nanos, HALF_SECOND, NANOS_PER_SEC};
pub use engine::{CountdownEngine, Reply, UserAction};
pub use outcome::{
    format_seconds, EngineOutcome, DEFAULT_DISPLAY_DECIMALS, MAX_DISPLAY_DECIMALS,
};
pub use session::{
    first_tick_point, parse_duration, CountdownSession, NextTick, Preload,
    DEFAULT_TICK_LEAD_SECONDS, MAX_DURATION_NANOS,
};
