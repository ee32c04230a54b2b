//! # Tickdown Core Library
//!
//! This library provides the core logic for the Tickdown countdown timer: the
//! user enters a duration in seconds, the countdown displays the time left,
//! starts a looping warning tick a configurable number of seconds before zero
//! and plays a ding at zero. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A monotonic-clock-based state machine that requires the
//!   caller to periodically invoke `poll()` with the current instant
//! - **Poller**: A tokio task polling the engine at a fixed cadence and
//!   forwarding outcomes, in order, over a channel
//! - **Presenter**: Turns outcomes into display text and sound requests
//! - **Storage**: TOML-based configuration behind the [`ConfigStore`] trait
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: Core countdown state machine
//! - [`TimerController`]: Start/stop entry point wiring engine, config and poller
//! - [`Config`]: Application configuration management
//! - [`SoundPlayer`]: Trait for sound backends

pub mod controller;
pub mod error;
pub mod events;
pub mod poller;
pub mod presenter;
pub mod sound;
pub mod storage;
pub mod timer;

pub use controller::{CountdownRun, TimerController};
pub use error::{ConfigError, CoreError, SoundError, StartError};
pub use events::Event;
pub use poller::{Poller, PollerHandle, SharedEngine, DEFAULT_POLL_INTERVAL};
pub use presenter::Presenter;
pub use sound::{DisplaySink, ErrorSink, NullSoundPlayer, SoundId, SoundPlayer, StreamHandle};
pub use storage::{Config, ConfigStore, FileConfigStore, MemoryConfigStore};
pub use timer::{CountdownEngine, CountdownSession, EngineOutcome, UserAction};
