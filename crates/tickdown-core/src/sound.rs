//! Presentation-side collaborators: sound playback, display text, error text.
//!
//! The core only asks for sounds by logical identity. Backends decide how a
//! tick or a ding actually reaches the speaker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::SoundError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundId {
    /// Warning tick, looped during the final seconds.
    Tick,
    /// Completion chime.
    Ding,
}

impl SoundId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundId::Tick => "tick",
            SoundId::Ding => "ding",
        }
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-issued identifier of a playing stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamHandle(pub u32);

pub trait SoundPlayer: Send {
    fn play_once(&mut self, sound: SoundId) -> Result<(), SoundError>;
    fn play_looping(&mut self, sound: SoundId) -> Result<StreamHandle, SoundError>;
    /// Play at zero volume to wake the audio backend before an audible sound.
    fn play_muted(&mut self, sound: SoundId) -> Result<(), SoundError>;
    fn stop(&mut self, stream: StreamHandle) -> Result<(), SoundError>;
}

pub trait DisplaySink: Send {
    fn set_display(&mut self, text: &str);
}

pub trait ErrorSink: Send {
    fn set_error(&mut self, message: &str);
    fn clear_error(&mut self);
}

// Boxed backends, so a front end can pick one at runtime.
impl<P: SoundPlayer + ?Sized> SoundPlayer for Box<P> {
    fn play_once(&mut self, sound: SoundId) -> Result<(), SoundError> {
        (**self).play_once(sound)
    }

    fn play_looping(&mut self, sound: SoundId) -> Result<StreamHandle, SoundError> {
        (**self).play_looping(sound)
    }

    fn play_muted(&mut self, sound: SoundId) -> Result<(), SoundError> {
        (**self).play_muted(sound)
    }

    fn stop(&mut self, stream: StreamHandle) -> Result<(), SoundError> {
        (**self).stop(stream)
    }
}

impl<D: DisplaySink + ?Sized> DisplaySink for Box<D> {
    fn set_display(&mut self, text: &str) {
        (**self).set_display(text)
    }
}

/// Player that accepts every request and plays nothing.
#[derive(Debug, Default)]
pub struct NullSoundPlayer {
    next_stream: u32,
}

impl SoundPlayer for NullSoundPlayer {
    fn play_once(&mut self, _sound: SoundId) -> Result<(), SoundError> {
        Ok(())
    }

    fn play_looping(&mut self, _sound: SoundId) -> Result<StreamHandle, SoundError> {
        self.next_stream += 1;
        Ok(StreamHandle(self.next_stream))
    }

    fn play_muted(&mut self, _sound: SoundId) -> Result<(), SoundError> {
        Ok(())
    }

    fn stop(&mut self, _stream: StreamHandle) -> Result<(), SoundError> {
        Ok(())
    }
}

/// One request made to a [`RecordingSoundPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCall {
    PlayOnce(SoundId),
    PlayLooping(SoundId, StreamHandle),
    PlayMuted(SoundId),
    Stop(StreamHandle),
}

/// Player that records every request. Clones share the same log.
///
/// With `set_failing(true)` every request is still recorded but reports a
/// playback failure.
#[derive(Debug, Clone, Default)]
pub struct RecordingSoundPlayer {
    calls: Arc<Mutex<Vec<SoundCall>>>,
    next_stream: Arc<AtomicU32>,
    failing: Arc<AtomicBool>,
}

impl RecordingSoundPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SoundCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn record(&self, call: SoundCall) -> Result<(), SoundError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SoundError::Playback("backend unavailable".into()));
        }
        Ok(())
    }
}

impl SoundPlayer for RecordingSoundPlayer {
    fn play_once(&mut self, sound: SoundId) -> Result<(), SoundError> {
        self.record(SoundCall::PlayOnce(sound))
    }

    fn play_looping(&mut self, sound: SoundId) -> Result<StreamHandle, SoundError> {
        let handle = StreamHandle(self.next_stream.fetch_add(1, Ordering::SeqCst) + 1);
        self.record(SoundCall::PlayLooping(sound, handle))?;
        Ok(handle)
    }

    fn play_muted(&mut self, sound: SoundId) -> Result<(), SoundError> {
        self.record(SoundCall::PlayMuted(sound))
    }

    fn stop(&mut self, stream: StreamHandle) -> Result<(), SoundError> {
        self.record(SoundCall::Stop(stream))
    }
}

/// In-memory display and error sink. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkState>>,
}

#[derive(Debug, Default)]
struct MemorySinkState {
    displays: Vec<String>,
    error: String,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every display text in the order it was set.
    pub fn displays(&self) -> Vec<String> {
        self.state().displays.clone()
    }

    pub fn last_display(&self) -> Option<String> {
        self.state().displays.last().cloned()
    }

    /// Current error text; empty when cleared.
    pub fn error(&self) -> String {
        self.state().error.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemorySinkState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplaySink for MemorySink {
    fn set_display(&mut self, text: &str) {
        self.state().displays.push(text.to_string());
    }
}

impl ErrorSink for MemorySink {
    fn set_error(&mut self, message: &str) {
        self.state().error = message.to_string();
    }

    fn clear_error(&mut self) {
        self.state().error.clear();
    }
}
