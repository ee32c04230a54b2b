//! Applies poll outcomes to the display and the sound backend.
//!
//! The presenter is the only place that turns [`EngineOutcome`]s into side
//! effects. Sound failures are logged and dropped here; they never flow back
//! into the engine.

use crate::sound::{DisplaySink, SoundId, SoundPlayer, StreamHandle};
use crate::timer::{EngineOutcome, DEFAULT_DISPLAY_DECIMALS};

pub struct Presenter<P, D> {
    player: P,
    display: D,
    decimals: u8,
    tick_stream: Option<StreamHandle>,
}

impl<P: SoundPlayer, D: DisplaySink> Presenter<P, D> {
    pub fn new(player: P, display: D) -> Self {
        Self {
            player,
            display,
            decimals: DEFAULT_DISPLAY_DECIMALS,
            tick_stream: None,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Handle of the looping tick, if one is playing.
    pub fn tick_stream(&self) -> Option<StreamHandle> {
        self.tick_stream
    }

    pub fn apply(&mut self, outcome: &EngineOutcome) {
        match outcome {
            EngineOutcome::Continue { .. } => {}
            EngineOutcome::PreloadSilent { .. } => {
                if let Err(err) = self.player.play_muted(SoundId::Tick) {
                    tracing::warn!(%err, "failed to preload tick sound");
                }
            }
            EngineOutcome::StartTicking { .. } => {
                if self.tick_stream.is_none() {
                    match self.player.play_looping(SoundId::Tick) {
                        Ok(handle) => self.tick_stream = Some(handle),
                        Err(err) => tracing::warn!(%err, "failed to start tick sound"),
                    }
                }
            }
            EngineOutcome::PlayDone => {
                self.stop_ticking();
                if let Err(err) = self.player.play_once(SoundId::Ding) {
                    tracing::warn!(%err, "failed to play ding");
                }
            }
            EngineOutcome::AlreadyTerminated => self.stop_ticking(),
        }

        if let Some(text) = outcome.format_display(self.decimals) {
            self.display.set_display(&text);
        }
    }

    /// Release sound resources once the session is over. Idempotent.
    pub fn finish(&mut self) {
        self.stop_ticking();
    }

    fn stop_ticking(&mut self) {
        if let Some(handle) = self.tick_stream.take() {
            if let Err(err) = self.player.stop(handle) {
                tracing::warn!(%err, stream = handle.0, "failed to stop tick sound");
            }
        }
    }
}
