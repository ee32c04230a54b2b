//! Terminal implementations of the presentation collaborators.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tickdown_core::{DisplaySink, ErrorSink, SoundError, SoundId, SoundPlayer, StreamHandle};

const BELL: &str = "\x07";
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Redraws the time left in place on stdout.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    last: String,
}

impl DisplaySink for TerminalDisplay {
    fn set_display(&mut self, text: &str) {
        if text == self.last {
            return;
        }
        let mut out = std::io::stdout().lock();
        // Pad so a shorter value fully overwrites a longer one.
        let _ = write!(out, "\r⏱️  {text:<12}");
        let _ = out.flush();
        self.last = text.to_string();
    }
}

/// Display sink for `--json` runs, where stdout carries events only.
#[derive(Debug, Default)]
pub struct SilentDisplay;

impl DisplaySink for SilentDisplay {
    fn set_display(&mut self, _text: &str) {}
}

/// Prints start errors to stderr verbatim.
#[derive(Debug, Default)]
pub struct TerminalErrors;

impl ErrorSink for TerminalErrors {
    fn set_error(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn clear_error(&mut self) {}
}

/// Sound player using the terminal bell.
///
/// The ding is a single bell; the looping tick rings once per second on a
/// helper thread until stopped. A terminal bell has no startup latency, so
/// muted preloads are accepted and ignored.
///
/// Bells go to stderr so stdout stays clean for `--json` event lines.
#[derive(Debug)]
pub struct BellPlayer {
    next_stream: u32,
    loops: HashMap<u32, Arc<AtomicBool>>,
}

impl BellPlayer {
    pub fn new() -> Self {
        Self {
            next_stream: 0,
            loops: HashMap::new(),
        }
    }
}

impl Default for BellPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn ring_bell() -> Result<(), SoundError> {
    let mut out = std::io::stderr().lock();
    out.write_all(BELL.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| SoundError::Playback(e.to_string()))
}

impl SoundPlayer for BellPlayer {
    fn play_once(&mut self, sound: SoundId) -> Result<(), SoundError> {
        tracing::debug!(%sound, "play once");
        ring_bell()
    }

    fn play_looping(&mut self, sound: SoundId) -> Result<StreamHandle, SoundError> {
        self.next_stream += 1;
        let id = self.next_stream;
        let stop = Arc::new(AtomicBool::new(false));
        self.loops.insert(id, Arc::clone(&stop));
        tracing::debug!(%sound, stream = id, "play looping");

        thread::Builder::new()
            .name(format!("tickdown-{sound}-loop"))
            .spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    if let Err(err) = ring_bell() {
                        tracing::warn!(%err, "bell loop ended");
                        break;
                    }
                    thread::sleep(TICK_PERIOD);
                }
            })
            .map_err(|e| SoundError::Playback(e.to_string()))?;
        Ok(StreamHandle(id))
    }

    fn play_muted(&mut self, sound: SoundId) -> Result<(), SoundError> {
        tracing::debug!(%sound, "preload");
        Ok(())
    }

    fn stop(&mut self, stream: StreamHandle) -> Result<(), SoundError> {
        let flag = self
            .loops
            .remove(&stream.0)
            .ok_or(SoundError::UnknownStream(stream.0))?;
        flag.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for BellPlayer {
    fn drop(&mut self) {
        for flag in self.loops.values() {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bell_player_tracks_streams() {
        let mut player = BellPlayer::new();
        let handle = player.play_looping(SoundId::Tick).unwrap();
        assert_eq!(player.loops.len(), 1);
        assert!(player.stop(handle).is_ok());
        assert_eq!(
            player.stop(handle),
            Err(SoundError::UnknownStream(handle.0))
        );
        assert!(player.loops.is_empty());
        assert!(player.play_muted(SoundId::Tick).is_ok());
    }

    #[test]
    fn dropping_player_stops_loops() {
        let mut player = BellPlayer::default();
        player.play_looping(SoundId::Tick).unwrap();
        let flag = Arc::clone(player.loops.values().next().unwrap());
        drop(player);
        assert!(flag.load(Ordering::SeqCst));
    }
}
