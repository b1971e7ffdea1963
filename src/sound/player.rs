//! Cue player implementation using rodio.
//!
//! Cues are short sine tones generated on the fly, so no audio files ship
//! with the binary.

use std::sync::atomic::{AtomicBool, Ordering};

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::CueError;
use super::Cue;

/// Output volume applied to generated tones.
const CUE_VOLUME: f32 = 0.25;

/// A cue player backed by the default rodio output device.
///
/// The output stream is not `Send`, so the player lives on the thread that
/// created it (the UI thread).
pub struct RodioCuePlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    /// Whether cue playback is disabled.
    disabled: AtomicBool,
}

impl RodioCuePlayer {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `CueError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(disabled: bool) -> Result<Self, CueError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| CueError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            disabled: AtomicBool::new(disabled),
        })
    }

    /// Plays `cue` without blocking.
    pub fn play(&self, cue: Cue) -> Result<(), CueError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Cue playback disabled, skipping {}", cue);
            return Ok(());
        }

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| CueError::StreamError(e.to_string()))?;

        let tone = SineWave::new(cue.frequency_hz())
            .take_duration(cue.duration())
            .amplify(CUE_VOLUME);
        sink.append(tone);
        sink.detach(); // the tone keeps playing after this returns

        debug!("Playing {} ({} Hz)", cue, cue.frequency_hz());
        Ok(())
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for RodioCuePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioCuePlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Creates a cue player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<RodioCuePlayer> {
    match RodioCuePlayer::new(disabled) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("Audio not available, cues disabled: {}", e);
            None
        }
    }
}
