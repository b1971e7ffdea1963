//! Audible cues for segment changes.
//!
//! A rising tone marks the start of a break and a lower one marks the return
//! to focus:
//!
//! | Cue             | Frequency | Length |
//! |-----------------|-----------|--------|
//! | `BreakStart`    | 880 Hz    | 500 ms |
//! | `FocusResume`   | 660 Hz    | 500 ms |
//!
//! # Usage
//!
//! ```rust,no_run
//! use focuslock::sound::{try_create_player, Cue, CuePlayer};
//!
//! if let Some(player) = try_create_player(false) {
//!     let _ = player.play(Cue::BreakStart);
//! }
//! ```

mod error;
mod player;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub use error::CueError;
pub use player::{try_create_player, RodioCuePlayer};

/// A short tone announcing a segment change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    BreakStart,
    FocusResume,
}

impl Cue {
    pub fn frequency_hz(&self) -> f32 {
        match self {
            Cue::BreakStart => 880.0,
            Cue::FocusResume => 660.0,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(500)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::BreakStart => "break cue",
            Cue::FocusResume => "focus cue",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for cue playback implementations.
pub trait CuePlayer {
    /// Starts playing `cue` and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, cue: Cue) -> Result<(), CueError>;
}

impl CuePlayer for RodioCuePlayer {
    fn play(&self, cue: Cue) -> Result<(), CueError> {
        RodioCuePlayer::play(self, cue)
    }
}

/// Mock cue player for testing.
#[derive(Debug, Default)]
pub struct MockCuePlayer {
    played: Mutex<Vec<Cue>>,
    should_fail: AtomicBool,
}

impl MockCuePlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn played(&self) -> Vec<Cue> {
        self.played.lock().unwrap().clone()
    }
}

impl CuePlayer for MockCuePlayer {
    fn play(&self, cue: Cue) -> Result<(), CueError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(CueError::StreamError("mock failure".to_string()));
        }
        self.played.lock().unwrap().push(cue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_tones() {
        assert_eq!(Cue::BreakStart.frequency_hz(), 880.0);
        assert_eq!(Cue::FocusResume.frequency_hz(), 660.0);
        assert_eq!(Cue::BreakStart.duration(), Duration::from_millis(500));
        assert_eq!(Cue::FocusResume.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_mock_records_cues() {
        let player = MockCuePlayer::new();
        player.play(Cue::BreakStart).unwrap();
        player.play(Cue::FocusResume).unwrap();
        assert_eq!(player.played(), vec![Cue::BreakStart, Cue::FocusResume]);

        player.set_should_fail(true);
        assert!(player.play(Cue::BreakStart).is_err());
        assert_eq!(player.played().len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cue::BreakStart.to_string(), "break cue");
    }
}
