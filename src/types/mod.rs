//! Core data types for a focus session.
//!
//! This module defines the data structures used for:
//! - Session phase tracking
//! - Session configuration per variant (classic and pomodoro)
//! - Segment arithmetic on the shared session state

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::display::{BREAK_LABEL, FOCUS_LABEL};
use crate::platform::Key;

const MINUTE: u64 = 60;

// ============================================================================
// SessionPhase
// ============================================================================

/// Represents the current phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session has been started
    #[default]
    Idle,
    /// External applications are starting and being discovered
    Launching,
    /// A focus segment is running and the desktop is locked
    Focused,
    /// A break segment is running and the desktop is released
    OnBreak,
    /// The session has finished or was reset
    Ending,
}

impl SessionPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Launching => "launching",
            SessionPhase::Focused => "focused",
            SessionPhase::OnBreak => "on_break",
            SessionPhase::Ending => "ending",
        }
    }

    /// Returns true while the worker owns the desktop.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionPhase::Launching | SessionPhase::Focused | SessionPhase::OnBreak
        )
    }
}

// ============================================================================
// Variant
// ============================================================================

/// Which flavour of session to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// One uninterrupted focus block, viewer started fullscreen.
    #[default]
    Classic,
    /// Alternating 25 minute focus and 5 minute break segments.
    Pomodoro,
}

impl Variant {
    /// Focus segment length of the pomodoro variant, in minutes.
    pub const FOCUS_MINUTES: u64 = 25;
    /// Break segment length of the pomodoro variant, in minutes.
    pub const BREAK_MINUTES: u64 = 5;

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Pomodoro => "pomodoro",
        }
    }

    /// Total durations offered for this variant, in minutes.
    pub fn duration_options(&self) -> &'static [u64] {
        match self {
            Variant::Classic => &[15, 25, 30, 45, 60, 90, 120],
            Variant::Pomodoro => &[45, 60, 90, 120, 150, 180],
        }
    }

    pub fn default_minutes(&self) -> u64 {
        match self {
            Variant::Classic => 25,
            Variant::Pomodoro => 90,
        }
    }

    pub fn supports(&self, minutes: u64) -> bool {
        self.duration_options().contains(&minutes)
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// How the PDF viewer is put into fullscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenMode {
    /// Pass a command-line flag when launching the viewer.
    LaunchFlag,
    /// Send the viewer's presentation key once after discovery.
    PresentKey,
}

/// Alternating focus and break lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakSchedule {
    pub focus: Duration,
    pub pause: Duration,
}

/// Everything a session needs to know before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Variant the config was built for
    pub variant: Variant,
    /// Total session length
    pub total: Duration,
    /// Break schedule, `None` for one uninterrupted focus block
    pub breaks: Option<BreakSchedule>,
    /// Fullscreen strategy for the viewer
    pub fullscreen: FullscreenMode,
    /// Global hotkey that toggles the music player
    pub toggle_hotkey: Option<Key>,
}

impl SessionConfig {
    /// Creates the standard configuration of `variant` for `minutes`.
    ///
    /// The minutes are not checked against [`Variant::duration_options`].
    pub fn for_variant(variant: Variant, minutes: u64) -> Self {
        let total = Duration::from_secs(minutes * MINUTE);
        match variant {
            Variant::Classic => Self {
                variant,
                total,
                breaks: None,
                fullscreen: FullscreenMode::LaunchFlag,
                toggle_hotkey: None,
            },
            Variant::Pomodoro => Self {
                variant,
                total,
                breaks: Some(BreakSchedule {
                    focus: Duration::from_secs(Variant::FOCUS_MINUTES * MINUTE),
                    pause: Duration::from_secs(Variant::BREAK_MINUTES * MINUTE),
                }),
                fullscreen: FullscreenMode::PresentKey,
                toggle_hotkey: Some(Key::F6),
            },
        }
    }

    /// Length of a focus segment. Without breaks this is the whole session.
    pub fn focus_interval(&self) -> Duration {
        self.breaks.map(|b| b.focus).unwrap_or(self.total)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.total.is_zero() {
            return Err("session length must be greater than zero".to_string());
        }
        if let Some(breaks) = self.breaks {
            if breaks.focus.is_zero() {
                return Err("focus segments must be longer than zero".to_string());
            }
            if breaks.pause.is_zero() {
                return Err("break segments must be longer than zero".to_string());
            }
        }
        Ok(())
    }
}

// ============================================================================
// Session
// ============================================================================

/// Shared state of the current (or last) session.
///
/// Lives behind one mutex; the worker mutates it and the UI thread reads
/// clones of it.
#[derive(Debug, Clone)]
pub struct Session {
    /// PDF opened in the viewer
    pub pdf_path: Option<PathBuf>,
    /// Configuration the session was started with
    pub config: SessionConfig,
    /// Current phase
    pub phase: SessionPhase,
    /// Absolute end of the whole session
    pub session_end: Option<Instant>,
    /// Absolute end of the running segment
    pub current_segment_end: Option<Instant>,
    /// True while a break segment runs
    pub is_on_break: bool,
    /// True from start until teardown completes or a reset is requested
    pub is_active: bool,
}

impl Session {
    /// Creates an idle session holding `config`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            pdf_path: None,
            config,
            phase: SessionPhase::Idle,
            session_end: None,
            current_segment_end: None,
            is_on_break: false,
            is_active: false,
        }
    }

    /// Starts the session clock and enters `Launching`.
    pub fn begin(&mut self, pdf_path: PathBuf, now: Instant) {
        self.pdf_path = Some(pdf_path);
        self.phase = SessionPhase::Launching;
        self.session_end = Some(now + self.config.total);
        self.current_segment_end = Some(now + self.config.focus_interval());
        self.is_on_break = false;
        self.is_active = true;
    }

    /// Marks the first focus segment as running.
    pub fn enter_focus(&mut self) {
        if self.is_active {
            self.phase = SessionPhase::Focused;
        }
    }

    /// Returns true once the running segment has elapsed.
    pub fn segment_due(&self, now: Instant) -> bool {
        self.current_segment_end.is_some_and(|end| now >= end)
    }

    /// Returns true once the whole session has elapsed.
    pub fn session_due(&self, now: Instant) -> bool {
        self.session_end.is_some_and(|end| now >= end)
    }

    /// Switches to a break segment and returns its length.
    ///
    /// The break is cut short so it never runs past the session end. Returns
    /// `None` when the config has no breaks.
    pub fn start_break(&mut self, now: Instant) -> Option<Duration> {
        let breaks = self.config.breaks?;
        let length = breaks.pause.min(self.session_remaining(now));
        self.is_on_break = true;
        self.phase = SessionPhase::OnBreak;
        self.current_segment_end = Some(now + length);
        Some(length)
    }

    /// Switches back to a focus segment and returns its length.
    ///
    /// Returns `None` if no time is left, in which case the session should end.
    pub fn resume_focus(&mut self, now: Instant) -> Option<Duration> {
        let length = self
            .config
            .focus_interval()
            .min(self.session_remaining(now));
        if length.is_zero() {
            return None;
        }
        self.is_on_break = false;
        self.phase = SessionPhase::Focused;
        self.current_segment_end = Some(now + length);
        Some(length)
    }

    /// Marks the session as over.
    pub fn finish(&mut self) {
        self.is_active = false;
        self.is_on_break = false;
        self.phase = SessionPhase::Ending;
    }

    /// Remaining time in the running segment.
    pub fn segment_remaining(&self, now: Instant) -> Duration {
        self.current_segment_end
            .map(|end| end.saturating_duration_since(now))
            .unwrap_or_default()
    }

    /// Remaining time of the whole session.
    pub fn session_remaining(&self, now: Instant) -> Duration {
        self.session_end
            .map(|end| end.saturating_duration_since(now))
            .unwrap_or_default()
    }

    /// Label shown on the overlay for the running segment.
    pub fn mode_label(&self) -> &'static str {
        if self.is_on_break {
            BREAK_LABEL
        } else {
            FOCUS_LABEL
        }
    }
}
