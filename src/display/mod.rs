//! Countdown display for a running session.
//!
//! This module handles:
//! - Formatting remaining time as `HH:MM:SS`
//! - Picking the mode label and accent color for the running segment
//! - Rendering through a [`DisplaySurface`] (the terminal overlay in the binary)
//!
//! The text generation is platform-independent and fully testable.

pub mod terminal;

use std::sync::Mutex;
use std::time::Duration;

pub use terminal::TerminalOverlay;

/// Label shown during focus segments.
pub const FOCUS_LABEL: &str = "FOCUS MODE";

/// Label shown during break segments.
pub const BREAK_LABEL: &str = "BREAK TIME";

// ============================================================================
// Accent
// ============================================================================

/// Accent color of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    /// Green, shown while focusing
    Focus,
    /// Red, shown during breaks
    Break,
}

impl Accent {
    /// Picks the accent for a segment.
    pub fn for_segment(is_on_break: bool) -> Self {
        if is_on_break {
            Accent::Break
        } else {
            Accent::Focus
        }
    }

    /// Returns the color as a `#RRGGBB` string.
    pub fn hex(&self) -> &'static str {
        match self {
            Accent::Focus => "#81C784",
            Accent::Break => "#F44336",
        }
    }

    /// Returns the color as RGB components.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Accent::Focus => (0x81, 0xC7, 0x84),
            Accent::Break => (0xF4, 0x43, 0x36),
        }
    }
}

/// Formats a duration as `HH:MM:SS`, dropping sub-second precision.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use focuslock::display::format_hms;
///
/// assert_eq!(format_hms(Duration::from_secs(25 * 60)), "00:25:00");
/// assert_eq!(format_hms(Duration::from_secs(3 * 3600 + 61)), "03:01:01");
/// ```
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

// ============================================================================
// DisplaySurface
// ============================================================================

/// Something that can show the countdown.
pub trait DisplaySurface {
    /// Redraws the countdown of the running segment.
    fn update_text(&mut self, segment_remaining: Duration, mode_label: &str, accent: Accent);

    /// Records the remaining time of the whole session for the next redraw.
    fn update_session_remaining(&mut self, _remaining: Duration) {}

    /// Removes the surface at session end.
    fn close(&mut self);
}

/// One recorded redraw of [`MockDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub text: String,
    pub mode_label: String,
    pub accent: Accent,
}

/// Display double that records every frame.
#[derive(Debug, Default)]
pub struct MockDisplay {
    frames: Mutex<Vec<RenderedFrame>>,
    closed: Mutex<bool>,
}

impl MockDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> Vec<RenderedFrame> {
        self.frames.lock().unwrap().clone()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl DisplaySurface for MockDisplay {
    fn update_text(&mut self, segment_remaining: Duration, mode_label: &str, accent: Accent) {
        self.frames.lock().unwrap().push(RenderedFrame {
            text: format_hms(segment_remaining),
            mode_label: mode_label.to_string(),
            accent,
        });
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_zero() {
            assert_eq!(format_hms(Duration::ZERO), "00:00:00");
        }

        #[test]
        fn test_format_truncates_subseconds() {
            assert_eq!(format_hms(Duration::from_millis(59_999)), "00:00:59");
        }

        #[test]
        fn test_format_hours() {
            assert_eq!(format_hms(Duration::from_secs(180 * 60)), "03:00:00");
            assert_eq!(format_hms(Duration::from_secs(90 * 60 + 5)), "01:30:05");
        }
    }

    mod accent_tests {
        use super::*;

        #[test]
        fn test_accent_colors() {
            assert_eq!(Accent::Focus.hex(), "#81C784");
            assert_eq!(Accent::Break.hex(), "#F44336");
            assert_eq!(Accent::Focus.rgb(), (129, 199, 132));
            assert_eq!(Accent::Break.rgb(), (244, 67, 54));
        }

        #[test]
        fn test_for_segment() {
            assert_eq!(Accent::for_segment(false), Accent::Focus);
            assert_eq!(Accent::for_segment(true), Accent::Break);
        }
    }

    #[test]
    fn test_mock_display_records_frames() {
        let mut display = MockDisplay::new();
        display.update_text(Duration::from_secs(61), FOCUS_LABEL, Accent::Focus);
        display.update_text(Duration::from_secs(300), BREAK_LABEL, Accent::Break);
        display.close();

        let frames = display.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].text, "00:01:01");
        assert_eq!(frames[1].mode_label, "BREAK TIME");
        assert!(display.is_closed());
    }
}
