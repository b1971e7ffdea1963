//! Display utilities for the focuslock CLI.
//!
//! This module provides formatted output for:
//! - Session start and plan
//! - Segment changes and warnings
//! - Session end
//! - Error messages
//!
//! Every line starts by clearing the countdown line, which the next refresh
//! redraws below it.

use std::time::Duration;

use crate::display::format_hms;
use crate::session::schedule::{describe, plan_segments};
use crate::session::EndReason;
use crate::types::{SessionConfig, SessionPhase};

const CLEAR_LINE: &str = "\r\x1b[2K";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the session plan right after a successful start.
    pub fn show_session_started(config: &SessionConfig) {
        println!("{CLEAR_LINE}{}", Self::format_plan(config));
    }

    /// Shows which application windows were found.
    pub fn show_apps_discovered(viewer: bool, player: bool) {
        println!(
            "{CLEAR_LINE}PDF viewer window: {}, music player window: {}",
            Self::found(viewer),
            Self::found(player)
        );
    }

    /// Shows a new focus or break segment.
    pub fn show_segment(phase: SessionPhase, length: Duration) {
        println!("{CLEAR_LINE}{}", Self::format_segment(phase, length));
    }

    /// Shows a non-fatal problem reported by the session.
    pub fn show_warning(message: &str) {
        eprintln!("{CLEAR_LINE}warning: {}", message);
    }

    /// Shows the end of the session.
    pub fn show_session_ended(reason: EndReason) {
        println!("{CLEAR_LINE}{}", Self::format_ended(reason));
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("{CLEAR_LINE}error: {}", message);
    }

    /// Shows an error message followed by a hint.
    pub fn show_error_with_hint(message: &str, hint: &str) {
        Self::show_error(message);
        eprintln!("  hint: {}", hint);
    }

    fn format_plan(config: &SessionConfig) -> String {
        let segments = plan_segments(config.total, config.breaks);
        format!(
            "Starting {} session of {} ({})",
            config.variant.as_str(),
            format_hms(config.total),
            describe(&segments)
        )
    }

    fn format_segment(phase: SessionPhase, length: Duration) -> String {
        match phase {
            SessionPhase::OnBreak => format!("Break for {}", format_hms(length)),
            _ => format!("Focus for {}", format_hms(length)),
        }
    }

    fn format_ended(reason: EndReason) -> String {
        match reason {
            EndReason::Completed => "Session complete. Desktop restored.".to_string(),
            EndReason::Reset => "Session reset. Desktop restored.".to_string(),
        }
    }

    fn found(found: bool) -> &'static str {
        if found {
            "found"
        } else {
            "not found"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Variant;

    #[test]
    fn test_format_plan() {
        let config = SessionConfig::for_variant(Variant::Pomodoro, 90);
        assert_eq!(
            Display::format_plan(&config),
            "Starting pomodoro session of 01:30:00 (3 focus blocks, 3 breaks)"
        );

        let config = SessionConfig::for_variant(Variant::Classic, 45);
        assert_eq!(
            Display::format_plan(&config),
            "Starting classic session of 00:45:00 (1 focus block)"
        );
    }

    #[test]
    fn test_format_segment() {
        assert_eq!(
            Display::format_segment(SessionPhase::OnBreak, Duration::from_secs(300)),
            "Break for 00:05:00"
        );
        assert_eq!(
            Display::format_segment(SessionPhase::Focused, Duration::from_secs(1500)),
            "Focus for 00:25:00"
        );
    }

    #[test]
    fn test_format_ended() {
        assert!(Display::format_ended(EndReason::Completed).contains("complete"));
        assert!(Display::format_ended(EndReason::Reset).contains("reset"));
    }

    #[test]
    fn test_found() {
        assert_eq!(Display::found(true), "found");
        assert_eq!(Display::found(false), "not found");
    }
}
