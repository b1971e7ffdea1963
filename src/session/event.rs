//! Events reported by the session worker to the front end.

use std::time::Duration;

use crate::sound::Cue;
use crate::types::SessionPhase;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured duration elapsed.
    Completed,
    /// The user forced a reset.
    Reset,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Completed => "completed",
            EndReason::Reset => "reset",
        }
    }
}

/// Session events for the display, cues and messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Worker started and is launching the applications
    Started {
        /// Total session length
        total: Duration,
    },
    /// Something non-fatal went wrong
    Warning(String),
    /// Window discovery finished
    AppsDiscovered {
        /// Whether a viewer window was found
        viewer: bool,
        /// Whether a player window was found
        player: bool,
    },
    /// A focus or break segment began
    SegmentStarted {
        /// `Focused` or `OnBreak`
        phase: SessionPhase,
        /// Length of the new segment
        length: Duration,
    },
    /// A cue should be played
    Cue(Cue),
    /// Desktop restored and session over
    Ended {
        /// Why the session ended
        reason: EndReason,
    },
}

impl SessionEvent {
    /// Returns true for the final event of a session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Ended { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(SessionEvent::Ended {
            reason: EndReason::Reset
        }
        .is_terminal());
        assert!(!SessionEvent::Cue(Cue::BreakStart).is_terminal());
        assert!(!SessionEvent::Warning("x".into()).is_terminal());
    }

    #[test]
    fn test_end_reason_as_str() {
        assert_eq!(EndReason::Completed.as_str(), "completed");
        assert_eq!(EndReason::Reset.as_str(), "reset");
    }

    #[test]
    fn test_segment_event_equality() {
        let a = SessionEvent::SegmentStarted {
            phase: SessionPhase::OnBreak,
            length: Duration::from_secs(300),
        };
        assert_eq!(a.clone(), a);
    }
}
