//! Segment plan of a session.
//!
//! Pure arithmetic matching what the worker does at runtime: focus and break
//! segments alternate, and whichever segment reaches the session end is cut
//! short.

use std::time::Duration;

use crate::types::{BreakSchedule, SessionPhase};

/// One planned segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// `Focused` or `OnBreak`
    pub phase: SessionPhase,
    pub length: Duration,
}

/// Lays out every segment of a session of length `total`.
pub fn plan_segments(total: Duration, breaks: Option<BreakSchedule>) -> Vec<Segment> {
    let Some(schedule) = breaks else {
        if total.is_zero() {
            return Vec::new();
        }
        return vec![Segment {
            phase: SessionPhase::Focused,
            length: total,
        }];
    };
    if schedule.focus.is_zero() || schedule.pause.is_zero() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        let focus = schedule.focus.min(total - elapsed);
        segments.push(Segment {
            phase: SessionPhase::Focused,
            length: focus,
        });
        elapsed += focus;
        if elapsed >= total {
            break;
        }

        let pause = schedule.pause.min(total - elapsed);
        segments.push(Segment {
            phase: SessionPhase::OnBreak,
            length: pause,
        });
        elapsed += pause;
    }
    segments
}

/// Number of complete focus-and-break cycles.
pub fn full_cycles(total: Duration, schedule: BreakSchedule) -> u32 {
    let cycle = schedule.focus + schedule.pause;
    if cycle.is_zero() {
        return 0;
    }
    (total.as_nanos() / cycle.as_nanos()) as u32
}

/// Time left over after the complete cycles.
pub fn final_partial(total: Duration, schedule: BreakSchedule) -> Duration {
    let cycle = schedule.focus + schedule.pause;
    if cycle.is_zero() {
        return total;
    }
    let rest = total.as_nanos() % cycle.as_nanos();
    Duration::from_nanos(rest as u64)
}

/// Human-readable summary such as `"3 focus blocks, 3 breaks"`.
pub fn describe(segments: &[Segment]) -> String {
    let focus = segments
        .iter()
        .filter(|s| s.phase == SessionPhase::Focused)
        .count();
    let breaks = segments.len() - focus;
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    };
    if breaks == 0 {
        plural(focus, "focus block")
    } else {
        format!("{}, {}", plural(focus, "focus block"), plural(breaks, "break"))
    }
}
