//! Single-line countdown drawn in the terminal.
//!
//! The line is rewritten in place with a carriage return, colored with the
//! segment's accent through 24-bit ANSI escapes. Terminals that cannot
//! interpret escapes get the plain line.

use std::io::Write;
use std::time::Duration;

use tracing::debug;

use super::{format_hms, Accent, DisplaySurface};

const CLEAR_LINE: &str = "\r\x1b[2K";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Countdown overlay on a terminal stream.
pub struct TerminalOverlay<W: Write> {
    out: W,
    session_remaining: Option<Duration>,
    color: bool,
}

impl<W: Write> TerminalOverlay<W> {
    /// Creates a colored overlay writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            session_remaining: None,
            color: true,
        }
    }

    /// Turns ANSI colors on or off.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Creates an overlay that writes plain text when `enabled` is false.
    pub fn with_escapes(out: W, enabled: bool) -> Self {
        let overlay = Self::new(out).with_color(enabled);
        if !enabled {
            debug!("ANSI escapes unavailable, drawing the overlay without color");
        }
        overlay
    }

    /// Builds the text of one frame, without the leading line reset.
    pub fn render(&self, segment_remaining: Duration, mode_label: &str, accent: Accent) -> String {
        let mut line = if self.color {
            let (r, g, b) = accent.rgb();
            format!(
                "{BOLD}\x1b[38;2;{r};{g};{b}m{mode_label}  {}{RESET}",
                format_hms(segment_remaining)
            )
        } else {
            format!("{}  {}", mode_label, format_hms(segment_remaining))
        };
        if let Some(total) = self.session_remaining {
            line.push_str(&format!("  (session {})", format_hms(total)));
        }
        line.push_str("  [type 'reset' + Enter to stop]");
        line
    }

    /// Consumes the overlay and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for TerminalOverlay<W> {
    fn update_text(&mut self, segment_remaining: Duration, mode_label: &str, accent: Accent) {
        let line = self.render(segment_remaining, mode_label, accent);
        let prefix = if self.color { CLEAR_LINE } else { "\r" };
        // a broken terminal must not take the session down
        if let Err(e) = write!(self.out, "{prefix}{line}").and_then(|_| self.out.flush()) {
            debug!("Failed to draw overlay: {}", e);
        }
    }

    fn update_session_remaining(&mut self, remaining: Duration) {
        self.session_remaining = Some(remaining);
    }

    fn close(&mut self) {
        let clear = if self.color { CLEAR_LINE } else { "\n" };
        if let Err(e) = write!(self.out, "{clear}").and_then(|_| self.out.flush()) {
            debug!("Failed to clear overlay: {}", e);
        }
        self.session_remaining = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{BREAK_LABEL, FOCUS_LABEL};

    #[test]
    fn test_plain_render() {
        let overlay = TerminalOverlay::new(Vec::new()).with_color(false);
        let line = overlay.render(Duration::from_secs(25 * 60), FOCUS_LABEL, Accent::Focus);
        assert!(line.starts_with("FOCUS MODE  00:25:00"));
        assert!(!line.contains("session"));
    }

    #[test]
    fn test_colored_render_uses_accent() {
        let overlay = TerminalOverlay::new(Vec::new());
        let line = overlay.render(Duration::from_secs(10), BREAK_LABEL, Accent::Break);
        assert!(line.contains("\x1b[38;2;244;67;54m"));
        assert!(line.contains("BREAK TIME"));
    }

    #[test]
    fn test_update_writes_session_remaining() {
        let mut overlay = TerminalOverlay::new(Vec::new());
        overlay.update_session_remaining(Duration::from_secs(3600));
        overlay.update_text(Duration::from_secs(59), FOCUS_LABEL, Accent::Focus);
        overlay.close();

        let written = String::from_utf8(overlay.into_inner()).unwrap();
        assert!(written.contains("00:00:59"));
        assert!(written.contains("(session 01:00:00)"));
        assert!(written.ends_with(CLEAR_LINE));
    }

    #[test]
    fn test_without_escapes_writes_no_ansi() {
        let mut overlay = TerminalOverlay::with_escapes(Vec::new(), false);
        overlay.update_text(Duration::from_secs(59), FOCUS_LABEL, Accent::Focus);
        overlay.close();

        let written = String::from_utf8(overlay.into_inner()).unwrap();
        assert!(written.contains("FOCUS MODE  00:00:59"));
        assert!(!written.contains('\x1b'));
    }
}
