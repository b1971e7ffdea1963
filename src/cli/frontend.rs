//! Terminal front end of a session.
//!
//! Runs on the UI thread and multiplexes four sources with `tokio::select!`:
//! worker events, the once-per-second countdown refresh, Ctrl+C and typed
//! `reset` commands. Ctrl+C also ends the interactive prompt.

use std::rc::Rc;
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::commands::SessionRequest;
use super::display::Display;
use super::prompt::{is_reset_command, Prompt};
use crate::display::{Accent, DisplaySurface};
use crate::session::{build_config, EndReason, SessionController, SessionError, SessionEvent};
use crate::sound::CuePlayer;

/// Countdown refresh period.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Forwards every Ctrl+C press to the returned receiver.
///
/// Once installed, the handler replaces the default Ctrl+C behavior for the
/// rest of the process. The receiver closes if the handler fails.
pub fn forward_ctrl_c() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Ctrl+C handler unavailable: {}", e);
                return;
            }
            if tx.send(()).is_err() {
                return;
            }
        }
    });
    rx
}

async fn next_interrupt(interrupts: &mut Option<mpsc::UnboundedReceiver<()>>) -> Option<()> {
    match interrupts {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// How a session run ended from the front end's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session ended on its own or through a `reset` command.
    Finished(EndReason),
    /// Ctrl+C was pressed; the program should exit.
    Interrupted,
}

/// Owns the controller, the overlay and the input for the lifetime of the program.
pub struct Frontend<D, R> {
    controller: SessionController,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    display: D,
    cues: Option<Rc<dyn CuePlayer>>,
    prompt: Prompt<R>,
    input_open: bool,
    interrupts: Option<mpsc::UnboundedReceiver<()>>,
}

impl<D: DisplaySurface, R: AsyncRead + Unpin> Frontend<D, R> {
    pub fn new(
        controller: SessionController,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        display: D,
        prompt: Prompt<R>,
    ) -> Self {
        Self {
            controller,
            events,
            display,
            cues: None,
            prompt,
            input_open: true,
            interrupts: None,
        }
    }

    /// Treats every message on `interrupts` as Ctrl+C.
    pub fn with_interrupts(mut self, interrupts: mpsc::UnboundedReceiver<()>) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    /// Plays break and focus cues through `cues`.
    pub fn with_cues(mut self, cues: Option<Rc<dyn CuePlayer>>) -> Self {
        self.cues = cues;
        self
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Prompts for sessions until end of input or Ctrl+C.
    ///
    /// Start errors are shown and the prompt asks again.
    pub async fn run_interactive(&mut self) -> anyhow::Result<()> {
        loop {
            let request = tokio::select! {
                request = self.prompt.ask_request() => request?,
                signal = next_interrupt(&mut self.interrupts) => {
                    if signal.is_some() {
                        return Ok(());
                    }
                    self.interrupts = None;
                    continue;
                }
            };
            let Some(request) = request else {
                return Ok(());
            };
            match self.run_session(request).await {
                Ok(SessionOutcome::Interrupted) => return Ok(()),
                Ok(SessionOutcome::Finished(_)) => {}
                Err(e) => Display::show_error_with_hint(&e.to_string(), e.suggestion()),
            }
        }
    }

    /// Starts one session and drives the display until it ends.
    pub async fn run_session(
        &mut self,
        request: SessionRequest,
    ) -> Result<SessionOutcome, SessionError> {
        let config = build_config(request.variant, request.minutes)?;

        // leftovers of a worker that died without reporting
        while self.events.try_recv().is_ok() {}

        self.controller.start(request.pdf, config.clone())?;
        Display::show_session_started(&config);

        let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut interrupted = false;

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        warn!("Session event channel closed");
                        self.controller.reset();
                        self.display.close();
                        return Ok(SessionOutcome::Finished(EndReason::Reset));
                    };
                    if let Some(reason) = self.handle_event(event) {
                        return Ok(if interrupted {
                            SessionOutcome::Interrupted
                        } else {
                            SessionOutcome::Finished(reason)
                        });
                    }
                }
                _ = ticker.tick() => self.refresh(),
                signal = next_interrupt(&mut self.interrupts), if !interrupted => {
                    match signal {
                        Some(()) => {
                            interrupted = true;
                            self.controller.reset();
                        }
                        None => self.interrupts = None,
                    }
                }
                line = self.prompt.next_line(), if self.input_open => {
                    match line {
                        Ok(Some(line)) if is_reset_command(&line) => self.controller.reset(),
                        Ok(Some(line)) => debug!("Ignoring input {:?}", line),
                        Ok(None) => self.input_open = false,
                        Err(e) => {
                            debug!("Input closed: {}", e);
                            self.input_open = false;
                        }
                    }
                }
            }
        }
    }

    /// Applies one worker event. Returns the end reason on the final event.
    fn handle_event(&mut self, event: SessionEvent) -> Option<EndReason> {
        match event {
            SessionEvent::Started { total } => debug!("Worker started, session of {:?}", total),
            SessionEvent::Warning(message) => Display::show_warning(&message),
            SessionEvent::AppsDiscovered { viewer, player } => {
                Display::show_apps_discovered(viewer, player)
            }
            SessionEvent::SegmentStarted { phase, length } => {
                Display::show_segment(phase, length);
                self.refresh();
            }
            SessionEvent::Cue(cue) => {
                if let Some(player) = &self.cues {
                    if let Err(e) = player.play(cue) {
                        warn!("Failed to play {} cue: {} ({})", cue, e, e.suggestion());
                    }
                }
            }
            SessionEvent::Ended { reason } => {
                self.display.close();
                Display::show_session_ended(reason);
                return Some(reason);
            }
        }
        None
    }

    /// Redraws the countdown from the shared session state.
    fn refresh(&mut self) {
        let session = self.controller.snapshot();
        if !session.is_active {
            return;
        }
        let now = self.controller.now();
        self.display
            .update_session_remaining(session.session_remaining(now));
        self.display.update_text(
            session.segment_remaining(now),
            session.mode_label(),
            Accent::for_segment(session.is_on_break),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock, SystemClock};
    use crate::display::MockDisplay;
    use crate::launcher::MockLauncher;
    use crate::platform::{Desktop, MockDesktop};
    use crate::session::SessionTiming;
    use crate::sound::{Cue, MockCuePlayer};
    use crate::types::Variant;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn frontend<R: AsyncRead + Unpin>(
        desktop: &Arc<MockDesktop>,
        clock: Arc<dyn Clock>,
        poll: Duration,
        input: R,
    ) -> Frontend<MockDisplay, R> {
        let (tx, rx) = mpsc::unbounded_channel();
        let timing = SessionTiming {
            poll_interval: poll,
            launch_settle: Duration::ZERO,
            discovery_attempts: 1,
            ..SessionTiming::default()
        };
        let controller = SessionController::new(
            Desktop::from_shared(desktop.clone()),
            Arc::new(MockLauncher::new()),
            clock,
            timing,
            tx,
        );
        Frontend::new(controller, rx, MockDisplay::new(), Prompt::new(input))
    }

    fn request(dir: &TempDir, variant: Variant, minutes: u64) -> SessionRequest {
        let pdf = dir.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        SessionRequest {
            pdf: Some(pdf),
            variant,
            minutes,
        }
    }

    #[tokio::test]
    async fn test_session_runs_to_completion() {
        let dir = TempDir::new().unwrap();
        let desktop = Arc::new(MockDesktop::new());
        desktop.add_window(1, "notes.pdf - SumatraPDF");
        let mut frontend = frontend(
            &desktop,
            Arc::new(ManualClock::new()),
            Duration::from_millis(500),
            tokio::io::empty(),
        );

        let outcome = frontend
            .run_session(request(&dir, Variant::Classic, 15))
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Finished(EndReason::Completed));
        assert!(frontend.display().is_closed());
        assert!(!desktop.is_taskbar_hidden());
        assert!(desktop.blocked_keys().is_empty());
    }

    #[tokio::test]
    async fn test_pomodoro_plays_cues() {
        let dir = TempDir::new().unwrap();
        let desktop = Arc::new(MockDesktop::new());
        desktop.add_window(1, "notes.pdf");
        desktop.add_window(2, "Spotify");
        let cues = Rc::new(MockCuePlayer::new());
        let mut frontend = frontend(
            &desktop,
            Arc::new(ManualClock::new()),
            Duration::from_millis(500),
            tokio::io::empty(),
        )
        .with_cues(Some(cues.clone()));

        // 45 = 25 focus + 5 break + 15 focus
        let outcome = frontend
            .run_session(request(&dir, Variant::Pomodoro, 45))
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Finished(EndReason::Completed));
        assert_eq!(cues.played(), vec![Cue::BreakStart, Cue::FocusResume]);
    }

    #[tokio::test]
    async fn test_reset_command_stops_session() {
        let dir = TempDir::new().unwrap();
        let desktop = Arc::new(MockDesktop::new());
        desktop.add_window(1, "notes.pdf");
        desktop.add_window(2, "Spotify");
        let mut frontend = frontend(
            &desktop,
            Arc::new(SystemClock),
            Duration::from_millis(10),
            &b"hello\nreset\n"[..],
        );

        let outcome = frontend
            .run_session(request(&dir, Variant::Pomodoro, 60))
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Finished(EndReason::Reset));
        assert!(!desktop.is_taskbar_hidden());
        assert!(desktop.registered_hotkeys().is_empty());
        assert!(frontend.display().is_closed());
    }

    #[tokio::test]
    async fn test_start_errors_are_returned() {
        let desktop = Arc::new(MockDesktop::new());
        let mut frontend = frontend(
            &desktop,
            Arc::new(ManualClock::new()),
            Duration::from_millis(500),
            tokio::io::empty(),
        );

        let err = frontend
            .run_session(SessionRequest {
                pdf: None,
                variant: Variant::Classic,
                minutes: 25,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NoPdfSelected));

        let err = frontend
            .run_session(SessionRequest {
                pdf: Some(PathBuf::from("notes.pdf")),
                variant: Variant::Classic,
                minutes: 7,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedDuration { .. }));
        assert!(desktop.calls().is_empty());
    }

    #[tokio::test]
    async fn test_interactive_reprompts_after_error() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        let desktop = Arc::new(MockDesktop::new());
        let input = format!("missing.pdf\n1\n25\n{}\n1\n15\n", pdf.display());
        let mut frontend = frontend(
            &desktop,
            Arc::new(ManualClock::new()),
            Duration::from_millis(500),
            std::io::Cursor::new(input.into_bytes()),
        );

        frontend.run_interactive().await.unwrap();

        // the second request ran a full session
        assert!(frontend.display().is_closed());
        assert!(desktop.calls().contains(&crate::platform::MockCall::HideTaskbar));
        assert!(!desktop.is_taskbar_hidden());
    }

    #[tokio::test]
    async fn test_ctrl_c_at_prompt_exits() {
        let desktop = Arc::new(MockDesktop::new());
        // input that never arrives
        let (_keyboard, input) = tokio::io::duplex(64);
        let (tx, rx) = mpsc::unbounded_channel();
        let mut frontend = frontend(
            &desktop,
            Arc::new(ManualClock::new()),
            Duration::from_millis(500),
            input,
        )
        .with_interrupts(rx);

        tx.send(()).unwrap();
        frontend.run_interactive().await.unwrap();

        assert!(desktop.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ctrl_c_during_session_interrupts() {
        let dir = TempDir::new().unwrap();
        let desktop = Arc::new(MockDesktop::new());
        desktop.add_window(1, "notes.pdf");
        desktop.add_window(2, "Spotify");
        let (_keyboard, input) = tokio::io::duplex(64);
        let (tx, rx) = mpsc::unbounded_channel();
        let mut frontend = frontend(
            &desktop,
            Arc::new(SystemClock),
            Duration::from_millis(10),
            input,
        )
        .with_interrupts(rx);

        tx.send(()).unwrap();
        let outcome = frontend
            .run_session(request(&dir, Variant::Pomodoro, 60))
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Interrupted);
        assert!(!desktop.is_taskbar_hidden());
        assert!(desktop.blocked_keys().is_empty());
    }
}
