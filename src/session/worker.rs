//! The session worker: launch, discover, enforce, tear down.
//!
//! One worker runs per session on its own thread. It owns the allowed window
//! set and the hotkey registration, reads and writes the shared [`Session`]
//! through its mutex, and reports progress over an unbounded channel.
//!
//! Every wait is sliced by the poll interval so a reset requested by the
//! controller is observed within one poll.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::event::{EndReason, SessionEvent};
use crate::clock::Clock;
use crate::launcher::{App, LaunchPlan, ProcessLauncher, ProcessStatus};
use crate::platform::{
    Desktop, HotkeyId, Key, PlatformError, PlatformResult, WindowDirectory, WindowHandle,
    WindowInfo, GENERAL_BLOCKED_KEYS,
};
use crate::sound::Cue;
use crate::types::{FullscreenMode, Session, SessionPhase};

/// Attempts made to bring the viewer back after a break.
const VIEWER_RESTORE_ATTEMPTS: u32 = 3;

// ============================================================================
// SessionTiming
// ============================================================================

/// Poll cadence and window discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTiming {
    /// Delay between enforcement ticks
    pub poll_interval: Duration,
    /// Wait after launching before looking for windows
    pub launch_settle: Duration,
    /// How many times to look for the windows
    pub discovery_attempts: u32,
    /// Delay between discovery attempts
    pub discovery_delay: Duration,
    /// Wait between focusing the viewer and sending the presentation key
    pub present_delay: Duration,
    /// Delay between attempts to bring the viewer back after a break
    pub restore_retry_delay: Duration,
    /// Title substring of the viewer window
    pub viewer_title_pattern: String,
    /// Title substring of the player window
    pub player_title_pattern: String,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            launch_settle: Duration::from_secs(6),
            discovery_attempts: 15,
            discovery_delay: Duration::from_secs(1),
            present_delay: Duration::from_millis(1100),
            restore_retry_delay: Duration::from_millis(500),
            viewer_title_pattern: ".pdf".to_string(),
            player_title_pattern: "spotify".to_string(),
        }
    }
}

// ============================================================================
// Helpers shared with the controller
// ============================================================================

/// Releases every desktop override a session may hold.
///
/// Safe to call when nothing is held: unblocking is idempotent.
pub fn restore_desktop(
    desktop: &Desktop,
    hotkey: Option<HotkeyId>,
    pinned: &[WindowHandle],
) {
    for key in GENERAL_BLOCKED_KEYS.iter().chain([Key::F5].iter()) {
        if let Err(e) = desktop.keys.unblock(*key) {
            warn!("Failed to unblock {}: {}", key, e);
        }
    }
    if let Err(e) = desktop.taskbar.show() {
        warn!("Failed to show taskbar: {}", e);
    }
    if let Some(id) = hotkey {
        if let Err(e) = desktop.keys.unregister_hotkey(id) {
            warn!("Failed to unregister hotkey: {}", e);
        }
    }
    for handle in pinned {
        // a closed window has nothing left to unpin
        if let Err(e) = desktop.windows.set_topmost(*handle, false) {
            debug!("Failed to unpin {}: {}", handle, e);
        }
    }
}

/// Minimizes the player if it is visible, otherwise brings it back.
pub fn toggle_player(windows: &dyn WindowDirectory, player: WindowHandle) -> PlatformResult<()> {
    if windows.is_minimized(player)? {
        windows.restore(player)?;
        windows.activate(player)?;
        windows.raise(player)
    } else {
        windows.minimize(player)
    }
}

/// First window whose title matches `pattern`, ignoring `exclude`.
fn find_window(
    windows: &[WindowInfo],
    pattern: &str,
    exclude: Option<WindowHandle>,
) -> Option<WindowHandle> {
    windows
        .iter()
        .filter(|w| Some(w.handle) != exclude)
        .find(|w| w.title_contains(pattern))
        .map(|w| w.handle)
}

// ============================================================================
// SessionWorker
// ============================================================================

/// Drives one session from launch to teardown.
pub struct SessionWorker {
    session: Arc<Mutex<Session>>,
    desktop: Desktop,
    launcher: Arc<dyn ProcessLauncher>,
    clock: Arc<dyn Clock>,
    events: mpsc::UnboundedSender<SessionEvent>,
    timing: SessionTiming,
    plan: LaunchPlan,
    overlay: Option<WindowHandle>,
    allowed: HashSet<WindowHandle>,
    viewer: Option<WindowHandle>,
    player: Option<WindowHandle>,
    hotkey: Option<HotkeyId>,
    pinned: Vec<WindowHandle>,
    /// Ticks left in which enforcement looks for missing windows again
    rediscover_ticks: u32,
}

impl SessionWorker {
    /// Creates a worker for the session currently stored in `session`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: Arc<Mutex<Session>>,
        desktop: Desktop,
        launcher: Arc<dyn ProcessLauncher>,
        clock: Arc<dyn Clock>,
        events: mpsc::UnboundedSender<SessionEvent>,
        timing: SessionTiming,
        plan: LaunchPlan,
        overlay: Option<WindowHandle>,
    ) -> Self {
        Self {
            session,
            desktop,
            launcher,
            clock,
            events,
            timing,
            plan,
            overlay,
            allowed: HashSet::new(),
            viewer: None,
            player: None,
            hotkey: None,
            pinned: Vec::new(),
            rediscover_ticks: 0,
        }
    }

    /// Runs the session to completion and returns why it ended.
    pub fn run(mut self) -> EndReason {
        let total = self.with_session(|s| s.config.total);
        self.emit(SessionEvent::Started { total });

        let reason = if self.launch_and_discover() {
            self.lock_desktop();
            self.enter_focus();
            loop {
                if let Some(reason) = self.tick() {
                    break reason;
                }
                self.clock.sleep(self.timing.poll_interval);
            }
        } else {
            EndReason::Reset
        };

        self.teardown(reason);
        reason
    }

    // ------------------------------------------------------------------------
    // Launching
    // ------------------------------------------------------------------------

    /// Starts both applications and looks for their windows.
    ///
    /// Returns false if the session was reset meanwhile.
    pub fn launch_and_discover(&mut self) -> bool {
        for app in [App::PdfViewer, App::MusicPlayer] {
            match self.launcher.launch(app, &self.plan) {
                Ok(path) => debug!("{} started from {}", app, path.display()),
                Err(e) => {
                    warn!("{}", e);
                    self.emit(SessionEvent::Warning(format!("{} ({})", e, e.suggestion())));
                }
            }
        }

        if !self.wait(self.timing.launch_settle) {
            return false;
        }

        for attempt in 1..=self.timing.discovery_attempts {
            if !self.is_active() {
                return false;
            }
            if self.discover_once() {
                debug!("Found both windows on attempt {}", attempt);
                break;
            }
            if attempt < self.timing.discovery_attempts && !self.wait(self.timing.discovery_delay) {
                return false;
            }
        }

        info!(
            "Discovery finished: viewer={:?} player={:?}",
            self.viewer, self.player
        );
        self.emit(SessionEvent::AppsDiscovered {
            viewer: self.viewer.is_some(),
            player: self.player.is_some(),
        });
        if self.viewer.is_none() && self.player.is_none() {
            self.emit(SessionEvent::Warning(
                "no application windows found; only relaunching is possible".to_string(),
            ));
        }
        self.is_active()
    }

    /// One discovery pass. Returns true once both windows are known.
    fn discover_once(&mut self) -> bool {
        let windows = match self.desktop.windows.list_top_level_windows() {
            Ok(windows) => windows,
            Err(e) => {
                debug!("Window enumeration failed: {}", e);
                return false;
            }
        };
        if self.viewer.is_none() {
            self.viewer = find_window(&windows, &self.timing.viewer_title_pattern, self.overlay);
        }
        if self.player.is_none() {
            self.player = find_window(&windows, &self.timing.player_title_pattern, self.overlay);
        }
        self.allowed.extend(self.viewer);
        self.allowed.extend(self.player);
        self.viewer.is_some() && self.player.is_some()
    }

    /// Blocks keys, hides the taskbar and puts the viewer up front.
    pub fn lock_desktop(&mut self) {
        self.block_general_keys();
        if let Err(e) = self.desktop.taskbar.hide() {
            warn!("Failed to hide taskbar: {}", e);
        }
        self.register_toggle();
        if let Some(overlay) = self.overlay {
            self.pin(overlay);
        }

        let Some(viewer) = self.viewer else { return };
        let result = (|| {
            if !self.desktop.windows.is_maximized(viewer)? {
                self.desktop.windows.maximize(viewer)?;
            }
            self.desktop.windows.activate(viewer)?;
            self.desktop.windows.raise(viewer)
        })();
        if let Err(e) = result {
            self.handle_window_error(viewer, e);
        }
        self.pin(viewer);

        let fullscreen = self.with_session(|s| s.config.fullscreen);
        if fullscreen == FullscreenMode::PresentKey {
            self.present(viewer);
        }
    }

    /// Sends the presentation key once the viewer is in front, then blocks it.
    ///
    /// The key is never sent to a window other than the viewer.
    fn present(&mut self, viewer: WindowHandle) {
        if !self.wait(self.timing.present_delay) {
            return;
        }
        if let Err(e) = self.desktop.windows.activate(viewer) {
            warn!("Viewer is not in front, presentation key not sent: {}", e);
            self.handle_window_error(viewer, e);
            return;
        }
        if let Err(e) = self.desktop.keys.send_key(Key::F5) {
            warn!("Failed to send presentation key: {}", e);
        }
        if let Err(e) = self.desktop.keys.block(Key::F5) {
            warn!("Failed to block {}: {}", Key::F5, e);
        }
    }

    /// Registers the player toggle hotkey if the variant has one.
    fn register_toggle(&mut self) {
        if self.hotkey.is_some() {
            return;
        }
        let toggle_key = self.with_session(|s| s.config.toggle_hotkey);
        let (Some(player), Some(key)) = (self.player, toggle_key) else {
            return;
        };
        let windows = self.desktop.windows.clone();
        let callback = Arc::new(move || {
            if let Err(e) = toggle_player(windows.as_ref(), player) {
                debug!("Player toggle failed: {}", e);
            }
        });
        match self.desktop.keys.register_hotkey(key, callback) {
            Ok(id) => self.hotkey = Some(id),
            Err(e) => warn!("Failed to register {} hotkey: {}", key, e),
        }
    }

    /// Drops the toggle hotkey of a player window that is gone.
    fn unregister_toggle(&mut self) {
        if let Some(id) = self.hotkey.take() {
            if let Err(e) = self.desktop.keys.unregister_hotkey(id) {
                warn!("Failed to unregister hotkey: {}", e);
            }
        }
    }

    /// Keeps `handle` above every other window until teardown.
    fn pin(&mut self, handle: WindowHandle) {
        if self.pinned.contains(&handle) {
            return;
        }
        match self.desktop.windows.set_topmost(handle, true) {
            Ok(()) => self.pinned.push(handle),
            Err(e) => debug!("Failed to pin {}: {}", handle, e),
        }
    }

    fn enter_focus(&mut self) {
        let now = self.clock.now();
        let length = self.with_session(|s| {
            s.enter_focus();
            s.segment_remaining(now)
        });
        self.emit(SessionEvent::SegmentStarted {
            phase: SessionPhase::Focused,
            length,
        });
    }

    // ------------------------------------------------------------------------
    // Polling loop
    // ------------------------------------------------------------------------

    /// One iteration of the polling loop.
    ///
    /// Returns `Some` when the session must end.
    pub fn tick(&mut self) -> Option<EndReason> {
        let now = self.clock.now();
        let (active, session_due, segment_due, on_break) = self.with_session(|s| {
            (
                s.is_active,
                s.session_due(now),
                s.segment_due(now),
                s.is_on_break,
            )
        });

        if !active {
            return Some(EndReason::Reset);
        }
        if session_due {
            return Some(EndReason::Completed);
        }

        let mut on_break = on_break;
        if segment_due {
            if on_break {
                if !self.resume_focus(now) {
                    return Some(EndReason::Completed);
                }
                on_break = false;
            } else if self.start_break(now) {
                on_break = true;
            }
        }

        if !on_break {
            self.enforce();
        }
        None
    }

    /// Focused → OnBreak. Returns false if the session has no breaks.
    fn start_break(&mut self, now: Instant) -> bool {
        let Some(length) = self.with_session(|s| s.start_break(now)) else {
            return false;
        };
        info!("Break started for {:?}", length);
        self.emit(SessionEvent::Cue(Cue::BreakStart));

        for key in GENERAL_BLOCKED_KEYS {
            if let Err(e) = self.desktop.keys.unblock(key) {
                warn!("Failed to unblock {}: {}", key, e);
            }
        }
        if let Err(e) = self.desktop.taskbar.show() {
            warn!("Failed to show taskbar: {}", e);
        }
        for handle in [self.viewer, self.player].into_iter().flatten() {
            if let Err(e) = self.desktop.windows.minimize(handle) {
                self.handle_window_error(handle, e);
            }
        }

        self.emit(SessionEvent::SegmentStarted {
            phase: SessionPhase::OnBreak,
            length,
        });
        true
    }

    /// OnBreak → Focused. Returns false when no time is left.
    fn resume_focus(&mut self, now: Instant) -> bool {
        let Some(length) = self.with_session(|s| s.resume_focus(now)) else {
            return false;
        };
        info!("Focus resumed for {:?}", length);
        self.emit(SessionEvent::Cue(Cue::FocusResume));

        self.block_general_keys();
        if let Err(e) = self.desktop.taskbar.hide() {
            warn!("Failed to hide taskbar: {}", e);
        }

        if let Some(viewer) = self.viewer {
            for attempt in 1..=VIEWER_RESTORE_ATTEMPTS {
                match self.bring_forward(viewer) {
                    Ok(()) => break,
                    Err(e) if !e.is_transient() => {
                        self.handle_window_error(viewer, e);
                        break;
                    }
                    Err(e) => debug!("Viewer restore attempt {} failed: {}", attempt, e),
                }
                if attempt < VIEWER_RESTORE_ATTEMPTS
                    && !self.wait(self.timing.restore_retry_delay)
                {
                    break;
                }
            }
        }
        if let Some(player) = self.player {
            if let Err(e) = self.bring_forward(player) {
                self.handle_window_error(player, e);
            }
        }

        self.emit(SessionEvent::SegmentStarted {
            phase: SessionPhase::Focused,
            length,
        });
        true
    }

    /// Pulls focus back to an allowed window if something else has it.
    pub fn enforce(&mut self) {
        if self.rediscover_ticks > 0 && (self.viewer.is_none() || self.player.is_none()) {
            self.rediscover_ticks -= 1;
            self.rediscover();
        }

        let active = match self.desktop.windows.active_window() {
            Ok(active) => active,
            Err(e) => {
                debug!("Failed to query active window: {}", e);
                return;
            }
        };
        if active.is_some_and(|handle| self.is_allowed(handle)) {
            return;
        }

        let target = self.viewer.or(self.player);
        match target {
            Some(handle) => {
                debug!("Focus left the allowed windows, activating {}", handle);
                if let Err(e) = self.bring_forward(handle) {
                    self.handle_window_error(handle, e);
                }
            }
            None => self.relaunch_exited(),
        }
    }

    /// Looks for windows that appeared after a relaunch or a closed window.
    fn rediscover(&mut self) {
        let before = (self.viewer, self.player);
        self.discover_once();
        if (self.viewer, self.player) == before {
            return;
        }

        info!(
            "Rediscovered windows: viewer={:?} player={:?}",
            self.viewer, self.player
        );
        if before.0.is_none() {
            if let Some(viewer) = self.viewer {
                self.pin(viewer);
            }
        }
        if before.1.is_none() {
            self.register_toggle();
        }
        self.emit(SessionEvent::AppsDiscovered {
            viewer: self.viewer.is_some(),
            player: self.player.is_some(),
        });
    }

    /// Relaunches one exited application, viewer first.
    ///
    /// Nothing is relaunched while windows of an earlier relaunch are still
    /// being looked for.
    fn relaunch_exited(&mut self) {
        if self.rediscover_ticks > 0 {
            return;
        }
        for app in [App::PdfViewer, App::MusicPlayer] {
            if self.launcher.status(app) != ProcessStatus::Exited {
                continue;
            }
            info!("{} exited, relaunching", app);
            if let Err(e) = self.launcher.launch(app, &self.plan) {
                warn!("Failed to relaunch {}: {}", app, e);
            }
            self.rediscover_ticks = self.timing.discovery_attempts;
            return;
        }
    }

    /// Restores (if minimized), activates and raises a window.
    fn bring_forward(&self, handle: WindowHandle) -> PlatformResult<()> {
        let windows = &self.desktop.windows;
        if windows.is_minimized(handle)? {
            windows.restore(handle)?;
        }
        windows.activate(handle)?;
        windows.raise(handle)
    }

    fn is_allowed(&self, handle: WindowHandle) -> bool {
        self.allowed.contains(&handle) || self.overlay == Some(handle)
    }

    /// Drops the reference to a closed window; anything else is retried later.
    fn handle_window_error(&mut self, handle: WindowHandle, error: PlatformError) {
        if error.is_window_gone() {
            info!("Window {} closed, dropping it", handle);
            self.allowed.remove(&handle);
            if self.viewer == Some(handle) {
                self.viewer = None;
            }
            if self.player == Some(handle) {
                self.player = None;
                self.unregister_toggle();
            }
            self.rediscover_ticks = self.timing.discovery_attempts;
        } else {
            debug!("Window call on {} failed: {}", handle, error);
        }
    }

    fn block_general_keys(&self) {
        for key in GENERAL_BLOCKED_KEYS {
            if let Err(e) = self.desktop.keys.block(key) {
                warn!("Failed to block {}: {}", key, e);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Releases the desktop and reports the end of the session.
    pub fn teardown(&mut self, reason: EndReason) {
        let pinned = std::mem::take(&mut self.pinned);
        restore_desktop(&self.desktop, self.hotkey.take(), &pinned);
        self.allowed.clear();
        self.rediscover_ticks = 0;
        self.viewer = None;
        self.player = None;
        self.with_session(Session::finish);
        info!("Session ended ({})", reason.as_str());
        self.emit(SessionEvent::Ended { reason });
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    /// Sleeps `total` in poll-sized slices. Returns false on reset.
    fn wait(&self, total: Duration) -> bool {
        let slice = self.timing.poll_interval.max(Duration::from_millis(1));
        let mut remaining = total;
        while !remaining.is_zero() {
            if !self.is_active() {
                return false;
            }
            let step = remaining.min(slice);
            self.clock.sleep(step);
            remaining -= step;
        }
        self.is_active()
    }

    fn is_active(&self) -> bool {
        self.with_session(|s| s.is_active)
    }

    fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    fn emit(&self, event: SessionEvent) {
        // the front end may already be gone during shutdown
        if self.events.send(event).is_err() {
            debug!("Session event dropped, receiver closed");
        }
    }

    /// Windows currently treated as legitimate.
    pub fn allowed_windows(&self) -> &HashSet<WindowHandle> {
        &self.allowed
    }
}
