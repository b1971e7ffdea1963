//! Starts, resets and observes sessions.
//!
//! The controller lives on the UI thread. It validates start requests, spawns
//! the [`SessionWorker`] on a dedicated thread and requests resets by
//! flipping `is_active` under the session mutex.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::error::SessionError;
use super::event::{EndReason, SessionEvent};
use super::worker::{restore_desktop, SessionTiming, SessionWorker};
use crate::clock::Clock;
use crate::launcher::{LaunchPlan, ProcessLauncher};
use crate::platform::{Desktop, WindowHandle};
use crate::types::{Session, SessionConfig, Variant};

/// Builds the standard configuration of `variant`, rejecting durations the
/// variant does not offer.
pub fn build_config(variant: Variant, minutes: u64) -> Result<SessionConfig, SessionError> {
    if !variant.supports(minutes) {
        return Err(SessionError::UnsupportedDuration { variant, minutes });
    }
    Ok(SessionConfig::for_variant(variant, minutes))
}

/// Owner of the shared session state and the worker thread.
pub struct SessionController {
    session: Arc<Mutex<Session>>,
    desktop: Desktop,
    launcher: Arc<dyn ProcessLauncher>,
    clock: Arc<dyn Clock>,
    timing: SessionTiming,
    events: mpsc::UnboundedSender<SessionEvent>,
    overlay: Option<WindowHandle>,
    worker: Option<JoinHandle<EndReason>>,
}

impl SessionController {
    pub fn new(
        desktop: Desktop,
        launcher: Arc<dyn ProcessLauncher>,
        clock: Arc<dyn Clock>,
        timing: SessionTiming,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new(SessionConfig::for_variant(
                Variant::default(),
                Variant::default().default_minutes(),
            )))),
            desktop,
            launcher,
            clock,
            timing,
            events,
            overlay: None,
            worker: None,
        }
    }

    /// Treats `handle` as the overlay: never discovered, always allowed.
    pub fn with_overlay_window(mut self, handle: Option<WindowHandle>) -> Self {
        self.overlay = handle;
        self
    }

    /// Validates the request and starts a worker.
    ///
    /// Returns once the worker thread is running; progress arrives as events.
    pub fn start(
        &mut self,
        pdf_path: Option<PathBuf>,
        config: SessionConfig,
    ) -> Result<(), SessionError> {
        if self.is_active() {
            return Err(SessionError::AlreadyActive);
        }
        // collect the previous worker, if it finished on its own
        self.join();

        let pdf_path = pdf_path.ok_or(SessionError::NoPdfSelected)?;
        if !pdf_path.is_file() {
            return Err(SessionError::PdfNotFound(pdf_path));
        }
        config.validate().map_err(SessionError::InvalidConfig)?;

        let plan = LaunchPlan {
            pdf_path: pdf_path.clone(),
            fullscreen: config.fullscreen,
        };
        {
            let mut session = self.lock();
            *session = Session::new(config);
            session.begin(pdf_path, self.clock.now());
        }

        let worker = SessionWorker::new(
            self.session.clone(),
            self.desktop.clone(),
            self.launcher.clone(),
            self.clock.clone(),
            self.events.clone(),
            self.timing.clone(),
            plan,
            self.overlay,
        );
        let handle = thread::Builder::new()
            .name("focuslock-session".to_string())
            .spawn(move || worker.run())
            .map_err(|e| {
                self.lock().finish();
                SessionError::WorkerSpawn(e.to_string())
            })?;

        info!("Session started");
        self.worker = Some(handle);
        Ok(())
    }

    /// Requests a reset and waits for the desktop to be restored.
    ///
    /// Does nothing when no session is running.
    pub fn reset(&mut self) {
        self.request_reset();
        self.join();
    }

    /// Clears `is_active` without waiting for the worker.
    ///
    /// The worker notices within one poll and tears the session down; call
    /// [`join`](Self::join) to wait for that.
    pub fn request_reset(&self) {
        let mut session = self.lock();
        if session.is_active {
            info!("Reset requested");
            session.is_active = false;
        }
    }

    /// Waits for the worker thread, if any, and returns its end reason.
    pub fn join(&mut self) -> Option<EndReason> {
        let handle = self.worker.take()?;
        match handle.join() {
            Ok(reason) => Some(reason),
            Err(_) => {
                error!("Session worker panicked, restoring the desktop");
                let pinned: Vec<WindowHandle> = self.overlay.into_iter().collect();
                restore_desktop(&self.desktop, None, &pinned);
                self.lock().finish();
                None
            }
        }
    }

    /// A copy of the current session state.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_active
    }

    /// Current time on the clock the session runs on.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.worker.is_some() {
            warn!("Controller dropped with a running session, resetting");
            self.reset();
        }
    }
}
