//! Starting and watching the PDF viewer and music player.
//!
//! The launcher resolves each application's executable, spawns it as a
//! child process and later answers whether that child has exited, which the
//! enforcement loop uses to decide on a relaunch.

pub mod error;
pub mod resolve;

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

pub use error::LaunchError;
pub use resolve::resolve_executable;

use crate::types::FullscreenMode;

/// Command-line flag that opens the viewer in fullscreen.
pub const VIEWER_FULLSCREEN_FLAG: &str = "-fullscreen";

/// The two applications a session locks the user into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum App {
    PdfViewer,
    MusicPlayer,
}

impl App {
    pub fn as_str(&self) -> &'static str {
        match self {
            App::PdfViewer => "PDF viewer",
            App::MusicPlayer => "music player",
        }
    }

    /// Arguments passed to the application's executable.
    pub fn args(&self, plan: &LaunchPlan) -> Vec<OsString> {
        match self {
            App::PdfViewer => {
                let mut args = Vec::with_capacity(2);
                if plan.fullscreen == FullscreenMode::LaunchFlag {
                    args.push(OsString::from(VIEWER_FULLSCREEN_FLAG));
                }
                args.push(plan.pdf_path.clone().into_os_string());
                args
            }
            App::MusicPlayer => Vec::new(),
        }
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to open and how, fixed for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub pdf_path: PathBuf,
    pub fullscreen: FullscreenMode,
}

/// Lifecycle of a launched child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    NotStarted,
    Running,
    Exited,
}

pub trait ProcessLauncher: Send + Sync {
    /// Starts `app`. Returns the executable that was started.
    fn launch(&self, app: App, plan: &LaunchPlan) -> Result<PathBuf, LaunchError>;

    /// Reports whether the last child started for `app` is still running.
    fn status(&self, app: App) -> ProcessStatus;
}

// ============================================================================
// SystemLauncher
// ============================================================================

/// Executable locations from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutablePaths {
    pub viewer: Option<PathBuf>,
    pub player: Option<PathBuf>,
}

impl ExecutablePaths {
    fn for_app(&self, app: App) -> Option<&Path> {
        match app {
            App::PdfViewer => self.viewer.as_deref(),
            App::MusicPlayer => self.player.as_deref(),
        }
    }
}

/// Launches real processes with [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemLauncher {
    overrides: ExecutablePaths,
    children: Mutex<HashMap<App, Child>>,
}

impl SystemLauncher {
    #[must_use]
    pub fn new(overrides: ExecutablePaths) -> Self {
        Self {
            overrides,
            children: Mutex::new(HashMap::new()),
        }
    }
}

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, app: App, plan: &LaunchPlan) -> Result<PathBuf, LaunchError> {
        let path = resolve_executable(app, self.overrides.for_app(app))
            .ok_or(LaunchError::ExecutableNotFound(app))?;

        let child = Command::new(&path)
            .args(app.args(plan))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed {
                app,
                path: path.clone(),
                reason: e.to_string(),
            })?;

        info!("Launched {} (pid {}) from {}", app, child.id(), path.display());
        self.children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(app, child);
        Ok(path)
    }

    fn status(&self, app: App) -> ProcessStatus {
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(child) = children.get_mut(&app) else {
            return ProcessStatus::NotStarted;
        };
        match child.try_wait() {
            Ok(None) => ProcessStatus::Running,
            Ok(Some(_)) => ProcessStatus::Exited,
            Err(e) => {
                warn!("Failed to query {} process: {}", app, e);
                ProcessStatus::Exited
            }
        }
    }
}

// ============================================================================
// MockLauncher
// ============================================================================

/// Launcher double that records launches and never spawns anything.
#[derive(Debug, Default)]
pub struct MockLauncher {
    missing: Mutex<HashSet<App>>,
    launches: Mutex<Vec<App>>,
    statuses: Mutex<HashMap<App, ProcessStatus>>,
}

impl MockLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes launches of `app` fail with [`LaunchError::ExecutableNotFound`].
    pub fn set_missing(&self, app: App) {
        self.missing.lock().unwrap().insert(app);
    }

    /// Overrides the status reported for `app`.
    pub fn set_status(&self, app: App, status: ProcessStatus) {
        self.statuses.lock().unwrap().insert(app, status);
    }

    /// Every launch attempt, including failed ones, in order.
    #[must_use]
    pub fn launches(&self) -> Vec<App> {
        self.launches.lock().unwrap().clone()
    }

    #[must_use]
    pub fn launch_count(&self, app: App) -> usize {
        self.launches().iter().filter(|a| **a == app).count()
    }
}

impl ProcessLauncher for MockLauncher {
    fn launch(&self, app: App, _plan: &LaunchPlan) -> Result<PathBuf, LaunchError> {
        self.launches.lock().unwrap().push(app);
        if self.missing.lock().unwrap().contains(&app) {
            return Err(LaunchError::ExecutableNotFound(app));
        }
        self.statuses
            .lock()
            .unwrap()
            .insert(app, ProcessStatus::Running);
        Ok(PathBuf::from(format!("mock/{}", app.as_str())))
    }

    fn status(&self, app: App) -> ProcessStatus {
        self.statuses
            .lock()
            .unwrap()
            .get(&app)
            .copied()
            .unwrap_or(ProcessStatus::NotStarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(fullscreen: FullscreenMode) -> LaunchPlan {
        LaunchPlan {
            pdf_path: PathBuf::from("thesis.pdf"),
            fullscreen,
        }
    }

    mod args_tests {
        use super::*;

        #[test]
        fn test_viewer_args_with_launch_flag() {
            let args = App::PdfViewer.args(&plan(FullscreenMode::LaunchFlag));
            assert_eq!(
                args,
                vec![OsString::from("-fullscreen"), OsString::from("thesis.pdf")]
            );
        }

        #[test]
        fn test_viewer_args_with_present_key() {
            let args = App::PdfViewer.args(&plan(FullscreenMode::PresentKey));
            assert_eq!(args, vec![OsString::from("thesis.pdf")]);
        }

        #[test]
        fn test_player_has_no_args() {
            assert!(App::MusicPlayer
                .args(&plan(FullscreenMode::LaunchFlag))
                .is_empty());
        }
    }

    mod system_launcher_tests {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn test_status_before_launch() {
            let launcher = SystemLauncher::default();
            assert_eq!(launcher.status(App::PdfViewer), ProcessStatus::NotStarted);
        }

        #[test]
        fn test_missing_override_without_install() {
            let dir = TempDir::new().unwrap();
            let launcher = SystemLauncher::new(ExecutablePaths {
                viewer: Some(dir.path().join("nope.exe")),
                player: None,
            });
            // only meaningful where no viewer is installed on the probe list
            if resolve_executable(App::PdfViewer, None).is_none() {
                let err = launcher
                    .launch(App::PdfViewer, &plan(FullscreenMode::LaunchFlag))
                    .unwrap_err();
                assert!(err.is_not_found());
            }
        }
    }

    mod mock_launcher_tests {
        use super::*;

        #[test]
        fn test_mock_records_launches() {
            let launcher = MockLauncher::new();
            launcher
                .launch(App::PdfViewer, &plan(FullscreenMode::LaunchFlag))
                .unwrap();
            assert_eq!(launcher.status(App::PdfViewer), ProcessStatus::Running);
            assert_eq!(launcher.status(App::MusicPlayer), ProcessStatus::NotStarted);

            launcher.set_status(App::PdfViewer, ProcessStatus::Exited);
            assert_eq!(launcher.status(App::PdfViewer), ProcessStatus::Exited);
            assert_eq!(launcher.launch_count(App::PdfViewer), 1);
        }

        #[test]
        fn test_mock_missing_app() {
            let launcher = MockLauncher::new();
            launcher.set_missing(App::MusicPlayer);
            let err = launcher
                .launch(App::MusicPlayer, &plan(FullscreenMode::PresentKey))
                .unwrap_err();
            assert!(err.is_not_found());
            assert_eq!(launcher.launches(), vec![App::MusicPlayer]);
            assert_eq!(launcher.status(App::MusicPlayer), ProcessStatus::NotStarted);
        }
    }
}
