//! focuslock library
//!
//! This library provides the core functionality for the focuslock CLI.
//! It includes:
//! - Session controller and worker that lock the desktop for a timed session
//! - Desktop capabilities (windows, keyboard, taskbar) with a Win32 backend
//! - Process launcher for the PDF viewer and the music player
//! - Terminal countdown overlay and audio cues
//! - Optional JSON configuration
//! - CLI command parsing, prompt and display utilities

pub mod cli;
pub mod clock;
pub mod config;
pub mod display;
pub mod launcher;
pub mod platform;
pub mod session;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{BreakSchedule, FullscreenMode, Session, SessionConfig, SessionPhase, Variant};

pub use session::{
    build_config, EndReason, SessionController, SessionError, SessionEvent, SessionTiming,
};

pub use platform::{
    Desktop, Key, MockDesktop, PlatformError, ShortcutBlocker, Taskbar, WindowDirectory,
    WindowHandle,
};

pub use launcher::{App, LaunchError, MockLauncher, ProcessLauncher, SystemLauncher};

pub use clock::{Clock, ManualClock, SystemClock};

pub use sound::{try_create_player, Cue, CueError, CuePlayer, MockCuePlayer, RodioCuePlayer};

pub use config::{AppConfig, ConfigError};
