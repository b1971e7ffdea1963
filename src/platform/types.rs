//! Platform-independent handle and key types.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// WindowHandle
// ============================================================================

/// Opaque identifier of a top-level OS window.
///
/// On Windows this is the numeric value of the `HWND`. Other platforms never
/// hand out real handles, so the value only has to be stable per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(u64);

impl WindowHandle {
    /// Wraps a raw platform handle value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw platform handle value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

// ============================================================================
// WindowInfo
// ============================================================================

/// A top-level window as reported by the window directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Handle used for every later operation on the window
    pub handle: WindowHandle,
    /// Window title at the time of enumeration
    pub title: String,
}

impl WindowInfo {
    /// Creates a new window description.
    pub fn new(handle: WindowHandle, title: impl Into<String>) -> Self {
        Self {
            handle,
            title: title.into(),
        }
    }

    /// Returns true if the title contains `pattern`, ignoring case.
    pub fn title_contains(&self, pattern: &str) -> bool {
        self.title
            .to_lowercase()
            .contains(&pattern.to_lowercase())
    }
}

// ============================================================================
// Key
// ============================================================================

/// Keys the shortcut blocker knows how to intercept or send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Either Alt key
    Alt,
    /// Tab
    Tab,
    /// Windows / Super / Command key
    Super,
    /// Escape
    Escape,
    /// Either Ctrl key
    Ctrl,
    /// F5, the PDF viewer's presentation key
    F5,
    /// F6, the music player toggle hotkey
    F6,
    /// F11
    F11,
}

/// Keys blocked while a focus segment is running.
///
/// F5 is deliberately absent: it is blocked separately, once, after being
/// sent to the viewer, and stays blocked across breaks.
pub const GENERAL_BLOCKED_KEYS: [Key; 6] = [
    Key::Alt,
    Key::Tab,
    Key::Super,
    Key::Escape,
    Key::Ctrl,
    Key::F11,
];

impl Key {
    /// Returns the conventional key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Alt => "alt",
            Key::Tab => "tab",
            Key::Super => "win",
            Key::Escape => "esc",
            Key::Ctrl => "ctrl",
            Key::F5 => "f5",
            Key::F6 => "f6",
            Key::F11 => "f11",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alt" => Ok(Key::Alt),
            "tab" => Ok(Key::Tab),
            "win" | "super" | "cmd" => Ok(Key::Super),
            "esc" | "escape" => Ok(Key::Escape),
            "ctrl" | "control" => Ok(Key::Ctrl),
            "f5" => Ok(Key::F5),
            "f6" => Ok(Key::F6),
            "f11" => Ok(Key::F11),
            other => Err(format!("unknown key: {}", other)),
        }
    }
}

// ============================================================================
// Hotkeys
// ============================================================================

/// Identifier of one registered global hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyId(pub u64);

/// Callback invoked when a registered hotkey is pressed.
///
/// Runs on a platform thread, never on the session worker.
pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;
