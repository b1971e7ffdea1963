//! Desktop capabilities: windows, keyboard and taskbar.
//!
//! The session worker never talks to the OS directly. It goes through three
//! small capability traits bundled in a [`Desktop`]:
//!
//! - [`WindowDirectory`] enumerates top-level windows and moves them around
//! - [`ShortcutBlocker`] swallows keys and dispatches a global hotkey
//! - [`Taskbar`] hides and shows the OS taskbar
//!
//! On Windows [`Desktop::native`] returns the Win32 implementation. Every other
//! platform gets a no-op implementation that logs at debug level, so the timer,
//! overlay and cues still work there.
//!
//! [`MockDesktop`] implements all three traits in memory and records every
//! call, which is how the session tests observe the worker.

pub mod error;
pub mod noop;
pub mod types;

#[cfg(windows)]
pub mod windows;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub use error::{PlatformError, PlatformResult};
pub use noop::NoopDesktop;
pub use types::{HotkeyCallback, HotkeyId, Key, WindowHandle, WindowInfo, GENERAL_BLOCKED_KEYS};

// ============================================================================
// Capability traits
// ============================================================================

/// Access to top-level OS windows.
pub trait WindowDirectory: Send + Sync {
    /// Lists visible top-level windows that have a title.
    fn list_top_level_windows(&self) -> PlatformResult<Vec<WindowInfo>>;

    /// Returns the window that currently has keyboard focus, if any.
    fn active_window(&self) -> PlatformResult<Option<WindowHandle>>;

    fn activate(&self, handle: WindowHandle) -> PlatformResult<()>;
    fn raise(&self, handle: WindowHandle) -> PlatformResult<()>;
    fn minimize(&self, handle: WindowHandle) -> PlatformResult<()>;
    fn maximize(&self, handle: WindowHandle) -> PlatformResult<()>;
    fn restore(&self, handle: WindowHandle) -> PlatformResult<()>;
    fn is_minimized(&self, handle: WindowHandle) -> PlatformResult<bool>;
    fn is_maximized(&self, handle: WindowHandle) -> PlatformResult<bool>;

    /// Pins the window above all others, or releases the pin.
    fn set_topmost(&self, handle: WindowHandle, topmost: bool) -> PlatformResult<()>;

    /// Returns the console window hosting this process, if the platform has one.
    fn own_console_window(&self) -> Option<WindowHandle> {
        None
    }
}

/// Global keyboard interception.
pub trait ShortcutBlocker: Send + Sync {
    /// Swallows every press of `key` until it is unblocked.
    fn block(&self, key: Key) -> PlatformResult<()>;

    /// Stops swallowing `key`. Unblocking a key that is not blocked succeeds.
    fn unblock(&self, key: Key) -> PlatformResult<()>;

    /// Sends a synthetic press and release of `key` to the active window.
    fn send_key(&self, key: Key) -> PlatformResult<()>;

    /// Registers `callback` to run whenever `key` is pressed.
    fn register_hotkey(&self, key: Key, callback: HotkeyCallback) -> PlatformResult<HotkeyId>;

    /// Removes a hotkey. Unknown ids are ignored.
    fn unregister_hotkey(&self, id: HotkeyId) -> PlatformResult<()>;
}

/// OS taskbar visibility.
pub trait Taskbar: Send + Sync {
    fn hide(&self) -> PlatformResult<()>;
    fn show(&self) -> PlatformResult<()>;
}

/// Prepares stdout for ANSI colors.
///
/// Returns false when the terminal would print the escapes verbatim.
pub fn enable_ansi_output() -> bool {
    #[cfg(windows)]
    {
        windows::enable_ansi_output()
    }
    #[cfg(not(windows))]
    {
        true
    }
}

// ============================================================================
// Desktop
// ============================================================================

/// The three desktop capabilities a session needs, shared across threads.
#[derive(Clone)]
pub struct Desktop {
    pub windows: Arc<dyn WindowDirectory>,
    pub keys: Arc<dyn ShortcutBlocker>,
    pub taskbar: Arc<dyn Taskbar>,
}

impl Desktop {
    /// Returns the implementation for the platform this binary was built for.
    pub fn native() -> Self {
        #[cfg(windows)]
        {
            Self::from_shared(Arc::new(windows::WindowsDesktop::new()))
        }
        #[cfg(not(windows))]
        {
            Self::from_shared(Arc::new(NoopDesktop::new(std::env::consts::OS)))
        }
    }

    /// Builds a desktop from one value implementing all three capabilities.
    pub fn from_shared<T>(shared: Arc<T>) -> Self
    where
        T: WindowDirectory + ShortcutBlocker + Taskbar + 'static,
    {
        Self {
            windows: shared.clone(),
            keys: shared.clone(),
            taskbar: shared,
        }
    }
}

impl std::fmt::Debug for Desktop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desktop").finish_non_exhaustive()
    }
}

// ============================================================================
// MockDesktop
// ============================================================================

/// A recorded call against [`MockDesktop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Activate(WindowHandle),
    Raise(WindowHandle),
    Minimize(WindowHandle),
    Maximize(WindowHandle),
    Restore(WindowHandle),
    SetTopmost(WindowHandle, bool),
    Block(Key),
    Unblock(Key),
    SendKey(Key),
    RegisterHotkey(Key),
    UnregisterHotkey(HotkeyId),
    HideTaskbar,
    ShowTaskbar,
}

impl MockCall {
    /// Returns true for calls that move or focus a window.
    pub fn is_window_call(&self) -> bool {
        matches!(
            self,
            MockCall::Activate(_)
                | MockCall::Raise(_)
                | MockCall::Minimize(_)
                | MockCall::Maximize(_)
                | MockCall::Restore(_)
        )
    }
}

#[derive(Default)]
struct MockWindows {
    windows: Vec<WindowInfo>,
    active: Option<WindowHandle>,
    minimized: HashSet<WindowHandle>,
    maximized: HashSet<WindowHandle>,
    topmost: HashSet<WindowHandle>,
}

/// In-memory desktop for tests.
///
/// Windows can be added, focused and closed from the test. A closed window
/// answers every call with [`PlatformError::WindowGone`].
#[derive(Default)]
pub struct MockDesktop {
    windows: Mutex<MockWindows>,
    calls: Mutex<Vec<MockCall>>,
    blocked: Mutex<HashSet<Key>>,
    hotkeys: Mutex<HashMap<HotkeyId, (Key, HotkeyCallback)>>,
    next_hotkey: AtomicU64,
    taskbar_hidden: AtomicBool,
    console: Mutex<Option<WindowHandle>>,
    deny_activation: AtomicBool,
}

impl MockDesktop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visible window and returns its handle.
    pub fn add_window(&self, raw: u64, title: &str) -> WindowHandle {
        let handle = WindowHandle::new(raw);
        self.windows
            .lock()
            .unwrap()
            .windows
            .push(WindowInfo::new(handle, title));
        handle
    }

    /// Removes a window. Later calls on its handle report it as gone.
    pub fn close_window(&self, handle: WindowHandle) {
        let mut state = self.windows.lock().unwrap();
        state.windows.retain(|w| w.handle != handle);
        if state.active == Some(handle) {
            state.active = None;
        }
    }

    /// Gives focus to `handle` without recording a call.
    pub fn set_active(&self, handle: Option<WindowHandle>) {
        self.windows.lock().unwrap().active = handle;
    }

    /// Marks the window as the process' own console.
    pub fn set_console_window(&self, handle: Option<WindowHandle>) {
        *self.console.lock().unwrap() = handle;
    }

    /// Makes every activation fail with `PermissionDenied`.
    pub fn set_deny_activation(&self, deny: bool) {
        self.deny_activation.store(deny, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns only the calls that touch windows.
    #[must_use]
    pub fn window_calls(&self) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(MockCall::is_window_call)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    #[must_use]
    pub fn blocked_keys(&self) -> HashSet<Key> {
        self.blocked.lock().unwrap().clone()
    }

    #[must_use]
    pub fn is_taskbar_hidden(&self) -> bool {
        self.taskbar_hidden.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_window_minimized(&self, handle: WindowHandle) -> bool {
        self.windows.lock().unwrap().minimized.contains(&handle)
    }

    #[must_use]
    pub fn is_window_topmost(&self, handle: WindowHandle) -> bool {
        self.windows.lock().unwrap().topmost.contains(&handle)
    }

    /// Returns the keys that currently have a hotkey registered.
    #[must_use]
    pub fn registered_hotkeys(&self) -> Vec<Key> {
        self.hotkeys
            .lock()
            .unwrap()
            .values()
            .map(|(key, _)| *key)
            .collect()
    }

    /// Simulates a press of `key`, running any registered callback.
    ///
    /// Returns true if a callback ran.
    pub fn press_hotkey(&self, key: Key) -> bool {
        let callbacks: Vec<HotkeyCallback> = self
            .hotkeys
            .lock()
            .unwrap()
            .values()
            .filter(|(k, _)| *k == key)
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in &callbacks {
            callback();
        }
        !callbacks.is_empty()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn ensure_exists(&self, handle: WindowHandle) -> PlatformResult<()> {
        let state = self.windows.lock().unwrap();
        if state.windows.iter().any(|w| w.handle == handle) {
            Ok(())
        } else {
            Err(PlatformError::WindowGone(handle))
        }
    }
}

impl WindowDirectory for MockDesktop {
    fn list_top_level_windows(&self) -> PlatformResult<Vec<WindowInfo>> {
        Ok(self.windows.lock().unwrap().windows.clone())
    }

    fn active_window(&self) -> PlatformResult<Option<WindowHandle>> {
        Ok(self.windows.lock().unwrap().active)
    }

    fn activate(&self, handle: WindowHandle) -> PlatformResult<()> {
        self.record(MockCall::Activate(handle));
        self.ensure_exists(handle)?;
        if self.deny_activation.load(Ordering::SeqCst) {
            return Err(PlatformError::PermissionDenied(
                "activation refused".to_string(),
            ));
        }
        let mut state = self.windows.lock().unwrap();
        state.active = Some(handle);
        state.minimized.remove(&handle);
        Ok(())
    }

    fn raise(&self, handle: WindowHandle) -> PlatformResult<()> {
        self.record(MockCall::Raise(handle));
        self.ensure_exists(handle)
    }

    fn minimize(&self, handle: WindowHandle) -> PlatformResult<()> {
        self.record(MockCall::Minimize(handle));
        self.ensure_exists(handle)?;
        let mut state = self.windows.lock().unwrap();
        state.minimized.insert(handle);
        if state.active == Some(handle) {
            state.active = None;
        }
        Ok(())
    }

    fn maximize(&self, handle: WindowHandle) -> PlatformResult<()> {
        self.record(MockCall::Maximize(handle));
        self.ensure_exists(handle)?;
        let mut state = self.windows.lock().unwrap();
        state.minimized.remove(&handle);
        state.maximized.insert(handle);
        Ok(())
    }

    fn restore(&self, handle: WindowHandle) -> PlatformResult<()> {
        self.record(MockCall::Restore(handle));
        self.ensure_exists(handle)?;
        self.windows.lock().unwrap().minimized.remove(&handle);
        Ok(())
    }

    fn is_minimized(&self, handle: WindowHandle) -> PlatformResult<bool> {
        self.ensure_exists(handle)?;
        Ok(self.windows.lock().unwrap().minimized.contains(&handle))
    }

    fn is_maximized(&self, handle: WindowHandle) -> PlatformResult<bool> {
        self.ensure_exists(handle)?;
        Ok(self.windows.lock().unwrap().maximized.contains(&handle))
    }

    fn set_topmost(&self, handle: WindowHandle, topmost: bool) -> PlatformResult<()> {
        self.record(MockCall::SetTopmost(handle, topmost));
        self.ensure_exists(handle)?;
        let mut state = self.windows.lock().unwrap();
        if topmost {
            state.topmost.insert(handle);
        } else {
            state.topmost.remove(&handle);
        }
        Ok(())
    }

    fn own_console_window(&self) -> Option<WindowHandle> {
        *self.console.lock().unwrap()
    }
}

impl ShortcutBlocker for MockDesktop {
    fn block(&self, key: Key) -> PlatformResult<()> {
        self.record(MockCall::Block(key));
        self.blocked.lock().unwrap().insert(key);
        Ok(())
    }

    fn unblock(&self, key: Key) -> PlatformResult<()> {
        self.record(MockCall::Unblock(key));
        self.blocked.lock().unwrap().remove(&key);
        Ok(())
    }

    fn send_key(&self, key: Key) -> PlatformResult<()> {
        self.record(MockCall::SendKey(key));
        Ok(())
    }

    fn register_hotkey(&self, key: Key, callback: HotkeyCallback) -> PlatformResult<HotkeyId> {
        self.record(MockCall::RegisterHotkey(key));
        let id = HotkeyId(self.next_hotkey.fetch_add(1, Ordering::SeqCst) + 1);
        self.hotkeys.lock().unwrap().insert(id, (key, callback));
        Ok(id)
    }

    fn unregister_hotkey(&self, id: HotkeyId) -> PlatformResult<()> {
        self.record(MockCall::UnregisterHotkey(id));
        self.hotkeys.lock().unwrap().remove(&id);
        Ok(())
    }
}

impl Taskbar for MockDesktop {
    fn hide(&self) -> PlatformResult<()> {
        self.record(MockCall::HideTaskbar);
        self.taskbar_hidden.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn show(&self) -> PlatformResult<()> {
        self.record(MockCall::ShowTaskbar);
        self.taskbar_hidden.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod mock_window_tests {
        use super::*;

        #[test]
        fn test_activate_moves_focus() {
            let mock = MockDesktop::new();
            let pdf = mock.add_window(1, "notes.pdf - SumatraPDF");
            let other = mock.add_window(2, "Browser");
            mock.set_active(Some(other));

            mock.activate(pdf).unwrap();

            assert_eq!(mock.active_window().unwrap(), Some(pdf));
            assert_eq!(mock.calls(), vec![MockCall::Activate(pdf)]);
        }

        #[test]
        fn test_closed_window_reports_gone() {
            let mock = MockDesktop::new();
            let pdf = mock.add_window(1, "notes.pdf");
            mock.close_window(pdf);

            let err = mock.activate(pdf).unwrap_err();
            assert!(err.is_window_gone());
            assert!(mock.is_minimized(pdf).unwrap_err().is_window_gone());
            // the attempt is still recorded
            assert_eq!(mock.window_calls().len(), 1);
        }

        #[test]
        fn test_minimize_and_restore() {
            let mock = MockDesktop::new();
            let player = mock.add_window(7, "Spotify Premium");

            mock.minimize(player).unwrap();
            assert!(mock.is_minimized(player).unwrap());

            mock.restore(player).unwrap();
            assert!(!mock.is_minimized(player).unwrap());
        }

        #[test]
        fn test_topmost_pin_and_release() {
            let mock = MockDesktop::new();
            let console = mock.add_window(3, "focuslock");

            mock.set_topmost(console, true).unwrap();
            assert!(mock.is_window_topmost(console));
            mock.set_topmost(console, false).unwrap();
            assert!(!mock.is_window_topmost(console));
            // pinning is not a focus change
            assert!(mock.window_calls().is_empty());
        }

        #[test]
        fn test_deny_activation() {
            let mock = MockDesktop::new();
            let pdf = mock.add_window(1, "notes.pdf");
            mock.set_deny_activation(true);

            let err = mock.activate(pdf).unwrap_err();
            assert!(err.is_transient());
        }
    }

    mod mock_key_tests {
        use super::*;

        #[test]
        fn test_unblock_without_block_succeeds() {
            let mock = MockDesktop::new();
            for key in GENERAL_BLOCKED_KEYS {
                assert!(mock.unblock(key).is_ok());
            }
            assert!(mock.blocked_keys().is_empty());
        }

        #[test]
        fn test_hotkey_callback_runs_on_press() {
            let mock = MockDesktop::new();
            let hits = Arc::new(AtomicU64::new(0));
            let counter = hits.clone();
            let id = mock
                .register_hotkey(
                    Key::F6,
                    Arc::new(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .unwrap();

            assert!(mock.press_hotkey(Key::F6));
            assert!(!mock.press_hotkey(Key::F5));
            assert_eq!(hits.load(Ordering::SeqCst), 1);

            mock.unregister_hotkey(id).unwrap();
            assert!(!mock.press_hotkey(Key::F6));
            assert!(mock.registered_hotkeys().is_empty());
        }
    }

    #[test]
    fn test_desktop_from_shared_routes_to_same_mock() {
        let mock = Arc::new(MockDesktop::new());
        let desktop = Desktop::from_shared(mock.clone());

        desktop.taskbar.hide().unwrap();
        desktop.keys.block(Key::Tab).unwrap();

        assert!(mock.is_taskbar_hidden());
        assert!(mock.blocked_keys().contains(&Key::Tab));
    }

    #[test]
    fn test_native_desktop_constructs() {
        let desktop = Desktop::native();
        // unblocking is always safe, whatever the platform
        assert!(desktop.keys.unblock(Key::F11).is_ok());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_ansi_output_available_off_windows() {
        assert!(enable_ansi_output());
    }
}
