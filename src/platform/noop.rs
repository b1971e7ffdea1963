//! Desktop implementation for platforms without window locking.
//!
//! Every call succeeds without doing anything and leaves a debug log line.

use tracing::debug;

use super::error::PlatformResult;
use super::types::{HotkeyCallback, HotkeyId, Key, WindowHandle, WindowInfo};
use super::{ShortcutBlocker, Taskbar, WindowDirectory};

/// No-op desktop used on macOS and Linux.
#[derive(Debug, Clone)]
pub struct NoopDesktop {
    platform: &'static str,
}

impl NoopDesktop {
    #[must_use]
    pub fn new(platform: &'static str) -> Self {
        Self { platform }
    }

    #[must_use]
    pub fn platform(&self) -> &'static str {
        self.platform
    }
}

impl WindowDirectory for NoopDesktop {
    fn list_top_level_windows(&self) -> PlatformResult<Vec<WindowInfo>> {
        debug!("window enumeration unavailable on {}", self.platform);
        Ok(Vec::new())
    }

    fn active_window(&self) -> PlatformResult<Option<WindowHandle>> {
        Ok(None)
    }

    fn activate(&self, handle: WindowHandle) -> PlatformResult<()> {
        debug!("activate {} ignored on {}", handle, self.platform);
        Ok(())
    }

    fn raise(&self, handle: WindowHandle) -> PlatformResult<()> {
        debug!("raise {} ignored on {}", handle, self.platform);
        Ok(())
    }

    fn minimize(&self, handle: WindowHandle) -> PlatformResult<()> {
        debug!("minimize {} ignored on {}", handle, self.platform);
        Ok(())
    }

    fn maximize(&self, handle: WindowHandle) -> PlatformResult<()> {
        debug!("maximize {} ignored on {}", handle, self.platform);
        Ok(())
    }

    fn restore(&self, handle: WindowHandle) -> PlatformResult<()> {
        debug!("restore {} ignored on {}", handle, self.platform);
        Ok(())
    }

    fn is_minimized(&self, _handle: WindowHandle) -> PlatformResult<bool> {
        Ok(false)
    }

    fn is_maximized(&self, _handle: WindowHandle) -> PlatformResult<bool> {
        Ok(false)
    }

    fn set_topmost(&self, handle: WindowHandle, topmost: bool) -> PlatformResult<()> {
        debug!("topmost={} on {} ignored on {}", topmost, handle, self.platform);
        Ok(())
    }
}

impl ShortcutBlocker for NoopDesktop {
    fn block(&self, key: Key) -> PlatformResult<()> {
        debug!("block {} ignored on {}", key, self.platform);
        Ok(())
    }

    fn unblock(&self, key: Key) -> PlatformResult<()> {
        debug!("unblock {} ignored on {}", key, self.platform);
        Ok(())
    }

    fn send_key(&self, key: Key) -> PlatformResult<()> {
        debug!("send {} ignored on {}", key, self.platform);
        Ok(())
    }

    fn register_hotkey(&self, key: Key, _callback: HotkeyCallback) -> PlatformResult<HotkeyId> {
        debug!("hotkey {} ignored on {}", key, self.platform);
        Ok(HotkeyId(0))
    }

    fn unregister_hotkey(&self, _id: HotkeyId) -> PlatformResult<()> {
        Ok(())
    }
}

impl Taskbar for NoopDesktop {
    fn hide(&self) -> PlatformResult<()> {
        debug!("taskbar hide ignored on {}", self.platform);
        Ok(())
    }

    fn show(&self) -> PlatformResult<()> {
        debug!("taskbar show ignored on {}", self.platform);
        Ok(())
    }
}
