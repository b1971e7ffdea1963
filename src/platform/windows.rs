//! Win32 desktop implementation.
//!
//! Window control goes through `EnumWindows`, `SetForegroundWindow` and
//! `ShowWindow`. Key blocking uses one process-wide low-level keyboard hook
//! running on its own thread with a message loop; hotkey presses are handed
//! to a dispatcher thread over a channel so callbacks never run inside the
//! hook procedure. The hook thread reports whether the hook was installed,
//! so a refused hook surfaces as an error from `block`.

use std::collections::{HashMap, HashSet};
use std::ffi::c_void;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError, RwLock};
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvError, Sender};
use tracing::{debug, info, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, LRESULT, TRUE, WPARAM};
use windows::Win32::System::Console::{
    GetConsoleMode, GetConsoleWindow, GetStdHandle, SetConsoleMode, CONSOLE_MODE,
    ENABLE_VIRTUAL_TERMINAL_PROCESSING, STD_OUTPUT_HANDLE,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    VIRTUAL_KEY, VK_CONTROL, VK_ESCAPE, VK_F11, VK_F5, VK_F6, VK_LCONTROL, VK_LMENU, VK_LWIN,
    VK_MENU, VK_RCONTROL, VK_RMENU, VK_RWIN, VK_TAB,
};
use windows::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, CallNextHookEx, DispatchMessageW, EnumWindows, FindWindowExW, FindWindowW,
    GetForegroundWindow, GetMessageW, GetWindowTextLengthW, GetWindowTextW, IsIconic, IsWindow,
    IsWindowVisible, IsZoomed, SetForegroundWindow, SetWindowPos, SetWindowsHookExW, ShowWindow,
    TranslateMessage, HWND_NOTOPMOST, HWND_TOPMOST, KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG,
    SHOW_WINDOW_CMD, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SW_HIDE, SW_MAXIMIZE, SW_MINIMIZE,
    SW_RESTORE, SW_SHOW, WH_KEYBOARD_LL, WM_KEYDOWN, WM_SYSKEYDOWN,
};

use super::error::{PlatformError, PlatformResult};
use super::types::{HotkeyCallback, HotkeyId, Key, WindowHandle, WindowInfo};
use super::{ShortcutBlocker, Taskbar, WindowDirectory};

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.raw() as usize as *mut c_void)
}

fn from_hwnd(hwnd: HWND) -> WindowHandle {
    WindowHandle::new(hwnd.0 as usize as u64)
}

fn live_hwnd(handle: WindowHandle) -> PlatformResult<HWND> {
    let hwnd = to_hwnd(handle);
    if hwnd.is_invalid() || !unsafe { IsWindow(Some(hwnd)) }.as_bool() {
        return Err(PlatformError::WindowGone(handle));
    }
    Ok(hwnd)
}

fn show(handle: WindowHandle, cmd: SHOW_WINDOW_CMD) -> PlatformResult<()> {
    let hwnd = live_hwnd(handle)?;
    // the return value is the previous visibility, not a status
    let _ = unsafe { ShowWindow(hwnd, cmd) };
    Ok(())
}

// ============================================================================
// Keyboard hook state
// ============================================================================

struct HookShared {
    blocked: RwLock<HashSet<Key>>,
    hotkeys: RwLock<HashMap<HotkeyId, (Key, HotkeyCallback)>>,
    presses: Sender<Key>,
    installed: AtomicBool,
}

static HOOK: OnceLock<HookShared> = OnceLock::new();
static INSTALL: Mutex<()> = Mutex::new(());

fn key_for_vk(vk: u32) -> Option<Key> {
    let vk = VIRTUAL_KEY(vk as u16);
    match vk {
        VK_MENU | VK_LMENU | VK_RMENU => Some(Key::Alt),
        VK_TAB => Some(Key::Tab),
        VK_LWIN | VK_RWIN => Some(Key::Super),
        VK_ESCAPE => Some(Key::Escape),
        VK_CONTROL | VK_LCONTROL | VK_RCONTROL => Some(Key::Ctrl),
        VK_F5 => Some(Key::F5),
        VK_F6 => Some(Key::F6),
        VK_F11 => Some(Key::F11),
        _ => None,
    }
}

fn vk_for_key(key: Key) -> VIRTUAL_KEY {
    match key {
        Key::Alt => VK_MENU,
        Key::Tab => VK_TAB,
        Key::Super => VK_LWIN,
        Key::Escape => VK_ESCAPE,
        Key::Ctrl => VK_CONTROL,
        Key::F5 => VK_F5,
        Key::F6 => VK_F6,
        Key::F11 => VK_F11,
    }
}

unsafe extern "system" fn keyboard_hook_proc(ncode: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if ncode < 0 {
        return CallNextHookEx(None, ncode, wparam, lparam);
    }

    let Some(shared) = HOOK.get() else {
        return CallNextHookEx(None, ncode, wparam, lparam);
    };

    let data = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
    let Some(key) = key_for_vk(data.vkCode) else {
        return CallNextHookEx(None, ncode, wparam, lparam);
    };

    // our own send_key output must reach the target window
    if data.flags.0 & LLKHF_INJECTED.0 != 0 {
        return CallNextHookEx(None, ncode, wparam, lparam);
    }

    let is_down = matches!(wparam.0 as u32, WM_KEYDOWN | WM_SYSKEYDOWN);
    if is_down {
        let has_hotkey = shared
            .hotkeys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|(k, _)| *k == key);
        if has_hotkey {
            let _ = shared.presses.send(key);
        }
    }

    let blocked = shared
        .blocked
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(&key);
    if blocked {
        return LRESULT(1);
    }

    CallNextHookEx(None, ncode, wparam, lparam)
}

fn run_dispatcher(presses: Receiver<Key>) {
    while let Ok(key) = presses.recv() {
        let Some(shared) = HOOK.get() else { continue };
        let callbacks: Vec<HotkeyCallback> = shared
            .hotkeys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|(k, _)| *k == key)
            .map(|(_, cb)| cb.clone())
            .collect();
        debug!("hotkey {} pressed, {} callback(s)", key, callbacks.len());
        for callback in callbacks {
            callback();
        }
    }
}

fn run_hook_loop(ready: Sender<Result<(), String>>) {
    let hook = unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) };
    if let Err(e) = hook {
        let _ = ready.send(Err(e.to_string()));
        return;
    }
    info!("Low-level keyboard hook installed");
    let _ = ready.send(Ok(()));

    let mut msg = MSG::default();
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

/// Turns the hook thread's install report into a result.
fn install_outcome(reply: Result<Result<(), String>, RecvError>) -> PlatformResult<()> {
    match reply {
        Ok(Ok(())) => Ok(()),
        Ok(Err(message)) => Err(PlatformError::PermissionDenied(format!(
            "keyboard hook not installed: {}",
            message
        ))),
        Err(_) => Err(PlatformError::Other(
            "keyboard hook thread exited before reporting".to_string(),
        )),
    }
}

/// Installs the hook thread and dispatcher on first use.
///
/// A failed install is retried on the next call.
fn hook_shared() -> PlatformResult<&'static HookShared> {
    let _guard = INSTALL.lock().unwrap_or_else(PoisonError::into_inner);

    let shared = match HOOK.get() {
        Some(shared) => shared,
        None => {
            let (tx, rx) = unbounded();
            let _ = HOOK.set(HookShared {
                blocked: RwLock::new(HashSet::new()),
                hotkeys: RwLock::new(HashMap::new()),
                presses: tx,
                installed: AtomicBool::new(false),
            });
            thread::Builder::new()
                .name("focuslock-hotkeys".to_string())
                .spawn(move || run_dispatcher(rx))
                .map_err(|e| {
                    PlatformError::Other(format!("failed to spawn hotkey dispatcher: {}", e))
                })?;
            HOOK.get()
                .ok_or_else(|| PlatformError::Other("keyboard hook state missing".to_string()))?
        }
    };
    if shared.installed.load(Ordering::SeqCst) {
        return Ok(shared);
    }

    let (ready_tx, ready_rx) = bounded(1);
    thread::Builder::new()
        .name("focuslock-keyhook".to_string())
        .spawn(move || run_hook_loop(ready_tx))
        .map_err(|e| PlatformError::Other(format!("failed to spawn keyboard hook: {}", e)))?;
    if let Err(e) = install_outcome(ready_rx.recv()) {
        warn!("{}", e);
        return Err(e);
    }
    shared.installed.store(true, Ordering::SeqCst);
    Ok(shared)
}

/// Lets stdout interpret ANSI escapes. Returns false if the console refuses.
pub fn enable_ansi_output() -> bool {
    unsafe {
        let Ok(handle) = GetStdHandle(STD_OUTPUT_HANDLE) else {
            return false;
        };
        let mut mode = CONSOLE_MODE::default();
        if GetConsoleMode(handle, &mut mode).is_err() {
            return false;
        }
        SetConsoleMode(handle, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING).is_ok()
    }
}

// ============================================================================
// WindowsDesktop
// ============================================================================

/// Win32 implementation of every desktop capability.
#[derive(Debug, Default)]
pub struct WindowsDesktop {
    next_hotkey: AtomicU64,
}

impl WindowsDesktop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

unsafe extern "system" fn enum_windows_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<WindowInfo>);

    if !IsWindowVisible(hwnd).as_bool() {
        return TRUE;
    }

    let title_len = GetWindowTextLengthW(hwnd);
    if title_len == 0 {
        return TRUE;
    }

    let mut title_buf: Vec<u16> = vec![0; (title_len + 1) as usize];
    let actual_len = GetWindowTextW(hwnd, &mut title_buf);
    if actual_len == 0 {
        return TRUE;
    }
    let title = String::from_utf16_lossy(&title_buf[..actual_len as usize]);
    windows.push(WindowInfo::new(from_hwnd(hwnd), title));

    TRUE
}

impl WindowDirectory for WindowsDesktop {
    fn list_top_level_windows(&self) -> PlatformResult<Vec<WindowInfo>> {
        let mut windows: Vec<WindowInfo> = Vec::new();
        unsafe {
            let windows_ptr = &mut windows as *mut Vec<WindowInfo>;
            EnumWindows(Some(enum_windows_callback), LPARAM(windows_ptr as isize))
                .map_err(|e| PlatformError::Other(format!("EnumWindows failed: {}", e)))?;
        }
        Ok(windows)
    }

    fn active_window(&self) -> PlatformResult<Option<WindowHandle>> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.is_invalid() {
            Ok(None)
        } else {
            Ok(Some(from_hwnd(hwnd)))
        }
    }

    fn activate(&self, handle: WindowHandle) -> PlatformResult<()> {
        let hwnd = live_hwnd(handle)?;
        if unsafe { IsIconic(hwnd) }.as_bool() {
            let _ = unsafe { ShowWindow(hwnd, SW_RESTORE) };
        }
        if unsafe { SetForegroundWindow(hwnd) }.as_bool() {
            Ok(())
        } else {
            Err(PlatformError::PermissionDenied(format!(
                "SetForegroundWindow refused for {}",
                handle
            )))
        }
    }

    fn raise(&self, handle: WindowHandle) -> PlatformResult<()> {
        let hwnd = live_hwnd(handle)?;
        unsafe { BringWindowToTop(hwnd) }
            .map_err(|e| PlatformError::Other(format!("BringWindowToTop failed: {}", e)))
    }

    fn minimize(&self, handle: WindowHandle) -> PlatformResult<()> {
        show(handle, SW_MINIMIZE)
    }

    fn maximize(&self, handle: WindowHandle) -> PlatformResult<()> {
        show(handle, SW_MAXIMIZE)
    }

    fn restore(&self, handle: WindowHandle) -> PlatformResult<()> {
        show(handle, SW_RESTORE)
    }

    fn is_minimized(&self, handle: WindowHandle) -> PlatformResult<bool> {
        let hwnd = live_hwnd(handle)?;
        Ok(unsafe { IsIconic(hwnd) }.as_bool())
    }

    fn is_maximized(&self, handle: WindowHandle) -> PlatformResult<bool> {
        let hwnd = live_hwnd(handle)?;
        Ok(unsafe { IsZoomed(hwnd) }.as_bool())
    }

    fn set_topmost(&self, handle: WindowHandle, topmost: bool) -> PlatformResult<()> {
        let hwnd = live_hwnd(handle)?;
        let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        unsafe {
            SetWindowPos(
                hwnd,
                Some(insert_after),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            )
        }
        .map_err(|e| PlatformError::Other(format!("SetWindowPos failed for {}: {}", handle, e)))
    }

    fn own_console_window(&self) -> Option<WindowHandle> {
        let hwnd = unsafe { GetConsoleWindow() };
        if hwnd.is_invalid() {
            None
        } else {
            Some(from_hwnd(hwnd))
        }
    }
}

impl ShortcutBlocker for WindowsDesktop {
    fn block(&self, key: Key) -> PlatformResult<()> {
        let shared = hook_shared()?;
        shared
            .blocked
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
        debug!("blocked {}", key);
        Ok(())
    }

    fn unblock(&self, key: Key) -> PlatformResult<()> {
        // nothing was ever blocked if the hook was never installed
        if let Some(shared) = HOOK.get() {
            shared
                .blocked
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&key);
        }
        Ok(())
    }

    fn send_key(&self, key: Key) -> PlatformResult<()> {
        let vk = vk_for_key(key);
        let inputs = [
            INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: vk,
                        wScan: 0,
                        dwFlags: KEYBD_EVENT_FLAGS(0),
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            },
            INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: vk,
                        wScan: 0,
                        dwFlags: KEYEVENTF_KEYUP,
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            },
        ];
        let sent = unsafe { SendInput(&inputs, mem::size_of::<INPUT>() as i32) };
        if sent as usize == inputs.len() {
            Ok(())
        } else {
            Err(PlatformError::PermissionDenied(format!(
                "SendInput delivered {} of {} events for {}",
                sent,
                inputs.len(),
                key
            )))
        }
    }

    fn register_hotkey(&self, key: Key, callback: HotkeyCallback) -> PlatformResult<HotkeyId> {
        let shared = hook_shared()?;
        let id = HotkeyId(self.next_hotkey.fetch_add(1, Ordering::SeqCst) + 1);
        shared
            .hotkeys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, (key, callback));
        debug!("registered hotkey {} as {:?}", key, id);
        Ok(id)
    }

    fn unregister_hotkey(&self, id: HotkeyId) -> PlatformResult<()> {
        if let Some(shared) = HOOK.get() {
            shared
                .hotkeys
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        }
        Ok(())
    }
}

// ============================================================================
// Taskbar
// ============================================================================

fn find_window(class: PCWSTR, title: PCWSTR) -> Option<HWND> {
    unsafe { FindWindowW(class, title) }
        .ok()
        .filter(|hwnd| !hwnd.is_invalid())
}

/// Taskbar, Start button and a visible Task Manager.
fn shell_windows() -> Vec<HWND> {
    let mut found = Vec::new();
    if let Some(tray) = find_window(w!("Shell_TrayWnd"), PCWSTR::null()) {
        found.push(tray);
    }
    if let Ok(start) = unsafe { FindWindowExW(None, None, w!("Button"), w!("Start")) } {
        if !start.is_invalid() {
            found.push(start);
        }
    }
    if let Some(task_manager) = find_window(w!("TaskManagerWindow"), w!("Task Manager")) {
        found.push(task_manager);
    }
    found
}

impl Taskbar for WindowsDesktop {
    fn hide(&self) -> PlatformResult<()> {
        let windows = shell_windows();
        if windows.is_empty() {
            return Err(PlatformError::Other("taskbar window not found".to_string()));
        }
        for hwnd in windows {
            let _ = unsafe { ShowWindow(hwnd, SW_HIDE) };
        }
        Ok(())
    }

    fn show(&self) -> PlatformResult<()> {
        let windows = shell_windows();
        if windows.is_empty() {
            return Err(PlatformError::Other("taskbar window not found".to_string()));
        }
        for hwnd in windows {
            let _ = unsafe { ShowWindow(hwnd, SW_SHOW) };
        }
        Ok(())
    }
}
