//! Foreground window title via GetForegroundWindow.

#![cfg(target_os = "windows")]

use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

use super::ActiveWindowTitle;

/// Windows implementation of [`ActiveWindowTitle`].
pub struct WindowsWindowTitle;

impl WindowsWindowTitle {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsWindowTitle {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveWindowTitle for WindowsWindowTitle {
    fn current(&self) -> String {
        // SAFETY: GetForegroundWindow has no preconditions; a null handle
        // means no window has focus.
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            return String::new();
        }

        let mut buffer = [0u16; 512];
        // SAFETY: buffer is a valid mutable slice; GetWindowTextW writes at
        // most buffer.len() - 1 characters plus a terminator and returns the
        // count written.
        let len = unsafe { GetWindowTextW(hwnd, &mut buffer) };
        if len <= 0 {
            return String::new();
        }
        String::from_utf16_lossy(&buffer[..len as usize])
    }
}
