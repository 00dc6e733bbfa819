//! Windows input synthesis via the SendInput API.
//!
//! Translates canonical keys to Windows Virtual-Key codes and injects
//! events with SendInput. Mouse button and scroll events carry no
//! coordinates: they act wherever the cursor currently is.

#![cfg(target_os = "windows")]

use macrokit_core::keymap::windows_vk;
use macrokit_core::{Key, MouseButton};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYEVENTF_EXTENDEDKEY,
    KEYEVENTF_KEYUP, MOUSEEVENTF_HWHEEL, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP,
    MOUSEEVENTF_WHEEL, MOUSEINPUT, VIRTUAL_KEY,
};

use super::{InputSynthesizer, SynthesisError};

/// One wheel notch in Win32 delta units.
const WHEEL_DELTA: i32 = 120;

/// Windows implementation of [`InputSynthesizer`] using SendInput.
pub struct WindowsSynthesizer;

impl WindowsSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSynthesizer for WindowsSynthesizer {
    fn press_key(&self, key: Key) -> Result<(), SynthesisError> {
        let vk = windows_vk::key_to_vk(key).ok_or(SynthesisError::UnsynthesizableKey(key))?;
        send_key(vk, false)
    }

    fn release_key(&self, key: Key) -> Result<(), SynthesisError> {
        let vk = windows_vk::key_to_vk(key).ok_or(SynthesisError::UnsynthesizableKey(key))?;
        send_key(vk, true)
    }

    fn press_button(&self, button: MouseButton) -> Result<(), SynthesisError> {
        let flags = match button {
            MouseButton::Left => MOUSEEVENTF_LEFTDOWN,
            MouseButton::Right => MOUSEEVENTF_RIGHTDOWN,
            MouseButton::Middle => MOUSEEVENTF_MIDDLEDOWN,
        };
        send_mouse(flags, 0)
    }

    fn release_button(&self, button: MouseButton) -> Result<(), SynthesisError> {
        let flags = match button {
            MouseButton::Left => MOUSEEVENTF_LEFTUP,
            MouseButton::Right => MOUSEEVENTF_RIGHTUP,
            MouseButton::Middle => MOUSEEVENTF_MIDDLEUP,
        };
        send_mouse(flags, 0)
    }

    fn scroll(&self, dx: i32, dy: i32) -> Result<(), SynthesisError> {
        if dy != 0 {
            send_mouse(MOUSEEVENTF_WHEEL, dy * WHEEL_DELTA)?;
        }
        if dx != 0 {
            send_mouse(MOUSEEVENTF_HWHEEL, dx * WHEEL_DELTA)?;
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Virtual keys that require the EXTENDEDKEY flag (nav cluster, Insert,
/// Delete, Win keys, right-side Ctrl/Alt).
const EXTENDED_VKS: &[u8] = &[
    0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, // nav
    0x2D, 0x2E, // Insert, Delete
    0x5B, 0x5C, // Win keys
    0xA3, 0xA5, // Right Ctrl, Right Alt
];

fn send_key(vk: u8, key_up: bool) -> Result<(), SynthesisError> {
    let mut flags = windows::Win32::UI::Input::KeyboardAndMouse::KEYBD_EVENT_FLAGS(0);
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if EXTENDED_VKS.contains(&vk) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }

    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk as u16),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    dispatch(input)
}

fn send_mouse(
    flags: windows::Win32::UI::Input::KeyboardAndMouse::MOUSE_EVENT_FLAGS,
    wheel_data: i32,
) -> Result<(), SynthesisError> {
    let input = INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: wheel_data as u32,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    dispatch(input)
}

fn dispatch(input: INPUT) -> Result<(), SynthesisError> {
    // SAFETY: input is a fully initialized INPUT structure on the stack.
    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent == 0 {
        // SendInput returns 0 when the input was blocked (e.g. by UIPI).
        return Err(SynthesisError::Platform(
            "SendInput injected 0 events".to_string(),
        ));
    }
    Ok(())
}
