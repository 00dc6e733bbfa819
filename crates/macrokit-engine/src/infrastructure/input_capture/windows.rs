//! Windows low-level keyboard and mouse hook implementation.
//!
//! Installs WH_KEYBOARD_LL and WH_MOUSE_LL hooks sharing a dedicated Win32
//! message-loop thread. The session is restartable: `stop()` posts WM_QUIT
//! to the loop thread, which unhooks both hooks on its way out, and a later
//! `start()` spawns a fresh loop.
//!
//! # Safety
//!
//! This module uses `unsafe` exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use macrokit_core::keymap::windows_vk;
use macrokit_core::MouseButton;
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, MSG, MSLLHOOKSTRUCT, WH_KEYBOARD_LL,
    WH_MOUSE_LL, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN,
    WM_MBUTTONUP, WM_MOUSEHWHEEL, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_QUIT, WM_RBUTTONDOWN,
    WM_RBUTTONUP, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

use super::{CaptureError, InputSource, RawInputEvent};

/// One wheel notch in Win32 delta units.
const WHEEL_DELTA: i32 = 120;

/// Sender used by the hook callbacks to deliver events. `Some` only while a
/// session is active; dropping it closes the consumer channel.
static EVENT_SENDER: Mutex<Option<Sender<RawInputEvent>>> = Mutex::new(None);

/// Thread id of the live message loop, for posting WM_QUIT. Zero when idle.
static HOOK_THREAD_ID: AtomicU32 = AtomicU32::new(0);

/// Windows low-level input capture service.
pub struct WindowsInputSource;

impl WindowsInputSource {
    /// Creates a new (unstarted) capture service.
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for WindowsInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel::<RawInputEvent>();
        {
            let mut sender = EVENT_SENDER.lock().expect("lock poisoned");
            if sender.is_some() {
                return Err(CaptureError::AlreadyStarted);
            }
            *sender = Some(tx);
        }

        // The loop thread reports hook installation success/failure back
        // before start() returns, so a capability error surfaces here and
        // no partial hook state is left behind.
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), CaptureError>>();
        thread::Builder::new()
            .name("macrokit-hook-loop".to_string())
            .spawn(move || run_hook_message_loop(ready_tx))
            .map_err(|e| {
                *EVENT_SENDER.lock().expect("lock poisoned") = None;
                CaptureError::KeyboardHookInstallFailed(e.to_string())
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(rx),
            Ok(Err(e)) => {
                *EVENT_SENDER.lock().expect("lock poisoned") = None;
                Err(e)
            }
            Err(_) => {
                *EVENT_SENDER.lock().expect("lock poisoned") = None;
                Err(CaptureError::KeyboardHookInstallFailed(
                    "hook thread exited before reporting readiness".to_string(),
                ))
            }
        }
    }

    fn stop(&self) {
        // Close the channel first so drain threads observe the end of the
        // session even if the message loop lingers briefly.
        *EVENT_SENDER.lock().expect("lock poisoned") = None;

        let thread_id = HOOK_THREAD_ID.swap(0, Ordering::SeqCst);
        if thread_id != 0 {
            // SAFETY: Posting WM_QUIT to a thread id is safe; a stale id is
            // rejected by the OS with an error we deliberately ignore.
            unsafe {
                let _ = PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
            }
        }
    }
}

/// Entry point for the dedicated Win32 message-loop thread.
fn run_hook_message_loop(ready_tx: Sender<Result<(), CaptureError>>) {
    // SAFETY: SetWindowsHookExW for WH_*_LL hooks requires a thread with a
    // message loop, which this thread enters below.
    let kbd_hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) } {
        Ok(h) => h,
        Err(e) => {
            let _ = ready_tx.send(Err(CaptureError::KeyboardHookInstallFailed(e.to_string())));
            return;
        }
    };
    let mouse_hook = match unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) } {
        Ok(h) => h,
        Err(e) => {
            // SAFETY: kbd_hook is the handle installed above.
            unsafe {
                let _ = UnhookWindowsHookEx(kbd_hook);
            }
            let _ = ready_tx.send(Err(CaptureError::MouseHookInstallFailed(e.to_string())));
            return;
        }
    };

    // SAFETY: GetCurrentThreadId has no preconditions.
    HOOK_THREAD_ID.store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);
    let _ = ready_tx.send(Ok(()));

    // Win32 message loop – blocks until WM_QUIT is posted by stop().
    let mut msg = MSG::default();
    // SAFETY: Standard GetMessage/DispatchMessage loop pattern.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
        let _ = UnhookWindowsHookEx(kbd_hook);
        let _ = UnhookWindowsHookEx(mouse_hook);
    }
}

fn forward(event: RawInputEvent) {
    if let Some(sender) = EVENT_SENDER.lock().expect("lock poisoned").as_ref() {
        // Send errors mean the session is shutting down.
        let _ = sender.send(event);
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the hook message-loop thread. Must return quickly
/// (< ~300ms) to avoid hook removal by the OS; this only translates the VK
/// code and pushes onto a channel.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: Must call CallNextHookEx when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
    let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
    let at = Instant::now();

    if let Some(key) = windows_vk::vk_to_key(kbs.vkCode as u8) {
        match w_param.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => forward(RawInputEvent::KeyDown { key, at }),
            WM_KEYUP | WM_SYSKEYUP => forward(RawInputEvent::KeyUp { key, at }),
            _ => {}
        }
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows on the hook message-loop thread; must return quickly.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: Must call CallNextHookEx when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
    let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
    let at = Instant::now();

    match w_param.0 as u32 {
        WM_MOUSEMOVE => forward(RawInputEvent::MouseMove { at }),
        WM_LBUTTONDOWN => forward(RawInputEvent::MouseButtonDown { button: MouseButton::Left, at }),
        WM_LBUTTONUP => forward(RawInputEvent::MouseButtonUp { button: MouseButton::Left, at }),
        WM_RBUTTONDOWN => forward(RawInputEvent::MouseButtonDown { button: MouseButton::Right, at }),
        WM_RBUTTONUP => forward(RawInputEvent::MouseButtonUp { button: MouseButton::Right, at }),
        WM_MBUTTONDOWN => forward(RawInputEvent::MouseButtonDown { button: MouseButton::Middle, at }),
        WM_MBUTTONUP => forward(RawInputEvent::MouseButtonUp { button: MouseButton::Middle, at }),
        WM_MOUSEWHEEL => {
            let notches = ((mhs.mouseData >> 16) as i16) as i32 / WHEEL_DELTA;
            forward(RawInputEvent::MouseWheel { dx: 0, dy: notches, at });
        }
        WM_MOUSEHWHEEL => {
            let notches = ((mhs.mouseData >> 16) as i16) as i32 / WHEEL_DELTA;
            forward(RawInputEvent::MouseWheel { dx: notches, dy: 0, at });
        }
        _ => {}
    }

    // SAFETY: Forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
