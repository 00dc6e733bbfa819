//! Windows hotkey hook via RegisterHotKey.
//!
//! RegisterHotKey ties a registration to the calling thread, so all combos
//! are registered on one dedicated message-loop thread. Install and remove
//! requests travel over a command channel; the loop is woken with a posted
//! message so commands are picked up promptly even when no hotkey fires.

#![cfg(target_os = "windows")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

use macrokit_core::keymap::{self, windows_vk, KeyToken};
use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT,
    MOD_SHIFT, MOD_WIN,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetMessageW, PostThreadMessageW, MSG, WM_APP, WM_HOTKEY, WM_QUIT,
};

use super::{HookError, HookHandler, HookId, HotkeyHook};

/// Posted to the loop thread to make it drain the command channel.
const WM_CHECK_COMMANDS: u32 = WM_APP + 1;

enum Command {
    Install {
        id: HookId,
        modifiers: HOT_KEY_MODIFIERS,
        vk: u32,
        handler: HookHandler,
        reply: Sender<Result<(), String>>,
    },
    Remove {
        id: HookId,
        reply: Sender<bool>,
    },
}

/// Windows implementation of [`HotkeyHook`].
pub struct WindowsHotkeyHook {
    commands: Mutex<Sender<Command>>,
    loop_thread_id: AtomicU32,
    next_id: AtomicU64,
}

impl WindowsHotkeyHook {
    /// Spawns the message-loop thread and returns the hook.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let hook = Self {
            commands: Mutex::new(tx),
            loop_thread_id: AtomicU32::new(0),
            next_id: AtomicU64::new(0),
        };

        let (ready_tx, ready_rx) = mpsc::channel();
        thread::Builder::new()
            .name("macrokit-hotkey-loop".to_string())
            .spawn(move || message_loop(rx, ready_tx))
            .ok();
        if let Ok(thread_id) = ready_rx.recv() {
            hook.loop_thread_id.store(thread_id, Ordering::SeqCst);
        }
        hook
    }

    fn wake_loop(&self) {
        let thread_id = self.loop_thread_id.load(Ordering::SeqCst);
        if thread_id != 0 {
            // SAFETY: posts a thread message to our own loop thread; no
            // pointers are carried in the message.
            unsafe {
                let _ = PostThreadMessageW(thread_id, WM_CHECK_COMMANDS, WPARAM(0), LPARAM(0));
            }
        }
    }
}

impl Default for WindowsHotkeyHook {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WindowsHotkeyHook {
    fn drop(&mut self) {
        let thread_id = self.loop_thread_id.load(Ordering::SeqCst);
        if thread_id != 0 {
            // SAFETY: WM_QUIT carries no pointers.
            unsafe {
                let _ = PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
            }
        }
    }
}

impl HotkeyHook for WindowsHotkeyHook {
    fn install(&self, combo: &str, handler: HookHandler) -> Result<HookId, HookError> {
        let (modifiers, vk) = parse_combo(combo).map_err(|reason| HookError::InstallFailed {
            combo: combo.to_string(),
            reason,
        })?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .lock()
            .expect("lock poisoned")
            .send(Command::Install {
                id,
                modifiers,
                vk,
                handler,
                reply: reply_tx,
            })
            .map_err(|_| HookError::InstallFailed {
                combo: combo.to_string(),
                reason: "hotkey loop thread is gone".to_string(),
            })?;
        self.wake_loop();

        match reply_rx.recv() {
            Ok(Ok(())) => {
                debug!(combo, id, "hotkey registered");
                Ok(id)
            }
            Ok(Err(reason)) => Err(HookError::InstallFailed {
                combo: combo.to_string(),
                reason,
            }),
            Err(_) => Err(HookError::InstallFailed {
                combo: combo.to_string(),
                reason: "hotkey loop thread is gone".to_string(),
            }),
        }
    }

    fn remove(&self, id: HookId) -> Result<(), HookError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .lock()
            .expect("lock poisoned")
            .send(Command::Remove { id, reply: reply_tx })
            .map_err(|_| HookError::Gone(id))?;
        self.wake_loop();

        match reply_rx.recv() {
            Ok(true) => Ok(()),
            _ => Err(HookError::Gone(id)),
        }
    }
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop(commands: Receiver<Command>, ready: Sender<u32>) {
    // SAFETY: GetCurrentThreadId has no preconditions.
    let thread_id = unsafe { windows::Win32::System::Threading::GetCurrentThreadId() };
    let _ = ready.send(thread_id);

    let mut handlers: HashMap<HookId, HookHandler> = HashMap::new();

    let mut msg = MSG::default();
    // SAFETY: msg points to a valid MSG on this thread's stack. No window
    // handle retrieves thread messages, which is where WM_HOTKEY lands for
    // RegisterHotKey calls made without a window.
    while unsafe { GetMessageW(&mut msg, None, 0, 0) }.as_bool() {
        match msg.message {
            WM_HOTKEY => {
                let id = msg.wParam.0 as HookId;
                if let Some(handler) = handlers.get(&id) {
                    handler();
                }
            }
            WM_CHECK_COMMANDS => {
                while let Ok(command) = commands.try_recv() {
                    handle_command(command, &mut handlers);
                }
            }
            _ => {}
        }
    }
    debug!("hotkey loop thread exiting");
}

fn handle_command(command: Command, handlers: &mut HashMap<HookId, HookHandler>) {
    match command {
        Command::Install {
            id,
            modifiers,
            vk,
            handler,
            reply,
        } => {
            // SAFETY: null HWND routes WM_HOTKEY to this thread's queue; the
            // id is unique per install so registrations never collide.
            let result = unsafe {
                RegisterHotKey(None, id as i32, modifiers | MOD_NOREPEAT, vk)
            };
            match result {
                Ok(()) => {
                    handlers.insert(id, handler);
                    let _ = reply.send(Ok(()));
                }
                Err(e) => {
                    warn!(id, error = %e, "RegisterHotKey failed");
                    let _ = reply.send(Err(e.to_string()));
                }
            }
        }
        Command::Remove { id, reply } => {
            let existed = handlers.remove(&id).is_some();
            if existed {
                // SAFETY: unregisters an id this thread registered.
                unsafe {
                    let _ = UnregisterHotKey(None, id as i32);
                }
            }
            let _ = reply.send(existed);
        }
    }
}

// ── Combo parsing ─────────────────────────────────────────────────────────────

/// Splits a normalized combo ("ctrl+shift+f2") into RegisterHotKey modifier
/// flags and the trailing key's virtual-key code.
fn parse_combo(combo: &str) -> Result<(HOT_KEY_MODIFIERS, u32), String> {
    let mut modifiers = HOT_KEY_MODIFIERS(0);
    let mut vk = None;

    for part in combo.split('+') {
        if part.is_empty() {
            return Err("empty combo segment".to_string());
        }
        match part {
            "ctrl" | "ctrl_l" | "ctrl_r" => modifiers |= MOD_CONTROL,
            "alt" | "alt_l" | "alt_r" | "alt_gr" => modifiers |= MOD_ALT,
            "shift" | "shift_l" | "shift_r" => modifiers |= MOD_SHIFT,
            "cmd" | "cmd_l" | "cmd_r" => modifiers |= MOD_WIN,
            key_part => {
                if vk.is_some() {
                    return Err(format!("more than one non-modifier key in '{combo}'"));
                }
                match keymap::parse_key(key_part) {
                    KeyToken::Resolved(key) => match windows_vk::key_to_vk(key) {
                        Some(code) => vk = Some(code as u32),
                        None => return Err(format!("key '{key_part}' has no virtual-key code")),
                    },
                    KeyToken::Unresolved(raw) => {
                        return Err(format!("unknown key token '{raw}'"));
                    }
                }
            }
        }
    }

    match vk {
        Some(vk) => Ok((modifiers, vk)),
        None => Err(format!("combo '{combo}' has no non-modifier key")),
    }
}
