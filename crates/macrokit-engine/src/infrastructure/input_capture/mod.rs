//! Input capture infrastructure.
//!
//! On Windows, this installs low-level keyboard and mouse hooks
//! (WH_KEYBOARD_LL, WH_MOUSE_LL) on a dedicated Win32 message-loop thread.
//! Raw events are placed into a channel and drained by the recorder (or by
//! the player's stop-key listener).
//!
//! The hook callbacks must complete within ~300ms or Windows will remove
//! the hook, so all processing is deferred out of the callback via the
//! `mpsc` channel.
//!
//! The [`InputSource`] trait allows unit tests to inject synthetic events
//! without requiring OS hooks.

use std::sync::mpsc;
use std::time::Instant;

use macrokit_core::{Key, MouseButton};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// A raw input notification produced by the capture infrastructure.
///
/// Keys are already translated to the canonical [`Key`] set at this
/// boundary; VK codes with no canonical mapping are not forwarded.
/// Coordinates are never captured: replay acts at the live cursor position.
#[derive(Debug, Clone)]
pub enum RawInputEvent {
    /// A key was pressed down.
    KeyDown { key: Key, at: Instant },
    /// A key was released.
    KeyUp { key: Key, at: Instant },
    /// A mouse button was pressed.
    MouseButtonDown { button: MouseButton, at: Instant },
    /// A mouse button was released.
    MouseButtonUp { button: MouseButton, at: Instant },
    /// The wheel was scrolled; deltas are in notches, positive = up/right.
    MouseWheel { dx: i32, dy: i32, at: Instant },
    /// The cursor moved. Discarded unless motion capture is enabled.
    MouseMove { at: Instant },
}

impl RawInputEvent {
    /// The capture timestamp of the notification.
    pub fn at(&self) -> Instant {
        match self {
            RawInputEvent::KeyDown { at, .. }
            | RawInputEvent::KeyUp { at, .. }
            | RawInputEvent::MouseButtonDown { at, .. }
            | RawInputEvent::MouseButtonUp { at, .. }
            | RawInputEvent::MouseWheel { at, .. }
            | RawInputEvent::MouseMove { at } => *at,
        }
    }
}

/// Error type for input capture operations.
///
/// Hook installation failures are capability errors: fatal to the attempted
/// operation, surfaced to the caller, with no partial hook state retained.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to install keyboard hook: {0}")]
    KeyboardHookInstallFailed(String),
    #[error("failed to install mouse hook: {0}")]
    MouseHookInstallFailed(String),
    #[error("capture is already running")]
    AlreadyStarted,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting raw input event production.
///
/// The production implementation uses Windows hooks; tests use
/// [`mock::MockInputSource`]. `start` may be called again after `stop`
/// (one session at a time).
pub trait InputSource: Send + Sync {
    /// Starts the source and returns a receiver for captured events.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] if a hook cannot be installed; in that case
    /// no hook remains installed.
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError>;

    /// Stops the source and releases all OS resources. The event channel
    /// closes, which is how drain threads observe the end of the session.
    /// Safe to call from a drain thread and safe to call twice.
    fn stop(&self);
}
