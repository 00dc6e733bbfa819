//! Input synthesis infrastructure.
//!
//! The player drives a [`InputSynthesizer`] trait object; the Windows
//! implementation injects events with SendInput, and tests use the
//! recording mock. Mouse actions always happen at the live cursor
//! position: positional replay is out of scope, so no variant takes
//! coordinates.

use macrokit_core::{Key, MouseButton};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for input synthesis operations.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// The canonical key has no platform code (capability error for this
    /// single action; playback continues).
    #[error("key {0:?} cannot be synthesized on this platform")]
    UnsynthesizableKey(Key),
    #[error("platform error: {0}")]
    Platform(String),
}

/// Platform-agnostic input injection trait.
pub trait InputSynthesizer: Send + Sync {
    /// Presses a key down (no auto-release).
    fn press_key(&self, key: Key) -> Result<(), SynthesisError>;

    /// Releases a key.
    fn release_key(&self, key: Key) -> Result<(), SynthesisError>;

    /// Presses a mouse button at the current cursor position.
    fn press_button(&self, button: MouseButton) -> Result<(), SynthesisError>;

    /// Releases a mouse button at the current cursor position.
    fn release_button(&self, button: MouseButton) -> Result<(), SynthesisError>;

    /// Scrolls the wheel by whole notches; positive `dy` scrolls up.
    fn scroll(&self, dx: i32, dy: i32) -> Result<(), SynthesisError>;
}
