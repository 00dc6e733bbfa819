//! Application layer: recording, playback, hotkey management, and trigger
//! dispatch.
//!
//! Use cases here depend only on the infrastructure traits
//! ([`crate::infrastructure::input_capture::InputSource`],
//! [`crate::infrastructure::input_synthesis::InputSynthesizer`],
//! [`crate::infrastructure::hotkey_hook::HotkeyHook`],
//! [`crate::infrastructure::window_info::ActiveWindowTitle`]) and on
//! `macrokit-core` domain types, so everything is unit-testable with the
//! mock implementations.

use macrokit_core::Key;

pub mod hotkeys;
pub mod play;
pub mod record;
pub mod trigger;

/// The reserved key that ends a recording session and stops playback.
/// It is never recorded and cannot be used as a trigger.
pub const STOP_KEY: Key = Key::F(10);

/// The reserved emergency-stop key, bound as a global hotkey while the
/// engine runs.
pub const EMERGENCY_STOP_COMBO: &str = "escape";
