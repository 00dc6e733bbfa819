//! Infrastructure layer: OS adapters and persistence.
//!
//! Every OS concern is behind a trait defined in its module's `mod.rs`,
//! with the Windows implementation compiled in via `#[cfg(target_os =
//! "windows")]` and a mock implementation available everywhere for tests.

pub mod hotkey_hook;
pub mod input_capture;
pub mod input_synthesis;
pub mod storage;
pub mod window_info;
