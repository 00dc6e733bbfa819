//! macrokit-engine library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The engine is split the same way at every seam:
//!
//! - **`application`** – the behavioral components: [`Recorder`],
//!   [`Player`], [`HotkeyRegistry`], and the trigger dispatcher. These
//!   depend only on the infrastructure *traits* and are fully testable
//!   with mocks.
//!
//! - **`infrastructure`** – OS adapters behind those traits: low-level
//!   input hooks, SendInput synthesis, global hotkey registration, the
//!   foreground-window query, and macro/config storage. Each module ships
//!   a mock implementation alongside the Windows one.
//!
//! [`Recorder`]: application::record::Recorder
//! [`Player`]: application::play::Player
//! [`HotkeyRegistry`]: application::hotkeys::HotkeyRegistry

pub mod application;
pub mod infrastructure;
