//! # macrokit-core
//!
//! Shared library for MacroKit containing the domain entities (events and
//! macros), the key translation tables, and the persisted macro document
//! format.
//!
//! This crate is used by the engine crate and has zero dependencies on OS
//! APIs, UI frameworks, or the file system. Everything here is pure data
//! plus (de)serialization:
//!
//! - **`domain`** – `Event`, `EventKind`, and `Macro`: a macro is a named,
//!   ordered sequence of input events with loop and trigger metadata.
//!   Inter-event spacing is represented by explicit `Delay` events, never
//!   by a per-event offset, so editing the sequence in a UI stays simple.
//!
//! - **`keymap`** – The canonical [`Key`] set, best-effort parsing of key
//!   identifier strings into [`KeyToken`]s, hotkey combo normalization, and
//!   the Windows Virtual-Key translation table used at the capture and
//!   synthesis boundaries.
//!
//! - **`format`** – The on-disk JSON document for a macro. Loading is
//!   tolerant: unknown fields are ignored and missing optional fields take
//!   their defaults, because macro files are user-editable.

pub mod domain;
pub mod format;
pub mod keymap;

pub use domain::event::{Event, EventKind, MouseButton};
pub use domain::macros::{validate_speed, Macro, ValidationError};
pub use format::{macro_from_document, macro_to_document, FormatError};
pub use keymap::key::{Key, FALLBACK_MODIFIERS};
pub use keymap::{normalize_combo, parse_key, KeyToken};
