//! Domain entities: input events and macros.
//!
//! Pure data with no OS dependencies. All invariants that can be enforced
//! structurally (payload groups per event kind, index revalidation on edits)
//! live here.

pub mod event;
pub mod macros;
