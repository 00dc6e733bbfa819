//! Foreground window inspection.
//!
//! The trigger dispatcher consults [`ActiveWindowTitle`] to decide whether
//! a macro bound to a window filter may run. Failure is not an error here:
//! when the title cannot be read the query returns an empty string, which
//! filtered macros treat as "no match".

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Source of the currently focused window's title.
pub trait ActiveWindowTitle: Send + Sync {
    /// Returns the foreground window's title, or an empty string if there
    /// is no foreground window or the title cannot be read.
    fn current(&self) -> String;
}
