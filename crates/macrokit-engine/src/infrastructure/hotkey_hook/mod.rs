//! Global hotkey hook infrastructure.
//!
//! A [`HotkeyHook`] installs OS-level bindings for normalized combo
//! strings ("f2", "ctrl+shift+a") and invokes a handler when one fires.
//! The Windows implementation registers the combos on a dedicated
//! message-loop thread; tests use [`mock::MockHotkeyHook`], which can also
//! simulate the silent hook eviction the registry's heartbeat compensates
//! for.
//!
//! Hooks are deliberately dumb: debouncing, callback threading, and
//! re-registration policy all live in the application-layer registry.

use std::sync::Arc;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Opaque handle identifying one installed hook.
pub type HookId = u64;

/// Handler invoked on the hook's dispatch thread when a combo fires.
/// Must return quickly; anything slow belongs on its own thread.
pub type HookHandler = Arc<dyn Fn() + Send + Sync>;

/// Error type for hotkey hook operations.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// The combo could not be parsed or the OS refused the registration.
    #[error("failed to install hook for '{combo}': {reason}")]
    InstallFailed { combo: String, reason: String },
    /// The handle does not refer to a live hook (already removed or
    /// evicted). Callers generally swallow this.
    #[error("hook {0} is not installed")]
    Gone(HookId),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting OS hotkey registration.
pub trait HotkeyHook: Send + Sync {
    /// Installs a hook for `combo` (already normalized) and returns its
    /// handle. Installing the same combo again creates a fresh hook that
    /// replaces the OS registration; the old handle becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::InstallFailed`] on parse or OS failure.
    fn install(&self, combo: &str, handler: HookHandler) -> Result<HookId, HookError>;

    /// Removes a hook by handle.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Gone`] if the handle is stale; the registry
    /// treats that as success (the hook is gone either way).
    fn remove(&self, id: HookId) -> Result<(), HookError>;
}
