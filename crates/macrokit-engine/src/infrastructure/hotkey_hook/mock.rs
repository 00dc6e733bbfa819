//! Mock hotkey hook for unit testing.
//!
//! Tests fire combos by hand and can simulate the OS silently evicting
//! every installed hook, which is exactly the failure mode the registry's
//! heartbeat exists to repair. Install calls are counted per combo so
//! convergence within N heartbeat cycles is observable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{HookError, HookHandler, HookId, HotkeyHook};

#[derive(Default)]
struct MockState {
    /// Live hooks by handle.
    live: HashMap<HookId, (String, HookHandler)>,
    /// Total install calls per combo, evictions included.
    install_counts: HashMap<String, u32>,
}

/// A mock implementation of [`HotkeyHook`].
#[derive(Clone, Default)]
pub struct MockHotkeyHook {
    state: Arc<Mutex<MockState>>,
    next_id: Arc<AtomicU64>,
}

impl MockHotkeyHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every live hook registered for `combo`, as if the user
    /// pressed it. Handlers run on the caller's thread, mirroring the
    /// real dispatch thread.
    pub fn fire(&self, combo: &str) {
        let handlers: Vec<HookHandler> = {
            let state = self.state.lock().expect("lock poisoned");
            state
                .live
                .values()
                .filter(|(c, _)| c == combo)
                .map(|(_, h)| Arc::clone(h))
                .collect()
        };
        for handler in handlers {
            handler();
        }
    }

    /// Simulates the OS silently dropping every installed hook: no error,
    /// no notification, combos simply stop firing.
    pub fn evict_all(&self) {
        self.state.lock().expect("lock poisoned").live.clear();
    }

    /// Number of live hooks currently installed for `combo`.
    pub fn live_count(&self, combo: &str) -> usize {
        self.state
            .lock()
            .expect("lock poisoned")
            .live
            .values()
            .filter(|(c, _)| c == combo)
            .count()
    }

    /// Total number of install calls ever made for `combo`.
    pub fn install_count(&self, combo: &str) -> u32 {
        *self
            .state
            .lock()
            .expect("lock poisoned")
            .install_counts
            .get(combo)
            .unwrap_or(&0)
    }
}

impl HotkeyHook for MockHotkeyHook {
    fn install(&self, combo: &str, handler: HookHandler) -> Result<HookId, HookError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().expect("lock poisoned");
        state.live.insert(id, (combo.to_string(), handler));
        *state.install_counts.entry(combo.to_string()).or_insert(0) += 1;
        Ok(id)
    }

    fn remove(&self, id: HookId) -> Result<(), HookError> {
        let mut state = self.state.lock().expect("lock poisoned");
        match state.live.remove(&id) {
            Some(_) => Ok(()),
            None => Err(HookError::Gone(id)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;

    fn counting_handler() -> (HookHandler, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = Arc::clone(&count);
        let handler: HookHandler = Arc::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (handler, count)
    }

    #[test]
    fn test_fire_invokes_only_matching_combo() {
        // Arrange
        let hook = MockHotkeyHook::new();
        let (handler_a, count_a) = counting_handler();
        let (handler_b, count_b) = counting_handler();
        hook.install("f2", handler_a).unwrap();
        hook.install("ctrl+x", handler_b).unwrap();

        // Act
        hook.fire("f2");

        // Assert
        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_evicted_hooks_stop_firing_without_error() {
        // Arrange
        let hook = MockHotkeyHook::new();
        let (handler, count) = counting_handler();
        hook.install("f2", handler).unwrap();

        // Act
        hook.evict_all();
        hook.fire("f2");

        // Assert – silent eviction: nothing fires, nothing errors
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(hook.live_count("f2"), 0);
        // The install is still counted
        assert_eq!(hook.install_count("f2"), 1);
    }

    #[test]
    fn test_remove_stale_handle_reports_gone() {
        let hook = MockHotkeyHook::new();
        let (handler, _) = counting_handler();
        let id = hook.install("f3", handler).unwrap();

        assert!(hook.remove(id).is_ok());
        assert!(matches!(hook.remove(id), Err(HookError::Gone(_))));
    }
}
