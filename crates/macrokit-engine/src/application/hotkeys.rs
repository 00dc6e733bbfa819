//! HotkeyRegistry: owns the set of combo-to-callback bindings.
//!
//! The OS-level [`HotkeyHook`] is deliberately dumb, so all policy lives
//! here: a cooldown suppresses the bursts real keyboards produce, accepted
//! callbacks run on their own short-lived threads so the hook dispatch
//! path never blocks, and a heartbeat thread periodically reinstalls every
//! binding because Windows is known to silently evict hooks from processes
//! it considers unresponsive. Reinstall failures are transient by policy:
//! logged and retried on the next beat, never surfaced.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use macrokit_core::normalize_combo;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::infrastructure::hotkey_hook::{HookError, HookId, HotkeyHook};

/// How often the heartbeat thread checks whether the interval elapsed.
const HEARTBEAT_POLL: Duration = Duration::from_millis(10);

/// Error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Callback invoked when a registered combo fires.
pub type TriggerCallback = Arc<dyn Fn() + Send + Sync>;

struct Binding {
    callback: TriggerCallback,
    hook_id: Option<HookId>,
    last_trigger: Option<Instant>,
}

/// The hotkey management use case.
pub struct HotkeyRegistry {
    hook: Arc<dyn HotkeyHook>,
    bindings: Arc<Mutex<HashMap<String, Binding>>>,
    heartbeat_interval: Duration,
    cooldown: Duration,
    running: Arc<AtomicBool>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl HotkeyRegistry {
    pub fn new(hook: Arc<dyn HotkeyHook>, heartbeat_interval: Duration, cooldown: Duration) -> Self {
        Self {
            hook,
            bindings: Arc::new(Mutex::new(HashMap::new())),
            heartbeat_interval,
            cooldown,
            running: Arc::new(AtomicBool::new(false)),
            heartbeat: Mutex::new(None),
        }
    }

    /// Binds `combo` (normalized internally) to `callback`. Registering a
    /// combo that is already bound replaces the old binding.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Hook`] when the registry is running and the
    /// OS refuses the registration.
    pub fn register(&self, combo: &str, callback: TriggerCallback) -> Result<(), RegistryError> {
        let combo = normalize_combo(combo);

        let old_id = {
            let mut bindings = self.bindings.lock().expect("lock poisoned");
            let old_id = bindings.get(&combo).and_then(|b| b.hook_id);
            bindings.insert(
                combo.clone(),
                Binding {
                    callback,
                    hook_id: None,
                    last_trigger: None,
                },
            );
            old_id
        };
        if let Some(id) = old_id {
            // Gone just means the OS got there first
            let _ = self.hook.remove(id);
        }

        if self.running.load(Ordering::SeqCst) {
            self.install(&combo)?;
        }
        debug!(combo, "hotkey registered");
        Ok(())
    }

    /// Removes the binding for `combo`. Unknown combos are a no-op.
    pub fn unregister(&self, combo: &str) {
        let combo = normalize_combo(combo);
        let removed = self
            .bindings
            .lock()
            .expect("lock poisoned")
            .remove(&combo);
        if let Some(binding) = removed {
            if let Some(id) = binding.hook_id {
                let _ = self.hook.remove(id);
            }
            debug!(combo, "hotkey unregistered");
        }
    }

    /// Removes every binding.
    pub fn clear_all(&self) {
        let combos: Vec<String> = self
            .bindings
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        for combo in combos {
            self.unregister(&combo);
        }
    }

    /// Currently bound combos, in no particular order.
    pub fn registered_combos(&self) -> Vec<String> {
        self.bindings
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Installs every binding and starts the heartbeat thread.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError::Hook`] hit while installing;
    /// bindings installed before the failure stay installed.
    pub fn start(&self) -> Result<(), RegistryError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let combos: Vec<String> = self.registered_combos();
        for combo in combos {
            self.install(&combo)?;
        }

        let bindings = Arc::clone(&self.bindings);
        let hook = Arc::clone(&self.hook);
        let running = Arc::clone(&self.running);
        let cooldown = self.cooldown;
        let interval = self.heartbeat_interval;
        let handle = thread::Builder::new()
            .name("macrokit-heartbeat".to_string())
            .spawn(move || {
                let mut last_beat = Instant::now();
                while running.load(Ordering::SeqCst) {
                    thread::sleep(HEARTBEAT_POLL);
                    if last_beat.elapsed() >= interval {
                        refresh_all(&hook, &bindings, cooldown);
                        last_beat = Instant::now();
                    }
                }
            });
        match handle {
            Ok(handle) => *self.heartbeat.lock().expect("lock poisoned") = Some(handle),
            Err(e) => warn!(error = %e, "heartbeat thread failed to spawn"),
        }

        info!(
            heartbeat_secs = self.heartbeat_interval.as_secs_f64(),
            "hotkey registry started"
        );
        Ok(())
    }

    /// Stops the heartbeat and removes every installed hook. Bindings are
    /// kept, so a later [`HotkeyRegistry::start`] restores them.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.heartbeat.lock().expect("lock poisoned").take() {
            let _ = handle.join();
        }

        let mut ids = Vec::new();
        {
            let mut bindings = self.bindings.lock().expect("lock poisoned");
            for binding in bindings.values_mut() {
                if let Some(id) = binding.hook_id.take() {
                    ids.push(id);
                }
            }
        }
        for id in ids {
            let _ = self.hook.remove(id);
        }
        info!("hotkey registry stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Tears down and reinstalls every binding. Called by the heartbeat;
    /// exposed for callers that just resumed from a known-degraded state.
    pub fn refresh_all(&self) {
        refresh_all(&self.hook, &self.bindings, self.cooldown);
    }

    fn install(&self, combo: &str) -> Result<(), RegistryError> {
        let handler = dispatch_handler(combo, Arc::clone(&self.bindings), self.cooldown);
        let id = self.hook.install(combo, handler)?;
        if let Some(binding) = self
            .bindings
            .lock()
            .expect("lock poisoned")
            .get_mut(combo)
        {
            binding.hook_id = Some(id);
        } else {
            // Unregistered between install and bookkeeping
            let _ = self.hook.remove(id);
        }
        Ok(())
    }
}

impl Drop for HotkeyRegistry {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Dispatch and heartbeat internals ──────────────────────────────────────────

/// Builds the hook-side handler for one combo: cooldown check on the
/// dispatch thread, accepted callbacks spawned onto their own thread.
fn dispatch_handler(
    combo: &str,
    bindings: Arc<Mutex<HashMap<String, Binding>>>,
    cooldown: Duration,
) -> Arc<dyn Fn() + Send + Sync> {
    let combo = combo.to_string();
    Arc::new(move || {
        let callback = {
            let mut bindings = bindings.lock().expect("lock poisoned");
            let Some(binding) = bindings.get_mut(&combo) else {
                return;
            };
            if let Some(last) = binding.last_trigger {
                if last.elapsed() < cooldown {
                    debug!(combo, "trigger suppressed by cooldown");
                    return;
                }
            }
            binding.last_trigger = Some(Instant::now());
            Arc::clone(&binding.callback)
        };

        if let Err(e) = thread::Builder::new()
            .name("macrokit-trigger".to_string())
            .spawn(move || callback())
        {
            warn!(error = %e, "trigger callback thread failed to spawn");
        }
    })
}

fn refresh_all(
    hook: &Arc<dyn HotkeyHook>,
    bindings: &Arc<Mutex<HashMap<String, Binding>>>,
    cooldown: Duration,
) {
    let stale: Vec<(String, Option<HookId>)> = {
        let bindings = bindings.lock().expect("lock poisoned");
        bindings
            .iter()
            .map(|(combo, binding)| (combo.clone(), binding.hook_id))
            .collect()
    };

    for (combo, old_id) in stale {
        if let Some(id) = old_id {
            // Gone is the expected answer when the OS evicted the hook
            let _ = hook.remove(id);
        }
        let handler = dispatch_handler(&combo, Arc::clone(bindings), cooldown);
        match hook.install(&combo, handler) {
            Ok(id) => {
                if let Some(binding) = bindings.lock().expect("lock poisoned").get_mut(&combo) {
                    binding.hook_id = Some(id);
                }
            }
            // Transient; the next heartbeat retries
            Err(e) => debug!(combo, error = %e, "heartbeat reinstall failed"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;
    use crate::infrastructure::hotkey_hook::mock::MockHotkeyHook;

    /// Callbacks run on spawned threads; give them a moment to land.
    fn settle() {
        thread::sleep(Duration::from_millis(50));
    }

    fn counting_callback() -> (TriggerCallback, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = Arc::clone(&count);
        let callback: TriggerCallback = Arc::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (callback, count)
    }

    fn registry(hook: &MockHotkeyHook, heartbeat_ms: u64, cooldown_ms: u64) -> HotkeyRegistry {
        HotkeyRegistry::new(
            Arc::new(hook.clone()),
            Duration::from_millis(heartbeat_ms),
            Duration::from_millis(cooldown_ms),
        )
    }

    #[test]
    fn test_rapid_repeat_triggers_collapse_to_one_callback() {
        // Arrange
        let hook = MockHotkeyHook::new();
        let reg = registry(&hook, 60_000, 150);
        let (callback, count) = counting_callback();
        reg.register("f2", callback).unwrap();
        reg.start().unwrap();

        // Act – a burst well inside the cooldown
        hook.fire("f2");
        hook.fire("f2");
        hook.fire("f2");
        settle();

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Act – after the cooldown a new trigger is accepted
        thread::sleep(Duration::from_millis(200));
        hook.fire("f2");
        settle();

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 2);
        reg.stop();
    }

    #[test]
    fn test_heartbeat_converges_after_silent_eviction() {
        // Arrange – fast heartbeat so the test stays quick
        let hook = MockHotkeyHook::new();
        let reg = registry(&hook, 50, 0);
        let (callback, count) = counting_callback();
        reg.register("ctrl+f3", callback).unwrap();
        reg.start().unwrap();
        assert_eq!(hook.live_count("ctrl+f3"), 1);

        // Act – the OS silently drops the hook
        hook.evict_all();
        assert_eq!(hook.live_count("ctrl+f3"), 0);
        thread::sleep(Duration::from_millis(250));

        // Assert – heartbeat reinstalled it and it fires again
        assert_eq!(hook.live_count("ctrl+f3"), 1);
        assert!(hook.install_count("ctrl+f3") >= 2);
        hook.fire("ctrl+f3");
        settle();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        reg.stop();
    }

    #[test]
    fn test_reregister_replaces_previous_callback() {
        // Arrange
        let hook = MockHotkeyHook::new();
        let reg = registry(&hook, 60_000, 0);
        let (first, first_count) = counting_callback();
        let (second, second_count) = counting_callback();
        reg.register("f4", first).unwrap();
        reg.start().unwrap();

        // Act
        reg.register("f4", second).unwrap();
        hook.fire("f4");
        settle();

        // Assert – only the replacement ran, and only one live hook exists
        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
        assert_eq!(hook.live_count("f4"), 1);
        reg.stop();
    }

    #[test]
    fn test_unregister_silences_the_combo() {
        // Arrange
        let hook = MockHotkeyHook::new();
        let reg = registry(&hook, 60_000, 0);
        let (callback, count) = counting_callback();
        reg.register("f5", callback).unwrap();
        reg.start().unwrap();

        // Act
        reg.unregister("f5");
        hook.fire("f5");
        settle();

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(hook.live_count("f5"), 0);
        reg.stop();
    }

    #[test]
    fn test_combo_is_normalized_before_binding() {
        // Arrange
        let hook = MockHotkeyHook::new();
        let reg = registry(&hook, 60_000, 0);
        let (callback, count) = counting_callback();

        // Act
        reg.register("Ctrl + Shift + A", callback).unwrap();
        reg.start().unwrap();
        hook.fire("ctrl+shift+a");
        settle();

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(reg.registered_combos(), vec!["ctrl+shift+a".to_string()]);
        reg.stop();
    }

    #[test]
    fn test_stop_removes_hooks_and_restart_restores_them() {
        // Arrange
        let hook = MockHotkeyHook::new();
        let reg = registry(&hook, 60_000, 0);
        let (callback, count) = counting_callback();
        reg.register("f6", callback).unwrap();
        reg.start().unwrap();

        // Act
        reg.stop();
        hook.fire("f6");
        settle();

        // Assert – nothing fires while stopped
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(hook.live_count("f6"), 0);

        // Act – bindings survive a stop
        reg.start().unwrap();
        hook.fire("f6");
        settle();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        reg.stop();
    }
}
