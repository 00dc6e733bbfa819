//! TriggerDispatcher: connects stored macros to the hotkey registry.
//!
//! Each macro with a trigger key gets a registry binding whose callback
//! re-checks the gate conditions at fire time: the player must be idle
//! (a trigger during playback is rejected, not queued) and the macro's
//! window filter, when set, must match the foreground window title
//! case-insensitively.

use std::sync::Arc;

use macrokit_core::{normalize_combo, Macro};
use tracing::{debug, info, warn};

use super::hotkeys::{HotkeyRegistry, TriggerCallback};
use super::play::{PlaybackOptions, Player};
use super::EMERGENCY_STOP_COMBO;
use crate::infrastructure::window_info::ActiveWindowTitle;

/// Combos that can never be macro triggers.
const RESERVED_COMBOS: &[&str] = &["f10", EMERGENCY_STOP_COMBO];

/// The trigger dispatch use case.
pub struct TriggerDispatcher {
    player: Arc<Player>,
    window: Arc<dyn ActiveWindowTitle>,
    options: PlaybackOptions,
}

impl TriggerDispatcher {
    /// `options` applies to every triggered playback (the configured
    /// default speed, in practice).
    pub fn new(
        player: Arc<Player>,
        window: Arc<dyn ActiveWindowTitle>,
        options: PlaybackOptions,
    ) -> Self {
        Self {
            player,
            window,
            options,
        }
    }

    /// Registers every macro that has a trigger key. Reserved combos and
    /// registration failures are skipped with a warning. Returns how many
    /// macros were bound.
    pub fn bind_macros(&self, registry: &HotkeyRegistry, macros: &[Macro]) -> usize {
        let mut bound = 0;
        for macro_def in macros {
            let Some(trigger) = macro_def.trigger_key.as_deref() else {
                continue;
            };
            let combo = normalize_combo(trigger);
            if RESERVED_COMBOS.contains(&combo.as_str()) {
                warn!(name = %macro_def.name, combo, "trigger uses a reserved key, skipping");
                continue;
            }
            match registry.register(&combo, self.playback_callback(macro_def.clone())) {
                Ok(()) => bound += 1,
                Err(e) => {
                    warn!(name = %macro_def.name, combo, error = %e, "trigger registration failed")
                }
            }
        }
        info!(bound, "macro triggers registered");
        bound
    }

    /// Binds the process-wide emergency stop combo.
    pub fn bind_emergency_stop(&self, registry: &HotkeyRegistry) {
        let player = Arc::clone(&self.player);
        let callback: TriggerCallback = Arc::new(move || {
            warn!("emergency stop triggered");
            player.emergency_stop();
        });
        if let Err(e) = registry.register(EMERGENCY_STOP_COMBO, callback) {
            warn!(error = %e, "emergency stop registration failed");
        }
    }

    fn playback_callback(&self, macro_def: Macro) -> TriggerCallback {
        let player = Arc::clone(&self.player);
        let window = Arc::clone(&self.window);
        let options = self.options.clone();
        Arc::new(move || {
            if player.is_playing() {
                debug!(name = %macro_def.name, "trigger rejected, playback in progress");
                return;
            }
            let filter = macro_def.target_window_filter.trim();
            if !filter.is_empty() {
                let title = window.current();
                if !title.to_lowercase().contains(&filter.to_lowercase()) {
                    debug!(
                        name = %macro_def.name,
                        filter,
                        title,
                        "trigger skipped, window filter does not match"
                    );
                    return;
                }
            }
            if let Err(e) = player.play(macro_def.clone(), options.clone()) {
                warn!(name = %macro_def.name, error = %e, "triggered playback failed to start");
            }
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
