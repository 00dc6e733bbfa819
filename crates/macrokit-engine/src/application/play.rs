//! Player: replays a macro's events through an [`InputSynthesizer`].
//!
//! Playback runs on a dedicated worker thread. Delays are slept in short
//! cancellable chunks so stop, pause, and emergency-stop requests take
//! effect within one poll tick. Whatever ends a session, every key and
//! button the player pressed is released exactly once before the worker
//! exits. A stopped or emergency-stopped session additionally sweeps the
//! standard modifiers, in case it died between a press and the
//! bookkeeping for it; a session that runs to completion does not.
//!
//! A per-session listener watches the raw input stream for the reserved
//! stop key, so playback can be aborted from the keyboard even when no
//! hotkey registry is running.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use macrokit_core::{
    parse_key, validate_speed, Event, EventKind, Key, KeyToken, Macro, MouseButton,
    ValidationError, FALLBACK_MODIFIERS,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::STOP_KEY;
use crate::infrastructure::input_capture::{InputSource, RawInputEvent};
use crate::infrastructure::input_synthesis::InputSynthesizer;

/// How often paused or sleeping playback re-checks its control flags.
pub const POLL_TICK: Duration = Duration::from_millis(100);

/// Error type for playback operations.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Per-session playback options.
#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// Delay divisor: 2.0 halves every delay.
    pub speed: f64,
    /// Skip all recorded delays and loop delays.
    pub ignore_delays: bool,
    /// Pause after each synthesized action so the OS registers it.
    pub settle: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            ignore_delays: false,
            settle: Duration::from_millis(5),
        }
    }
}

/// Observer notified as playback progresses. Callbacks run on the worker
/// thread and must return quickly.
pub trait PlaybackObserver: Send + Sync {
    fn playback_started(&self, _name: &str) {}
    fn event_played(&self, _event: &Event) {}
    fn pass_completed(&self, _pass: u32) {}
    /// `completed` is false when the session was stopped early.
    fn playback_stopped(&self, _name: &str, _completed: bool) {}
    fn emergency_stopped(&self) {}
}

/// Control and safety state shared between the player handle, the worker,
/// and the stop-key listener.
#[derive(Default)]
struct Shared {
    playing: AtomicBool,
    paused: AtomicBool,
    stop: AtomicBool,
    emergency: AtomicBool,
    held_keys: Mutex<HashSet<Key>>,
    held_buttons: Mutex<HashSet<MouseButton>>,
}

/// The playback use case.
pub struct Player {
    synthesizer: Arc<dyn InputSynthesizer>,
    stop_source: Arc<dyn InputSource>,
    shared: Arc<Shared>,
    observers: Mutex<Vec<Arc<dyn PlaybackObserver>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Creates a player. `stop_source` feeds the per-session stop-key
    /// listener; it is started when playback starts and stopped when the
    /// session ends.
    pub fn new(synthesizer: Arc<dyn InputSynthesizer>, stop_source: Arc<dyn InputSource>) -> Self {
        Self {
            synthesizer,
            stop_source,
            shared: Arc::new(Shared::default()),
            observers: Mutex::new(Vec::new()),
            worker: Mutex::new(None),
            listener: Mutex::new(None),
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn PlaybackObserver>) {
        self.observers.lock().expect("lock poisoned").push(observer);
    }

    /// Starts playing `macro_def`. A session already in progress is
    /// stopped first.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError::Validation`] for a non-positive speed.
    pub fn play(&self, macro_def: Macro, options: PlaybackOptions) -> Result<(), PlayError> {
        validate_speed(options.speed)?;
        self.stop();

        self.shared.playing.store(true, Ordering::SeqCst);
        self.shared.paused.store(false, Ordering::SeqCst);
        self.shared.stop.store(false, Ordering::SeqCst);
        self.shared.emergency.store(false, Ordering::SeqCst);

        // Stop-key listener for this session. Failure to install the hook
        // degrades the session (no keyboard abort) but does not block it.
        match self.stop_source.start() {
            Ok(rx) => {
                let shared = Arc::clone(&self.shared);
                let handle = thread::Builder::new()
                    .name("macrokit-stopkey".to_string())
                    .spawn(move || {
                        for raw in rx {
                            if let RawInputEvent::KeyDown { key, .. } = raw {
                                if key == STOP_KEY {
                                    debug!("stop key pressed, aborting playback");
                                    shared.stop.store(true, Ordering::SeqCst);
                                }
                            }
                        }
                    });
                match handle {
                    Ok(handle) => *self.listener.lock().expect("lock poisoned") = Some(handle),
                    Err(e) => warn!(error = %e, "stop-key listener thread failed to spawn"),
                }
            }
            Err(e) => warn!(error = %e, "stop-key listener unavailable for this session"),
        }

        let shared = Arc::clone(&self.shared);
        let synthesizer = Arc::clone(&self.synthesizer);
        let stop_source = Arc::clone(&self.stop_source);
        let observers = self.observers.lock().expect("lock poisoned").clone();

        let handle = match thread::Builder::new()
            .name("macrokit-playback".to_string())
            .spawn(move || run_session(macro_def, options, shared, synthesizer, stop_source, observers))
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "playback worker failed to spawn");
                self.shared.playing.store(false, Ordering::SeqCst);
                self.stop_source.stop();
                return Ok(());
            }
        };
        *self.worker.lock().expect("lock poisoned") = Some(handle);
        Ok(())
    }

    /// Requests a stop and waits for the session to wind down, including
    /// the release-all sweep. A no-op when nothing is playing.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.lock().expect("lock poisoned").take() {
            let _ = handle.join();
        }
        self.stop_source.stop();
        if let Some(handle) = self.listener.lock().expect("lock poisoned").take() {
            let _ = handle.join();
        }
    }

    /// Stops like [`Player::stop`] but flags the session as an emergency
    /// abort, which observers are told about separately.
    pub fn emergency_stop(&self) {
        self.shared.emergency.store(true, Ordering::SeqCst);
        self.stop();
    }

    /// Freezes playback at the current position.
    pub fn pause(&self) {
        if self.is_playing() {
            self.shared.paused.store(true, Ordering::SeqCst);
        }
    }

    /// Resumes a paused session.
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
    }

    /// Flips between paused and running. A no-op when nothing is playing.
    pub fn toggle_pause(&self) {
        if self.is_playing() {
            self.shared.paused.fetch_xor(true, Ordering::SeqCst);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }
}

// ── Worker ────────────────────────────────────────────────────────────────────

fn run_session(
    macro_def: Macro,
    options: PlaybackOptions,
    shared: Arc<Shared>,
    synthesizer: Arc<dyn InputSynthesizer>,
    stop_source: Arc<dyn InputSource>,
    observers: Vec<Arc<dyn PlaybackObserver>>,
) {
    info!(name = %macro_def.name, loops = macro_def.loop_count, "playback started");
    for observer in &observers {
        observer.playback_started(&macro_def.name);
    }

    let mut completed = true;
    let mut pass = 0u32;

    'session: loop {
        pass += 1;
        for event in &macro_def.events {
            if !gate(&shared) {
                completed = false;
                break 'session;
            }
            if !options.ignore_delays
                && !interruptible_wait(scale(event.delay_before, options.speed), &shared)
            {
                completed = false;
                break 'session;
            }
            if matches!(event.kind, EventKind::Delay) {
                continue;
            }
            perform(event, synthesizer.as_ref(), &shared);
            for observer in &observers {
                observer.event_played(event);
            }
            if !options.settle.is_zero() && !interruptible_wait(options.settle, &shared) {
                completed = false;
                break 'session;
            }
        }
        for observer in &observers {
            observer.pass_completed(pass);
        }

        if macro_def.loop_count != 0 && pass >= macro_def.loop_count {
            break;
        }
        if !options.ignore_delays
            && !interruptible_wait(scale(macro_def.loop_delay, options.speed), &shared)
        {
            completed = false;
            break;
        }
    }

    let interrupted =
        shared.stop.load(Ordering::SeqCst) || shared.emergency.load(Ordering::SeqCst);
    release_all(synthesizer.as_ref(), &shared, interrupted);
    shared.playing.store(false, Ordering::SeqCst);
    shared.paused.store(false, Ordering::SeqCst);
    stop_source.stop();

    if shared.emergency.load(Ordering::SeqCst) {
        for observer in &observers {
            observer.emergency_stopped();
        }
    }
    for observer in &observers {
        observer.playback_stopped(&macro_def.name, completed);
    }
    info!(name = %macro_def.name, completed, "playback stopped");
}

/// Blocks while paused; returns false when a stop was requested.
fn gate(shared: &Shared) -> bool {
    loop {
        if shared.stop.load(Ordering::SeqCst) {
            return false;
        }
        if !shared.paused.load(Ordering::SeqCst) {
            return true;
        }
        thread::sleep(POLL_TICK);
    }
}

/// Sleeps `total` in poll-tick chunks, not counting time spent paused.
/// Returns false when a stop was requested.
fn interruptible_wait(total: Duration, shared: &Shared) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if shared.stop.load(Ordering::SeqCst) {
            return false;
        }
        if shared.paused.load(Ordering::SeqCst) {
            thread::sleep(POLL_TICK);
            continue;
        }
        let chunk = remaining.min(POLL_TICK);
        thread::sleep(chunk);
        remaining -= chunk;
    }
    !shared.stop.load(Ordering::SeqCst)
}

fn scale(d: Duration, speed: f64) -> Duration {
    Duration::from_secs_f64(d.as_secs_f64() / speed)
}

/// Executes one event. Synthesis failures and unresolvable key tokens skip
/// the action with a warning; the timeline continues.
fn perform(event: &Event, synthesizer: &dyn InputSynthesizer, shared: &Shared) {
    match event.kind {
        EventKind::KeyPress | EventKind::KeyRelease => {
            let Some(raw) = event.key.as_deref() else {
                warn!(kind = ?event.kind, "key event without a key token, skipping");
                return;
            };
            let key = match parse_key(raw) {
                KeyToken::Resolved(key) => key,
                KeyToken::Unresolved(raw) => {
                    warn!(token = %raw, "unresolvable key token, skipping action");
                    return;
                }
            };
            if event.kind == EventKind::KeyPress {
                match synthesizer.press_key(key) {
                    Ok(()) => {
                        shared.held_keys.lock().expect("lock poisoned").insert(key);
                    }
                    Err(e) => warn!(?key, error = %e, "key press failed"),
                }
            } else {
                shared.held_keys.lock().expect("lock poisoned").remove(&key);
                if let Err(e) = synthesizer.release_key(key) {
                    warn!(?key, error = %e, "key release failed");
                }
            }
        }
        EventKind::MouseClick | EventKind::MouseRelease => {
            let Some(button) = event.button else {
                warn!(kind = ?event.kind, "button event without a button, skipping");
                return;
            };
            if event.kind == EventKind::MouseClick {
                match synthesizer.press_button(button) {
                    Ok(()) => {
                        shared
                            .held_buttons
                            .lock()
                            .expect("lock poisoned")
                            .insert(button);
                    }
                    Err(e) => warn!(?button, error = %e, "button press failed"),
                }
            } else {
                shared
                    .held_buttons
                    .lock()
                    .expect("lock poisoned")
                    .remove(&button);
                if let Err(e) = synthesizer.release_button(button) {
                    warn!(?button, error = %e, "button release failed");
                }
            }
        }
        EventKind::MouseScroll => {
            let dx = event.scroll_dx.unwrap_or(0);
            let dy = event.scroll_dy.unwrap_or(0);
            if let Err(e) = synthesizer.scroll(dx, dy) {
                warn!(dx, dy, error = %e, "scroll failed");
            }
        }
        // Legacy marker from old documents; nothing to synthesize
        EventKind::MouseMove => {}
        EventKind::Delay => {}
    }
}

/// Releases everything the session pressed, exactly once per key. With
/// `sweep_modifiers` set, also releases the standard modifiers that were
/// not already released; that covers an interrupted session dying between
/// a press and the bookkeeping for it.
fn release_all(synthesizer: &dyn InputSynthesizer, shared: &Shared, sweep_modifiers: bool) {
    let held_keys: Vec<Key> = shared
        .held_keys
        .lock()
        .expect("lock poisoned")
        .drain()
        .collect();
    for key in &held_keys {
        if let Err(e) = synthesizer.release_key(*key) {
            debug!(?key, error = %e, "release-all key release failed");
        }
    }

    let held_buttons: Vec<MouseButton> = shared
        .held_buttons
        .lock()
        .expect("lock poisoned")
        .drain()
        .collect();
    for button in held_buttons {
        if let Err(e) = synthesizer.release_button(button) {
            debug!(?button, error = %e, "release-all button release failed");
        }
    }

    if !sweep_modifiers {
        return;
    }
    for modifier in FALLBACK_MODIFIERS {
        if held_keys.contains(&modifier) {
            continue;
        }
        if let Err(e) = synthesizer.release_key(modifier) {
            debug!(?modifier, error = %e, "release-all modifier sweep failed");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
