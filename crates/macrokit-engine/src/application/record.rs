//! Recorder: turns raw input notifications into normalized macro events.
//!
//! A recording session drains the capture channel on a dedicated thread.
//! Normalization happens inline as events arrive: idle gaps longer than
//! [`GAP_THRESHOLD`] become explicit `Delay` events, OS key auto-repeat is
//! collapsed via a held-key set, and the reserved stop key ends the
//! session without being recorded.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use macrokit_core::{Event, Key, Macro, MouseButton, ValidationError};
use thiserror::Error;
use tracing::{debug, info};

use super::STOP_KEY;
use crate::infrastructure::input_capture::{CaptureError, InputSource, RawInputEvent};

/// Idle gaps strictly longer than this become explicit `Delay` events;
/// shorter gaps are absorbed.
pub const GAP_THRESHOLD: Duration = Duration::from_millis(50);

/// Error type for recording operations.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("a recording session is already active")]
    AlreadyRecording,
    #[error("no recording session exists")]
    NotRecording,
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Which notification classes a session captures. Motion capture is off by
/// default: motion events carry no payload and exist only for documents
/// that already contain them.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub capture_keyboard: bool,
    pub capture_mouse_clicks: bool,
    pub capture_mouse_scroll: bool,
    pub capture_mouse_motion: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            capture_keyboard: true,
            capture_mouse_clicks: true,
            capture_mouse_scroll: true,
            capture_mouse_motion: false,
        }
    }
}

/// Observer notified as a session progresses. Callbacks run on the drain
/// thread and must return quickly.
pub trait RecorderObserver: Send + Sync {
    fn event_recorded(&self, _event: &Event) {}
    fn recording_stopped(&self, _event_count: usize) {}
}

#[derive(Default)]
struct Session {
    events: Vec<Event>,
    recording: bool,
}

/// The recording use case.
pub struct Recorder {
    source: Arc<dyn InputSource>,
    config: RecorderConfig,
    session: Arc<Mutex<Session>>,
    observers: Mutex<Vec<Arc<dyn RecorderObserver>>>,
    drain: Mutex<Option<JoinHandle<()>>>,
}

impl Recorder {
    pub fn new(source: Arc<dyn InputSource>, config: RecorderConfig) -> Self {
        Self {
            source,
            config,
            session: Arc::new(Mutex::new(Session::default())),
            observers: Mutex::new(Vec::new()),
            drain: Mutex::new(None),
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn RecorderObserver>) {
        self.observers.lock().expect("lock poisoned").push(observer);
    }

    /// Starts a fresh recording session.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::AlreadyRecording`] if a session is active and
    /// [`RecordError::Capture`] if the input hooks cannot be installed.
    pub fn start(&self) -> Result<(), RecordError> {
        self.start_with(Vec::new())
    }

    /// Starts a session seeded with an existing macro's events; new input
    /// is appended after them.
    ///
    /// # Errors
    ///
    /// Same as [`Recorder::start`].
    pub fn start_append(&self, seed: Vec<Event>) -> Result<(), RecordError> {
        self.start_with(seed)
    }

    fn start_with(&self, seed: Vec<Event>) -> Result<(), RecordError> {
        {
            let session = self.session.lock().expect("lock poisoned");
            if session.recording {
                return Err(RecordError::AlreadyRecording);
            }
        }

        let rx = self.source.start()?;

        {
            let mut session = self.session.lock().expect("lock poisoned");
            session.events = seed;
            session.recording = true;
        }

        let session = Arc::clone(&self.session);
        let source = Arc::clone(&self.source);
        let config = self.config.clone();
        let observers = self.observers.lock().expect("lock poisoned").clone();

        let handle = match thread::Builder::new()
            .name("macrokit-record-drain".to_string())
            .spawn(move || drain_loop(rx, session, source, config, observers))
        {
            Ok(handle) => handle,
            Err(e) => {
                self.source.stop();
                self.session.lock().expect("lock poisoned").recording = false;
                return Err(CaptureError::KeyboardHookInstallFailed(e.to_string()).into());
            }
        };
        *self.drain.lock().expect("lock poisoned") = Some(handle);

        info!("recording started");
        Ok(())
    }

    /// Ends the session and returns the normalized events. Safe to call
    /// after the stop key already ended the session; the captured events
    /// are still returned.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotRecording`] when no session was ever
    /// started.
    pub fn stop(&self) -> Result<Vec<Event>, RecordError> {
        let handle = self.drain.lock().expect("lock poisoned").take();
        let handle = handle.ok_or(RecordError::NotRecording)?;

        self.source.stop();
        let _ = handle.join();

        let mut session = self.session.lock().expect("lock poisoned");
        session.recording = false;
        Ok(std::mem::take(&mut session.events))
    }

    /// Whether a session is currently capturing.
    pub fn is_recording(&self) -> bool {
        self.session.lock().expect("lock poisoned").recording
    }

    /// Events captured so far, without ending the session.
    pub fn events_snapshot(&self) -> Vec<Event> {
        self.session.lock().expect("lock poisoned").events.clone()
    }

    /// Ends the session and wraps the captured events in a named macro.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Validation`] for an empty name, plus the
    /// errors of [`Recorder::stop`].
    pub fn create_macro(&self, name: &str) -> Result<Macro, RecordError> {
        let events = self.stop()?;
        let mut macro_def = Macro::new(name)?;
        macro_def.events = events;
        Ok(macro_def)
    }
}

// ── Drain loop ────────────────────────────────────────────────────────────────

fn drain_loop(
    rx: std::sync::mpsc::Receiver<RawInputEvent>,
    session: Arc<Mutex<Session>>,
    source: Arc<dyn InputSource>,
    config: RecorderConfig,
    observers: Vec<Arc<dyn RecorderObserver>>,
) {
    let mut held_keys: HashSet<Key> = HashSet::new();
    let mut held_buttons: HashSet<MouseButton> = HashSet::new();
    let mut last_at: Option<Instant> = None;

    for raw in rx {
        // The stop key is consumed, never recorded
        match &raw {
            RawInputEvent::KeyDown { key, .. } if *key == STOP_KEY => {
                debug!("stop key pressed, ending recording session");
                source.stop();
                break;
            }
            RawInputEvent::KeyUp { key, .. } if *key == STOP_KEY => continue,
            _ => {}
        }

        let at = raw.at();
        let event = match raw {
            RawInputEvent::KeyDown { key, .. } => {
                if !config.capture_keyboard {
                    continue;
                }
                // OS auto-repeat sends KeyDown again while held
                if !held_keys.insert(key) {
                    continue;
                }
                Event::key_press(key.name())
            }
            RawInputEvent::KeyUp { key, .. } => {
                if !config.capture_keyboard {
                    continue;
                }
                held_keys.remove(&key);
                Event::key_release(key.name())
            }
            RawInputEvent::MouseButtonDown { button, .. } => {
                if !config.capture_mouse_clicks {
                    continue;
                }
                // A repeated down for a held button carries no new action
                if !held_buttons.insert(button) {
                    continue;
                }
                Event::mouse_click(button)
            }
            RawInputEvent::MouseButtonUp { button, .. } => {
                if !config.capture_mouse_clicks {
                    continue;
                }
                held_buttons.remove(&button);
                Event::mouse_release(button)
            }
            RawInputEvent::MouseWheel { dx, dy, .. } => {
                if !config.capture_mouse_scroll {
                    continue;
                }
                Event::mouse_scroll(dx, dy)
            }
            RawInputEvent::MouseMove { .. } => {
                if !config.capture_mouse_motion {
                    continue;
                }
                Event::mouse_move()
            }
        };

        let mut session = session.lock().expect("lock poisoned");
        if let Some(prev) = last_at {
            let gap = at.saturating_duration_since(prev);
            if gap > GAP_THRESHOLD {
                let delay = Event::delay(gap);
                for observer in &observers {
                    observer.event_recorded(&delay);
                }
                session.events.push(delay);
            }
        }
        last_at = Some(at);

        for observer in &observers {
            observer.event_recorded(&event);
        }
        session.events.push(event);
    }

    let count = {
        let mut session = session.lock().expect("lock poisoned");
        session.recording = false;
        session.events.len()
    };
    for observer in &observers {
        observer.recording_stopped(count);
    }
    info!(events = count, "recording stopped");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
