//! Mock input source for unit testing.
//!
//! Allows tests to inject synthetic [`RawInputEvent`]s without a running
//! message loop or OS hooks. Timestamps are supplied by the test, so gap
//! normalization can be exercised without real sleeps.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::time::{Duration, Instant};

use macrokit_core::{Key, MouseButton};

use super::{CaptureError, InputSource, RawInputEvent};

/// A mock implementation of [`InputSource`] that tests feed by hand.
#[derive(Clone)]
pub struct MockInputSource {
    sender: Arc<Mutex<Option<Sender<RawInputEvent>>>>,
    /// Base instant for the `*_after` helpers.
    epoch: Instant,
}

impl MockInputSource {
    /// Creates a new mock input source.
    pub fn new() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            epoch: Instant::now(),
        }
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called or the session was stopped.
    pub fn inject(&self, event: RawInputEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        match &*guard {
            Some(sender) => sender
                .send(event)
                .expect("receiver dropped; did the drain thread exit?"),
            None => panic!("MockInputSource::inject called before start()"),
        }
    }

    /// Returns `true` while a started session's channel is open.
    pub fn is_started(&self) -> bool {
        self.sender.lock().expect("lock poisoned").is_some()
    }

    /// Timestamp helper: the mock's epoch plus `offset_ms`.
    pub fn at_ms(&self, offset_ms: u64) -> Instant {
        self.epoch + Duration::from_millis(offset_ms)
    }

    // ── Convenience injectors with scripted timestamps ────────────────────────

    pub fn key_down(&self, key: Key, offset_ms: u64) {
        self.inject(RawInputEvent::KeyDown { key, at: self.at_ms(offset_ms) });
    }

    pub fn key_up(&self, key: Key, offset_ms: u64) {
        self.inject(RawInputEvent::KeyUp { key, at: self.at_ms(offset_ms) });
    }

    pub fn button_down(&self, button: MouseButton, offset_ms: u64) {
        self.inject(RawInputEvent::MouseButtonDown { button, at: self.at_ms(offset_ms) });
    }

    pub fn button_up(&self, button: MouseButton, offset_ms: u64) {
        self.inject(RawInputEvent::MouseButtonUp { button, at: self.at_ms(offset_ms) });
    }

    pub fn wheel(&self, dx: i32, dy: i32, offset_ms: u64) {
        self.inject(RawInputEvent::MouseWheel { dx, dy, at: self.at_ms(offset_ms) });
    }

    pub fn motion(&self, offset_ms: u64) {
        self.inject(RawInputEvent::MouseMove { at: self.at_ms(offset_ms) });
    }
}

impl Default for MockInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let mut guard = self.sender.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::channel();
        *guard = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

/// An input source whose `start` always fails, for capability-error tests.
pub struct FailingInputSource;

impl InputSource for FailingInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        Err(CaptureError::KeyboardHookInstallFailed(
            "permission denied".to_string(),
        ))
    }

    fn stop(&self) {}
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_delivers_injected_events_in_order() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.key_down(Key::Char('a'), 0);
        source.key_up(Key::Char('a'), 40);

        // Assert
        assert!(matches!(rx.recv().unwrap(), RawInputEvent::KeyDown { key: Key::Char('a'), .. }));
        assert!(matches!(rx.recv().unwrap(), RawInputEvent::KeyUp { key: Key::Char('a'), .. }));
    }

    #[test]
    fn test_stop_closes_the_channel() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.stop();

        // Assert – channel disconnected
        assert!(rx.recv().is_err());
        assert!(!source.is_started());
    }

    #[test]
    fn test_second_start_without_stop_is_rejected() {
        let source = MockInputSource::new();
        let _rx = source.start().expect("first start succeeds");
        assert!(matches!(source.start(), Err(CaptureError::AlreadyStarted)));
    }

    #[test]
    fn test_start_after_stop_opens_a_fresh_session() {
        let source = MockInputSource::new();
        let _rx = source.start().unwrap();
        source.stop();

        let rx = source.start().expect("restart should succeed");
        source.wheel(0, 1, 5);
        assert!(matches!(rx.recv().unwrap(), RawInputEvent::MouseWheel { dy: 1, .. }));
    }

    #[test]
    fn test_scripted_timestamps_are_monotonic_offsets() {
        let source = MockInputSource::new();
        assert_eq!(
            source.at_ms(120).duration_since(source.at_ms(0)),
            Duration::from_millis(120)
        );
    }
}
