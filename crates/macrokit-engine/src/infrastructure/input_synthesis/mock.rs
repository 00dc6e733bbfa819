//! Recording mock synthesizer for unit testing.
//!
//! Records every injected action in order so tests can assert on the exact
//! sequence the player produced, including the releases issued by the
//! release-all safety sweep.

use std::sync::{Arc, Mutex};

use macrokit_core::{Key, MouseButton};

use super::{InputSynthesizer, SynthesisError};

/// One action the player asked the platform to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesizedAction {
    KeyPress(Key),
    KeyRelease(Key),
    ButtonPress(MouseButton),
    ButtonRelease(MouseButton),
    Scroll { dx: i32, dy: i32 },
}

/// A mock [`InputSynthesizer`] that records calls instead of injecting input.
#[derive(Default, Clone)]
pub struct RecordingSynthesizer {
    actions: Arc<Mutex<Vec<SynthesizedAction>>>,
    fail_all: bool,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A synthesizer whose every call fails, for error-path tests.
    pub fn failing() -> Self {
        Self {
            actions: Arc::new(Mutex::new(Vec::new())),
            fail_all: true,
        }
    }

    /// Snapshot of all recorded actions in injection order.
    pub fn actions(&self) -> Vec<SynthesizedAction> {
        self.actions.lock().expect("lock poisoned").clone()
    }

    /// Number of times `action` was recorded.
    pub fn count_of(&self, action: &SynthesizedAction) -> usize {
        self.actions
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|a| *a == action)
            .count()
    }

    fn record(&self, action: SynthesizedAction) -> Result<(), SynthesisError> {
        if self.fail_all {
            return Err(SynthesisError::Platform("injected failure".to_string()));
        }
        self.actions.lock().expect("lock poisoned").push(action);
        Ok(())
    }
}

impl InputSynthesizer for RecordingSynthesizer {
    fn press_key(&self, key: Key) -> Result<(), SynthesisError> {
        self.record(SynthesizedAction::KeyPress(key))
    }

    fn release_key(&self, key: Key) -> Result<(), SynthesisError> {
        self.record(SynthesizedAction::KeyRelease(key))
    }

    fn press_button(&self, button: MouseButton) -> Result<(), SynthesisError> {
        self.record(SynthesizedAction::ButtonPress(button))
    }

    fn release_button(&self, button: MouseButton) -> Result<(), SynthesisError> {
        self.record(SynthesizedAction::ButtonRelease(button))
    }

    fn scroll(&self, dx: i32, dy: i32) -> Result<(), SynthesisError> {
        self.record(SynthesizedAction::Scroll { dx, dy })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_synthesizer_keeps_injection_order() {
        // Arrange
        let synth = RecordingSynthesizer::new();

        // Act
        synth.press_key(Key::Char('a')).unwrap();
        synth.scroll(0, -2).unwrap();
        synth.release_key(Key::Char('a')).unwrap();

        // Assert
        assert_eq!(
            synth.actions(),
            vec![
                SynthesizedAction::KeyPress(Key::Char('a')),
                SynthesizedAction::Scroll { dx: 0, dy: -2 },
                SynthesizedAction::KeyRelease(Key::Char('a')),
            ]
        );
    }

    #[test]
    fn test_count_of_counts_exact_matches_only() {
        let synth = RecordingSynthesizer::new();
        synth.press_button(MouseButton::Left).unwrap();
        synth.press_button(MouseButton::Left).unwrap();
        synth.press_button(MouseButton::Right).unwrap();

        assert_eq!(synth.count_of(&SynthesizedAction::ButtonPress(MouseButton::Left)), 2);
        assert_eq!(synth.count_of(&SynthesizedAction::ButtonRelease(MouseButton::Left)), 0);
    }

    #[test]
    fn test_failing_synthesizer_rejects_every_call() {
        let synth = RecordingSynthesizer::failing();
        assert!(synth.press_key(Key::Enter).is_err());
        assert!(synth.scroll(1, 0).is_err());
        assert!(synth.actions().is_empty());
    }
}
