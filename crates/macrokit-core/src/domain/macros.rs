//! Macro entity: a named, ordered sequence of input events plus loop and
//! trigger metadata.
//!
//! A `Macro` is a value owned by whichever component currently holds it
//! (recorder during capture, player during playback, the store between
//! uses). It is never shared across a recording and a playback session.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::event::Event;

/// Errors for malformed numeric configuration, rejected before any macro
/// state is mutated.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Loop counts are 0 (infinite) through `u32::MAX`.
    #[error("loop count must be between 0 and {max}, got {0}", max = u32::MAX)]
    LoopCountOutOfRange(i64),

    /// Speed multipliers must be finite and strictly positive.
    #[error("speed multiplier must be > 0, got {0}")]
    NonPositiveSpeed(f64),

    /// Macro names identify files in the store and cannot be empty.
    #[error("macro name cannot be empty")]
    EmptyName,
}

/// Validates a playback speed multiplier.
///
/// Values below 1.0 slow playback down, values above speed it up.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositiveSpeed`] for zero, negative, NaN, or
/// infinite values.
pub fn validate_speed(speed: f64) -> Result<f64, ValidationError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(ValidationError::NonPositiveSpeed(speed))
    }
}

/// A named, replayable sequence of input events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macro {
    /// Unique name within a store; also the basis of the on-disk filename.
    pub name: String,
    /// Ordered event sequence.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Number of playback passes. 0 means repeat until stopped.
    #[serde(default = "default_loop_count")]
    pub loop_count: u32,
    /// Pause between passes, scaled by the speed multiplier on playback.
    #[serde(
        rename = "loop_delay_ms",
        default,
        with = "super::event::duration_ms"
    )]
    pub loop_delay: Duration,
    /// Hotkey combo that triggers playback, if any (normalized form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_key: Option<String>,
    /// Case-insensitive substring the foreground window title must contain
    /// for the trigger to fire. Empty means the trigger is global.
    #[serde(default)]
    pub target_window_filter: String,
    /// Creation time as epoch milliseconds; 0 when unknown.
    #[serde(default)]
    pub created_at: u64,
}

fn default_loop_count() -> u32 {
    1
}

impl Macro {
    /// Creates an empty macro with default loop settings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name,
            events: Vec::new(),
            loop_count: default_loop_count(),
            loop_delay: Duration::ZERO,
            trigger_key: None,
            target_window_filter: String::new(),
            created_at: 0,
        })
    }

    /// Total playback duration at 1.0× speed: the sum of every event's
    /// `delay_before`. Derived, never stored.
    pub fn total_duration(&self) -> Duration {
        self.events.iter().map(|e| e.delay_before).sum()
    }

    /// Number of events, including synthetic delays.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Sets the loop count from user input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LoopCountOutOfRange`] when `count` is
    /// negative or does not fit the stored `u32`.
    pub fn set_loop_count(&mut self, count: i64) -> Result<(), ValidationError> {
        self.loop_count =
            u32::try_from(count).map_err(|_| ValidationError::LoopCountOutOfRange(count))?;
        Ok(())
    }

    // ── Edit operations (array splice semantics) ──────────────────────────────
    //
    // Indices coming from a UI may be stale after a resize, so every
    // operation revalidates them by clamping instead of panicking.

    /// Appends an event at the end of the sequence.
    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Inserts an event at `index`, clamped to the current length.
    pub fn insert_event(&mut self, index: usize, event: Event) {
        let index = index.min(self.events.len());
        self.events.insert(index, event);
    }

    /// Removes and returns the event at `index`, or `None` if out of range.
    pub fn remove_event(&mut self, index: usize) -> Option<Event> {
        if index < self.events.len() {
            Some(self.events.remove(index))
        } else {
            None
        }
    }

    /// Moves the event at `from` to position `to` (both clamped).
    ///
    /// No-op when the sequence is empty or the positions coincide after
    /// clamping.
    pub fn move_event(&mut self, from: usize, to: usize) {
        if self.events.is_empty() {
            return;
        }
        let last = self.events.len() - 1;
        let from = from.min(last);
        let to = to.min(last);
        if from == to {
            return;
        }
        let event = self.events.remove(from);
        self.events.insert(to, event);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::MouseButton;

    fn sample_macro() -> Macro {
        let mut m = Macro::new("sample").unwrap();
        m.push_event(Event::key_press("a"));
        m.push_event(Event::delay(Duration::from_millis(80)));
        m.push_event(Event::key_release("a"));
        m
    }

    #[test]
    fn test_new_rejects_empty_name() {
        let result = Macro::new("");
        assert_eq!(result.unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn test_total_duration_is_sum_of_delay_before_fields() {
        // Arrange
        let mut m = sample_macro();
        m.push_event(Event::delay(Duration::from_millis(20)));

        // Act / Assert
        assert_eq!(m.total_duration(), Duration::from_millis(100));
    }

    #[test]
    fn test_set_loop_count_rejects_out_of_range_values() {
        let mut m = sample_macro();

        let negative = m.set_loop_count(-3);
        assert_eq!(
            negative.unwrap_err(),
            ValidationError::LoopCountOutOfRange(-3)
        );

        let too_large = m.set_loop_count(i64::from(u32::MAX) + 1);
        assert_eq!(
            too_large.unwrap_err(),
            ValidationError::LoopCountOutOfRange(i64::from(u32::MAX) + 1)
        );

        // State untouched either way
        assert_eq!(m.loop_count, 1);
    }

    #[test]
    fn test_set_loop_count_accepts_zero_as_infinite() {
        let mut m = sample_macro();
        m.set_loop_count(0).unwrap();
        assert_eq!(m.loop_count, 0);
    }

    #[test]
    fn test_validate_speed_rejects_zero_negative_and_nan() {
        assert!(validate_speed(0.0).is_err());
        assert!(validate_speed(-1.5).is_err());
        assert!(validate_speed(f64::NAN).is_err());
        assert!(validate_speed(f64::INFINITY).is_err());
        assert_eq!(validate_speed(2.0), Ok(2.0));
        assert_eq!(validate_speed(0.25), Ok(0.25));
    }

    #[test]
    fn test_insert_event_clamps_out_of_range_index() {
        // Arrange
        let mut m = sample_macro();

        // Act – index far past the end lands at the end
        m.insert_event(99, Event::mouse_click(MouseButton::Left));

        // Assert
        assert_eq!(m.event_count(), 4);
        assert_eq!(m.events[3].button, Some(MouseButton::Left));
    }

    #[test]
    fn test_remove_event_out_of_range_returns_none() {
        let mut m = sample_macro();
        assert!(m.remove_event(99).is_none());
        assert_eq!(m.event_count(), 3);
    }

    #[test]
    fn test_move_event_reorders_and_clamps() {
        // Arrange
        let mut m = sample_macro();

        // Act – move first event to (clamped) end
        m.move_event(0, 99);

        // Assert
        assert_eq!(m.events[2].key.as_deref(), Some("a"));
        assert_eq!(m.events[2].kind, crate::EventKind::KeyPress);
    }

    #[test]
    fn test_move_event_on_empty_macro_is_noop() {
        let mut m = Macro::new("empty").unwrap();
        m.move_event(0, 5);
        assert_eq!(m.event_count(), 0);
    }
}
