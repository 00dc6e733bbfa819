//! Input event entity.
//!
//! An [`Event`] is one step of a macro: a key or mouse action, or an explicit
//! [`EventKind::Delay`] representing idle time between two actions. After
//! normalization by the recorder, a non-`Delay` event always carries a zero
//! `delay_before`; spacing lives only in the injected `Delay` events.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The closed set of event kinds a macro may contain.
///
/// `MouseMove` is accepted when loading user-edited or legacy documents but
/// is never produced by the recorder and performs no action on playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    KeyPress,
    KeyRelease,
    MouseClick,
    MouseRelease,
    MouseMove,
    MouseScroll,
    Delay,
}

/// Mouse button identifier recorded with click/release events.
///
/// Coordinates are deliberately not part of the schema: replay always acts
/// at the current cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A single macro event.
///
/// Exactly one payload group is populated per kind:
///
/// | kind                      | payload                  |
/// |---------------------------|--------------------------|
/// | `KeyPress` / `KeyRelease` | `key`                    |
/// | `MouseClick` / `MouseRelease` | `button`             |
/// | `MouseScroll`             | `scroll_dx`, `scroll_dy` |
/// | `Delay`                   | `delay_before` only      |
///
/// Use the constructors rather than building the struct by hand; they keep
/// the payload invariant intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Idle time carried by this event. Zero for every non-`Delay` event
    /// after normalization.
    #[serde(
        rename = "delay_ms",
        default,
        with = "duration_ms",
        skip_serializing_if = "Duration::is_zero"
    )]
    pub delay_before: Duration,
    /// Canonical key identifier string (see `keymap`), for key events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Button identity, for mouse click/release events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
    /// Horizontal scroll delta, for scroll events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_dx: Option<i32>,
    /// Vertical scroll delta, for scroll events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_dy: Option<i32>,
}

impl Event {
    /// Creates a key-press event for the given canonical key string.
    pub fn key_press(key: impl Into<String>) -> Self {
        Self {
            kind: EventKind::KeyPress,
            delay_before: Duration::ZERO,
            key: Some(key.into()),
            button: None,
            scroll_dx: None,
            scroll_dy: None,
        }
    }

    /// Creates a key-release event for the given canonical key string.
    pub fn key_release(key: impl Into<String>) -> Self {
        Self {
            kind: EventKind::KeyRelease,
            key: Some(key.into()),
            ..Self::delay(Duration::ZERO)
        }
    }

    /// Creates a mouse button press event.
    pub fn mouse_click(button: MouseButton) -> Self {
        Self {
            kind: EventKind::MouseClick,
            button: Some(button),
            ..Self::delay(Duration::ZERO)
        }
    }

    /// Creates a mouse button release event.
    pub fn mouse_release(button: MouseButton) -> Self {
        Self {
            kind: EventKind::MouseRelease,
            button: Some(button),
            ..Self::delay(Duration::ZERO)
        }
    }

    /// Creates a payload-free motion marker. Plays back as a no-op.
    pub fn mouse_move() -> Self {
        Self {
            kind: EventKind::MouseMove,
            ..Self::delay(Duration::ZERO)
        }
    }

    /// Creates a scroll event carrying the recorded wheel deltas.
    pub fn mouse_scroll(dx: i32, dy: i32) -> Self {
        Self {
            kind: EventKind::MouseScroll,
            scroll_dx: Some(dx),
            scroll_dy: Some(dy),
            ..Self::delay(Duration::ZERO)
        }
    }

    /// Creates an explicit delay event representing `gap` of idle time.
    pub fn delay(gap: Duration) -> Self {
        Self {
            kind: EventKind::Delay,
            delay_before: gap,
            key: None,
            button: None,
            scroll_dx: None,
            scroll_dy: None,
        }
    }

    /// Returns `true` for the synthetic `Delay` kind.
    pub fn is_delay(&self) -> bool {
        self.kind == EventKind::Delay
    }
}

/// Serde adapter: `Duration` as integer milliseconds on the wire.
pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_populates_only_key_payload() {
        // Arrange / Act
        let event = Event::key_press("a");

        // Assert
        assert_eq!(event.kind, EventKind::KeyPress);
        assert_eq!(event.key.as_deref(), Some("a"));
        assert_eq!(event.delay_before, Duration::ZERO);
        assert!(event.button.is_none());
        assert!(event.scroll_dx.is_none());
        assert!(event.scroll_dy.is_none());
    }

    #[test]
    fn test_mouse_scroll_populates_both_deltas() {
        let event = Event::mouse_scroll(-1, 3);
        assert_eq!(event.kind, EventKind::MouseScroll);
        assert_eq!(event.scroll_dx, Some(-1));
        assert_eq!(event.scroll_dy, Some(3));
        assert!(event.key.is_none());
    }

    #[test]
    fn test_delay_event_carries_only_duration() {
        let event = Event::delay(Duration::from_millis(80));
        assert!(event.is_delay());
        assert_eq!(event.delay_before, Duration::from_millis(80));
        assert!(event.key.is_none());
        assert!(event.button.is_none());
    }

    #[test]
    fn test_event_serializes_duration_as_milliseconds() {
        // Arrange
        let event = Event::delay(Duration::from_millis(125));

        // Act
        let json = serde_json::to_value(&event).unwrap();

        // Assert
        assert_eq!(json["delay_ms"], 125);
        assert_eq!(json["kind"], "delay");
    }

    #[test]
    fn test_event_omits_absent_optional_fields_from_json() {
        let json = serde_json::to_string(&Event::key_press("f5")).unwrap();
        assert!(!json.contains("button"));
        assert!(!json.contains("scroll_dx"));
        assert!(!json.contains("delay_ms"), "zero delay must be omitted");
    }

    #[test]
    fn test_event_deserializes_with_missing_optionals() {
        // Arrange – a hand-edited document with only the required field
        let json = r#"{"kind": "mouse_click", "button": "left"}"#;

        // Act
        let event: Event = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(event.kind, EventKind::MouseClick);
        assert_eq!(event.button, Some(MouseButton::Left));
        assert_eq!(event.delay_before, Duration::ZERO);
    }

    #[test]
    fn test_legacy_mouse_move_kind_still_deserializes() {
        let json = r#"{"kind": "mouse_move"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, EventKind::MouseMove);
    }
}
