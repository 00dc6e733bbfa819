//! Integration tests for the macro document format.
//!
//! Exercises the public API of macrokit-core the way the engine and any
//! external tooling consume it: build a macro, serialize, reload, compare.

use std::time::Duration;

use macrokit_core::{
    macro_from_document, macro_to_document, Event, EventKind, Macro, MouseButton,
};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_full_macro_survives_a_document_round_trip() {
    let mut m = Macro::new("round trip").unwrap();
    m.push_event(Event::key_press("a"));
    m.push_event(Event::key_release("a"));
    m.push_event(Event::delay(Duration::from_millis(80)));
    m.push_event(Event::key_press("b"));
    m.push_event(Event::key_release("b"));
    m.push_event(Event::mouse_click(MouseButton::Middle));
    m.push_event(Event::mouse_release(MouseButton::Middle));
    m.push_event(Event::mouse_scroll(1, -4));
    m.loop_count = 3;
    m.loop_delay = Duration::from_millis(50);

    let restored = macro_from_document(&macro_to_document(&m).unwrap()).unwrap();

    assert_eq!(restored, m);
    assert_eq!(restored.total_duration(), Duration::from_millis(80));
}

#[test]
fn test_infinite_loop_count_round_trips_as_zero() {
    let mut m = Macro::new("forever").unwrap();
    m.set_loop_count(0).unwrap();

    let restored = macro_from_document(&macro_to_document(&m).unwrap()).unwrap();

    assert_eq!(restored.loop_count, 0);
}

#[test]
fn test_unset_optional_fields_round_trip_as_absent() {
    let m = Macro::new("plain").unwrap();

    let doc = macro_to_document(&m).unwrap();

    // The trigger key must not appear at all when unset, so hand edits and
    // older builds agree on the document shape.
    assert!(!doc.contains("trigger_key"));
    let restored = macro_from_document(&doc).unwrap();
    assert_eq!(restored.trigger_key, None);
    assert_eq!(restored, m);
}

#[test]
fn test_hand_written_document_loads() {
    // The field spellings users see in the files: snake_case kinds,
    // millisecond durations.
    let doc = r#"
    {
        "name": "hand written",
        "events": [
            {"kind": "key_press", "key": "x"},
            {"kind": "delay", "delay_ms": 120},
            {"kind": "key_release", "key": "x"},
            {"kind": "mouse_scroll", "scroll_dx": 0, "scroll_dy": 2}
        ],
        "loop_count": 2,
        "loop_delay_ms": 250,
        "target_window_filter": "editor"
    }
    "#;

    let m = macro_from_document(doc).unwrap();

    assert_eq!(m.event_count(), 4);
    assert_eq!(m.events[1].kind, EventKind::Delay);
    assert_eq!(m.events[1].delay_before, Duration::from_millis(120));
    assert_eq!(m.loop_count, 2);
    assert_eq!(m.loop_delay, Duration::from_millis(250));
    assert_eq!(m.target_window_filter, "editor");
}

#[test]
fn test_total_duration_matches_sum_of_delays_for_any_sequence() {
    let mut m = Macro::new("sum check").unwrap();
    for ms in [10u64, 0, 250, 33, 0, 1000] {
        if ms > 0 {
            m.push_event(Event::delay(Duration::from_millis(ms)));
        }
        m.push_event(Event::key_press("k"));
        m.push_event(Event::key_release("k"));
    }

    let expected: Duration = m.events.iter().map(|e| e.delay_before).sum();

    assert_eq!(m.total_duration(), expected);
    assert_eq!(m.total_duration(), Duration::from_millis(1293));
}
