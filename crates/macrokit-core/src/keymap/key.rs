//! The canonical key set used throughout MacroKit.
//!
//! Recorded key events store the canonical name string of a [`Key`]
//! (e.g. `"a"`, `"f10"`, `"num_add"`, `"ctrl_l"`). Platform codes are
//! translated to and from `Key` only at the capture and synthesis
//! boundaries, so macro documents stay portable and human-editable.

/// A key MacroKit can record and synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character key, stored lowercase (`'a'`, `'1'`, `';'`).
    Char(char),
    /// Function keys F1–F24.
    F(u8),
    /// Numpad digits 0–9.
    Numpad(u8),
    NumpadMultiply,
    NumpadAdd,
    NumpadSubtract,
    NumpadDecimal,
    NumpadDivide,
    NumLock,

    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    CapsLock,
    ScrollLock,
    PrintScreen,
    PauseBreak,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,

    CtrlLeft,
    CtrlRight,
    ShiftLeft,
    ShiftRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,
    Menu,
}

/// Modifier keys forcibly released on every stop, regardless of what the
/// held-input set tracked. A stuck modifier corrupts all subsequent user
/// input system-wide, so these are always swept.
pub const FALLBACK_MODIFIERS: [Key; 8] = [
    Key::CtrlLeft,
    Key::CtrlRight,
    Key::AltLeft,
    Key::AltRight,
    Key::ShiftLeft,
    Key::ShiftRight,
    Key::MetaLeft,
    Key::MetaRight,
];

impl Key {
    /// Canonical name string, the form stored in macro documents.
    pub fn name(&self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::F(n) => format!("f{n}"),
            Key::Numpad(n) => format!("num{n}"),
            Key::NumpadMultiply => "num_multiply".to_string(),
            Key::NumpadAdd => "num_add".to_string(),
            Key::NumpadSubtract => "num_subtract".to_string(),
            Key::NumpadDecimal => "num_decimal".to_string(),
            Key::NumpadDivide => "num_divide".to_string(),
            Key::NumLock => "num_lock".to_string(),
            Key::Enter => "enter".to_string(),
            Key::Escape => "escape".to_string(),
            Key::Backspace => "backspace".to_string(),
            Key::Tab => "tab".to_string(),
            Key::Space => "space".to_string(),
            Key::CapsLock => "caps_lock".to_string(),
            Key::ScrollLock => "scroll_lock".to_string(),
            Key::PrintScreen => "print_screen".to_string(),
            Key::PauseBreak => "pause".to_string(),
            Key::Insert => "insert".to_string(),
            Key::Delete => "delete".to_string(),
            Key::Home => "home".to_string(),
            Key::End => "end".to_string(),
            Key::PageUp => "page_up".to_string(),
            Key::PageDown => "page_down".to_string(),
            Key::Up => "up".to_string(),
            Key::Down => "down".to_string(),
            Key::Left => "left".to_string(),
            Key::Right => "right".to_string(),
            Key::CtrlLeft => "ctrl_l".to_string(),
            Key::CtrlRight => "ctrl_r".to_string(),
            Key::ShiftLeft => "shift_l".to_string(),
            Key::ShiftRight => "shift_r".to_string(),
            Key::AltLeft => "alt_l".to_string(),
            Key::AltRight => "alt_r".to_string(),
            Key::MetaLeft => "cmd".to_string(),
            Key::MetaRight => "cmd_r".to_string(),
            Key::Menu => "menu".to_string(),
        }
    }

    /// Returns `true` for the modifier keys in the fallback release set.
    pub fn is_modifier(&self) -> bool {
        FALLBACK_MODIFIERS.contains(self)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
