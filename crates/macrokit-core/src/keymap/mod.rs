//! Key identifier parsing and hotkey combo normalization.
//!
//! Macro documents store keys as canonical name strings (see [`key::Key`]).
//! Because documents are user-editable, a stored string may not resolve to
//! anything synthesizable; parsing therefore returns a tagged [`KeyToken`]
//! rather than failing. The player treats [`KeyToken::Unresolved`] as
//! skip-the-action-keep-the-timing, never as a reason to abort playback.

pub mod key;
pub mod windows_vk;

pub use key::{Key, FALLBACK_MODIFIERS};

/// Result of resolving a key identifier string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyToken {
    /// The string maps to a synthesizable key.
    Resolved(Key),
    /// No mapping exists; the original string is preserved for logging.
    Unresolved(String),
}

impl KeyToken {
    /// Returns the resolved key, or `None` for unresolved tokens.
    pub fn key(&self) -> Option<Key> {
        match self {
            KeyToken::Resolved(k) => Some(*k),
            KeyToken::Unresolved(_) => None,
        }
    }
}

/// Normalizes a hotkey combo string: lowercased, whitespace stripped.
///
/// `"Ctrl + Shift + A"` and `"ctrl+shift+a"` identify the same binding.
pub fn normalize_combo(combo: &str) -> String {
    combo
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Best-effort resolution of a key identifier string to a [`KeyToken`].
///
/// Accepts canonical names (`"a"`, `"f10"`, `"num_add"`, `"ctrl_l"`), a few
/// aliases produced by other tools (`"ctrl"`, `"return"`, `"esc"`), and the
/// legacy `"Key."`-prefixed form found in imported documents.
pub fn parse_key(raw: &str) -> KeyToken {
    let trimmed = raw.trim();
    // Legacy documents prefix special keys with "Key."
    let stripped = trimmed.strip_prefix("Key.").unwrap_or(trimmed);
    let lower = stripped.to_lowercase();

    if let Some(key) = lookup_name(&lower) {
        return KeyToken::Resolved(key);
    }
    KeyToken::Unresolved(raw.to_string())
}

fn lookup_name(name: &str) -> Option<Key> {
    // Single printable character
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if !c.is_whitespace() {
            return Some(Key::Char(c));
        }
    }

    // Function keys f1–f24
    if let Some(rest) = name.strip_prefix('f') {
        if let Ok(n) = rest.parse::<u8>() {
            if (1..=24).contains(&n) {
                return Some(Key::F(n));
            }
        }
    }

    // Numpad digits num0–num9
    if let Some(rest) = name.strip_prefix("num") {
        if rest.len() == 1 {
            if let Ok(n) = rest.parse::<u8>() {
                return Some(Key::Numpad(n));
            }
        }
    }

    let key = match name {
        "num_multiply" => Key::NumpadMultiply,
        "num_add" => Key::NumpadAdd,
        "num_subtract" => Key::NumpadSubtract,
        "num_decimal" => Key::NumpadDecimal,
        "num_divide" => Key::NumpadDivide,
        "num_lock" => Key::NumLock,
        "enter" | "return" => Key::Enter,
        "escape" | "esc" => Key::Escape,
        "backspace" => Key::Backspace,
        "tab" => Key::Tab,
        "space" => Key::Space,
        "caps_lock" => Key::CapsLock,
        "scroll_lock" => Key::ScrollLock,
        "print_screen" => Key::PrintScreen,
        "pause" => Key::PauseBreak,
        "insert" => Key::Insert,
        "delete" => Key::Delete,
        "home" => Key::Home,
        "end" => Key::End,
        "page_up" => Key::PageUp,
        "page_down" => Key::PageDown,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "ctrl" | "ctrl_l" => Key::CtrlLeft,
        "ctrl_r" => Key::CtrlRight,
        "shift" | "shift_l" => Key::ShiftLeft,
        "shift_r" => Key::ShiftRight,
        "alt" | "alt_l" => Key::AltLeft,
        "alt_r" | "alt_gr" => Key::AltRight,
        "cmd" | "cmd_l" | "win" | "super" => Key::MetaLeft,
        "cmd_r" => Key::MetaRight,
        "menu" => Key::Menu,
        _ => return None,
    };
    Some(key)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolves_canonical_names() {
        assert_eq!(parse_key("a"), KeyToken::Resolved(Key::Char('a')));
        assert_eq!(parse_key("f10"), KeyToken::Resolved(Key::F(10)));
        assert_eq!(parse_key("num7"), KeyToken::Resolved(Key::Numpad(7)));
        assert_eq!(parse_key("num_divide"), KeyToken::Resolved(Key::NumpadDivide));
        assert_eq!(parse_key("ctrl_r"), KeyToken::Resolved(Key::CtrlRight));
    }

    #[test]
    fn test_parse_round_trips_every_canonical_name() {
        // Every key we can name must resolve back to itself.
        let mut keys: Vec<Key> = vec![
            Key::Enter,
            Key::Escape,
            Key::Backspace,
            Key::Tab,
            Key::Space,
            Key::CapsLock,
            Key::ScrollLock,
            Key::PrintScreen,
            Key::PauseBreak,
            Key::Insert,
            Key::Delete,
            Key::Home,
            Key::End,
            Key::PageUp,
            Key::PageDown,
            Key::Up,
            Key::Down,
            Key::Left,
            Key::Right,
            Key::Menu,
            Key::NumpadMultiply,
            Key::NumpadAdd,
            Key::NumpadSubtract,
            Key::NumpadDecimal,
            Key::NumpadDivide,
            Key::NumLock,
        ];
        keys.extend(FALLBACK_MODIFIERS);
        keys.extend((1..=24).map(Key::F));
        keys.extend((0..=9).map(Key::Numpad));
        keys.extend("abcxyz0189;,.".chars().map(Key::Char));

        for key in keys {
            assert_eq!(
                parse_key(&key.name()),
                KeyToken::Resolved(key),
                "canonical name {:?} must round-trip",
                key.name()
            );
        }
    }

    #[test]
    fn test_parse_accepts_aliases_and_mixed_case() {
        assert_eq!(parse_key("Esc"), KeyToken::Resolved(Key::Escape));
        assert_eq!(parse_key("RETURN"), KeyToken::Resolved(Key::Enter));
        assert_eq!(parse_key("ctrl"), KeyToken::Resolved(Key::CtrlLeft));
        assert_eq!(parse_key("A"), KeyToken::Resolved(Key::Char('a')));
    }

    #[test]
    fn test_parse_strips_legacy_key_prefix() {
        assert_eq!(parse_key("Key.space"), KeyToken::Resolved(Key::Space));
        assert_eq!(parse_key("Key.shift_r"), KeyToken::Resolved(Key::ShiftRight));
    }

    #[test]
    fn test_parse_tags_unknown_strings_as_unresolved() {
        // Arrange / Act
        let token = parse_key("media_play_pause");

        // Assert – the original spelling is preserved for logging
        assert_eq!(
            token,
            KeyToken::Unresolved("media_play_pause".to_string())
        );
        assert!(token.key().is_none());
    }

    #[test]
    fn test_normalize_combo_lowercases_and_strips_whitespace() {
        assert_eq!(normalize_combo("Ctrl + Shift + A"), "ctrl+shift+a");
        assert_eq!(normalize_combo("F2"), "f2");
        assert_eq!(normalize_combo(" escape "), "escape");
    }
}
