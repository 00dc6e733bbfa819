//! Windows Virtual-Key code translation table.
//!
//! Used only at the capture boundary (hook callbacks report VK codes) and
//! the synthesis boundary (SendInput consumes VK codes). Everything in
//! between works with the canonical [`Key`] set.
//!
//! Reference: Microsoft "Virtual-Key Codes" (winuser.h).

use super::key::Key;

/// Translates a Windows Virtual-Key code to a canonical [`Key`].
///
/// Returns `None` for codes MacroKit does not record (e.g. browser or
/// multimedia keys).
pub fn vk_to_key(vk: u8) -> Option<Key> {
    let key = match vk {
        // Letters A–Z (VK 0x41–0x5A); recorded lowercase.
        0x41..=0x5A => Key::Char((vk as char).to_ascii_lowercase()),
        // Top-row digits 0–9 (VK 0x30–0x39)
        0x30..=0x39 => Key::Char(vk as char),
        // Numpad digits (VK 0x60–0x69)
        0x60..=0x69 => Key::Numpad(vk - 0x60),
        0x6A => Key::NumpadMultiply,
        0x6B => Key::NumpadAdd,
        0x6D => Key::NumpadSubtract,
        0x6E => Key::NumpadDecimal,
        0x6F => Key::NumpadDivide,
        0x90 => Key::NumLock,
        // Function keys F1–F24 (VK 0x70–0x87)
        0x70..=0x87 => Key::F(vk - 0x70 + 1),

        0x0D => Key::Enter,
        0x1B => Key::Escape,
        0x08 => Key::Backspace,
        0x09 => Key::Tab,
        0x20 => Key::Space,
        0x14 => Key::CapsLock,
        0x91 => Key::ScrollLock,
        0x2C => Key::PrintScreen,
        0x13 => Key::PauseBreak,
        0x2D => Key::Insert,
        0x2E => Key::Delete,
        0x24 => Key::Home,
        0x23 => Key::End,
        0x21 => Key::PageUp,
        0x22 => Key::PageDown,
        0x26 => Key::Up,
        0x28 => Key::Down,
        0x25 => Key::Left,
        0x27 => Key::Right,

        0xA2 => Key::CtrlLeft,
        0xA3 => Key::CtrlRight,
        0xA0 => Key::ShiftLeft,
        0xA1 => Key::ShiftRight,
        0xA4 => Key::AltLeft,
        0xA5 => Key::AltRight,
        0x5B => Key::MetaLeft,
        0x5C => Key::MetaRight,
        0x5D => Key::Menu,

        // OEM punctuation (US layout)
        0xBA => Key::Char(';'),
        0xBB => Key::Char('='),
        0xBC => Key::Char(','),
        0xBD => Key::Char('-'),
        0xBE => Key::Char('.'),
        0xBF => Key::Char('/'),
        0xC0 => Key::Char('`'),
        0xDB => Key::Char('['),
        0xDC => Key::Char('\\'),
        0xDD => Key::Char(']'),
        0xDE => Key::Char('\''),

        _ => return None,
    };
    Some(key)
}

/// Translates a canonical [`Key`] to a Windows Virtual-Key code.
///
/// Returns `None` if the key has no VK equivalent (e.g. a non-ASCII
/// character from an imported document).
pub fn key_to_vk(key: Key) -> Option<u8> {
    let vk = match key {
        Key::Char(c) => match c {
            'a'..='z' => c.to_ascii_uppercase() as u8,
            '0'..='9' => c as u8,
            ';' => 0xBA,
            '=' => 0xBB,
            ',' => 0xBC,
            '-' => 0xBD,
            '.' => 0xBE,
            '/' => 0xBF,
            '`' => 0xC0,
            '[' => 0xDB,
            '\\' => 0xDC,
            ']' => 0xDD,
            '\'' => 0xDE,
            _ => return None,
        },
        Key::F(n) if (1..=24).contains(&n) => 0x70 + n - 1,
        Key::F(_) => return None,
        Key::Numpad(n) if n <= 9 => 0x60 + n,
        Key::Numpad(_) => return None,
        Key::NumpadMultiply => 0x6A,
        Key::NumpadAdd => 0x6B,
        Key::NumpadSubtract => 0x6D,
        Key::NumpadDecimal => 0x6E,
        Key::NumpadDivide => 0x6F,
        Key::NumLock => 0x90,

        Key::Enter => 0x0D,
        Key::Escape => 0x1B,
        Key::Backspace => 0x08,
        Key::Tab => 0x09,
        Key::Space => 0x20,
        Key::CapsLock => 0x14,
        Key::ScrollLock => 0x91,
        Key::PrintScreen => 0x2C,
        Key::PauseBreak => 0x13,
        Key::Insert => 0x2D,
        Key::Delete => 0x2E,
        Key::Home => 0x24,
        Key::End => 0x23,
        Key::PageUp => 0x21,
        Key::PageDown => 0x22,
        Key::Up => 0x26,
        Key::Down => 0x28,
        Key::Left => 0x25,
        Key::Right => 0x27,

        Key::CtrlLeft => 0xA2,
        Key::CtrlRight => 0xA3,
        Key::ShiftLeft => 0xA0,
        Key::ShiftRight => 0xA1,
        Key::AltLeft => 0xA4,
        Key::AltRight => 0xA5,
        Key::MetaLeft => 0x5B,
        Key::MetaRight => 0x5C,
        Key::Menu => 0x5D,
    };
    Some(vk)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_vk_maps_to_lowercase_char() {
        assert_eq!(vk_to_key(0x41), Some(Key::Char('a')));
        assert_eq!(vk_to_key(0x5A), Some(Key::Char('z')));
    }

    #[test]
    fn test_function_and_numpad_ranges() {
        assert_eq!(vk_to_key(0x70), Some(Key::F(1)));
        assert_eq!(vk_to_key(0x87), Some(Key::F(24)));
        assert_eq!(vk_to_key(0x60), Some(Key::Numpad(0)));
        assert_eq!(vk_to_key(0x69), Some(Key::Numpad(9)));
    }

    #[test]
    fn test_unmapped_vk_returns_none() {
        // VK_VOLUME_UP (0xAF) is not part of the recordable set
        assert_eq!(vk_to_key(0xAF), None);
    }

    #[test]
    fn test_vk_round_trips_through_key_and_back() {
        // Every VK we can decode must encode back to the same VK.
        for vk in 0u8..=0xFE {
            if let Some(key) = vk_to_key(vk) {
                assert_eq!(
                    key_to_vk(key),
                    Some(vk),
                    "vk 0x{vk:02X} must round-trip via {key:?}"
                );
            }
        }
    }

    #[test]
    fn test_unsynthesizable_char_returns_none() {
        assert_eq!(key_to_vk(Key::Char('é')), None);
    }
}
