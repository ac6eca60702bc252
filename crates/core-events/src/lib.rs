//! Key event model shared by the parser, the action translator and hosts.
//!
//! Events carry raw input bytes for printable characters so insertion keeps
//! the exact sequence the terminal delivered.

use smallvec::SmallVec;
use std::fmt;

bitflags::bitflags! {
    /// Modifier bits as encoded by xterm-style CSI parameters (`param - 1`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

impl KeyModifiers {
    /// Decode the modifier parameter of a CSI sequence (`1` means none).
    pub fn from_csi_param(param: u16) -> Self {
        let bits = param.saturating_sub(1);
        Self::from_bits_truncate((bits & 0x7) as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
    Backspace,
    Enter,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    F(u8),
    WordLeft,
    WordRight,
    DeleteWordLeft,
    DeleteWordRight,
}

/// SGR mouse report (`ESC [ < button ; column ; row M|m`), 1-based coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub button: u16,
    pub column: u16,
    pub row: u16,
    pub pressed: bool,
}

impl MouseEvent {
    pub fn is_left_press(&self) -> bool {
        self.pressed && self.button == 0
    }
}

/// One logical key produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// A printable character with its raw UTF-8 bytes.
    Char { raw: SmallVec<[u8; 4]> },
    /// A control byte 0..=31; the Ctrl modifier is implied.
    Control(u8),
    Named { key: NamedKey, mods: KeyModifiers },
    Mouse(MouseEvent),
    Unknown,
}

impl KeyEvent {
    pub fn char_from_bytes(raw: &[u8]) -> Self {
        KeyEvent::Char {
            raw: SmallVec::from_slice(raw),
        }
    }

    pub fn named(key: NamedKey) -> Self {
        KeyEvent::Named {
            key,
            mods: KeyModifiers::empty(),
        }
    }

    pub fn named_with(key: NamedKey, mods: KeyModifiers) -> Self {
        KeyEvent::Named { key, mods }
    }

    /// Byte length of a character event's payload (0 for other kinds).
    pub fn byte_len(&self) -> usize {
        match self {
            KeyEvent::Char { raw } => raw.len(),
            _ => 0,
        }
    }

    pub fn modifiers(&self) -> KeyModifiers {
        match self {
            KeyEvent::Control(_) => KeyModifiers::CTRL,
            KeyEvent::Named { mods, .. } => *mods,
            _ => KeyModifiers::empty(),
        }
    }
}

/// Control code for a letter, e.g. `ctrl(b'a') == 1`.
pub const fn ctrl(letter: u8) -> u8 {
    letter & 0x1F
}

pub const ENTER: u8 = 13;
pub const TAB: u8 = 9;
pub const CTRL_H: u8 = 8;

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Char { raw } => match std::str::from_utf8(raw) {
                Ok(s) => write!(f, "Char({s:?})"),
                Err(_) => write!(f, "Char({raw:02x?})"),
            },
            KeyEvent::Control(code) => write!(f, "Ctrl-{}", char::from(code + 0x40)),
            KeyEvent::Named { key, mods } if mods.is_empty() => write!(f, "{key:?}"),
            KeyEvent::Named { key, mods } => write!(f, "{key:?}{mods:?}"),
            KeyEvent::Mouse(m) => write!(
                f,
                "Mouse(button={} col={} row={} {})",
                m.button,
                m.column,
                m.row,
                if m.pressed { "press" } else { "release" }
            ),
            KeyEvent::Unknown => f.write_str("Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csi_modifier_param_decodes_all_combinations() {
        for bits in 0u16..8 {
            let mods = KeyModifiers::from_csi_param(bits + 1);
            assert_eq!(mods.contains(KeyModifiers::SHIFT), bits & 1 != 0);
            assert_eq!(mods.contains(KeyModifiers::ALT), bits & 2 != 0);
            assert_eq!(mods.contains(KeyModifiers::CTRL), bits & 4 != 0);
        }
        assert!(KeyModifiers::from_csi_param(0).is_empty());
    }

    #[test]
    fn char_event_keeps_raw_bytes() {
        let ev = KeyEvent::char_from_bytes("漢".as_bytes());
        assert_eq!(ev.byte_len(), 3);
        assert_eq!(format!("{ev}"), "Char(\"漢\")");
    }

    #[test]
    fn control_display_and_modifiers() {
        let ev = KeyEvent::Control(ctrl(b'c'));
        assert_eq!(format!("{ev}"), "Ctrl-C");
        assert_eq!(ev.modifiers(), KeyModifiers::CTRL);
    }

    #[test]
    fn left_press_detection() {
        let m = MouseEvent {
            button: 0,
            column: 4,
            row: 1,
            pressed: true,
        };
        assert!(m.is_left_press());
        let release = MouseEvent {
            pressed: false,
            ..m
        };
        assert!(!release.is_left_press());
    }
}
