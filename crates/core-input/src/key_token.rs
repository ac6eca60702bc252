use core_events::{KeyEvent, KeyModifiers, MouseEvent, NamedKey};
use smallvec::SmallVec;

/// Split `;`-separated decimal parameters. Empty fields decode as `None`;
/// values saturate at `u16::MAX`. Returns `None` on any non-digit byte.
pub(crate) fn parse_params(params: &[u8]) -> Option<SmallVec<[Option<u16>; 4]>> {
    let mut out = SmallVec::new();
    if params.is_empty() {
        return Some(out);
    }
    for field in params.split(|&b| b == b';') {
        if field.is_empty() {
            out.push(None);
            continue;
        }
        let mut value: u16 = 0;
        for &b in field {
            if !b.is_ascii_digit() {
                return None;
            }
            value = value.saturating_mul(10).saturating_add(u16::from(b - b'0'));
        }
        out.push(Some(value));
    }
    Some(out)
}

/// Key named by the leading parameter of a `CSI n ~` sequence.
pub(crate) fn vt_tilde_key(code: u16) -> Option<NamedKey> {
    let key = match code {
        1 | 7 => NamedKey::Home,
        2 => NamedKey::Insert,
        3 => NamedKey::Delete,
        4 | 8 => NamedKey::End,
        5 => NamedKey::PageUp,
        6 => NamedKey::PageDown,
        11..=15 => NamedKey::F((code - 10) as u8),
        17..=21 => NamedKey::F((code - 11) as u8),
        23 | 24 => NamedKey::F((code - 12) as u8),
        _ => return None,
    };
    Some(key)
}

/// Key named by the final byte of a `CSI` or `SS3` cursor sequence.
pub(crate) fn cursor_final_key(final_byte: u8) -> Option<NamedKey> {
    let key = match final_byte {
        b'A' => NamedKey::Up,
        b'B' => NamedKey::Down,
        b'C' => NamedKey::Right,
        b'D' => NamedKey::Left,
        b'H' => NamedKey::Home,
        b'F' => NamedKey::End,
        _ => return None,
    };
    Some(key)
}

/// Decode a complete `ESC [ params final` sequence.
pub(crate) fn decode_csi(params: &[u8], final_byte: u8) -> KeyEvent {
    if let Some(rest) = params.strip_prefix(b"<") {
        return decode_sgr_mouse(rest, final_byte);
    }
    let Some(fields) = parse_params(params) else {
        return KeyEvent::Unknown;
    };
    let first = fields.first().copied().flatten();
    let mods = fields
        .get(1)
        .copied()
        .flatten()
        .map(KeyModifiers::from_csi_param)
        .unwrap_or_default();

    match final_byte {
        b'~' => match first.and_then(vt_tilde_key) {
            Some(key) => KeyEvent::named_with(key, mods),
            None => KeyEvent::Unknown,
        },
        b'Z' if fields.is_empty() => KeyEvent::named_with(NamedKey::Tab, KeyModifiers::SHIFT),
        _ => match cursor_final_key(final_byte) {
            Some(key) if fields.is_empty() => KeyEvent::named(key),
            Some(key) if first == Some(1) => KeyEvent::named_with(key, mods),
            _ => KeyEvent::Unknown,
        },
    }
}

/// Decode the tail of an SGR mouse report: `button ; column ; row` then `M`
/// (press) or `m` (release).
fn decode_sgr_mouse(params: &[u8], final_byte: u8) -> KeyEvent {
    let pressed = match final_byte {
        b'M' => true,
        b'm' => false,
        _ => return KeyEvent::Unknown,
    };
    match parse_params(params).as_deref() {
        Some(&[Some(button), Some(column), Some(row)]) => KeyEvent::Mouse(MouseEvent {
            button,
            column,
            row,
            pressed,
        }),
        _ => KeyEvent::Unknown,
    }
}

/// Decode `ESC O final`.
pub(crate) fn decode_ss3(final_byte: u8) -> KeyEvent {
    if let Some(key) = cursor_final_key(final_byte) {
        return KeyEvent::named(key);
    }
    match final_byte {
        b'P'..=b'S' => KeyEvent::named(NamedKey::F(final_byte - b'P' + 1)),
        _ => KeyEvent::Unknown,
    }
}

/// Decode `ESC x` where `x` is not a sequence introducer (meta/alt keys).
pub(crate) fn decode_meta(byte: u8) -> KeyEvent {
    match byte {
        b'b' => KeyEvent::named(NamedKey::WordLeft),
        b'f' => KeyEvent::named(NamedKey::WordRight),
        b'd' => KeyEvent::named(NamedKey::DeleteWordRight),
        0x7F | core_events::CTRL_H => KeyEvent::named(NamedKey::DeleteWordLeft),
        core_events::ENTER => KeyEvent::named_with(NamedKey::Enter, KeyModifiers::ALT),
        _ => KeyEvent::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_keep_empty_fields() {
        let p = parse_params(b"1;;5").unwrap();
        assert_eq!(p.as_slice(), &[Some(1), None, Some(5)]);
        assert!(parse_params(b"1?").is_none());
        assert_eq!(parse_params(b"99999").unwrap()[0], Some(u16::MAX));
    }

    #[test]
    fn vt_table_covers_editing_and_function_keys() {
        assert_eq!(vt_tilde_key(3), Some(NamedKey::Delete));
        assert_eq!(vt_tilde_key(7), Some(NamedKey::Home));
        assert_eq!(vt_tilde_key(15), Some(NamedKey::F(5)));
        assert_eq!(vt_tilde_key(17), Some(NamedKey::F(6)));
        assert_eq!(vt_tilde_key(24), Some(NamedKey::F(12)));
        assert_eq!(vt_tilde_key(16), None);
    }

    #[test]
    fn cursor_keys_need_leading_one_when_modified() {
        assert_eq!(decode_csi(b"", b'A'), KeyEvent::named(NamedKey::Up));
        assert_eq!(
            decode_csi(b"1;5", b'C'),
            KeyEvent::named_with(NamedKey::Right, KeyModifiers::CTRL)
        );
        assert_eq!(decode_csi(b"2;5", b'C'), KeyEvent::Unknown);
    }

    #[test]
    fn private_parameters_are_unknown() {
        assert_eq!(decode_csi(b"?1", b'h'), KeyEvent::Unknown);
    }

    #[test]
    fn sgr_mouse_press_and_release() {
        assert_eq!(
            decode_csi(b"<0;12;3", b'M'),
            KeyEvent::Mouse(MouseEvent {
                button: 0,
                column: 12,
                row: 3,
                pressed: true
            })
        );
        assert!(matches!(
            decode_csi(b"<0;12;3", b'm'),
            KeyEvent::Mouse(MouseEvent { pressed: false, .. })
        ));
        assert_eq!(decode_csi(b"<0;12", b'M'), KeyEvent::Unknown);
    }
}
