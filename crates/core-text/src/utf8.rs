//! Byte-level UTF-8 decoding and codepoint classification.
//!
//! The line buffer stores the raw bytes received from the terminal, so these
//! helpers never assume the input is valid UTF-8. A malformed sequence decodes
//! as `U+FFFD` with a length of one byte; every offset produced by the decoders
//! therefore stays inside the slice and moves by at least one byte.

/// Replacement codepoint returned for malformed input.
pub const REPLACEMENT: u32 = 0xFFFD;
/// Zero-width joiner.
pub const ZWJ: u32 = 0x200D;

/// Byte length of a UTF-8 sequence given its lead byte (1 for invalid leads).
#[inline]
pub fn byte_len(lead: u8) -> usize {
    if lead & 0x80 == 0x00 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

/// True for `10xxxxxx` continuation bytes.
#[inline]
pub fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Decode the codepoint starting at `at`. Returns `(codepoint, byte_len)`;
/// `(0, 0)` when `at` is at or past the end of `bytes`.
pub fn decode_forward(bytes: &[u8], at: usize) -> (u32, usize) {
    let Some(&lead) = bytes.get(at) else {
        return (0, 0);
    };
    let len = byte_len(lead);
    if len == 1 {
        if lead < 0x80 {
            return (u32::from(lead), 1);
        }
        return (REPLACEMENT, 1);
    }
    if at + len > bytes.len() {
        return (REPLACEMENT, 1);
    }
    let mut cp = match len {
        2 => u32::from(lead & 0x1F),
        3 => u32::from(lead & 0x0F),
        _ => u32::from(lead & 0x07),
    };
    for &b in &bytes[at + 1..at + len] {
        if !is_continuation(b) {
            return (REPLACEMENT, 1);
        }
        cp = (cp << 6) | u32::from(b & 0x3F);
    }
    (cp, len)
}

/// Decode the codepoint ending right before `at`, scanning back at most four
/// bytes for a lead byte. Returns `(codepoint, byte_len)`; `(0, 0)` at offset 0.
pub fn decode_backward(bytes: &[u8], at: usize) -> (u32, usize) {
    let at = at.min(bytes.len());
    if at == 0 {
        return (0, 0);
    }
    let floor = at.saturating_sub(4);
    let mut start = at - 1;
    while start > floor && is_continuation(bytes[start]) {
        start -= 1;
    }
    let (cp, len) = decode_forward(bytes, start);
    if start + len == at {
        (cp, len)
    } else {
        // The bytes before `at` do not form one complete sequence.
        (REPLACEMENT, 1)
    }
}

/// Iterate `(offset, codepoint, len)` across a byte slice.
pub fn codepoints(bytes: &[u8]) -> impl Iterator<Item = (usize, u32, usize)> + '_ {
    let mut at = 0usize;
    std::iter::from_fn(move || {
        if at >= bytes.len() {
            return None;
        }
        let (cp, len) = decode_forward(bytes, at);
        let item = (at, cp, len);
        at += len;
        Some(item)
    })
}

#[inline]
pub fn is_zwj(cp: u32) -> bool {
    cp == ZWJ
}

/// VS1..VS16 plus the supplementary selectors VS17..VS256.
#[inline]
pub fn is_variation_selector(cp: u32) -> bool {
    (0xFE00..=0xFE0F).contains(&cp) || (0xE0100..=0xE01EF).contains(&cp)
}

/// Fitzpatrick skin tone modifiers.
#[inline]
pub fn is_skin_tone_modifier(cp: u32) -> bool {
    (0x1F3FB..=0x1F3FF).contains(&cp)
}

/// Regional indicators; a pair of them renders as one flag.
#[inline]
pub fn is_regional_indicator(cp: u32) -> bool {
    (0x1F1E6..=0x1F1FF).contains(&cp)
}

/// Combining marks commonly encountered in practice (curated subset).
pub fn is_combining_mark(cp: u32) -> bool {
    matches!(cp,
        0x0300..=0x036F
        | 0x0483..=0x0489
        | 0x0591..=0x05BD
        | 0x0610..=0x061A
        | 0x064B..=0x065F
        | 0x0670
        | 0x06D6..=0x06DC
        | 0x0900..=0x0903
        | 0x093A..=0x094F
        | 0x0951..=0x0957
        | 0x0E31
        | 0x0E34..=0x0E3A
        | 0x0E47..=0x0E4E
        | 0x1AB0..=0x1AFF
        | 0x1DC0..=0x1DFF
        | 0x20D0..=0x20FF
        | 0x302A..=0x302F
        | 0x3099..=0x309A
        | 0xFE20..=0xFE2F
        | 0xE0020..=0xE007F
    )
}

/// Codepoints that attach to the preceding base without starting a new cluster.
#[inline]
pub fn is_grapheme_extend(cp: u32) -> bool {
    is_combining_mark(cp) || is_variation_selector(cp) || is_skin_tone_modifier(cp)
}
