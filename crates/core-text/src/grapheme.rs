//! Grapheme cluster boundaries over raw UTF-8 bytes.
//!
//! A practical heuristic rather than full UAX #29: a cluster is one base
//! codepoint extended by
//! * `ZWJ` plus the codepoint that follows it (repeatable),
//! * any run of extending codepoints (combining marks, variation selectors,
//!   skin tone modifiers),
//! * exactly one paired regional indicator when the base is one.
//!
//! Boundaries are defined relative to the start of the slice. `prev_len` walks
//! back to the nearest codepoint that can only ever begin a cluster and replays
//! the forward rules from there, so `next_len` and `prev_len` agree at every
//! boundary by construction.

use crate::utf8::{
    decode_backward, decode_forward, is_grapheme_extend, is_regional_indicator, is_zwj,
};

/// Byte length of the grapheme cluster starting at `at` (0 at end of input).
pub fn next_len(bytes: &[u8], at: usize) -> usize {
    let (base, base_len) = decode_forward(bytes, at);
    if base_len == 0 {
        return 0;
    }
    let mut pos = at + base_len;
    if is_regional_indicator(base) {
        let (next, len) = decode_forward(bytes, pos);
        if len > 0 && is_regional_indicator(next) {
            pos += len;
        }
    }
    let mut joined = is_zwj(base);
    loop {
        let (cp, len) = decode_forward(bytes, pos);
        if len == 0 {
            break;
        }
        if joined || is_zwj(cp) || is_grapheme_extend(cp) {
            joined = is_zwj(cp);
            pos += len;
            continue;
        }
        break;
    }
    pos - at
}

/// Byte length of the grapheme cluster ending at `at` (0 at offset 0).
pub fn prev_len(bytes: &[u8], at: usize) -> usize {
    let at = at.min(bytes.len());
    if at == 0 {
        return 0;
    }
    let anchor = cluster_anchor(bytes, at);
    let mut boundary = anchor;
    loop {
        let len = next_len(bytes, boundary);
        if len == 0 || boundary + len >= at {
            return at - boundary;
        }
        boundary += len;
    }
}

/// Nearest offset before `at` holding a codepoint that always starts a cluster:
/// not extending, not a joiner, not a regional indicator, and not preceded by a
/// joiner. Falls back to 0.
fn cluster_anchor(bytes: &[u8], at: usize) -> usize {
    let mut cursor = at;
    loop {
        let (cp, len) = decode_backward(bytes, cursor);
        if len == 0 {
            return 0;
        }
        let start = cursor - len;
        let (before, before_len) = decode_backward(bytes, start);
        let joined = before_len > 0 && is_zwj(before);
        if !is_grapheme_extend(cp) && !is_zwj(cp) && !is_regional_indicator(cp) && !joined {
            return start;
        }
        cursor = start;
    }
}

/// Offset of the next cluster boundary after `at`, clamped to the slice.
#[inline]
pub fn next_boundary(bytes: &[u8], at: usize) -> usize {
    (at + next_len(bytes, at)).min(bytes.len())
}

/// Offset of the previous cluster boundary before `at`.
#[inline]
pub fn prev_boundary(bytes: &[u8], at: usize) -> usize {
    let at = at.min(bytes.len());
    at - prev_len(bytes, at)
}

/// Iterate `(offset, cluster_bytes)` over a slice.
pub fn clusters(bytes: &[u8]) -> impl Iterator<Item = (usize, &[u8])> + '_ {
    let mut at = 0usize;
    std::iter::from_fn(move || {
        let len = next_len(bytes, at);
        if len == 0 {
            return None;
        }
        let item = (at, &bytes[at..at + len]);
        at += len;
        Some(item)
    })
}

/// Number of clusters in a slice.
pub fn count(bytes: &[u8]) -> usize {
    clusters(bytes).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundaries(s: &str) -> Vec<usize> {
        let bytes = s.as_bytes();
        let mut out = vec![0];
        let mut at = 0;
        while at < bytes.len() {
            at += next_len(bytes, at);
            out.push(at);
        }
        out
    }

    #[test]
    fn ascii_clusters_are_single_bytes() {
        assert_eq!(boundaries("abc"), vec![0, 1, 2, 3]);
    }

    #[test]
    fn combining_mark_extends_base() {
        let s = "e\u{0301}x";
        assert_eq!(boundaries(s), vec![0, 3, 4]);
        assert_eq!(prev_len(s.as_bytes(), 3), 3);
    }

    #[test]
    fn zwj_family_is_one_cluster() {
        let s = "👨\u{200D}👩\u{200D}👧Z";
        let family_len = s.len() - 1;
        assert_eq!(next_len(s.as_bytes(), 0), family_len);
        assert_eq!(prev_len(s.as_bytes(), family_len), family_len);
    }

    #[test]
    fn skin_tone_and_variation_selector() {
        let s = "👍🏽⚙\u{FE0F}";
        let thumbs = "👍🏽".len();
        assert_eq!(next_len(s.as_bytes(), 0), thumbs);
        assert_eq!(next_len(s.as_bytes(), thumbs), s.len() - thumbs);
    }

    #[test]
    fn regional_indicators_pair_up() {
        let s = "🇺🇸🇫🇷🇩";
        let flag = "🇺🇸".len();
        assert_eq!(boundaries(s), vec![0, flag, 2 * flag, 2 * flag + flag / 2]);
        assert_eq!(prev_len(s.as_bytes(), s.len()), flag / 2);
        assert_eq!(prev_len(s.as_bytes(), 2 * flag), flag);
    }

    #[test]
    fn trailing_joiner_attaches_to_base() {
        let s = "a\u{200D}";
        assert_eq!(next_len(s.as_bytes(), 0), s.len());
        assert_eq!(prev_len(s.as_bytes(), s.len()), s.len());
    }

    #[test]
    fn double_joiner_glues_following_codepoint() {
        let s = "a\u{200D}\u{200D}b c";
        let glued = "a\u{200D}\u{200D}b".len();
        assert_eq!(next_len(s.as_bytes(), 0), glued);
        assert_eq!(prev_len(s.as_bytes(), glued), glued);
    }

    #[test]
    fn boundary_helpers_clamp() {
        let s = "ab".as_bytes();
        assert_eq!(next_boundary(s, 2), 2);
        assert_eq!(prev_boundary(s, 0), 0);
        assert_eq!(prev_boundary(s, 10), 1);
    }
}
