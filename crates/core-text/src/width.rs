//! Display width engine.
//!
//! A curated range table rather than a general `wcwidth`: it covers the blocks
//! an interactive prompt realistically meets (CJK, Hangul, fullwidth forms,
//! emoji and pictographic symbols). All width decisions in the workspace flow
//! through `codepoint_width` / `str_width`.
//!
//! Invariants:
//! - Control, zero-width and extending codepoints measure 0.
//! - A codepoint immediately following a ZWJ measures 0 in `str_width`; the
//!   joined glyph is drawn once by the terminal.
//! - Regional indicators measure 1 each so a flag pair totals 2.

use crate::grapheme;
use crate::utf8::{codepoints, is_grapheme_extend, is_zwj};

/// Sorted, non-overlapping inclusive ranges rendered two columns wide.
static WIDE: &[(u32, u32)] = &[
    (0x1100, 0x115F),
    (0x231A, 0x231B),
    (0x2329, 0x232A),
    (0x23E9, 0x23EC),
    (0x23F0, 0x23F0),
    (0x23F3, 0x23F3),
    (0x25FD, 0x25FE),
    (0x2614, 0x2615),
    (0x2648, 0x2653),
    (0x267F, 0x267F),
    (0x2693, 0x2693),
    (0x26A1, 0x26A1),
    (0x26AA, 0x26AB),
    (0x26BD, 0x26BE),
    (0x26C4, 0x26C5),
    (0x26CE, 0x26CE),
    (0x26D4, 0x26D4),
    (0x26EA, 0x26EA),
    (0x26F2, 0x26F3),
    (0x26F5, 0x26F5),
    (0x26FA, 0x26FA),
    (0x26FD, 0x26FD),
    (0x2705, 0x2705),
    (0x270A, 0x270B),
    (0x2728, 0x2728),
    (0x274C, 0x274C),
    (0x274E, 0x274E),
    (0x2753, 0x2755),
    (0x2757, 0x2757),
    (0x2795, 0x2797),
    (0x27B0, 0x27B0),
    (0x27BF, 0x27BF),
    (0x2B1B, 0x2B1C),
    (0x2B50, 0x2B50),
    (0x2B55, 0x2B55),
    (0x2E80, 0x303E),
    (0x3041, 0x33FF),
    (0x3400, 0x4DBF),
    (0x4E00, 0x9FFF),
    (0xA000, 0xA4CF),
    (0xA960, 0xA97F),
    (0xAC00, 0xD7A3),
    (0xF900, 0xFAFF),
    (0xFE10, 0xFE19),
    (0xFE30, 0xFE6F),
    (0xFF00, 0xFF60),
    (0xFFE0, 0xFFE6),
    (0x16FE0, 0x16FE4),
    (0x17000, 0x18AFF),
    (0x1B000, 0x1B2FF),
    (0x1F004, 0x1F004),
    (0x1F0CF, 0x1F0CF),
    (0x1F18E, 0x1F18E),
    (0x1F191, 0x1F19A),
    (0x1F200, 0x1F251),
    (0x1F300, 0x1F64F),
    (0x1F680, 0x1F6FF),
    (0x1F7E0, 0x1F7EB),
    (0x1F90C, 0x1F9FF),
    (0x1FA70, 0x1FAFF),
    (0x20000, 0x2FFFD),
    (0x30000, 0x3FFFD),
];

fn in_table(cp: u32, table: &[(u32, u32)]) -> bool {
    table
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                std::cmp::Ordering::Less
            } else if lo > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

fn is_zero_width(cp: u32) -> bool {
    cp < 0x20
        || (0x7F..=0x9F).contains(&cp)
        || (0x200B..=0x200F).contains(&cp)
        || (0x2028..=0x202E).contains(&cp)
        || (0x2060..=0x2064).contains(&cp)
        || (0x1160..=0x11FF).contains(&cp)
        || cp == 0xFEFF
        || is_grapheme_extend(cp)
}

/// Terminal columns occupied by a single codepoint: 0, 1 or 2.
pub fn codepoint_width(cp: u32) -> usize {
    if is_zero_width(cp) {
        0
    } else if in_table(cp, WIDE) {
        2
    } else {
        1
    }
}

/// Width of a byte range: the sum of codepoint widths, except a codepoint
/// right after a ZWJ contributes nothing.
pub fn str_width(bytes: &[u8]) -> usize {
    let mut total = 0usize;
    let mut after_zwj = false;
    for (_, cp, _) in codepoints(bytes) {
        if !after_zwj {
            total += codepoint_width(cp);
        }
        after_zwj = is_zwj(cp);
    }
    total
}

/// Width of one grapheme cluster.
#[inline]
pub fn cluster_width(cluster: &[u8]) -> usize {
    str_width(cluster)
}

/// Byte offset of the cluster boundary whose column is closest to, without
/// passing, `target_col` (measured from the start of `bytes`). A line break
/// ends the row. `cell_width` overrides every cluster's width, as when each
/// one is drawn as the same mask glyph.
pub fn byte_for_col(bytes: &[u8], target_col: usize, cell_width: Option<usize>) -> usize {
    let mut col = 0usize;
    for (at, cluster) in grapheme::clusters(bytes) {
        let w = cell_width.unwrap_or_else(|| cluster_width(cluster));
        if cluster == b"\n" || col + w > target_col {
            return at;
        }
        col += w;
    }
    bytes.len()
}
