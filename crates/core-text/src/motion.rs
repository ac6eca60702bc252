//! Word motion helpers.
//!
//! These operate purely on a byte slice + cursor offset and step by whole
//! grapheme clusters. A "word" is a run of clusters delimited by ASCII space
//! only; tabs and punctuation are treated as word characters. That mirrors the
//! long-standing readline-family behavior this engine reproduces and is pinned
//! by tests so a change is deliberate.

use crate::grapheme::{next_len, prev_len};

#[inline]
fn is_separator(cluster: &[u8]) -> bool {
    cluster == b" "
}

/// Offset of the start of the word left of `cursor`: skip separators, then
/// skip the word itself.
pub fn word_left(bytes: &[u8], cursor: usize) -> usize {
    let mut pos = cursor.min(bytes.len());
    while pos > 0 {
        let len = prev_len(bytes, pos);
        if !is_separator(&bytes[pos - len..pos]) {
            break;
        }
        pos -= len;
    }
    while pos > 0 {
        let len = prev_len(bytes, pos);
        if is_separator(&bytes[pos - len..pos]) {
            break;
        }
        pos -= len;
    }
    pos
}

/// Offset just past the word right of `cursor`: skip separators, then skip
/// the word itself.
pub fn word_right(bytes: &[u8], cursor: usize) -> usize {
    let mut pos = cursor.min(bytes.len());
    while pos < bytes.len() {
        let len = next_len(bytes, pos);
        if !is_separator(&bytes[pos..pos + len]) {
            break;
        }
        pos += len;
    }
    while pos < bytes.len() {
        let len = next_len(bytes, pos);
        if is_separator(&bytes[pos..pos + len]) {
            break;
        }
        pos += len;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_left_skips_spaces_then_word() {
        let s = b"foo bar  baz";
        assert_eq!(word_left(s, s.len()), 9);
        assert_eq!(word_left(s, 9), 4);
        assert_eq!(word_left(s, 4), 0);
        assert_eq!(word_left(s, 0), 0);
    }

    #[test]
    fn word_right_skips_spaces_then_word() {
        let s = b"foo bar  baz";
        assert_eq!(word_right(s, 0), 3);
        assert_eq!(word_right(s, 3), 7);
        assert_eq!(word_right(s, 7), s.len());
    }

    #[test]
    fn only_ascii_space_separates_words() {
        // Tabs, punctuation and no-break spaces are part of the word.
        let s = "a\tb,c\u{00A0}d e".as_bytes();
        assert_eq!(word_left(s, s.len()), s.len() - 1);
        assert_eq!(word_right(s, 0), s.len() - 2);
    }

    #[test]
    fn steps_over_whole_clusters() {
        let s = "x 漢字e\u{0301}".as_bytes();
        assert_eq!(word_left(s, s.len()), 2);
        assert_eq!(word_right(s, 1), s.len());
    }
}
