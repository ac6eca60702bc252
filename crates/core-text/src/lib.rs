//! Byte-oriented line buffer plus the UTF-8, grapheme and width engines it
//! is measured with.
//!
//! The buffer keeps the exact bytes delivered by the key parser so an insert
//! never re-encodes input. Every edit primitive moves by whole grapheme
//! clusters; callers never slice inside a cluster.

use std::borrow::Cow;
use thiserror::Error;

pub mod grapheme;
pub mod motion;
pub mod utf8;
pub mod width;

pub use width::{byte_for_col, cluster_width, codepoint_width, str_width};

/// Errors surfaced by buffer growth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("line buffer capacity of {limit} bytes exceeded")]
    CapacityExceeded { limit: usize },
    #[error("allocation failed while growing the line buffer")]
    OutOfMemory,
}

/// The single in-progress line being edited.
///
/// Invariant: `0 <= cursor <= len <= limit` (when a limit is set) and the
/// cursor always rests on a cluster boundary produced by the edit primitives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    cursor: usize,
    limit: Option<usize>,
}

impl LineBuffer {
    /// Engine-owned buffer that grows on demand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer refusing to grow past `limit` bytes (the fixed-region mode).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            cursor: 0,
            limit: Some(limit),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            cursor: bytes.len(),
            limit: None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
    pub fn at_end(&self) -> bool {
        self.cursor == self.bytes.len()
    }

    /// Bytes that can still be inserted, when a limit is set.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.bytes.len()))
    }

    /// Lossy UTF-8 view of the contents.
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Move the cursor, clamping to the buffer length.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.bytes.len());
    }

    fn ensure_room(&mut self, extra: usize) -> Result<(), BufferError> {
        if let Some(limit) = self.limit
            && self.bytes.len() + extra > limit
        {
            return Err(BufferError::CapacityExceeded { limit });
        }
        self.bytes
            .try_reserve(extra)
            .map_err(|_| BufferError::OutOfMemory)
    }

    /// Insert raw bytes at the cursor and advance past them.
    pub fn insert(&mut self, raw: &[u8]) -> Result<(), BufferError> {
        self.ensure_room(raw.len())?;
        let at = self.cursor;
        self.bytes.splice(at..at, raw.iter().copied());
        self.cursor += raw.len();
        Ok(())
    }

    /// Replace the whole contents; the cursor is clamped to the new length.
    pub fn replace(&mut self, bytes: &[u8], cursor: usize) -> Result<(), BufferError> {
        if let Some(limit) = self.limit
            && bytes.len() > limit
        {
            return Err(BufferError::CapacityExceeded { limit });
        }
        if bytes.len() > self.bytes.capacity() {
            self.bytes
                .try_reserve(bytes.len() - self.bytes.len())
                .map_err(|_| BufferError::OutOfMemory)?;
        }
        self.bytes.clear();
        self.bytes.extend_from_slice(bytes);
        self.cursor = cursor.min(self.bytes.len());
        Ok(())
    }

    /// Delete the cluster before the cursor. Returns false at the start.
    pub fn backspace(&mut self) -> bool {
        let len = grapheme::prev_len(&self.bytes, self.cursor);
        if len == 0 {
            return false;
        }
        let start = self.cursor - len;
        self.bytes.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Delete the cluster under the cursor. Returns false at the end.
    pub fn delete(&mut self) -> bool {
        let len = grapheme::next_len(&self.bytes, self.cursor);
        if len == 0 {
            return false;
        }
        self.bytes.drain(self.cursor..self.cursor + len);
        true
    }

    pub fn move_left(&mut self) -> bool {
        let len = grapheme::prev_len(&self.bytes, self.cursor);
        self.cursor -= len;
        len > 0
    }

    pub fn move_right(&mut self) -> bool {
        let len = grapheme::next_len(&self.bytes, self.cursor);
        self.cursor += len;
        len > 0
    }

    pub fn move_home(&mut self) -> bool {
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    pub fn move_end(&mut self) -> bool {
        let moved = self.cursor != self.bytes.len();
        self.cursor = self.bytes.len();
        moved
    }

    pub fn move_word_left(&mut self) -> bool {
        let target = motion::word_left(&self.bytes, self.cursor);
        let moved = target != self.cursor;
        self.cursor = target;
        moved
    }

    pub fn move_word_right(&mut self) -> bool {
        let target = motion::word_right(&self.bytes, self.cursor);
        let moved = target != self.cursor;
        self.cursor = target;
        moved
    }

    /// Delete from the start of the previous word up to the cursor.
    pub fn delete_word_left(&mut self) -> bool {
        let start = motion::word_left(&self.bytes, self.cursor);
        if start == self.cursor {
            return false;
        }
        self.bytes.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Delete from the cursor to the end of the next word.
    pub fn delete_word_right(&mut self) -> bool {
        let end = motion::word_right(&self.bytes, self.cursor);
        if end == self.cursor {
            return false;
        }
        self.bytes.drain(self.cursor..end);
        true
    }

    /// Delete everything right of the cursor.
    pub fn kill_to_end(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.bytes.truncate(self.cursor);
        true
    }

    /// Delete the whole line.
    pub fn kill_line(&mut self) -> bool {
        if self.bytes.is_empty() {
            return false;
        }
        self.bytes.clear();
        self.cursor = 0;
        true
    }

    /// Swap the clusters before and under the cursor. The cursor advances past
    /// the swapped pair unless the pair ends the line.
    pub fn transpose(&mut self) -> bool {
        if self.cursor == 0 || self.at_end() {
            return false;
        }
        let before = grapheme::prev_len(&self.bytes, self.cursor);
        let after = grapheme::next_len(&self.bytes, self.cursor);
        let start = self.cursor - before;
        let end = self.cursor + after;
        let mut swapped = Vec::with_capacity(before + after);
        swapped.extend_from_slice(&self.bytes[self.cursor..end]);
        swapped.extend_from_slice(&self.bytes[start..self.cursor]);
        self.bytes.splice(start..end, swapped);
        self.cursor = if end == self.bytes.len() {
            start + after
        } else {
            end
        };
        true
    }

    /// Display width of the bytes left of the cursor.
    pub fn width_to_cursor(&self) -> usize {
        str_width(&self.bytes[..self.cursor])
    }

    /// Display width of the whole buffer.
    pub fn width(&self) -> usize {
        str_width(&self.bytes)
    }
}
