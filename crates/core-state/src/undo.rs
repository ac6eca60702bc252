use std::collections::VecDeque;

use core_text::{BufferError, LineBuffer};
use tracing::trace;

/// Default number of snapshots retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 100;

/// A full copy of the line and its cursor taken before an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSnapshot {
    pub bytes: Vec<u8>,
    pub cursor: usize,
}

impl EditSnapshot {
    pub fn capture(buffer: &LineBuffer) -> Self {
        Self {
            bytes: buffer.as_bytes().to_vec(),
            cursor: buffer.cursor(),
        }
    }

    fn restore_into(&self, buffer: &mut LineBuffer) -> Result<(), BufferError> {
        buffer.replace(&self.bytes, self.cursor)
    }
}

/// Bounded undo/redo history for the edited line.
///
/// Every mutating command pushes the state it is about to change. Pushing a
/// new snapshot discards the redo side; the oldest snapshot is evicted once
/// the configured depth is reached.
#[derive(Debug, Clone)]
pub struct UndoEngine {
    undo_stack: VecDeque<EditSnapshot>,
    redo_stack: Vec<EditSnapshot>,
    max_depth: usize,
    snapshots_skipped: u64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_MAX)
    }
}

impl UndoEngine {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            snapshots_skipped: 0,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        trace!(target: "state.undo", "cleared");
    }

    /// Record `buffer` as it is before a mutation.
    pub fn push_snapshot(&mut self, buffer: &LineBuffer) {
        self.push(EditSnapshot::capture(buffer));
    }

    /// Record a snapshot captured earlier (before an edit that turned out to
    /// change the buffer).
    pub fn push(&mut self, snapshot: EditSnapshot) {
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
        if self.undo_stack.back() == Some(&snapshot) {
            self.snapshots_skipped += 1;
            trace!(
                target: "state.undo",
                undo_depth = self.undo_stack.len(),
                "snapshot_dedupe_skip"
            );
            return;
        }
        let len = snapshot.bytes.len();
        self.undo_stack.push_back(snapshot);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), len, "push_snapshot");
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
    }

    /// Step back one edit. Returns `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut LineBuffer) -> Result<bool, BufferError> {
        let Some(last) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        let current = EditSnapshot::capture(buffer);
        if let Err(e) = last.restore_into(buffer) {
            self.undo_stack.push_back(last);
            return Err(e);
        }
        self.redo_stack.push(current);
        trace!(target: "state.undo", redo_depth = self.redo_stack.len(), "redo_push_from_undo");
        Ok(true)
    }

    /// Re-apply the last undone edit. Returns `Ok(false)` when there is none.
    pub fn redo(&mut self, buffer: &mut LineBuffer) -> Result<bool, BufferError> {
        let Some(next) = self.redo_stack.pop() else {
            return Ok(false);
        };
        trace!(target: "state.undo", redo_depth = self.redo_stack.len(), undo_depth = self.undo_stack.len(), "redo_pop");
        let current = EditSnapshot::capture(buffer);
        if let Err(e) = next.restore_into(buffer) {
            self.redo_stack.push(next);
            return Err(e);
        }
        self.undo_stack.push_back(current);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), "undo_push_from_redo");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_chars(undo: &mut UndoEngine, buf: &mut LineBuffer, s: &str) {
        for c in s.chars() {
            undo.push_snapshot(buf);
            let mut tmp = [0u8; 4];
            buf.insert(c.encode_utf8(&mut tmp).as_bytes()).unwrap();
        }
    }

    #[test]
    fn undo_twice_then_redo() {
        let mut undo = UndoEngine::default();
        let mut buf = LineBuffer::new();
        type_chars(&mut undo, &mut buf, "abc");
        assert!(undo.undo(&mut buf).unwrap());
        assert!(undo.undo(&mut buf).unwrap());
        assert_eq!(buf.as_bytes(), b"a");
        assert_eq!(buf.cursor(), 1);
        assert!(undo.redo(&mut buf).unwrap());
        assert_eq!(buf.as_bytes(), b"ab");
    }

    #[test]
    fn new_edit_discards_redo_tail() {
        let mut undo = UndoEngine::default();
        let mut buf = LineBuffer::new();
        type_chars(&mut undo, &mut buf, "ab");
        undo.undo(&mut buf).unwrap();
        type_chars(&mut undo, &mut buf, "x");
        assert_eq!(buf.as_bytes(), b"ax");
        assert_eq!(undo.redo_depth(), 0);
        assert!(!undo.redo(&mut buf).unwrap());
    }

    #[test]
    fn depth_is_bounded_oldest_first() {
        let mut undo = UndoEngine::new(2);
        let mut buf = LineBuffer::new();
        type_chars(&mut undo, &mut buf, "abc");
        assert_eq!(undo.undo_depth(), 2);
        undo.undo(&mut buf).unwrap();
        undo.undo(&mut buf).unwrap();
        assert_eq!(buf.as_bytes(), b"a");
        assert!(!undo.undo(&mut buf).unwrap());
    }

    #[test]
    fn identical_snapshots_are_skipped() {
        let mut undo = UndoEngine::default();
        let buf = LineBuffer::from_bytes(b"same");
        undo.push_snapshot(&buf);
        undo.push_snapshot(&buf);
        assert_eq!(undo.undo_depth(), 1);
        assert_eq!(undo.snapshots_skipped(), 1);
    }

    #[test]
    fn empty_history_is_noop() {
        let mut undo = UndoEngine::default();
        let mut buf = LineBuffer::from_bytes(b"x");
        assert!(!undo.undo(&mut buf).unwrap());
        assert_eq!(buf.as_bytes(), b"x");
    }

    #[test]
    fn skipped_duplicate_still_discards_redo_tail() {
        let mut undo = UndoEngine::default();
        let mut buf = LineBuffer::from_bytes(b"a");
        undo.push_snapshot(&buf);
        buf.insert(b"b").unwrap();
        undo.push_snapshot(&buf);
        buf.insert(b"c").unwrap();
        undo.undo(&mut buf).unwrap();
        assert_eq!(undo.redo_depth(), 1);

        undo.push_snapshot(&LineBuffer::from_bytes(b"a"));
        assert_eq!(undo.snapshots_skipped(), 1);
        assert_eq!(undo.redo_depth(), 0);
        assert!(!undo.redo(&mut buf).unwrap());
        assert_eq!(buf.as_bytes(), b"ab");
    }
}
