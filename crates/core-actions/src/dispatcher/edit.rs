//! Text mutation.
//!
//! Every edit captures the line before touching it and commits the snapshot
//! to undo history only if the primitive reports a change. Inserts check the
//! capacity first so a rejected insert leaves history untouched.

use super::DispatchResult;
use crate::EditKind;
use core_state::{EditSnapshot, UndoEngine};
use core_text::{BufferError, LineBuffer};

pub(crate) fn handle_edit(
    kind: &EditKind,
    buffer: &mut LineBuffer,
    undo: &mut UndoEngine,
) -> Result<DispatchResult, BufferError> {
    let snapshot = EditSnapshot::capture(buffer);
    let changed = match kind {
        EditKind::InsertText(raw) => insert(buffer, raw)?,
        EditKind::InsertNewline => insert(buffer, b"\n")?,
        EditKind::Backspace => buffer.backspace(),
        EditKind::DeleteUnder => buffer.delete(),
        EditKind::DeleteWordBackward => buffer.delete_word_left(),
        EditKind::DeleteWordForward => buffer.delete_word_right(),
        EditKind::KillToEnd => buffer.kill_to_end(),
        EditKind::KillLine => buffer.kill_line(),
        EditKind::Transpose => buffer.transpose(),
    };
    if changed {
        undo.push(snapshot);
    }
    tracing::trace!(target: "actions.dispatch", op = "edit", changed, len = buffer.len(), cursor = buffer.cursor(), "edit");
    Ok(DispatchResult::from_changed(changed))
}

fn insert(buffer: &mut LineBuffer, raw: &[u8]) -> Result<bool, BufferError> {
    if raw.is_empty() {
        return Ok(false);
    }
    if let Some(room) = buffer.remaining()
        && room < raw.len()
    {
        return Err(BufferError::CapacityExceeded {
            limit: buffer.limit().unwrap_or_default(),
        });
    }
    buffer.insert(raw)?;
    Ok(true)
}
