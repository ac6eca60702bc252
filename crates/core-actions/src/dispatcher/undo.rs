//! Undo / redo dispatch over the snapshot engine in `core_state`.

use super::DispatchResult;
use core_state::UndoEngine;
use core_text::{BufferError, LineBuffer};

pub(crate) fn handle_undo(
    buffer: &mut LineBuffer,
    undo: &mut UndoEngine,
) -> Result<DispatchResult, BufferError> {
    let applied = undo.undo(buffer)?;
    tracing::trace!(target: "actions.dispatch", op = "undo", applied, "undo");
    Ok(DispatchResult::from_changed(applied))
}

pub(crate) fn handle_redo(
    buffer: &mut LineBuffer,
    undo: &mut UndoEngine,
) -> Result<DispatchResult, BufferError> {
    let applied = undo.redo(buffer)?;
    tracing::trace!(target: "actions.dispatch", op = "redo", applied, "redo");
    Ok(DispatchResult::from_changed(applied))
}
