//! Dispatcher applying buffer-level `Action`s to a line and its undo history.
//!
//! Sub-modules:
//! * `motion` - cursor movement
//! * `edit`   - text mutation (insert, delete, kill, transpose)
//! * `undo`   - undo / redo
//!
//! Session-level actions pass through with `handled == false`; the caller
//! owns history navigation, completion and line acceptance.

use crate::Action;
use core_state::UndoEngine;
use core_text::{BufferError, LineBuffer};

mod edit;
mod motion;
mod undo;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// The line or cursor changed and must be redrawn.
    pub dirty: bool,
    /// The dispatcher consumed the action.
    pub handled: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            handled: true,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            handled: true,
        }
    }
    pub fn unhandled() -> Self {
        Self {
            dirty: false,
            handled: false,
        }
    }
    pub(crate) fn from_changed(changed: bool) -> Self {
        if changed { Self::dirty() } else { Self::clean() }
    }
}

/// Apply `action` to `buffer`. Mutating edits record an undo snapshot only
/// when they actually change the line.
pub fn dispatch(
    action: &Action,
    buffer: &mut LineBuffer,
    undo: &mut UndoEngine,
) -> Result<DispatchResult, BufferError> {
    match action {
        Action::Motion(kind) => Ok(motion::handle_motion(*kind, buffer)),
        Action::Edit(kind) => edit::handle_edit(kind, buffer, undo),
        Action::Undo => undo::handle_undo(buffer, undo),
        Action::Redo => undo::handle_redo(buffer, undo),
        _ => Ok(DispatchResult::unhandled()),
    }
}
