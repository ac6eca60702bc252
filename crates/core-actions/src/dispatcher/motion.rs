//! Cursor movement. Pure: never touches bytes or undo history.

use super::DispatchResult;
use crate::MotionKind;
use core_text::LineBuffer;

pub(crate) fn handle_motion(kind: MotionKind, buffer: &mut LineBuffer) -> DispatchResult {
    let before = buffer.cursor();
    let moved = match kind {
        MotionKind::Left => buffer.move_left(),
        MotionKind::Right => buffer.move_right(),
        MotionKind::LineStart => buffer.move_home(),
        MotionKind::LineEnd => buffer.move_end(),
        MotionKind::WordBackward => buffer.move_word_left(),
        MotionKind::WordForward => buffer.move_word_right(),
    };
    tracing::trace!(target: "actions.dispatch", op = "motion", ?kind, before, after = buffer.cursor(), "motion");
    DispatchResult::from_changed(moved)
}
