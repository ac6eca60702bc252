//! Editing actions: what a key means, and how buffer-level actions apply.
//!
//! `key_translator` maps parsed [`KeyEvent`](core_events::KeyEvent)s to
//! [`Action`]s. `dispatcher` applies the actions that only touch the line
//! buffer and its undo history; session-level actions (submit, history,
//! completion, screen control) are returned to the caller untouched.

use smallvec::SmallVec;

pub mod dispatcher;
pub mod key_translator;

pub use dispatcher::{DispatchResult, dispatch};
pub use key_translator::translate_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    LineStart,
    LineEnd,
    WordBackward,
    WordForward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKind {
    /// Raw UTF-8 bytes of one typed character.
    InsertText(SmallVec<[u8; 4]>),
    InsertNewline,
    Backspace,
    DeleteUnder,
    DeleteWordBackward,
    DeleteWordForward,
    KillToEnd,
    KillLine,
    Transpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Edit(EditKind),
    Motion(MotionKind),
    Undo,
    Redo,
    History(HistoryDirection),
    Complete,
    /// Escape pressed outside any sequence.
    Escape,
    /// Delete under the cursor, or end of input on an empty line.
    DeleteOrEof,
    ClearScreen,
    Submit,
    Cancel,
    /// Left button press at a 1-based terminal column.
    Click { column: u16 },
}

impl Action {
    /// True for actions [`dispatch`] handles itself.
    pub fn is_buffer_action(&self) -> bool {
        matches!(
            self,
            Action::Edit(_) | Action::Motion(_) | Action::Undo | Action::Redo
        )
    }
}
