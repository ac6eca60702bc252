//! Line-editing state that outlives a single edit session: history,
//! completion cycling and undo/redo.
//!
//! Undo snapshots are whole copies of the line plus cursor. A line is short
//! enough that diffing would only add bookkeeping.

pub mod completion;
pub mod history;
pub mod undo;

pub use completion::{CompletionCycle, DEFAULT_MAX_CANDIDATES, Shown};
pub use history::{DEFAULT_HISTORY_MAX_LEN, History};
pub use undo::{EditSnapshot, UNDO_HISTORY_MAX, UndoEngine};
