//! Edit session controller.
//!
//! An [`EditSession`] drives one line of input through the key parser, the
//! action dispatcher and the renderer. The host calls [`EditSession::feed`]
//! whenever input is readable; each call consumes one key and reports whether
//! the line is still being edited.
//!
//! Long-lived state (history, undo, options and the completion / hint /
//! highlight callbacks) lives in [`EditorContext`], which the session borrows
//! mutably for its lifetime.

mod context;
mod error;
mod fallback;
mod session;
mod state;

pub use context::{Completer, EditorContext, Highlighter, Hinter};
pub use core_render::Hint;
pub use error::EditError;
pub use session::{EditSession, FeedOutcome, InputMode, Phase};
pub use state::EditState;
