//! Tab completion inside a session.
//!
//! The first Tab asks the completer for candidates and shows the first one.
//! Further Tabs cycle, showing the original line once per round (with a
//! bell). Escape puts the original back; any other key commits the shown
//! candidate as a single undoable edit and is then handled normally.

use core_input::ByteSource;
use core_state::{CompletionCycle, EditSnapshot, Shown};
use core_terminal::TerminalBackend;
use core_text::BufferError;
use tracing::debug;

use super::{EditSession, FeedOutcome};
use crate::EditError;

impl<T: TerminalBackend, S: ByteSource> EditSession<'_, T, S> {
    pub(crate) fn completing(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.completion.is_some())
    }

    pub(crate) fn complete_start(&mut self) -> Result<FeedOutcome, EditError> {
        let Some(completer) = self.ctx.completer() else {
            return Ok(FeedOutcome::Continue);
        };
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        let candidates = completer.complete(&state.buffer.as_str_lossy());
        let cycle = CompletionCycle::start(
            candidates,
            self.ctx.options().max_candidates,
            state.buffer.as_bytes(),
            state.buffer.cursor(),
        );
        match cycle {
            Some(cycle) => {
                state.completion = Some(cycle);
                self.refresh()?;
            }
            None => self.beep()?,
        }
        Ok(FeedOutcome::Continue)
    }

    pub(crate) fn complete_next(&mut self) -> Result<FeedOutcome, EditError> {
        let wrapped = match self.state.as_mut().and_then(|s| s.completion.as_mut()) {
            Some(cycle) => cycle.advance(),
            None => return Ok(FeedOutcome::Continue),
        };
        if wrapped {
            self.beep()?;
        }
        self.refresh()?;
        Ok(FeedOutcome::Continue)
    }

    pub(crate) fn complete_cancel(&mut self) -> Result<FeedOutcome, EditError> {
        if let Some(state) = self.state.as_mut() {
            state.completion = None;
        }
        debug!(target: "session", "completion_cancelled");
        self.refresh()?;
        Ok(FeedOutcome::Continue)
    }

    /// Make the shown candidate the real line. The screen already shows it,
    /// so no redraw happens here.
    pub(crate) fn complete_accept(&mut self) -> Result<(), EditError> {
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        let Some(cycle) = state.completion.take() else {
            return Ok(());
        };
        let Shown::Candidate(candidate) = cycle.shown() else {
            return Ok(());
        };
        let before = EditSnapshot::capture(&state.buffer);
        match state.buffer.replace(candidate.as_bytes(), candidate.len()) {
            Ok(()) => {
                self.ctx.undo.push(before);
                debug!(target: "session", index = cycle.index(), "completion_accepted");
                Ok(())
            }
            Err(BufferError::CapacityExceeded { limit }) => {
                debug!(target: "session", limit, "completion_too_long");
                self.beep()?;
                self.refresh()
            }
            Err(e) => Err(e.into()),
        }
    }
}
