//! Key handling for raw-mode sessions.

use core_actions::{Action, EditKind, HistoryDirection, dispatch, translate_key};
use core_events::KeyEvent;
use core_input::ByteSource;
use core_render::Geometry;
use core_terminal::TerminalBackend;
use core_text::{BufferError, utf8, width};
use tracing::{debug, info, trace};

use super::{EditSession, FeedOutcome};
use crate::EditError;

const NEWLINE: &[u8] = b"\r\n";

impl<T: TerminalBackend, S: ByteSource> EditSession<'_, T, S> {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Result<FeedOutcome, EditError> {
        let action = translate_key(&key, self.ctx.options().multiline);
        if self.completing() {
            match action {
                Some(Action::Complete) => return self.complete_next(),
                Some(Action::Escape) => return self.complete_cancel(),
                _ => self.complete_accept()?,
            }
        }
        let Some(action) = action else {
            trace!(target: "session", key_len = key.byte_len(), "unbound_key");
            return Ok(FeedOutcome::Continue);
        };
        self.apply(action)
    }

    fn apply(&mut self, action: Action) -> Result<FeedOutcome, EditError> {
        match action {
            Action::Submit => self.submit(),
            Action::Cancel => self.cancel(),
            Action::DeleteOrEof => {
                if self.state_ref()?.buffer.is_empty() {
                    self.finish_eof()
                } else {
                    self.edit(&Action::Edit(EditKind::DeleteUnder))
                }
            }
            Action::History(direction) => self.history_step(direction),
            Action::Complete => self.complete_start(),
            Action::ClearScreen => self.clear_screen(),
            Action::Click { column } => self.click(column),
            Action::Escape => Ok(FeedOutcome::Continue),
            Action::Edit(EditKind::InsertText(ref raw)) if self.can_echo(raw) => {
                let echoed = raw.clone();
                if self.apply_buffer_action(&action)? {
                    self.term.write_frame(&echoed).map_err(EditError::Write)?;
                }
                Ok(FeedOutcome::Continue)
            }
            other => self.edit(&other),
        }
    }

    fn edit(&mut self, action: &Action) -> Result<FeedOutcome, EditError> {
        if self.apply_buffer_action(action)? {
            self.refresh()?;
        }
        Ok(FeedOutcome::Continue)
    }

    /// Apply an edit, motion or undo step. A full fixed-size buffer rings the
    /// bell instead of failing the session. Returns whether a redraw is due.
    fn apply_buffer_action(&mut self, action: &Action) -> Result<bool, EditError> {
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        match dispatch(action, &mut state.buffer, &mut self.ctx.undo) {
            Ok(result) => Ok(result.dirty),
            Err(BufferError::CapacityExceeded { limit }) => {
                debug!(target: "session", limit, "buffer_full");
                self.beep()?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The keystroke can be echoed as-is: one narrow codepoint appended at the
    /// end of an unscrolled single-row line that still has room, with nothing
    /// (mask, hint, highlight) that would change how it is drawn.
    fn can_echo(&self, raw: &[u8]) -> bool {
        if !self.ctx.plain_echo() {
            return false;
        }
        let Some(state) = self.state.as_ref() else {
            return false;
        };
        if state.completion.is_some()
            || !state.buffer.at_end()
            || state.window_start != 0
            || state.geometry != Geometry::default()
        {
            return false;
        }
        if state.buffer.remaining().is_some_and(|room| room < raw.len()) {
            return false;
        }
        let (cp, len) = utf8::decode_forward(raw, 0);
        if len != raw.len() || width::codepoint_width(cp) != 1 || utf8::is_grapheme_extend(cp) {
            return false;
        }
        let bytes = state.buffer.as_bytes();
        if !bytes.is_empty() {
            let (prev, _) = utf8::decode_backward(bytes, bytes.len());
            if utf8::is_zwj(prev) || utf8::is_regional_indicator(prev) {
                return false;
            }
        }
        let prompt_width = width::str_width(&state.prompt);
        prompt_width + state.buffer.width() + 1 < state.columns
    }

    fn history_step(&mut self, direction: HistoryDirection) -> Result<FeedOutcome, EditError> {
        let len = self.ctx.history.len();
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        if len <= 1 {
            return Ok(FeedOutcome::Continue);
        }
        let next = match direction {
            HistoryDirection::Previous => state.history_index + 1,
            HistoryDirection::Next => match state.history_index.checked_sub(1) {
                Some(i) => i,
                None => return Ok(FeedOutcome::Continue),
            },
        };
        if next >= len {
            return Ok(FeedOutcome::Continue);
        }
        let current = state.buffer.as_str_lossy().into_owned();
        self.ctx.history.set(len - 1 - state.history_index, &current);
        let entry = self.ctx.history.get(len - 1 - next).unwrap_or_default().to_owned();
        state.history_index = next;
        trace!(target: "session", index = next, "history_step");

        if entry.as_bytes() != state.buffer.as_bytes() {
            let before = core_state::EditSnapshot::capture(&state.buffer);
            match state.buffer.replace(entry.as_bytes(), entry.len()) {
                Ok(()) => self.ctx.undo.push(before),
                Err(BufferError::CapacityExceeded { limit }) => {
                    debug!(target: "session", limit, "history_entry_too_long");
                    return self.beep().map(|()| FeedOutcome::Continue);
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.refresh()?;
        Ok(FeedOutcome::Continue)
    }

    /// Single-line only: map a 1-based terminal column to a byte offset by
    /// accumulating cluster widths from the first visible cluster.
    fn click(&mut self, column: u16) -> Result<FeedOutcome, EditError> {
        if self.ctx.options().multiline {
            return Ok(FeedOutcome::Continue);
        }
        let mask_width = self
            .ctx
            .options()
            .mask
            .map(|c| width::str_width(c.to_string().as_bytes()));
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        let prompt_width = width::str_width(&state.prompt);
        let target = (column as usize).saturating_sub(1).saturating_sub(prompt_width);
        let bytes = state.buffer.as_bytes();
        let start = state.window_start.min(bytes.len());
        let offset = start + width::byte_for_col(&bytes[start..], target, mask_width);
        trace!(target: "session", column, offset, "click");
        if offset != state.buffer.cursor() {
            state.buffer.set_cursor(offset);
            self.refresh()?;
        }
        Ok(FeedOutcome::Continue)
    }

    fn clear_screen(&mut self) -> Result<FeedOutcome, EditError> {
        self.term
            .write_frame(&core_render::clear_screen())
            .map_err(EditError::Write)?;
        if let Some(state) = self.state.as_mut() {
            state.geometry = Geometry::default();
        }
        self.refresh()?;
        Ok(FeedOutcome::Continue)
    }

    fn submit(&mut self) -> Result<FeedOutcome, EditError> {
        self.state_mut()?.buffer.move_end();
        self.redraw(false)?;
        self.term.write_frame(NEWLINE).map_err(EditError::Write)?;
        let line = self.finish()?;
        let opts = self.ctx.options();
        if opts.auto_history && opts.mask.is_none() && !line.is_empty() {
            self.ctx.history.add(&line);
        }
        info!(target: "session", len = line.len(), "line_accepted");
        Ok(FeedOutcome::Line(line))
    }

    fn cancel(&mut self) -> Result<FeedOutcome, EditError> {
        self.state_mut()?.buffer.move_end();
        self.redraw(false)?;
        self.term.write_frame(NEWLINE).map_err(EditError::Write)?;
        self.finish()?;
        debug!(target: "session", "line_cancelled");
        Ok(FeedOutcome::Cancelled)
    }

    pub(crate) fn finish_eof(&mut self) -> Result<FeedOutcome, EditError> {
        self.finish()?;
        debug!(target: "session", "input_eof");
        Ok(FeedOutcome::Eof)
    }

    /// Close the line: drop the in-progress history slot and refuse further
    /// input. Returns the line text.
    fn finish(&mut self) -> Result<String, EditError> {
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        if state.transient {
            self.ctx.history.pop_last();
            state.transient = false;
        }
        state.finished = true;
        Ok(state.buffer.as_str_lossy().into_owned())
    }

    fn state_ref(&self) -> Result<&crate::EditState, EditError> {
        self.state.as_ref().ok_or(EditError::NotActive)
    }

    fn state_mut(&mut self) -> Result<&mut crate::EditState, EditError> {
        self.state.as_mut().ok_or(EditError::NotActive)
    }
}
