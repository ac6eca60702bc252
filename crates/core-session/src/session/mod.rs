//! The `NotStarted -> Active -> Done` session state machine.
//!
//! `start` chooses an input mode from the terminal's capabilities:
//! * `Raw`   - full editing: raw mode, key parser, incremental rendering;
//! * `Dumb`  - `TERM` is on the denylist: prompt written, plain line read;
//! * `Pipe`  - input is not a TTY: plain newline-terminated read, no prompt.
//!
//! `feed` is the only call that reads input. `stop` (or dropping the session)
//! releases the terminal.

use std::time::Duration;

use core_input::{ByteSource, KeyParser, KeyRead, read_cursor_position};
use core_render::{Geometry, LayoutMode, RenderRequest, render};
use core_state::Shown;
use core_terminal::{
    BELL, CURSOR_POSITION_QUERY, MOUSE_DISABLE, MOUSE_ENABLE, TerminalBackend, enter_guard,
};
use crossterm::Command;
use tracing::{debug, info, trace, warn};

use crate::fallback::read_plain_line;
use crate::{EditError, EditState, EditorContext};

mod complete;
mod keys;

/// Width assumed when neither the backend nor the cursor probe reports one.
pub(crate) const DEFAULT_COLUMNS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Active,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Raw,
    Dumb,
    Pipe,
}

/// Result of one `feed` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Still editing; call `feed` again when input is ready.
    Continue,
    /// The user submitted a line.
    Line(String),
    /// Ctrl-C.
    Cancelled,
    /// Ctrl-D on an empty line, or the input stream ended.
    Eof,
}

pub struct EditSession<'ctx, T: TerminalBackend, S: ByteSource> {
    ctx: &'ctx mut EditorContext,
    term: T,
    src: S,
    parser: KeyParser,
    prompt: Vec<u8>,
    buffer_limit: Option<usize>,
    phase: Phase,
    mode: InputMode,
    mouse_on: bool,
    state: Option<EditState>,
}

impl<'ctx, T: TerminalBackend, S: ByteSource> EditSession<'ctx, T, S> {
    pub fn new(ctx: &'ctx mut EditorContext, term: T, src: S, prompt: &str) -> Self {
        let parser = KeyParser::new(ctx.options().escape_timeout, ctx.options().max_sequence_len);
        Self {
            ctx,
            term,
            src,
            parser,
            prompt: prompt.as_bytes().to_vec(),
            buffer_limit: None,
            phase: Phase::NotStarted,
            mode: InputMode::Raw,
            mouse_on: false,
            state: None,
        }
    }

    /// Cap the line at `limit` bytes instead of growing on demand.
    pub fn with_buffer_limit(mut self, limit: usize) -> Self {
        self.buffer_limit = Some(limit);
        self
    }

    /// Prompt used from the next `start`.
    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.as_bytes().to_vec();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn state(&self) -> Option<&EditState> {
        self.state.as_ref()
    }

    pub fn context(&self) -> &EditorContext {
        self.ctx
    }

    /// Between lines the host may change options or history directly.
    pub fn context_mut(&mut self) -> &mut EditorContext {
        self.ctx
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.term
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.src
    }

    /// The parser holds a byte from an interrupted sequence, so `feed` can
    /// make progress even when the source has nothing new to read.
    pub fn has_buffered_input(&self) -> bool {
        self.parser.has_pending()
    }

    /// Begin editing a new line. Allowed from `NotStarted` and `Done`.
    pub fn start(&mut self) -> Result<(), EditError> {
        if self.phase == Phase::Active {
            debug!(target: "session", "start_while_active_ignored");
            return Ok(());
        }
        let opts = self.ctx.options().clone();
        self.parser = KeyParser::new(opts.escape_timeout, opts.max_sequence_len);
        self.ctx.undo.clear();
        let mut state = EditState::new(&self.prompt, self.buffer_limit);

        let caps = self.term.capabilities();
        if !caps.is_interactive() {
            self.mode = InputMode::Pipe;
        } else if !caps.is_supported() {
            self.mode = InputMode::Dumb;
            self.term.write_frame(&self.prompt).map_err(EditError::Write)?;
        } else {
            self.mode = InputMode::Raw;
            let mut guard = enter_guard(&mut self.term).map_err(EditError::Terminal)?;
            state.columns = match guard.backend().columns() {
                Some(cols) => cols as usize,
                None => probe_columns(guard.backend(), &mut self.src, opts.escape_timeout)?
                    .unwrap_or(DEFAULT_COLUMNS),
            };
            if opts.mouse {
                guard.backend().write_frame(MOUSE_ENABLE).map_err(EditError::Write)?;
                self.mouse_on = true;
            }
            guard.disarm();
            self.ctx.history.push_transient("");
            state.transient = self.ctx.history.max_len() > 0;
        }

        info!(target: "session", mode = ?self.mode, columns = state.columns, "session_started");
        self.state = Some(state);
        self.phase = Phase::Active;
        if self.mode == InputMode::Raw {
            self.refresh()?;
        }
        Ok(())
    }

    /// Read and apply one key.
    pub fn feed(&mut self) -> Result<FeedOutcome, EditError> {
        if self.phase != Phase::Active || self.state.as_ref().is_none_or(|s| s.finished) {
            return Err(EditError::NotActive);
        }
        if self.mode != InputMode::Raw {
            return self.feed_plain();
        }
        let key = match self.parser.read_key(&mut self.src, None).map_err(EditError::Read)? {
            KeyRead::Key(key) => key,
            KeyRead::Timeout => return Ok(FeedOutcome::Continue),
            KeyRead::Eof => return self.finish_eof(),
        };
        self.handle_key(key)
    }

    /// Restore the terminal and end the session.
    pub fn stop(&mut self) -> Result<(), EditError> {
        if self.phase != Phase::Active {
            return Err(EditError::NotActive);
        }
        let released = self.release();
        self.state = None;
        self.phase = Phase::Done;
        debug!(target: "session", "session_stopped");
        released
    }

    /// Blocking convenience: `start`, feed until an outcome, `stop`.
    pub fn read_line(&mut self) -> Result<FeedOutcome, EditError> {
        self.start()?;
        let outcome = loop {
            match self.feed() {
                Ok(FeedOutcome::Continue) => continue,
                other => break other,
            }
        };
        let stopped = self.stop();
        let outcome = outcome?;
        stopped?;
        Ok(outcome)
    }

    /// Erase the edited line so the host can print above it.
    pub fn hide(&mut self) -> Result<(), EditError> {
        if self.mode != InputMode::Raw {
            return Ok(());
        }
        let mode = self.layout_mode();
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        let bytes = core_render::clear_line(mode, state.geometry);
        state.geometry = Geometry::default();
        self.term.write_frame(&bytes).map_err(EditError::Write)
    }

    /// Repaint the line after `hide`.
    pub fn show(&mut self) -> Result<(), EditError> {
        if self.mode != InputMode::Raw {
            return Ok(());
        }
        if self.state.is_none() {
            return Err(EditError::NotActive);
        }
        self.refresh()
    }

    fn feed_plain(&mut self) -> Result<FeedOutcome, EditError> {
        let limit = self.buffer_limit;
        let line = read_plain_line(&mut self.src, limit)?;
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        state.finished = true;
        let Some(line) = line else {
            debug!(target: "session", mode = ?self.mode, "plain_eof");
            return Ok(FeedOutcome::Eof);
        };
        let line = String::from_utf8_lossy(&line).into_owned();
        if self.ctx.options().auto_history && !line.is_empty() {
            self.ctx.history.add(&line);
        }
        debug!(target: "session", mode = ?self.mode, len = line.len(), "plain_line_read");
        Ok(FeedOutcome::Line(line))
    }

    fn release(&mut self) -> Result<(), EditError> {
        let mut first_err = None;
        if let Some(state) = self.state.as_mut()
            && state.transient
        {
            self.ctx.history.pop_last();
            state.transient = false;
        }
        if self.mouse_on {
            self.mouse_on = false;
            if let Err(e) = self.term.write_frame(MOUSE_DISABLE) {
                first_err = Some(EditError::Write(e));
            }
        }
        if self.mode == InputMode::Raw
            && let Err(e) = self.term.disable_raw_mode()
        {
            first_err.get_or_insert(EditError::Terminal(e));
        }
        first_err.map_or(Ok(()), Err)
    }

    pub(crate) fn layout_mode(&self) -> LayoutMode {
        if self.ctx.options().multiline {
            LayoutMode::MultiLine
        } else {
            LayoutMode::SingleLine
        }
    }

    pub(crate) fn refresh(&mut self) -> Result<(), EditError> {
        self.redraw(true)
    }

    /// Full redraw of the prompt and line (or the shown completion).
    pub(crate) fn redraw(&mut self, with_hint: bool) -> Result<(), EditError> {
        let mode = self.layout_mode();
        let ctx = &*self.ctx;
        let Some(state) = self.state.as_mut() else {
            return Err(EditError::NotActive);
        };
        let shown = state.completion.as_ref().map(|c| c.shown());
        let (bytes, cursor) = match shown {
            Some(Shown::Candidate(candidate)) => (candidate.as_bytes(), candidate.len()),
            _ => (state.buffer.as_bytes(), state.buffer.cursor()),
        };
        let opts = ctx.options();
        let mask = opts.mask.map(|c| c.to_string().into_bytes());
        let classes = match (mask.is_some(), ctx.highlighter()) {
            (false, Some(h)) => Some(h.highlight(bytes)),
            _ => None,
        };
        let hint = match (with_hint && mask.is_none(), ctx.hinter()) {
            (true, Some(h)) => h.hint(&String::from_utf8_lossy(bytes)),
            _ => None,
        };
        let req = RenderRequest::new(&state.prompt, bytes, cursor, state.columns)
            .mode(mode)
            .mask(mask.as_deref())
            .classes(classes.as_deref())
            .hint(hint.as_ref())
            .previous(state.geometry);
        let out = render(&req);
        trace!(target: "session", rows = out.geometry.rows, bytes = out.bytes.len(), "refresh");
        state.geometry = out.geometry;
        state.window_start = out.window_start;
        self.term.write_frame(&out.bytes).map_err(EditError::Write)
    }

    pub(crate) fn beep(&mut self) -> Result<(), EditError> {
        if !self.ctx.options().bell {
            return Ok(());
        }
        self.term.write_frame(BELL).map_err(EditError::Write)
    }
}

impl<T: TerminalBackend, S: ByteSource> Drop for EditSession<'_, T, S> {
    fn drop(&mut self) {
        if self.phase == Phase::Active
            && let Err(e) = self.release()
        {
            warn!(target: "session", error = %e, "restore_on_drop_failed");
        }
    }
}

fn ansi(command: impl Command) -> Vec<u8> {
    let mut s = String::new();
    let _ = command.write_ansi(&mut s);
    s.into_bytes()
}

/// Measure the width by asking for the cursor column, jumping to the right
/// margin, asking again, then moving back.
fn probe_columns<T, S>(
    term: &mut T,
    src: &mut S,
    timeout: Duration,
) -> Result<Option<usize>, EditError>
where
    T: TerminalBackend + ?Sized,
    S: ByteSource + ?Sized,
{
    term.write_frame(CURSOR_POSITION_QUERY).map_err(EditError::Write)?;
    let Some((_, start)) = read_cursor_position(src, timeout).map_err(EditError::Read)? else {
        debug!(target: "session", "width_probe_no_reply");
        return Ok(None);
    };
    let mut query = ansi(crossterm::cursor::MoveRight(999));
    query.extend_from_slice(CURSOR_POSITION_QUERY);
    term.write_frame(&query).map_err(EditError::Write)?;
    let Some((_, end)) = read_cursor_position(src, timeout).map_err(EditError::Read)? else {
        return Ok(None);
    };
    if end > start {
        term.write_frame(&ansi(crossterm::cursor::MoveLeft(end - start)))
            .map_err(EditError::Write)?;
    }
    debug!(target: "session", columns = end, "width_probed");
    Ok(Some(end as usize))
}
