use std::fmt;

use core_config::EditorOptions;
use core_render::Hint;
use core_state::{History, UndoEngine};

/// Produces completion candidates for the current line.
pub trait Completer {
    fn complete(&self, line: &str) -> Vec<String>;
}

impl<F> Completer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn complete(&self, line: &str) -> Vec<String> {
        self(line)
    }
}

/// Suggests text shown greyed out after the line.
pub trait Hinter {
    fn hint(&self, line: &str) -> Option<Hint>;
}

impl<F> Hinter for F
where
    F: Fn(&str) -> Option<Hint>,
{
    fn hint(&self, line: &str) -> Option<Hint> {
        self(line)
    }
}

/// Returns one highlight class per byte of the line: 0 for none, 1-15 for
/// the legacy colours (bit 3 = bold), 16-255 for a palette index.
pub trait Highlighter {
    fn highlight(&self, line: &[u8]) -> Vec<u8>;
}

impl<F> Highlighter for F
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    fn highlight(&self, line: &[u8]) -> Vec<u8> {
        self(line)
    }
}

/// State that outlives individual edit sessions.
pub struct EditorContext {
    pub history: History,
    pub undo: UndoEngine,
    options: EditorOptions,
    completer: Option<Box<dyn Completer>>,
    hinter: Option<Box<dyn Hinter>>,
    highlighter: Option<Box<dyn Highlighter>>,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}

impl fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorContext")
            .field("history_len", &self.history.len())
            .field("undo_depth", &self.undo.undo_depth())
            .field("options", &self.options)
            .field("completer", &self.completer.is_some())
            .field("hinter", &self.hinter.is_some())
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}

impl EditorContext {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            history: History::new(options.history_max_len),
            undo: UndoEngine::new(options.undo_max_depth),
            options,
            completer: None,
            hinter: None,
            highlighter: None,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn set_completer(&mut self, completer: impl Completer + 'static) {
        self.completer = Some(Box::new(completer));
    }

    pub fn set_hinter(&mut self, hinter: impl Hinter + 'static) {
        self.hinter = Some(Box::new(hinter));
    }

    pub fn set_highlighter(&mut self, highlighter: impl Highlighter + 'static) {
        self.highlighter = Some(Box::new(highlighter));
    }

    pub fn clear_callbacks(&mut self) {
        self.completer = None;
        self.hinter = None;
        self.highlighter = None;
    }

    pub fn set_multiline(&mut self, on: bool) {
        self.options.multiline = on;
    }

    /// Password mode: every cluster renders as the configured mask glyph.
    pub fn set_mask(&mut self, on: bool) {
        self.options.set_mask(on);
    }

    /// Takes effect at the next session start.
    pub fn set_mouse(&mut self, on: bool) {
        self.options.mouse = on;
    }

    pub fn set_history_max_len(&mut self, max_len: usize) -> bool {
        let changed = self.history.set_max_len(max_len);
        if changed {
            self.options.history_max_len = max_len;
        }
        changed
    }

    pub(crate) fn completer(&self) -> Option<&dyn Completer> {
        self.completer.as_deref()
    }

    pub(crate) fn hinter(&self) -> Option<&dyn Hinter> {
        self.hinter.as_deref()
    }

    pub(crate) fn highlighter(&self) -> Option<&dyn Highlighter> {
        self.highlighter.as_deref()
    }

    /// True when an append can be echoed without a full redraw.
    pub(crate) fn plain_echo(&self) -> bool {
        self.options.mask.is_none() && self.hinter.is_none() && self.highlighter.is_none()
    }
}
