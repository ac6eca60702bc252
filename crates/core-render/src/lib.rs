//! Line rendering: pure computation of the bytes that redraw the edited line.
//!
//! Nothing here performs I/O. A [`RenderRequest`] describes the prompt, the
//! buffer, the cursor and the previous frame's geometry; the result is the
//! exact byte string to write plus the geometry the next frame diffs against.
//!
//! Two layouts exist:
//! - single-line: the buffer scrolls horizontally inside one row, trimming
//!   whole clusters from the left until the cursor fits, then from the right
//!   until the text fits;
//! - multi-line: the buffer wraps across rows (and breaks at embedded `\n`);
//!   the previous rows are cleared bottom-up before the rewrite.
//!
//! Invariants:
//! - Output never splits a grapheme cluster (masking, trimming and highlight
//!   transitions all operate on whole clusters).
//! - The cursor column escape is absolute; relative moves are only vertical.

pub mod layout;
pub mod multi_line;
pub mod single_line;
pub mod style;
pub mod writer;

pub use style::{Hint, TextStyle, class_style};
pub use writer::{Command, Writer};

use layout::Cell;

/// Rows occupied by the last frame and the row the cursor was left on
/// (relative to the first row of the prompt).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub rows: usize,
    pub cursor_row: usize,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            rows: 1,
            cursor_row: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    SingleLine,
    MultiLine,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub prompt: &'a [u8],
    pub prompt_width: usize,
    pub buffer: &'a [u8],
    pub cursor: usize,
    pub columns: usize,
    pub mode: LayoutMode,
    /// Glyph drawn for every cluster in password mode.
    pub mask: Option<&'a [u8]>,
    /// Per-byte highlight classes; ignored in mask mode.
    pub classes: Option<&'a [u8]>,
    pub hint: Option<&'a Hint>,
    pub previous: Geometry,
}

impl<'a> RenderRequest<'a> {
    pub fn new(prompt: &'a [u8], buffer: &'a [u8], cursor: usize, columns: usize) -> Self {
        Self {
            prompt,
            prompt_width: core_text::str_width(prompt),
            buffer,
            cursor,
            columns,
            mode: LayoutMode::SingleLine,
            mask: None,
            classes: None,
            hint: None,
            previous: Geometry::default(),
        }
    }

    pub fn mode(mut self, mode: LayoutMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mask(mut self, glyph: Option<&'a [u8]>) -> Self {
        self.mask = glyph;
        self
    }

    pub fn classes(mut self, classes: Option<&'a [u8]>) -> Self {
        self.classes = classes;
        self
    }

    pub fn hint(mut self, hint: Option<&'a Hint>) -> Self {
        self.hint = hint;
        self
    }

    pub fn previous(mut self, previous: Geometry) -> Self {
        self.previous = previous;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub geometry: Geometry,
    /// Byte offset of the first visible cluster (non-zero only when the
    /// single-line layout scrolled horizontally).
    pub window_start: usize,
}

/// Compute the redraw for `req`.
pub fn render(req: &RenderRequest<'_>) -> RenderOutput {
    match req.mode {
        LayoutMode::SingleLine => single_line::render(req),
        LayoutMode::MultiLine => multi_line::render(req),
    }
}

/// Erase a single-line frame.
pub fn clear_single_line() -> Vec<u8> {
    let mut w = Writer::new();
    w.carriage_return();
    w.clear_to_eol();
    w.into_bytes()
}

/// Erase a multi-line frame, leaving the cursor at column 0 of its first row.
pub fn clear_multi_line(previous: Geometry) -> Vec<u8> {
    let mut w = Writer::new();
    multi_line::clean(&mut w, previous);
    w.into_bytes()
}

/// Erase the frame for whichever layout produced `previous`.
pub fn clear_line(mode: LayoutMode, previous: Geometry) -> Vec<u8> {
    match mode {
        LayoutMode::SingleLine => clear_single_line(),
        LayoutMode::MultiLine => clear_multi_line(previous),
    }
}

/// Clear the whole screen and home the cursor.
pub fn clear_screen() -> Vec<u8> {
    let mut w = Writer::new();
    w.clear_screen();
    w.into_bytes()
}

/// Write `cells` applying highlight transitions; leaves the style reset.
pub(crate) fn emit_cells(w: &mut Writer, cells: &[Cell<'_>], classes: Option<&[u8]>) {
    let mut current = 0u8;
    for cell in cells {
        if let Some(classes) = classes {
            let class = classes.get(cell.start).copied().unwrap_or(0);
            if class != current {
                match class_style(class) {
                    Some(style) => {
                        if current != 0 {
                            w.reset_style();
                        }
                        w.set_style(style);
                    }
                    None => w.reset_style(),
                }
                current = class;
            }
        }
        if cell.newline {
            w.line_break();
        } else {
            w.print(cell.text);
        }
    }
    if current != 0 {
        w.reset_style();
    }
}

/// Write as much of `hint` as fits in `room` columns.
pub(crate) fn emit_hint(w: &mut Writer, hint: Option<&Hint>, room: usize) {
    let Some(hint) = hint else { return };
    let text = layout::truncate_to_width(hint.text.as_bytes(), room);
    if text.is_empty() {
        return;
    }
    match hint.style() {
        Some(style) => {
            w.set_style(style);
            w.print(text);
            w.reset_style();
        }
        None => w.print(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn highlight_transitions_wrap_runs() {
        let mut w = Writer::new();
        let cs = layout::cells(b"ab c", None);
        emit_cells(&mut w, &cs, Some(&[1, 1, 0, 0]));
        assert_eq!(
            String::from_utf8(w.into_bytes()).unwrap(),
            "\x1b[38;5;1mab\x1b[0m c"
        );
    }

    #[test]
    fn highlight_reset_at_end() {
        let mut w = Writer::new();
        let cs = layout::cells(b"x", None);
        emit_cells(&mut w, &cs, Some(&[200]));
        assert_eq!(
            String::from_utf8(w.into_bytes()).unwrap(),
            "\x1b[38;5;200mx\x1b[0m"
        );
    }

    #[test]
    fn clear_helpers() {
        assert_eq!(clear_single_line(), b"\r\x1b[K".to_vec());
        assert_eq!(
            clear_multi_line(Geometry {
                rows: 2,
                cursor_row: 0
            }),
            b"\x1b[1B\r\x1b[K\x1b[1A\r\x1b[K".to_vec()
        );
    }
}
