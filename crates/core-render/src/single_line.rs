use tracing::trace;

use crate::layout::{self, Cell};
use crate::{Geometry, RenderOutput, RenderRequest, Writer, emit_cells, emit_hint};

/// Visible cell window `[start, end)` and the cursor's width inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub cursor_width: usize,
    pub width: usize,
}

/// Trim clusters from the left until the cursor fits, then from the right
/// until the text fits.
pub fn window(
    prompt_width: usize,
    cells: &[Cell<'_>],
    cursor_index: usize,
    columns: usize,
) -> Window {
    let mut start = 0;
    let mut end = cells.len();
    let mut cursor_width: usize = cells[..cursor_index].iter().map(|c| c.width).sum();
    while prompt_width + cursor_width >= columns && start < cursor_index {
        cursor_width -= cells[start].width;
        start += 1;
    }
    let mut width: usize = cells[start..end].iter().map(|c| c.width).sum();
    while prompt_width + width > columns && end > cursor_index {
        end -= 1;
        width -= cells[end].width;
    }
    Window {
        start,
        end,
        cursor_width,
        width,
    }
}

pub fn render(req: &RenderRequest<'_>) -> RenderOutput {
    let columns = req.columns.max(1);
    let cells = layout::cells(req.buffer, req.mask);
    let cursor_index = layout::cell_index(&cells, req.cursor);
    let win = window(req.prompt_width, &cells, cursor_index, columns);
    let classes = if req.mask.is_some() { None } else { req.classes };

    let mut w = Writer::new();
    w.carriage_return();
    w.print(req.prompt);
    emit_cells(&mut w, &cells[win.start..win.end], classes);
    let used = req.prompt_width + win.width;
    emit_hint(&mut w, req.hint, columns.saturating_sub(used));
    w.clear_to_eol();
    w.move_to_column(req.prompt_width + win.cursor_width);

    let window_start = cells.get(win.start).map_or(req.buffer.len(), |c| c.start);
    if win.start > 0 || win.end < cells.len() {
        trace!(
            target: "render",
            trimmed_left = win.start,
            trimmed_right = cells.len() - win.end,
            "single_line_scrolled"
        );
    }
    RenderOutput {
        bytes: w.into_bytes(),
        geometry: Geometry {
            rows: 1,
            cursor_row: 0,
        },
        window_start,
    }
}
