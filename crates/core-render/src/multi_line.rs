use tracing::trace;

use crate::layout::{self, Pos};
use crate::{Geometry, RenderOutput, RenderRequest, Writer, emit_cells, emit_hint};

/// Erase the rows of the previous frame bottom-up, ending on its first row.
pub(crate) fn clean(w: &mut Writer, previous: Geometry) {
    let rows = previous.rows.max(1);
    w.move_down(rows.saturating_sub(previous.cursor_row + 1));
    for _ in 1..rows {
        w.carriage_return();
        w.clear_to_eol();
        w.move_up(1);
    }
    w.carriage_return();
    w.clear_to_eol();
}

pub fn render(req: &RenderRequest<'_>) -> RenderOutput {
    let columns = req.columns.max(1);
    let cells = layout::cells(req.buffer, req.mask);
    let classes = if req.mask.is_some() { None } else { req.classes };

    let mut w = Writer::new();
    clean(&mut w, req.previous);
    w.print(req.prompt);
    emit_cells(&mut w, &cells, classes);

    let end = layout::walk(req.prompt_width, &cells, columns);
    if end.col < columns {
        emit_hint(&mut w, req.hint, columns - end.col);
    }

    let cursor_index = layout::cell_index(&cells, req.cursor);
    let mut last_row = end.row;
    let cursor = if cursor_index == cells.len() && end.col == columns {
        // Content ends on the right margin: move to a fresh row so the
        // cursor is not left in the terminal's pending-wrap state.
        w.line_break();
        last_row += 1;
        Pos {
            row: last_row,
            col: 0,
        }
    } else {
        layout::cursor_pos(req.prompt_width, &cells, cursor_index, columns)
    };

    w.move_up(last_row - cursor.row);
    w.carriage_return();
    if cursor.col > 0 {
        w.move_to_column(cursor.col);
    }

    let geometry = Geometry {
        rows: last_row + 1,
        cursor_row: cursor.row,
    };
    trace!(
        target: "render",
        rows = geometry.rows,
        cursor_row = geometry.cursor_row,
        prev_rows = req.previous.rows,
        "multi_line_refresh"
    );
    RenderOutput {
        bytes: w.into_bytes(),
        geometry,
        window_start: 0,
    }
}
