//! Display cells and row/column walking.
//!
//! The buffer is split into grapheme clusters once per frame. In mask mode
//! every cluster except a line break is displayed as the mask glyph, so all
//! width accounting runs over what is shown rather than what is stored.

use core_text::grapheme;
use core_text::{cluster_width, str_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a> {
    /// Byte range of the cluster in the edited buffer.
    pub start: usize,
    pub end: usize,
    /// Bytes written to the terminal for this cluster.
    pub text: &'a [u8],
    pub width: usize,
    pub newline: bool,
}

pub fn cells<'a>(buffer: &'a [u8], mask: Option<&'a [u8]>) -> Vec<Cell<'a>> {
    let mask_width = mask.map(str_width).unwrap_or(0);
    grapheme::clusters(buffer)
        .map(|(start, cluster)| {
            let newline = cluster == b"\n";
            let (text, width) = match mask {
                _ if newline => (cluster, 0),
                Some(glyph) => (glyph, mask_width),
                None => (cluster, cluster_width(cluster)),
            };
            Cell {
                start,
                end: start + cluster.len(),
                text,
                width,
                newline,
            }
        })
        .collect()
}

/// Index of the first cell at or after byte offset `cursor`.
pub fn cell_index(cells: &[Cell<'_>], cursor: usize) -> usize {
    cells.partition_point(|c| c.start < cursor)
}

/// Position of the terminal cursor while writing a wrapped layout.
///
/// `col == columns` is the pending-wrap state: the row is full but the
/// terminal has not moved to the next row yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

/// Position after printing `prompt_width` columns from the origin.
pub fn after_prompt(prompt_width: usize, columns: usize) -> Pos {
    let mut pos = Pos {
        row: 0,
        col: prompt_width,
    };
    while pos.col > columns {
        pos.row += 1;
        pos.col -= columns;
    }
    pos
}

/// Advance `pos` over one cell.
pub fn advance(pos: Pos, cell: &Cell<'_>, columns: usize) -> Pos {
    if cell.newline {
        return Pos {
            row: pos.row + 1,
            col: 0,
        };
    }
    if pos.col + cell.width > columns {
        Pos {
            row: pos.row + 1,
            col: cell.width,
        }
    } else {
        Pos {
            row: pos.row,
            col: pos.col + cell.width,
        }
    }
}

/// Walk `cells` starting after the prompt.
pub fn walk(prompt_width: usize, cells: &[Cell<'_>], columns: usize) -> Pos {
    cells.iter().fold(after_prompt(prompt_width, columns), |pos, c| {
        advance(pos, c, columns)
    })
}

/// Where the cursor is drawn when it sits before `cells[index]`.
///
/// A pending wrap resolves onto the next row, except in front of a line
/// break where the cursor stays on the last column of the full row.
pub fn cursor_pos(prompt_width: usize, cells: &[Cell<'_>], index: usize, columns: usize) -> Pos {
    let pos = walk(prompt_width, &cells[..index], columns);
    if pos.col < columns {
        return pos;
    }
    match cells.get(index) {
        Some(next) if next.newline => Pos {
            row: pos.row,
            col: columns.saturating_sub(1),
        },
        Some(_) => Pos {
            row: pos.row + 1,
            col: 0,
        },
        None => pos,
    }
}

/// Longest prefix of `text` (whole clusters) fitting in `max_width` columns.
pub fn truncate_to_width(text: &[u8], max_width: usize) -> &[u8] {
    let mut used = 0;
    let mut end = 0;
    for (start, cluster) in grapheme::clusters(text) {
        let w = cluster_width(cluster);
        if used + w > max_width {
            break;
        }
        used += w;
        end = start + cluster.len();
    }
    &text[..end]
}
