use core_render::Geometry;
use core_state::CompletionCycle;
use core_text::LineBuffer;

/// Per-line editing state, created by `start` and dropped by `stop`.
///
/// Invariant: `cursor <= len <= limit`, enforced by [`LineBuffer`]. While a
/// completion cycle is active the buffer still holds the original line; the
/// displayed candidate is only committed when a non-Tab key arrives.
#[derive(Debug, Clone)]
pub struct EditState {
    pub(crate) buffer: LineBuffer,
    pub(crate) prompt: Vec<u8>,
    pub(crate) columns: usize,
    pub(crate) geometry: Geometry,
    pub(crate) window_start: usize,
    /// Steps back from the newest history entry; 0 is the in-progress slot.
    pub(crate) history_index: usize,
    pub(crate) completion: Option<CompletionCycle>,
    /// The in-progress history slot has been pushed and not yet removed.
    pub(crate) transient: bool,
    /// A terminal outcome was returned; further feeds are rejected.
    pub(crate) finished: bool,
}

impl EditState {
    pub(crate) fn new(prompt: &[u8], limit: Option<usize>) -> Self {
        Self {
            buffer: limit.map_or_else(LineBuffer::new, LineBuffer::with_limit),
            prompt: prompt.to_vec(),
            columns: crate::session::DEFAULT_COLUMNS,
            geometry: Geometry::default(),
            window_start: 0,
            history_index: 0,
            completion: None,
            transient: false,
            finished: false,
        }
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn prompt(&self) -> &[u8] {
        &self.prompt
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn is_completing(&self) -> bool {
        self.completion.is_some()
    }
}
