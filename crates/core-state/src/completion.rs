//! Tab-completion cycling.
//!
//! A cycle holds the candidates produced for the line as it was when Tab was
//! first pressed. The index runs over `0..=count`; `count` shows the original
//! line again.

use tracing::{trace, warn};

pub const DEFAULT_MAX_CANDIDATES: usize = 100;

/// What the session should display for the current cycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shown<'a> {
    Candidate(&'a str),
    Original,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCycle {
    candidates: Vec<String>,
    index: usize,
    original: Vec<u8>,
    original_cursor: usize,
}

impl CompletionCycle {
    /// Begin cycling. Returns `None` when there are no candidates; more than
    /// `max` candidates are truncated.
    pub fn start(
        mut candidates: Vec<String>,
        max: usize,
        original: &[u8],
        original_cursor: usize,
    ) -> Option<Self> {
        if candidates.is_empty() {
            trace!(target: "state.completion", "no_candidates");
            return None;
        }
        if candidates.len() > max {
            warn!(target: "state.completion", produced = candidates.len(), max, "candidates_truncated");
            candidates.truncate(max.max(1));
        }
        trace!(target: "state.completion", count = candidates.len(), "cycle_started");
        Some(Self {
            candidates,
            index: 0,
            original: original.to_vec(),
            original_cursor,
        })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn shown(&self) -> Shown<'_> {
        match self.candidates.get(self.index) {
            Some(c) => Shown::Candidate(c),
            None => Shown::Original,
        }
    }

    /// Move to the next position. Returns true when the cycle lands on the
    /// original line (the caller rings the bell).
    pub fn advance(&mut self) -> bool {
        self.index = (self.index + 1) % (self.candidates.len() + 1);
        self.index == self.candidates.len()
    }

    pub fn original(&self) -> (&[u8], usize) {
        (&self.original, self.original_cursor)
    }
}
