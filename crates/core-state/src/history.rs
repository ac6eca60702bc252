//! Bounded line history with newline-delimited file persistence.
//!
//! The file format is one UTF-8 entry per line. Entries containing `\n`
//! cannot round-trip through a file; they are written as-is and load back as
//! separate entries.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, trace};

pub const DEFAULT_HISTORY_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
    max_len: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_MAX_LEN)
    }
}

impl History {
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_len,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn max_len(&self) -> usize {
        self.max_len
    }
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Append `line`. A repeat of the newest entry is ignored; at capacity the
    /// oldest entry is dropped. Returns whether the history changed.
    pub fn add(&mut self, line: &str) -> bool {
        if self.max_len == 0 || self.last() == Some(line) {
            return false;
        }
        self.push(line.to_owned());
        trace!(target: "state.history", len = self.entries.len(), "entry_added");
        true
    }

    fn push(&mut self, line: String) {
        while self.entries.len() >= self.max_len {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }

    /// Append the in-progress slot used while a line is being edited.
    /// Bypasses duplicate suppression and the capacity limit, so the slot
    /// always exists and popping it leaves the stored entries untouched.
    pub fn push_transient(&mut self, line: &str) {
        if self.max_len == 0 {
            return;
        }
        self.entries.push_back(line.to_owned());
    }

    /// Overwrite the entry at `index` (used to stash the edited line).
    pub fn set(&mut self, index: usize, line: &str) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) => {
                slot.clear();
                slot.push_str(line);
                true
            }
            None => false,
        }
    }

    pub fn pop_last(&mut self) -> Option<String> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Change the capacity, keeping the newest entries. Zero is rejected.
    pub fn set_max_len(&mut self, max_len: usize) -> bool {
        if max_len == 0 {
            return false;
        }
        while self.entries.len() > max_len {
            self.entries.pop_front();
        }
        self.max_len = max_len;
        debug!(target: "state.history", max_len, len = self.entries.len(), "max_len_set");
        true
    }

    /// Write every entry to `path`, one per line. On unix the file is
    /// created readable by the owner only.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut opts = OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        let mut out = BufWriter::new(opts.open(path)?);
        for entry in &self.entries {
            out.write_all(entry.as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        debug!(target: "state.history", entries = self.entries.len(), "saved");
        Ok(())
    }

    /// Append the entries of `path`. Returns the number of lines read.
    pub fn load(&mut self, path: &Path) -> io::Result<usize> {
        let text = fs::read_to_string(path)?;
        let mut lines = 0;
        for line in text.lines() {
            self.add(line.strip_suffix('\r').unwrap_or(line));
            lines += 1;
        }
        debug!(target: "state.history", lines, len = self.entries.len(), "loaded");
        Ok(lines)
    }
}
