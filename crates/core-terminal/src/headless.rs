//! In-memory terminal for tests and embedding without a TTY.

use std::io;

use crate::{TerminalBackend, TerminalCapabilities};

#[derive(Debug, Clone)]
pub struct HeadlessTerminal {
    columns: Option<u16>,
    capabilities: TerminalCapabilities,
    raw: bool,
    raw_transitions: usize,
    fail_raw_mode: bool,
    output: Vec<u8>,
}

impl HeadlessTerminal {
    pub fn new(columns: u16) -> Self {
        Self {
            columns: Some(columns),
            capabilities: TerminalCapabilities::interactive(Some("xterm")),
            raw: false,
            raw_transitions: 0,
            fail_raw_mode: false,
            output: Vec::new(),
        }
    }

    /// Terminal that cannot report its width (forces the DSR probe path).
    pub fn without_size() -> Self {
        Self {
            columns: None,
            ..Self::new(80)
        }
    }

    pub fn with_capabilities(mut self, capabilities: TerminalCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Make `enable_raw_mode` fail, as on a descriptor that is not a TTY.
    pub fn failing_raw_mode(mut self) -> Self {
        self.fail_raw_mode = true;
        self
    }

    pub fn set_columns(&mut self, columns: u16) {
        self.columns = Some(columns);
    }

    /// Number of actual raw-mode state changes.
    pub fn raw_transitions(&self) -> usize {
        self.raw_transitions
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Drain captured output.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

impl TerminalBackend for HeadlessTerminal {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if self.fail_raw_mode {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "raw mode unavailable",
            ));
        }
        if !self.raw {
            self.raw = true;
            self.raw_transitions += 1;
        }
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if self.raw {
            self.raw = false;
            self.raw_transitions += 1;
        }
        Ok(())
    }

    fn is_raw(&self) -> bool {
        self.raw
    }

    fn columns(&self) -> Option<u16> {
        self.columns
    }

    fn capabilities(&self) -> TerminalCapabilities {
        self.capabilities.clone()
    }

    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_toggles_are_idempotent() {
        let mut t = HeadlessTerminal::new(80);
        t.enable_raw_mode().unwrap();
        t.enable_raw_mode().unwrap();
        t.disable_raw_mode().unwrap();
        t.disable_raw_mode().unwrap();
        assert_eq!(t.raw_transitions(), 2);
    }

    #[test]
    fn captures_frames() {
        let mut t = HeadlessTerminal::new(80);
        t.write_frame(b"> ").unwrap();
        t.write_frame(b"hi").unwrap();
        assert_eq!(t.output_lossy(), "> hi");
        assert_eq!(t.take_output(), b"> hi");
        assert!(t.output().is_empty());
    }
}
