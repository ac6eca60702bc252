//! Terminal backend abstraction and crossterm implementation.
//!
//! The backend owns raw-mode toggling and the output stream. Raw mode is
//! tracked with an `entered` flag so enabling or disabling twice is a no-op,
//! and both the backend and [`RawModeGuard`] restore the terminal on drop.

use std::io::{self, Write};

use tracing::{debug, warn};

pub mod capabilities;
pub mod headless;
pub use capabilities::{TerminalCapabilities, UNSUPPORTED_TERMS, is_unsupported_term};
pub use headless::HeadlessTerminal;

/// Turns on press/release reporting in SGR encoding.
pub const MOUSE_ENABLE: &[u8] = b"\x1b[?1000h\x1b[?1006h";
pub const MOUSE_DISABLE: &[u8] = b"\x1b[?1000l\x1b[?1006l";
/// Device status report: asks the terminal for the cursor position.
pub const CURSOR_POSITION_QUERY: &[u8] = b"\x1b[6n";
pub const BELL: &[u8] = b"\x07";

pub trait TerminalBackend {
    fn enable_raw_mode(&mut self) -> io::Result<()>;
    fn disable_raw_mode(&mut self) -> io::Result<()>;
    fn is_raw(&self) -> bool;
    /// Terminal width, when the platform can report it.
    fn columns(&self) -> Option<u16>;
    fn capabilities(&self) -> TerminalCapabilities;
    /// Write one frame of output and flush it.
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<T: TerminalBackend + ?Sized> TerminalBackend for &mut T {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        (**self).enable_raw_mode()
    }
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        (**self).disable_raw_mode()
    }
    fn is_raw(&self) -> bool {
        (**self).is_raw()
    }
    fn columns(&self) -> Option<u16> {
        (**self).columns()
    }
    fn capabilities(&self) -> TerminalCapabilities {
        (**self).capabilities()
    }
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_frame(bytes)
    }
}

impl<T: TerminalBackend + ?Sized> TerminalBackend for Box<T> {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        (**self).enable_raw_mode()
    }
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        (**self).disable_raw_mode()
    }
    fn is_raw(&self) -> bool {
        (**self).is_raw()
    }
    fn columns(&self) -> Option<u16> {
        (**self).columns()
    }
    fn capabilities(&self) -> TerminalCapabilities {
        (**self).capabilities()
    }
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_frame(bytes)
    }
}

pub struct CrosstermBackend {
    entered: bool,
    out: io::Stdout,
}

/// RAII guard ensuring raw mode is left even if the caller early-returns or panics.
pub struct RawModeGuard<'a, B: TerminalBackend + ?Sized> {
    backend: &'a mut B,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            entered: false,
            out: io::stdout(),
        }
    }
}

/// Enable raw mode and return a guard that disables it on drop.
pub fn enter_guard<B: TerminalBackend + ?Sized>(
    backend: &mut B,
) -> io::Result<RawModeGuard<'_, B>> {
    backend.enable_raw_mode()?;
    Ok(RawModeGuard {
        backend,
        active: true,
    })
}

impl<B: TerminalBackend + ?Sized> RawModeGuard<'_, B> {
    pub fn backend(&mut self) -> &mut B {
        self.backend
    }

    /// Keep raw mode enabled after the guard is dropped.
    pub fn disarm(mut self) {
        self.active = false;
    }
}

impl<B: TerminalBackend + ?Sized> Drop for RawModeGuard<'_, B> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.disable_raw_mode();
        }
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !self.entered {
            crossterm::terminal::enable_raw_mode()?;
            self.entered = true;
            debug!(target: "terminal", "raw_mode_enabled");
        }
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if self.entered {
            crossterm::terminal::disable_raw_mode()?;
            self.entered = false;
            debug!(target: "terminal", "raw_mode_disabled");
        }
        Ok(())
    }

    fn is_raw(&self) -> bool {
        self.entered
    }

    fn columns(&self) -> Option<u16> {
        match crossterm::terminal::size() {
            Ok((cols, _)) if cols > 0 => Some(cols),
            Ok(_) => None,
            Err(e) => {
                debug!(target: "terminal", error = %e, "size_query_failed");
                None
            }
        }
    }

    fn capabilities(&self) -> TerminalCapabilities {
        TerminalCapabilities::detect()
    }

    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut out = self.out.lock();
        out.write_all(bytes)?;
        out.flush()
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        if let Err(e) = self.disable_raw_mode() {
            warn!(target: "terminal", error = %e, "raw_mode_restore_failed");
        }
    }
}

/// Best-effort restore for paths that cannot unwind normally (panic hook,
/// allocation failure while building output). Never fails.
pub fn emergency_restore() {
    let _ = crossterm::terminal::disable_raw_mode();
    let mut out = io::stdout();
    let _ = out.write_all(MOUSE_DISABLE);
    let _ = out.write_all(b"\r\n");
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_restores_on_drop() {
        let mut term = HeadlessTerminal::new(80);
        {
            let guard = enter_guard(&mut term).unwrap();
            assert!(guard.backend.is_raw());
        }
        assert!(!term.is_raw());
        assert_eq!(term.raw_transitions(), 2);
    }

    #[test]
    fn disarmed_guard_leaves_raw_mode_on() {
        let mut term = HeadlessTerminal::new(80);
        enter_guard(&mut term).unwrap().disarm();
        assert!(term.is_raw());
    }

    #[test]
    fn boxed_backend_forwards() {
        let mut term: Box<dyn TerminalBackend> = Box::new(HeadlessTerminal::new(40));
        term.write_frame(b"x").unwrap();
        assert_eq!(term.columns(), Some(40));
    }
}
