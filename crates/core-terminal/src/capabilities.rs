//! Terminal capability probing.
//!
//! Detection runs once per session start and records whether the input is an
//! interactive TTY and whether `TERM` names a terminal known to mishandle the
//! cursor-control sequences the renderer emits.

use std::io::IsTerminal;

/// `TERM` values that get a bare prompt-and-read instead of in-place editing.
pub const UNSUPPORTED_TERMS: &[&str] = &["dumb", "cons25", "emacs"];

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    pub input_is_tty: bool,
    pub output_is_tty: bool,
    pub term: Option<String>,
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self::interactive(None)
    }
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        Self {
            input_is_tty: std::io::stdin().is_terminal(),
            output_is_tty: std::io::stdout().is_terminal(),
            term: std::env::var("TERM").ok(),
        }
    }

    /// Capabilities of a fully interactive terminal with the given `TERM`.
    pub fn interactive(term: Option<&str>) -> Self {
        Self {
            input_is_tty: true,
            output_is_tty: true,
            term: term.map(str::to_owned),
        }
    }

    /// Capabilities of redirected input (pipe or file).
    pub fn piped() -> Self {
        Self {
            input_is_tty: false,
            output_is_tty: false,
            term: None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.input_is_tty
    }

    /// False when `TERM` is on the denylist.
    pub fn is_supported(&self) -> bool {
        self.term.as_deref().is_none_or(|t| !is_unsupported_term(t))
    }
}

pub fn is_unsupported_term(term: &str) -> bool {
    UNSUPPORTED_TERMS
        .iter()
        .any(|bad| bad.eq_ignore_ascii_case(term.trim()))
}
