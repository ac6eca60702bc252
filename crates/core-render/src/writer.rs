//! Output command list.
//!
//! Renderers push primitive terminal operations in order; [`Writer::into_bytes`]
//! serialises them in one pass through crossterm's ANSI encoders so the whole
//! frame reaches the terminal in a single write. The writer performs no I/O.
//!
//! Invariants:
//! * Commands preserve ordering.
//! * Relative moves are never emitted with a zero count.
//! * Text is carried as raw bytes so input is echoed exactly as received.

use std::fmt;

use crossterm::cursor::{MoveDown, MoveTo, MoveToColumn, MoveUp};
use crossterm::style::{Attribute, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::style::TextStyle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CarriageReturn,
    /// CR LF: next row, column 0.
    LineBreak,
    Print(Vec<u8>),
    ClearToEndOfLine,
    /// 0-based absolute column.
    MoveToColumn(u16),
    MoveUp(u16),
    MoveDown(u16),
    SetStyle(TextStyle),
    ResetStyle,
    ClearScreen,
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

fn ansi(scratch: &mut String, cmd: impl crossterm::Command) -> fmt::Result {
    cmd.write_ansi(scratch)
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn carriage_return(&mut self) {
        self.cmds.push(Command::CarriageReturn);
    }

    pub fn line_break(&mut self) {
        self.cmds.push(Command::LineBreak);
    }

    pub fn print(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        // Coalesce adjacent text so a frame stays a short command list.
        if let Some(Command::Print(last)) = self.cmds.last_mut() {
            last.extend_from_slice(bytes);
        } else {
            self.cmds.push(Command::Print(bytes.to_vec()));
        }
    }

    pub fn clear_to_eol(&mut self) {
        self.cmds.push(Command::ClearToEndOfLine);
    }

    pub fn move_to_column(&mut self, col: usize) {
        self.cmds.push(Command::MoveToColumn(clamp_u16(col)));
    }

    pub fn move_up(&mut self, n: usize) {
        if n > 0 {
            self.cmds.push(Command::MoveUp(clamp_u16(n)));
        }
    }

    pub fn move_down(&mut self, n: usize) {
        if n > 0 {
            self.cmds.push(Command::MoveDown(clamp_u16(n)));
        }
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.cmds.push(Command::SetStyle(style));
    }

    pub fn reset_style(&mut self) {
        self.cmds.push(Command::ResetStyle);
    }

    pub fn clear_screen(&mut self) {
        self.cmds.push(Command::ClearScreen);
    }

    fn encode(cmd: &Command, scratch: &mut String) -> fmt::Result {
        match cmd {
            Command::CarriageReturn => scratch.push('\r'),
            Command::LineBreak => scratch.push_str("\r\n"),
            Command::Print(_) => {}
            Command::ClearToEndOfLine => ansi(scratch, Clear(ClearType::UntilNewLine))?,
            Command::MoveToColumn(c) => ansi(scratch, MoveToColumn(*c))?,
            Command::MoveUp(n) => ansi(scratch, MoveUp(*n))?,
            Command::MoveDown(n) => ansi(scratch, MoveDown(*n))?,
            Command::SetStyle(style) => {
                if let Some(color) = style.color {
                    ansi(scratch, SetForegroundColor(color))?;
                }
                if style.bold {
                    ansi(scratch, SetAttribute(Attribute::Bold))?;
                }
            }
            Command::ResetStyle => ansi(scratch, SetAttribute(Attribute::Reset))?,
            Command::ClearScreen => {
                ansi(scratch, Clear(ClearType::All))?;
                ansi(scratch, MoveTo(0, 0))?;
            }
        }
        Ok(())
    }

    /// Serialise the frame.
    ///
    /// Allocation failure here cannot be reported to anyone who could recover
    /// the terminal, so the process restores the terminal and aborts.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        let mut scratch = String::new();
        for cmd in &self.cmds {
            scratch.clear();
            let piece: &[u8] = match cmd {
                Command::Print(bytes) => bytes,
                other => {
                    if Self::encode(other, &mut scratch).is_err() {
                        continue;
                    }
                    scratch.as_bytes()
                }
            };
            if out.try_reserve(piece.len()).is_err() {
                core_terminal::emergency_restore();
                std::process::abort();
            }
            out.extend_from_slice(piece);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escapes_use_one_based_columns() {
        let mut w = Writer::new();
        w.carriage_return();
        w.print(b"> ");
        w.print(b"hi");
        w.clear_to_eol();
        w.move_to_column(4);
        assert_eq!(w.commands().len(), 4);
        assert_eq!(w.into_bytes(), b"\r> hi\x1b[K\x1b[5G".to_vec());
    }

    #[test]
    fn zero_moves_are_dropped() {
        let mut w = Writer::new();
        w.move_up(0);
        w.move_down(0);
        w.move_up(2);
        w.move_down(1);
        assert_eq!(w.into_bytes(), b"\x1b[2A\x1b[1B".to_vec());
    }

    #[test]
    fn clear_screen_homes_cursor() {
        let mut w = Writer::new();
        w.clear_screen();
        assert_eq!(w.into_bytes(), b"\x1b[2J\x1b[1;1H".to_vec());
    }
}
