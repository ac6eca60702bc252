//! Byte-to-key state machine.
//!
//! One call to [`KeyParser::read_key`] consumes exactly the bytes of one
//! logical key. The machine is table-shaped: every `(State, ByteClass)` pair
//! has an explicit arm, so an unexpected byte always lands somewhere visible
//! instead of falling through.
//!
//! A byte that cuts a sequence short (an `ESC` inside a CSI sequence, an
//! ASCII byte where a UTF-8 continuation was expected) ends the broken key
//! and is kept back as the first byte of the next one.

use std::io;
use std::time::Duration;

use core_events::KeyEvent;
use core_text::utf8;
use tracing::trace;

use crate::key_token::{decode_csi, decode_meta, decode_ss3};
use crate::source::{ByteRead, ByteSource};

pub const DEFAULT_ESCAPE_TIMEOUT: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 16;

/// Result of one parse step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRead {
    Key(KeyEvent),
    /// Nothing arrived within the caller's wait; no bytes were consumed.
    Timeout,
    /// Input closed before a key started.
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    SawEsc,
    SawCsi,
    SawCsiParam,
    /// Parameter scratch overflowed; swallow bytes up to the final byte.
    CsiOverflow,
    SawSs3,
    Utf8 { remaining: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteClass {
    Control,
    Escape,
    Delete,
    Digit,
    Separator,
    /// Remaining CSI parameter/intermediate bytes (0x20..=0x3F).
    ParamByte,
    FinalByte,
    /// UTF-8 lead byte carrying the number of continuation bytes.
    Utf8Lead(u8),
    Continuation,
    Invalid,
}

fn classify(byte: u8) -> ByteClass {
    match byte {
        0x1B => ByteClass::Escape,
        0x00..=0x1F => ByteClass::Control,
        0x7F => ByteClass::Delete,
        b'0'..=b'9' => ByteClass::Digit,
        b';' => ByteClass::Separator,
        0x20..=0x3F => ByteClass::ParamByte,
        0x40..=0x7E => ByteClass::FinalByte,
        0x80..=0xBF => ByteClass::Continuation,
        0xC2..=0xF4 => ByteClass::Utf8Lead((utf8::byte_len(byte) - 1) as u8),
        _ => ByteClass::Invalid,
    }
}

enum Step {
    Next(State),
    Emit(KeyEvent),
    /// Emit the key and hold the current byte for the next read.
    EmitAndKeep(KeyEvent),
}

/// Converts raw terminal bytes into [`KeyEvent`]s.
#[derive(Debug, Clone)]
pub struct KeyParser {
    escape_timeout: Duration,
    max_sequence_len: usize,
    scratch: Vec<u8>,
    pending: Option<u8>,
}

impl Default for KeyParser {
    fn default() -> Self {
        Self::new(DEFAULT_ESCAPE_TIMEOUT, DEFAULT_MAX_SEQUENCE_LEN)
    }
}

impl KeyParser {
    pub fn new(escape_timeout: Duration, max_sequence_len: usize) -> Self {
        let max_sequence_len = max_sequence_len.max(1);
        Self {
            escape_timeout,
            max_sequence_len,
            scratch: Vec::with_capacity(max_sequence_len),
            pending: None,
        }
    }

    pub fn escape_timeout(&self) -> Duration {
        self.escape_timeout
    }

    /// True when a byte held back from an interrupted sequence is waiting,
    /// so the next `read_key` returns without touching the source.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Read one key. `wait` bounds only the first byte; once a sequence has
    /// started each further byte waits at most the escape timeout.
    pub fn read_key<S>(&mut self, src: &mut S, wait: Option<Duration>) -> io::Result<KeyRead>
    where
        S: ByteSource + ?Sized,
    {
        self.scratch.clear();
        let mut state = State::Start;
        loop {
            let timeout = match state {
                State::Start => wait,
                _ => Some(self.escape_timeout),
            };
            let read = match self.pending.take() {
                Some(b) => ByteRead::Byte(b),
                None => src.read_byte(timeout)?,
            };
            let byte = match read {
                ByteRead::Byte(b) => b,
                ByteRead::Timeout => return Ok(self.interrupted(state, "timeout")),
                ByteRead::Eof => {
                    if state == State::Start {
                        return Ok(KeyRead::Eof);
                    }
                    return Ok(self.interrupted(state, "eof"));
                }
            };
            let (key, keep) = match self.step(state, byte) {
                Step::Next(next) => {
                    state = next;
                    continue;
                }
                Step::Emit(key) => (key, false),
                Step::EmitAndKeep(key) => (key, true),
            };
            if keep {
                self.pending = Some(byte);
            }
            if key == KeyEvent::Unknown {
                trace!(
                    target: "input.parser",
                    seq_len = self.scratch.len(),
                    byte,
                    kept = keep,
                    "unknown_sequence"
                );
            }
            return Ok(KeyRead::Key(key));
        }
    }

    /// A sequence cut short by timeout or end of input.
    fn interrupted(&self, state: State, reason: &'static str) -> KeyRead {
        match state {
            State::Start => KeyRead::Timeout,
            State::SawEsc => KeyRead::Key(KeyEvent::named(core_events::NamedKey::Escape)),
            _ => {
                trace!(target: "input.parser", ?state, seq_len = self.scratch.len(), reason, "incomplete_sequence");
                KeyRead::Key(KeyEvent::Unknown)
            }
        }
    }

    fn push_param(&mut self, byte: u8) -> State {
        if self.scratch.len() >= self.max_sequence_len {
            return State::CsiOverflow;
        }
        self.scratch.push(byte);
        State::SawCsiParam
    }

    fn step(&mut self, state: State, byte: u8) -> Step {
        use ByteClass as C;
        match (state, classify(byte)) {
            (State::Start, C::Escape) => Step::Next(State::SawEsc),
            (State::Start, C::Control) => Step::Emit(KeyEvent::Control(byte)),
            (State::Start, C::Delete) => {
                Step::Emit(KeyEvent::named(core_events::NamedKey::Backspace))
            }
            (State::Start, C::Digit | C::Separator | C::ParamByte | C::FinalByte) => {
                Step::Emit(KeyEvent::char_from_bytes(&[byte]))
            }
            (State::Start, C::Utf8Lead(n)) => {
                self.scratch.push(byte);
                Step::Next(State::Utf8 { remaining: n })
            }
            (State::Start, C::Continuation | C::Invalid) => Step::Emit(KeyEvent::Unknown),

            (State::SawEsc, C::FinalByte) if byte == b'[' => Step::Next(State::SawCsi),
            (State::SawEsc, C::FinalByte) if byte == b'O' => Step::Next(State::SawSs3),
            (State::SawEsc, C::FinalByte | C::Delete | C::Control) => {
                Step::Emit(decode_meta(byte))
            }
            (State::SawEsc, C::Escape) => {
                Step::EmitAndKeep(KeyEvent::named(core_events::NamedKey::Escape))
            }
            (
                State::SawEsc,
                C::Digit
                | C::Separator
                | C::ParamByte
                | C::Utf8Lead(_)
                | C::Continuation
                | C::Invalid,
            ) => Step::Emit(KeyEvent::Unknown),

            (State::SawCsi | State::SawCsiParam, C::Digit | C::Separator | C::ParamByte) => {
                Step::Next(self.push_param(byte))
            }
            (State::SawCsi | State::SawCsiParam, C::FinalByte) => {
                Step::Emit(decode_csi(&self.scratch, byte))
            }
            (
                State::SawCsi | State::SawCsiParam | State::CsiOverflow | State::SawSs3,
                C::Escape,
            ) => Step::EmitAndKeep(KeyEvent::Unknown),
            (
                State::SawCsi | State::SawCsiParam,
                C::Control
                | C::Delete
                | C::Utf8Lead(_)
                | C::Continuation
                | C::Invalid,
            ) => Step::Emit(KeyEvent::Unknown),

            (State::CsiOverflow, C::Digit | C::Separator | C::ParamByte) => {
                Step::Next(State::CsiOverflow)
            }
            (State::CsiOverflow, _) => Step::Emit(KeyEvent::Unknown),

            (State::SawSs3, C::FinalByte) => Step::Emit(decode_ss3(byte)),
            (State::SawSs3, _) => Step::Emit(KeyEvent::Unknown),

            (State::Utf8 { remaining }, C::Continuation) => {
                self.scratch.push(byte);
                if remaining <= 1 {
                    Step::Emit(KeyEvent::char_from_bytes(&self.scratch))
                } else {
                    Step::Next(State::Utf8 {
                        remaining: remaining - 1,
                    })
                }
            }
            (State::Utf8 { .. }, _) => Step::EmitAndKeep(KeyEvent::Unknown),
        }
    }
}

/// Read a cursor position report (`ESC [ row ; col R`) after a DSR query.
///
/// Returns `None` when the reply is malformed or does not arrive in time.
pub fn read_cursor_position<S>(src: &mut S, timeout: Duration) -> io::Result<Option<(u16, u16)>>
where
    S: ByteSource + ?Sized,
{
    const MAX_REPLY: usize = 32;
    let mut reply: Vec<u8> = Vec::with_capacity(MAX_REPLY);
    while reply.len() < MAX_REPLY {
        match src.read_byte(Some(timeout))? {
            ByteRead::Byte(b'R') => break,
            ByteRead::Byte(b) => reply.push(b),
            ByteRead::Timeout | ByteRead::Eof => return Ok(None),
        }
    }
    let Some(body) = reply.strip_prefix(b"\x1b[") else {
        return Ok(None);
    };
    let Some(fields) = crate::key_token::parse_params(body) else {
        return Ok(None);
    };
    match fields.as_slice() {
        &[Some(row), Some(col)] => Ok(Some((row, col))),
        _ => Ok(None),
    }
}
