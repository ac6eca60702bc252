//! Terminal input: byte sources and the key parser.

mod key_token;
pub mod parser;
pub mod source;

pub use parser::{
    DEFAULT_ESCAPE_TIMEOUT, DEFAULT_MAX_SEQUENCE_LEN, KeyParser, KeyRead, read_cursor_position,
};
pub use source::{ByteRead, ByteSource, ReaderSource, ScriptedSource, StdinSource};
