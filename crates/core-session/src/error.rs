use std::io;

use core_text::BufferError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("failed to read terminal input")]
    Read(#[source] io::Error),
    #[error("failed to write terminal output")]
    Write(#[source] io::Error),
    #[error("failed to change terminal mode")]
    Terminal(#[source] io::Error),
    #[error("out of memory while growing the line buffer")]
    OutOfMemory,
    #[error("line buffer capacity of {limit} bytes exceeded")]
    CapacityExceeded { limit: usize },
    #[error("edit session is not active")]
    NotActive,
}

impl From<BufferError> for EditError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::CapacityExceeded { limit } => EditError::CapacityExceeded { limit },
            BufferError::OutOfMemory => EditError::OutOfMemory,
        }
    }
}
