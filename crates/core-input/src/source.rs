//! Byte sources feeding the key parser.
//!
//! The parser only ever asks for one byte at a time with an optional timeout:
//! `None` blocks until input arrives, `Some(d)` gives up after `d` and reports
//! `ByteRead::Timeout`. End of input and read errors stay distinct.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::time::Duration;

/// Outcome of a single byte read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRead {
    Byte(u8),
    Timeout,
    Eof,
}

/// Read-with-timeout primitive injected into the parser.
pub trait ByteSource {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<ByteRead>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<ByteRead> {
        (**self).read_byte(timeout)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<ByteRead> {
        (**self).read_byte(timeout)
    }
}

/// Terminal input on file descriptor 0. Timeouts use `poll(2)`.
#[cfg(unix)]
#[derive(Debug)]
pub struct StdinSource {
    fd: libc::c_int,
}

#[cfg(unix)]
impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl StdinSource {
    pub fn new() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
        }
    }

    /// Wait up to `timeout` for the descriptor to become readable.
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        loop {
            // SAFETY: `pfd` is a valid, exclusively borrowed pollfd and the count is 1.
            let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
            if rc >= 0 {
                return Ok(rc > 0);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    /// True when at least one byte can be read without blocking.
    pub fn has_pending(&self) -> io::Result<bool> {
        self.wait_readable(Duration::ZERO)
    }
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<ByteRead> {
        if let Some(timeout) = timeout
            && !self.wait_readable(timeout)?
        {
            return Ok(ByteRead::Timeout);
        }
        let mut byte = 0u8;
        loop {
            // SAFETY: reading at most one byte into a live, writable u8.
            let n = unsafe { libc::read(self.fd, (&raw mut byte).cast(), 1) };
            match n {
                1 => return Ok(ByteRead::Byte(byte)),
                0 => return Ok(ByteRead::Eof),
                _ => {
                    let err = io::Error::last_os_error();
                    match err.kind() {
                        io::ErrorKind::Interrupted => continue,
                        io::ErrorKind::WouldBlock => return Ok(ByteRead::Timeout),
                        _ => return Err(err),
                    }
                }
            }
        }
    }
}

#[cfg(unix)]
impl std::os::fd::AsRawFd for StdinSource {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.fd
    }
}

/// Terminal input on platforms without `poll(2)`: reads block and timeouts
/// are not honored, so a lone Escape resolves with the next key press.
#[cfg(not(unix))]
#[derive(Debug, Default)]
pub struct StdinSource {
    inner: ReaderSource<io::Stdin>,
}

#[cfg(not(unix))]
impl StdinSource {
    pub fn new() -> Self {
        Self {
            inner: ReaderSource::new(io::stdin()),
        }
    }

    pub fn has_pending(&self) -> io::Result<bool> {
        Ok(false)
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<ByteRead> {
        self.inner.read_byte(timeout)
    }
}

/// Blocking adapter over any `Read` (pipes, files). Timeouts are ignored.
#[derive(Debug, Default)]
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_byte(&mut self, _timeout: Option<Duration>) -> io::Result<ByteRead> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(ByteRead::Eof),
                Ok(_) => return Ok(ByteRead::Byte(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scripted {
    Byte(u8),
    Timeout,
    Error(io::ErrorKind),
}

/// Deterministic in-memory source for tests and embedding.
///
/// Once the script is exhausted a timed read reports `Timeout` and a
/// blocking read reports `Eof`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    script: VecDeque<Scripted>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut s = Self::new();
        s.push_bytes(bytes);
        s
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.script.extend(bytes.iter().copied().map(Scripted::Byte));
        self
    }

    pub fn push_str(&mut self, s: &str) -> &mut Self {
        self.push_bytes(s.as_bytes())
    }

    pub fn push_timeout(&mut self) -> &mut Self {
        self.script.push_back(Scripted::Timeout);
        self
    }

    pub fn push_error(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.script.push_back(Scripted::Error(kind));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for ScriptedSource {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<ByteRead> {
        match self.script.pop_front() {
            Some(Scripted::Byte(b)) => Ok(ByteRead::Byte(b)),
            Some(Scripted::Timeout) => Ok(ByteRead::Timeout),
            Some(Scripted::Error(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            None if timeout.is_some() => Ok(ByteRead::Timeout),
            None => Ok(ByteRead::Eof),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_distinguishes_outcomes() {
        let mut src = ScriptedSource::from_bytes(b"a");
        src.push_timeout().push_error(io::ErrorKind::BrokenPipe);
        assert_eq!(src.read_byte(None).unwrap(), ByteRead::Byte(b'a'));
        assert_eq!(src.read_byte(None).unwrap(), ByteRead::Timeout);
        assert!(src.read_byte(None).is_err());
        assert_eq!(
            src.read_byte(Some(Duration::from_millis(1))).unwrap(),
            ByteRead::Timeout
        );
        assert_eq!(src.read_byte(None).unwrap(), ByteRead::Eof);
    }

    #[test]
    fn reader_source_reports_eof() {
        let mut src = ReaderSource::new(&b"xy"[..]);
        assert_eq!(src.read_byte(None).unwrap(), ByteRead::Byte(b'x'));
        assert_eq!(src.read_byte(None).unwrap(), ByteRead::Byte(b'y'));
        assert_eq!(src.read_byte(None).unwrap(), ByteRead::Eof);
    }
}
