//! Plain line reading for input that is not an interactive terminal, or a
//! terminal too limited for escape sequences.

use core_input::{ByteRead, ByteSource};

use crate::EditError;

/// Read bytes up to `\n` (not included; a trailing `\r` is dropped).
/// Returns `None` at end of input with nothing read.
pub(crate) fn read_plain_line<S>(
    src: &mut S,
    limit: Option<usize>,
) -> Result<Option<Vec<u8>>, EditError>
where
    S: ByteSource + ?Sized,
{
    let mut line = Vec::new();
    loop {
        match src.read_byte(None).map_err(EditError::Read)? {
            ByteRead::Byte(b'\n') => break,
            ByteRead::Byte(b) => {
                if let Some(limit) = limit
                    && line.len() >= limit
                {
                    return Err(EditError::CapacityExceeded { limit });
                }
                line.try_reserve(1).map_err(|_| EditError::OutOfMemory)?;
                line.push(b);
            }
            ByteRead::Timeout => continue,
            ByteRead::Eof if line.is_empty() => return Ok(None),
            ByteRead::Eof => break,
        }
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(Some(line))
}
