use std::io::{self, ErrorKind, Read};

use crate::reading::record_cursor::RecordCursor;

/// Outcome of reading one bounded chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk {
    /// Exactly the requested number of bytes.
    Full(Vec<u8>),
    /// End of file reached after some, but not all, requested bytes.
    Partial(Vec<u8>),
    /// End of file reached before any byte was read.
    Eof,
}

impl Chunk {
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Chunk::Full(data) | Chunk::Partial(data) => Some(data),
            Chunk::Eof => None,
        }
    }
}

/// Reads up to `size` bytes, retrying interrupted and would-block reads.
///
/// A short read at end of file is returned as [`Chunk::Partial`] rather than
/// discarded. The cursor advances by every byte actually read, including
/// when an error ends the read early.
pub fn read_chunk<R: Read + ?Sized>(
    reader: &mut R,
    cursor: &mut RecordCursor,
    size: usize,
) -> io::Result<Chunk> {
    if size == 0 {
        return Ok(Chunk::Eof);
    }

    let mut data = vec![0u8; size];
    let mut byte_read = 0;
    while byte_read < size {
        log::trace!(
            "Reading {} bytes at offset {:#x}",
            size - byte_read,
            cursor.file_offset
        );
        match reader.read(&mut data[byte_read..]) {
            Ok(0) if byte_read == 0 => {
                log::debug!("EOS at offset {:#x}", cursor.file_offset);
                return Ok(Chunk::Eof);
            }
            Ok(0) => {
                log::debug!("Short read: {byte_read} of {size} bytes before EOS");
                data.truncate(byte_read);
                return Ok(Chunk::Partial(data));
            }
            Ok(n) => {
                log::trace!("Read: {n}");
                byte_read += n;
                cursor.advance(n);
            }
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                continue
            }
            Err(e) => return Err(e),
        }
    }
    Ok(Chunk::Full(data))
}
