use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::reading::chunk_reader::{read_chunk, Chunk};
use crate::reading::location_pattern::LocationPattern;
use crate::reading::record_cursor::RecordCursor;
use crate::reading::session::{RecordLayout, Session};
use crate::shared::error::{Result, SourceError};
use crate::shared::record::{ReadOutcome, Record};

/// Turns a session's record layout into a stream of records.
///
/// Each call to [`next`](Self::next) yields one record, end of stream, or
/// an error; after an error the host is expected to stop and restart.
pub struct RecordProducer {
    session: Session,
    records_produced: u64,
}

impl RecordProducer {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            records_produced: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn records_produced(&self) -> u64 {
        self.records_produced
    }

    pub fn next(&mut self) -> Result<ReadOutcome> {
        if !self.session.is_active() {
            return Err(SourceError::NotStarted);
        }
        let index = self.records_produced;
        let Session {
            layout,
            path,
            file,
            cursor,
            produced_any,
            ..
        } = &mut self.session;

        let outcome = match layout {
            RecordLayout::Slots(sizes) => {
                let file = file.as_mut().ok_or(SourceError::NotStarted)?;
                read_slots(file, cursor, path, sizes, index)?
            }
            RecordLayout::Block(size) => {
                let file = file.as_mut().ok_or(SourceError::NotStarted)?;
                read_block(file, cursor, path, *size, index)?
            }
            RecordLayout::WholeFile(pattern) => read_image(pattern, cursor, produced_any, index)?,
        };

        if let ReadOutcome::Record(_) = outcome {
            self.records_produced += 1;
        }
        Ok(outcome)
    }

    /// Ends the session, releasing the descriptor.
    pub fn stop(&mut self) {
        self.session.stop();
    }
}

fn read_error(path: &Path, cursor: &RecordCursor, source: std::io::Error) -> SourceError {
    log::error!(
        "Error while reading from \"{}\" at offset {:#x}: {source}",
        path.display(),
        cursor.file_offset
    );
    SourceError::Read {
        path: path.to_path_buf(),
        offset: cursor.file_offset,
        source,
    }
}

fn read_slots(
    file: &mut File,
    cursor: &mut RecordCursor,
    path: &Path,
    sizes: &[usize],
    index: u64,
) -> Result<ReadOutcome> {
    let mut blocks = Vec::with_capacity(sizes.len());
    for (i, &size) in sizes.iter().enumerate() {
        let chunk = match read_chunk(file, cursor, size) {
            Ok(chunk) => chunk,
            Err(e) => return Err(read_error(path, cursor, e)),
        };
        match chunk {
            Chunk::Full(data) | Chunk::Partial(data) => blocks.push(data),
            Chunk::Eof if i == 0 => return Ok(ReadOutcome::EndOfStream),
            Chunk::Eof => {
                log::warn!(
                    "Discarding incomplete tensor record {index}: end of file before slot {i} of {}",
                    sizes.len()
                );
                return Ok(ReadOutcome::EndOfStream);
            }
        }
    }
    Ok(ReadOutcome::Record(Record::tensors(blocks, index)))
}

fn read_block(
    file: &mut File,
    cursor: &mut RecordCursor,
    path: &Path,
    size: usize,
    index: u64,
) -> Result<ReadOutcome> {
    match read_chunk(file, cursor, size) {
        Ok(chunk) => Ok(match chunk.into_bytes() {
            Some(data) => ReadOutcome::Record(Record::block(data, index)),
            None => ReadOutcome::EndOfStream,
        }),
        Err(e) => Err(read_error(path, cursor, e)),
    }
}

fn read_image(
    pattern: &LocationPattern,
    cursor: &mut RecordCursor,
    produced_any: &mut bool,
    index: u64,
) -> Result<ReadOutcome> {
    if cursor.past_stop() {
        log::debug!("Frame index {} is past the stop index; EOS", cursor.frame_index);
        return Ok(ReadOutcome::EndOfStream);
    }

    let path = PathBuf::from(pattern.format(cursor.frame_index));
    log::debug!("Reading from file \"{}\".", path.display());

    let mut file = match File::open(&path) {
        Ok(file) => file,
        // Having read at least one image, a missing next file ends the sequence.
        Err(e) if *produced_any => {
            log::debug!("No file \"{}\" ({e}); EOS", path.display());
            return Ok(ReadOutcome::EndOfStream);
        }
        Err(e) => return Err(SourceError::FirstFileMissing { path, source: e }),
    };

    let mut data = Vec::new();
    if let Err(e) = file.read_to_end(&mut data) {
        log::error!("Error while reading from file \"{}\": {e}", path.display());
        return Err(SourceError::Read {
            offset: data.len() as u64,
            path,
            source: e,
        });
    }

    *produced_any = true;
    cursor.advance_frame(data.len());
    log::debug!("Read file \"{}\" ({} bytes).", path.display(), data.len());
    Ok(ReadOutcome::Record(Record::block(data, index)))
}
