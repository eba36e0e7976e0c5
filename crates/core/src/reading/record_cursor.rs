/// Read position within the active session.
///
/// `file_offset` tracks the descriptor position for streamed kinds;
/// `frame_index` selects the next file of an image sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordCursor {
    pub file_offset: u64,
    pub bytes_read_total: u64,
    pub frame_index: u64,
    pub start_frame_index: u64,
    /// Inclusive upper bound on `frame_index`, if configured.
    pub stop_frame_index: Option<u64>,
}

impl RecordCursor {
    pub fn new(start_frame_index: u32, stop_frame_index: Option<u32>) -> Self {
        Self {
            file_offset: 0,
            bytes_read_total: 0,
            frame_index: start_frame_index.into(),
            start_frame_index: start_frame_index.into(),
            stop_frame_index: stop_frame_index.map(u64::from),
        }
    }

    /// Records `n` bytes consumed from the open descriptor.
    pub fn advance(&mut self, n: usize) {
        self.file_offset += n as u64;
        self.bytes_read_total += n as u64;
    }

    /// Records a whole file consumed from an image sequence.
    pub fn advance_frame(&mut self, bytes: usize) {
        self.bytes_read_total += bytes as u64;
        self.frame_index += 1;
    }

    pub fn past_stop(&self) -> bool {
        self.stop_frame_index
            .is_some_and(|stop| self.frame_index > stop)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
