/// Payload of a record: one contiguous block, or one block per tensor slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordData {
    Block(Vec<u8>),
    Tensors(Vec<Vec<u8>>),
}

/// One unit of output, corresponding to one pipeline buffer.
///
/// `index` counts records produced in the current session, starting at 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    data: RecordData,
    index: u64,
}

impl Record {
    pub fn block(data: Vec<u8>, index: u64) -> Self {
        Self {
            data: RecordData::Block(data),
            index,
        }
    }

    pub fn tensors(blocks: Vec<Vec<u8>>, index: u64) -> Self {
        Self {
            data: RecordData::Tensors(blocks),
            index,
        }
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn into_data(self) -> RecordData {
        self.data
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Blocks in order; a single-block record yields one slice.
    pub fn blocks(&self) -> Vec<&[u8]> {
        match &self.data {
            RecordData::Block(data) => vec![data.as_slice()],
            RecordData::Tensors(blocks) => blocks.iter().map(Vec::as_slice).collect(),
        }
    }

    pub fn block_sizes(&self) -> Vec<usize> {
        self.blocks().iter().map(|b| b.len()).collect()
    }

    /// Total payload size across all blocks.
    pub fn len(&self) -> usize {
        match &self.data {
            RecordData::Block(data) => data.len(),
            RecordData::Tensors(blocks) => blocks.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a successful `next` call on a record source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Record(Record),
    EndOfStream,
}

impl ReadOutcome {
    pub fn into_record(self) -> Option<Record> {
        match self {
            ReadOutcome::Record(record) => Some(record),
            ReadOutcome::EndOfStream => None,
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }
}
