use std::fmt;

/// Classification of record shape, fixed once caps are negotiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Tensor,
    Video,
    Audio,
    Text,
    Octet,
    Image,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Tensor => write!(f, "tensor"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Text => write!(f, "text"),
            MediaKind::Octet => write!(f, "octet"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

/// Per-kind sizing parameters derived from caps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Schema {
    /// Byte size of each tensor slot, in order.
    Tensors { slot_sizes: Vec<usize> },
    /// One record of exactly this many bytes.
    Fixed { record_size: usize },
    /// Caps carry no size; it must come from configuration or the file.
    SizeUnknown,
    /// Each record is a whole file.
    WholeFile,
}

impl Schema {
    /// Total bytes per record, when the schema alone determines it.
    pub fn record_size(&self) -> Option<usize> {
        match self {
            Schema::Tensors { slot_sizes } => Some(slot_sizes.iter().sum()),
            Schema::Fixed { record_size } => Some(*record_size),
            Schema::SizeUnknown | Schema::WholeFile => None,
        }
    }
}

/// Outcome of schema resolution: what kind of records, and how large.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaInfo {
    pub kind: MediaKind,
    pub schema: Schema,
}

impl MediaInfo {
    pub fn new(kind: MediaKind, schema: Schema) -> Self {
        Self { kind, schema }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_record_size_is_sum_of_slots() {
        let schema = Schema::Tensors {
            slot_sizes: vec![3136, 40],
        };
        assert_eq!(schema.record_size(), Some(3176));
    }

    #[test]
    fn test_unsized_schemas_have_no_record_size() {
        assert_eq!(Schema::SizeUnknown.record_size(), None);
        assert_eq!(Schema::WholeFile.record_size(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(MediaKind::Octet.to_string(), "octet");
        assert_eq!(MediaKind::Tensor.to_string(), "tensor");
    }
}
