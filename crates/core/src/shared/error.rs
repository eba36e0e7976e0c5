use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Invalid or missing configuration, surfaced before any read attempt.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no file name specified for reading")]
    NoLocation,
    #[error("malformed location pattern \"{pattern}\": {reason}")]
    MalformedPattern { pattern: String, reason: String },
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
    #[error("start frame index {start} is past stop frame index {stop}")]
    InvalidFrameRange { start: u32, stop: u32 },
    #[error("failed to read config {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The negotiated caps could not be turned into a record layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unrecognized caps \"{0}\"")]
    UnrecognizedSchema(String),
    #[error("malformed caps: {0}")]
    MalformedSchema(String),
}

impl SchemaError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        SchemaError::MalformedSchema(reason.into())
    }
}

/// The backing location could not be opened as a regular file.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("no such file \"{}\"", path.display())]
    NotFound { path: PathBuf },
    #[error("could not open file \"{}\" for reading: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("\"{}\" is a directory", path.display())]
    IsDirectory { path: PathBuf },
    #[error("file \"{}\" is a socket", path.display())]
    IsSocket { path: PathBuf },
    #[error("\"{}\" is not a regular file", path.display())]
    NotRegularFile { path: PathBuf },
}

/// Top-level error returned by the record source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("error while reading from \"{}\" at offset {offset:#x}: {source}", path.display())]
    Read {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },
    #[error("first file of image sequence \"{}\" could not be read: {source}", path.display())]
    FirstFileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid state: {0}")]
    State(&'static str),
    #[error("caps must be set before the source is started")]
    NoCaps,
    #[error("source is not started")]
    NotStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_converts_into_source_error() {
        let err: SourceError = SchemaError::malformed("missing width").into();
        assert!(matches!(
            err,
            SourceError::Schema(SchemaError::MalformedSchema(ref r)) if r == "missing width"
        ));
    }

    #[test]
    fn test_open_error_messages_name_the_path() {
        let err = OpenError::IsDirectory {
            path: PathBuf::from("/data/set"),
        };
        assert_eq!(err.to_string(), "\"/data/set\" is a directory");
    }

    #[test]
    fn test_read_error_keeps_os_source() {
        use std::error::Error as _;
        let err = SourceError::Read {
            path: PathBuf::from("a.dat"),
            offset: 16,
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("0x10"));
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }
}
