use std::fs::{self, File, FileType};
use std::io;
use std::path::{Path, PathBuf};

use crate::caps::domain::media_kind::{MediaInfo, MediaKind, Schema};
use crate::reading::location_pattern::LocationPattern;
use crate::reading::record_cursor::RecordCursor;
use crate::shared::error::{OpenError, Result, SourceError};
use crate::shared::source_config::SourceConfig;

/// Record layout resolved against the opened storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordLayout {
    /// One block per tensor slot, of these sizes.
    Slots(Vec<usize>),
    /// One block of this size per record.
    Block(usize),
    /// One whole file per record, named by substituting the frame index.
    WholeFile(LocationPattern),
}

/// The span between a successful start and stop.
///
/// Streamed kinds hold the descriptor for the whole session; image
/// sequences hold none, opening each file as it is read.
#[derive(Debug)]
pub struct Session {
    pub(crate) kind: MediaKind,
    pub(crate) layout: RecordLayout,
    pub(crate) path: PathBuf,
    pub(crate) file: Option<File>,
    pub(crate) cursor: RecordCursor,
    pub(crate) produced_any: bool,
    pub(crate) active: bool,
}

impl Session {
    /// Validates configuration, opens the backing file, and resolves the
    /// record layout.
    pub fn start(config: &SourceConfig, info: &MediaInfo) -> Result<Self> {
        let location = config.location()?;
        config.validate()?;
        let cursor = RecordCursor::new(config.start_frame_index, config.stop_frame_index);

        let pattern = match info.kind {
            MediaKind::Image => Some(location.parse::<LocationPattern>()?),
            _ => None,
        };
        let path = match &pattern {
            Some(pattern) => PathBuf::from(pattern.format(cursor.frame_index)),
            None => PathBuf::from(location),
        };

        log::info!("Opening file {}", path.display());
        let file = open_regular_file(&path)?;

        let layout = match (&info.schema, pattern) {
            (_, Some(pattern)) => RecordLayout::WholeFile(pattern),
            (Schema::Tensors { slot_sizes }, None) => {
                let mut slots = slot_sizes.clone();
                if let Some(limit) = config.tensor_slot_limit {
                    if limit < slots.len() {
                        log::debug!("Reading {limit} of {} tensor slots", slots.len());
                        slots.truncate(limit);
                    }
                }
                RecordLayout::Slots(slots)
            }
            (Schema::Fixed { record_size }, None) => RecordLayout::Block(*record_size),
            (Schema::SizeUnknown, None) => match config.blocksize {
                Some(size) => RecordLayout::Block(size),
                None => {
                    let len = file
                        .metadata()
                        .map_err(|e| OpenError::OpenFailed {
                            path: path.clone(),
                            source: e,
                        })?
                        .len();
                    log::debug!("No blocksize configured; reading {len} bytes as one record");
                    RecordLayout::Block(len as usize)
                }
            },
            (Schema::WholeFile, None) => {
                return Err(SourceError::State("whole-file schema without an image kind"))
            }
        };

        // Image sequences read each file by path.
        let file = match info.kind {
            MediaKind::Image => None,
            _ => Some(file),
        };

        Ok(Self {
            kind: info.kind,
            layout,
            path,
            file,
            cursor,
            produced_any: false,
            active: true,
        })
    }

    /// Closes the descriptor and resets the cursor. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.file.take().is_some() {
            log::debug!("Closed {}", self.path.display());
        }
        self.cursor.reset();
        self.produced_any = false;
        self.active = false;
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Path opened at start: the location, or the first image of a sequence.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cursor(&self) -> &RecordCursor {
        &self.cursor
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn holds_descriptor(&self) -> bool {
        self.file.is_some()
    }
}

/// Opens `path` read-only, rejecting anything but a regular file.
///
/// The entry is classified before opening so that a FIFO never blocks the
/// caller, then re-checked on the open descriptor.
fn open_regular_file(path: &Path) -> std::result::Result<File, OpenError> {
    let metadata = fs::metadata(path).map_err(|e| open_error(path, e))?;
    check_file_type(path, &metadata.file_type())?;

    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let metadata = file.metadata().map_err(|e| OpenError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    check_file_type(path, &metadata.file_type())?;
    Ok(file)
}

fn open_error(path: &Path, error: io::Error) -> OpenError {
    match error.kind() {
        io::ErrorKind::NotFound => OpenError::NotFound {
            path: path.to_path_buf(),
        },
        _ => OpenError::OpenFailed {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

fn check_file_type(path: &Path, file_type: &FileType) -> std::result::Result<(), OpenError> {
    let path = path.to_path_buf();
    if file_type.is_dir() {
        Err(OpenError::IsDirectory { path })
    } else if is_socket(file_type) {
        Err(OpenError::IsSocket { path })
    } else if !file_type.is_file() {
        Err(OpenError::NotRegularFile { path })
    } else {
        Ok(())
    }
}

#[cfg(unix)]
fn is_socket(file_type: &FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file_type.is_socket()
}

#[cfg(not(unix))]
fn is_socket(_file_type: &FileType) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::ConfigError;
    use tempfile::TempDir;

    fn octet() -> MediaInfo {
        MediaInfo::new(MediaKind::Octet, Schema::SizeUnknown)
    }

    fn image() -> MediaInfo {
        MediaInfo::new(MediaKind::Image, Schema::WholeFile)
    }

    fn config_for(path: &Path) -> SourceConfig {
        SourceConfig::with_location(path.to_string_lossy())
    }

    #[test]
    fn test_missing_location() {
        let err = Session::start(&SourceConfig::default(), &octet()).unwrap_err();
        assert!(matches!(err, SourceError::Config(ConfigError::NoLocation)));
    }

    #[test]
    fn test_not_found() {
        let tmp = TempDir::new().unwrap();
        let config = config_for(&tmp.path().join("absent.dat"));
        let err = Session::start(&config, &octet()).unwrap_err();
        assert!(matches!(err, SourceError::Open(OpenError::NotFound { .. })));
    }

    #[test]
    fn test_directory_is_rejected_at_start() {
        let tmp = TempDir::new().unwrap();
        let err = Session::start(&config_for(tmp.path()), &octet()).unwrap_err();
        assert!(matches!(err, SourceError::Open(OpenError::IsDirectory { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_socket_is_rejected_at_start() {
        let tmp = TempDir::new().unwrap();
        let sock = tmp.path().join("data.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&sock).unwrap();
        let err = Session::start(&config_for(&sock), &octet()).unwrap_err();
        assert!(matches!(err, SourceError::Open(OpenError::IsSocket { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_character_device_is_not_regular() {
        let err = Session::start(&config_for(Path::new("/dev/null")), &octet()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Open(OpenError::NotRegularFile { .. })
        ));
    }

    #[test]
    fn test_octet_without_blocksize_uses_file_length() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob.bin");
        fs::write(&path, vec![0u8; 3176]).unwrap();
        let session = Session::start(&config_for(&path), &octet()).unwrap();
        assert_eq!(session.layout(), &RecordLayout::Block(3176));
        assert!(session.holds_descriptor());
    }

    #[test]
    fn test_octet_blocksize_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob.bin");
        fs::write(&path, vec![0u8; 100]).unwrap();
        let mut config = config_for(&path);
        config.blocksize = Some(10);
        let session = Session::start(&config, &octet()).unwrap();
        assert_eq!(session.layout(), &RecordLayout::Block(10));
    }

    #[test]
    fn test_tensor_slot_limit_truncates_layout() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.dat");
        fs::write(&path, vec![0u8; 28]).unwrap();
        let mut config = config_for(&path);
        config.tensor_slot_limit = Some(2);
        let info = MediaInfo::new(
            MediaKind::Tensor,
            Schema::Tensors {
                slot_sizes: vec![16, 8, 4],
            },
        );
        let session = Session::start(&config, &info).unwrap();
        assert_eq!(session.layout(), &RecordLayout::Slots(vec![16, 8]));
    }

    #[test]
    fn test_image_substitutes_start_index_and_releases_descriptor() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("img_03.png"), b"png").unwrap();
        let mut config = config_for(&tmp.path().join("img_%02d.png"));
        config.start_frame_index = 3;

        let session = Session::start(&config, &image()).unwrap();
        assert_eq!(session.path(), tmp.path().join("img_03.png"));
        assert_eq!(session.cursor().frame_index, 3);
        assert!(!session.holds_descriptor());
        assert!(matches!(session.layout(), RecordLayout::WholeFile(_)));
    }

    #[test]
    fn test_image_requires_pattern() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("img.png");
        fs::write(&path, b"png").unwrap();
        let err = Session::start(&config_for(&path), &image()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Config(ConfigError::MalformedPattern { .. })
        ));
    }

    #[test]
    fn test_stop_is_idempotent_and_resets_cursor() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob.bin");
        fs::write(&path, vec![1u8; 8]).unwrap();
        let mut config = config_for(&path);
        config.start_frame_index = 2;
        let mut session = Session::start(&config, &octet()).unwrap();

        session.stop();
        assert!(!session.holds_descriptor());
        assert!(!session.is_active());
        assert_eq!(session.cursor(), &RecordCursor::default());
        session.stop();
        assert!(!session.is_active());
    }
}
