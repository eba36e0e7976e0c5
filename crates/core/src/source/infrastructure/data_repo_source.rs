use crate::caps::domain::caps::Caps;
use crate::caps::domain::media_kind::MediaInfo;
use crate::caps::schema_resolver;
use crate::reading::record_cursor::RecordCursor;
use crate::reading::record_producer::RecordProducer;
use crate::reading::session::Session;
use crate::shared::error::{Result, SourceError};
use crate::shared::record::ReadOutcome;
use crate::shared::source_config::SourceConfig;
use crate::source::domain::record_source::RecordSource;

/// Reads records from a file, or a numbered sequence of image files, in a
/// data repository.
///
/// Configuration may only change while the source is stopped.
#[derive(Default)]
pub struct DataRepoSource {
    config: SourceConfig,
    media_info: Option<MediaInfo>,
    producer: Option<RecordProducer>,
}

impl DataRepoSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SourceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn media_info(&self) -> Option<&MediaInfo> {
        self.media_info.as_ref()
    }

    pub fn location(&self) -> Option<&str> {
        self.config.location.as_deref()
    }

    /// Cursor of the active session, if started.
    pub fn cursor(&self) -> Option<&RecordCursor> {
        self.producer.as_ref().map(|p| p.session().cursor())
    }

    pub fn set_config(&mut self, config: SourceConfig) -> Result<()> {
        self.ensure_stopped()?;
        self.config = config;
        Ok(())
    }

    /// Sets the file path or image sequence pattern. `None` clears it.
    pub fn set_location(&mut self, location: Option<&str>) -> Result<()> {
        self.ensure_stopped()?;
        self.config.location = location.map(str::to_string);
        if let Some(location) = location {
            log::info!("filename : {location}");
        }
        Ok(())
    }

    pub fn set_start_frame_index(&mut self, index: u32) -> Result<()> {
        self.ensure_stopped()?;
        self.config.start_frame_index = index;
        Ok(())
    }

    pub fn set_stop_frame_index(&mut self, index: Option<u32>) -> Result<()> {
        self.ensure_stopped()?;
        self.config.stop_frame_index = index;
        Ok(())
    }

    pub fn set_blocksize(&mut self, blocksize: Option<usize>) -> Result<()> {
        self.ensure_stopped()?;
        self.config.blocksize = blocksize;
        Ok(())
    }

    pub fn set_tensor_slot_limit(&mut self, limit: Option<usize>) -> Result<()> {
        self.ensure_stopped()?;
        self.config.tensor_slot_limit = limit;
        Ok(())
    }

    fn ensure_stopped(&self) -> Result<()> {
        if self.producer.is_some() {
            log::warn!("Changing the configuration of a source when a file is open is not supported.");
            return Err(SourceError::State(
                "changing the configuration while a file is open is not supported",
            ));
        }
        Ok(())
    }
}

impl RecordSource for DataRepoSource {
    fn set_caps(&mut self, caps: &Caps) -> Result<MediaInfo> {
        self.ensure_stopped()?;
        log::info!("set caps: {caps}");
        let info = schema_resolver::resolve(caps)?;
        self.media_info = Some(info.clone());
        Ok(info)
    }

    fn start(&mut self) -> Result<()> {
        if self.producer.is_some() {
            return Err(SourceError::State("source is already started"));
        }
        let info = self.media_info.as_ref().ok_or(SourceError::NoCaps)?;
        let session = Session::start(&self.config, info)?;
        self.producer = Some(RecordProducer::new(session));
        Ok(())
    }

    fn next_record(&mut self) -> Result<ReadOutcome> {
        self.producer
            .as_mut()
            .ok_or(SourceError::NotStarted)?
            .next()
    }

    fn stop(&mut self) {
        if let Some(mut producer) = self.producer.take() {
            log::debug!(
                "Stopping after {} records",
                producer.records_produced()
            );
            producer.stop();
        }
    }

    fn is_started(&self) -> bool {
        self.producer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::domain::media_kind::MediaKind;
    use crate::shared::error::{ConfigError, SchemaError};
    use crate::shared::record::Record;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn octet_caps() -> Caps {
        Caps::new("application/octet-stream")
    }

    fn started_source(tmp: &TempDir) -> DataRepoSource {
        let path = tmp.path().join("blob.bin");
        fs::write(&path, vec![0u8; 8]).unwrap();
        let mut source = DataRepoSource::new();
        source.set_location(Some(&path.to_string_lossy())).unwrap();
        source.set_caps(&octet_caps()).unwrap();
        source.start().unwrap();
        source
    }

    #[test]
    fn test_setters_apply_while_stopped() {
        let mut source = DataRepoSource::new();
        source.set_location(Some("data.raw")).unwrap();
        source.set_start_frame_index(2).unwrap();
        source.set_stop_frame_index(Some(10)).unwrap();
        source.set_blocksize(Some(64)).unwrap();
        source.set_tensor_slot_limit(Some(2)).unwrap();

        assert_eq!(source.location(), Some("data.raw"));
        assert_eq!(source.config().start_frame_index, 2);
        assert_eq!(source.config().stop_frame_index, Some(10));
        assert_eq!(source.config().blocksize, Some(64));
        assert_eq!(source.config().tensor_slot_limit, Some(2));

        source.set_location(None).unwrap();
        assert_eq!(source.location(), None);
    }

    #[test]
    fn test_setters_rejected_while_started() {
        let tmp = TempDir::new().unwrap();
        let mut source = started_source(&tmp);

        assert!(matches!(
            source.set_location(Some("other.raw")),
            Err(SourceError::State(_))
        ));
        assert!(source.set_start_frame_index(1).is_err());
        assert!(source.set_config(SourceConfig::default()).is_err());
        assert!(matches!(
            source.set_caps(&octet_caps()),
            Err(SourceError::State(_))
        ));

        source.stop();
        assert!(source.set_location(Some("other.raw")).is_ok());
    }

    #[test]
    fn test_start_requires_caps() {
        let mut source = DataRepoSource::with_config(SourceConfig::with_location("x.raw"));
        assert!(matches!(source.start(), Err(SourceError::NoCaps)));
    }

    #[test]
    fn test_start_requires_location() {
        let mut source = DataRepoSource::new();
        source.set_caps(&octet_caps()).unwrap();
        assert!(matches!(
            source.start(),
            Err(SourceError::Config(ConfigError::NoLocation))
        ));
        assert!(!source.is_started());
    }

    #[test]
    fn test_double_start_is_state_error() {
        let tmp = TempDir::new().unwrap();
        let mut source = started_source(&tmp);
        assert!(matches!(source.start(), Err(SourceError::State(_))));
    }

    #[test]
    fn test_next_before_start() {
        let mut source = DataRepoSource::new();
        assert!(matches!(source.next_record(), Err(SourceError::NotStarted)));
    }

    #[test]
    fn test_unrecognized_caps_keeps_previous_info() {
        let mut source = DataRepoSource::new();
        source.set_caps(&octet_caps()).unwrap();
        let err = source.set_caps(&Caps::new("video/x-h264")).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Schema(SchemaError::UnrecognizedSchema(_))
        ));
        assert_eq!(source.media_info().unwrap().kind, MediaKind::Octet);
    }

    #[test]
    fn test_stop_is_idempotent_and_allows_restart() {
        let tmp = TempDir::new().unwrap();
        let mut source = started_source(&tmp);

        assert!(source.next_record().unwrap().into_record().is_some());
        assert_eq!(source.cursor().unwrap().file_offset, 8);
        source.stop();
        source.stop();
        assert!(source.cursor().is_none());

        source.start().unwrap();
        let record = source.next_record().unwrap().into_record().unwrap();
        assert_eq!(record.index(), 0);
        assert_eq!(record.len(), 8);
    }

    fn open(location: &Path, caps: &str) -> DataRepoSource {
        let mut source = DataRepoSource::new();
        source.set_location(Some(&location.to_string_lossy())).unwrap();
        source.set_caps(&caps.parse().unwrap()).unwrap();
        source.start().unwrap();
        source
    }

    fn write_test_image(path: &Path, shade: u8) {
        let mut img = image::RgbImage::new(8, 6);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([shade, 100, 200]);
        }
        img.save(path).unwrap();
    }

    #[test]
    fn test_audio_one_second_per_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("audio.raw");
        fs::write(&path, vec![7u8; 96000]).unwrap();
        let mut source = open(&path, "audio/x-raw, format=S16LE, rate=8000, channels=2");

        let records: Vec<Record> = source.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.len() == 32000));
        assert_eq!(source.cursor().unwrap().bytes_read_total, 96000);
        assert!(source.next_record().unwrap().is_end_of_stream());
    }

    #[test]
    fn test_video_frames_with_short_tail() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("video.raw");
        // Two 4x2 RGB frames plus 10 trailing bytes.
        fs::write(&path, vec![0u8; 24 * 2 + 10]).unwrap();
        let mut source = open(&path, "video/x-raw, format=RGB, width=4, height=2");

        let sizes: Vec<usize> = source.records().map(|r| r.unwrap().len()).collect();
        assert_eq!(sizes, vec![24, 24, 10]);
    }

    #[test]
    fn test_tensor_record_splits_into_slots() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tensors.dat");
        let bytes: Vec<u8> = (0..24).collect();
        fs::write(&path, &bytes).unwrap();
        let mut source = open(&path, "other/tensors, dimensions=16:1.8:1, types=uint8.uint8");

        let record = source.next_record().unwrap().into_record().unwrap();
        assert_eq!(record.block_sizes(), vec![16, 8]);
        assert_eq!(record.blocks()[1], &bytes[16..]);
        assert!(source.next_record().unwrap().is_end_of_stream());
    }

    #[test]
    fn test_text_uses_blocksize() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("text.txt");
        fs::write(&path, "hello world").unwrap();
        let mut source = DataRepoSource::new();
        source.set_location(Some(&path.to_string_lossy())).unwrap();
        source.set_blocksize(Some(5)).unwrap();
        source.set_caps(&"text/x-raw, format=utf8".parse().unwrap()).unwrap();
        source.start().unwrap();

        let chunks: Vec<Vec<u8>> = source
            .records()
            .map(|r| r.unwrap().blocks()[0].to_vec())
            .collect();
        assert_eq!(chunks, vec![b"hello".to_vec(), b" worl".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn test_image_sequence_reads_each_file_whole() {
        let tmp = TempDir::new().unwrap();
        write_test_image(&tmp.path().join("frame_0.png"), 10);
        write_test_image(&tmp.path().join("frame_1.png"), 20);
        let mut source = open(&tmp.path().join("frame_%d.png"), "image/png");

        let records: Vec<Record> = source.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        let expected = fs::read(tmp.path().join("frame_1.png")).unwrap();
        assert_eq!(records[1].blocks()[0], expected.as_slice());
        assert_eq!(source.cursor().unwrap().frame_index, 2);
    }

    #[test]
    fn test_image_sequence_missing_first_file_fails_start() {
        let tmp = TempDir::new().unwrap();
        let mut source = DataRepoSource::new();
        let pattern = tmp.path().join("frame_%d.png");
        source.set_location(Some(&pattern.to_string_lossy())).unwrap();
        source.set_caps(&Caps::new("image/png")).unwrap();

        assert!(matches!(
            source.start(),
            Err(SourceError::Open(crate::shared::error::OpenError::NotFound { .. }))
        ));
        assert!(!source.is_started());
    }
}
