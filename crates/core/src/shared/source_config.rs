use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::shared::error::ConfigError;

/// Host-supplied configuration for a record source.
///
/// Applied only while no session is open; see
/// [`DataRepoSource`](crate::source::infrastructure::data_repo_source::DataRepoSource).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// File path, or for image sequences a path with one integer conversion
    /// such as `frame_%04d.png`.
    pub location: Option<String>,
    /// First frame index substituted into an image sequence pattern.
    pub start_frame_index: u32,
    /// Inclusive last frame index of an image sequence. `None` reads until
    /// the first missing file.
    pub stop_frame_index: Option<u32>,
    /// Record size for text and octet streams, whose caps carry no size.
    /// `None` reads the whole file as one record.
    pub blocksize: Option<usize>,
    /// Caps the number of tensor slots read per record.
    pub tensor_slot_limit: Option<usize>,
}

impl SourceConfig {
    pub fn with_location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    /// Loads a config from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validated location: present and non-empty.
    pub fn location(&self) -> Result<&str, ConfigError> {
        match self.location.as_deref() {
            Some(location) if !location.is_empty() => Ok(location),
            _ => Err(ConfigError::NoLocation),
        }
    }

    /// Checks the numeric settings; the location is checked at session start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocksize == Some(0) {
            return Err(ConfigError::ZeroValue("blocksize"));
        }
        if self.tensor_slot_limit == Some(0) {
            return Err(ConfigError::ZeroValue("tensor_slot_limit"));
        }
        self.validate_frame_range()
    }

    pub fn validate_frame_range(&self) -> Result<(), ConfigError> {
        match self.stop_frame_index {
            Some(stop) if self.start_frame_index > stop => Err(ConfigError::InvalidFrameRange {
                start: self.start_frame_index,
                stop,
            }),
            _ => Ok(()),
        }
    }
}
