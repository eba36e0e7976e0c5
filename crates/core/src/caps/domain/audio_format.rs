use std::str::FromStr;

use crate::shared::error::SchemaError;

/// Interleaved raw audio sample formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    S8,
    U8,
    S16Le,
    S16Be,
    U16Le,
    U16Be,
    S32Le,
    S32Be,
    U32Le,
    U32Be,
    F32Le,
    F32Be,
    F64Le,
    F64Be,
}

impl AudioFormat {
    /// Bits per sample.
    pub fn depth(self) -> usize {
        match self {
            AudioFormat::S8 | AudioFormat::U8 => 8,
            AudioFormat::S16Le | AudioFormat::S16Be | AudioFormat::U16Le | AudioFormat::U16Be => 16,
            AudioFormat::S32Le
            | AudioFormat::S32Be
            | AudioFormat::U32Le
            | AudioFormat::U32Be
            | AudioFormat::F32Le
            | AudioFormat::F32Be => 32,
            AudioFormat::F64Le | AudioFormat::F64Be => 64,
        }
    }

    /// Bytes in one second of interleaved audio.
    pub fn chunk_size(self, channels: usize, rate: usize) -> usize {
        channels * (self.depth() / 8) * rate
    }
}

impl FromStr for AudioFormat {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S8" => Ok(AudioFormat::S8),
            "U8" => Ok(AudioFormat::U8),
            "S16LE" => Ok(AudioFormat::S16Le),
            "S16BE" => Ok(AudioFormat::S16Be),
            "U16LE" => Ok(AudioFormat::U16Le),
            "U16BE" => Ok(AudioFormat::U16Be),
            "S32LE" => Ok(AudioFormat::S32Le),
            "S32BE" => Ok(AudioFormat::S32Be),
            "U32LE" => Ok(AudioFormat::U32Le),
            "U32BE" => Ok(AudioFormat::U32Be),
            "F32LE" => Ok(AudioFormat::F32Le),
            "F32BE" => Ok(AudioFormat::F32Be),
            "F64LE" => Ok(AudioFormat::F64Le),
            "F64BE" => Ok(AudioFormat::F64Be),
            other => Err(SchemaError::malformed(format!(
                "unsupported audio format \"{other}\""
            ))),
        }
    }
}
