/// Maximum number of tensor slots a single record may carry.
pub const MAX_TENSOR_SLOTS: usize = 16;

/// Maximum rank of a single tensor slot.
pub const MAX_TENSOR_RANK: usize = 16;

pub const TENSORS_CAPS_NAME: &str = "other/tensors";
pub const VIDEO_CAPS_NAME: &str = "video/x-raw";
pub const AUDIO_CAPS_NAME: &str = "audio/x-raw";
pub const TEXT_CAPS_NAME: &str = "text/x-raw";
pub const OCTET_CAPS_NAME: &str = "application/octet-stream";

pub const IMAGE_CAPS_NAMES: &[&str] = &["image/png", "image/jpeg", "image/tiff", "image/gif"];

/// Upper bound accepted for raw video width and height.
pub const MAX_VIDEO_DIMENSION: i64 = 1 << 20;

/// Upper bound accepted for raw audio channel count.
pub const MAX_AUDIO_CHANNELS: i64 = 64;
