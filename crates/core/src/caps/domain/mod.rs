pub mod audio_format;
pub mod caps;
pub mod media_kind;
pub mod tensor_info;
pub mod video_format;
