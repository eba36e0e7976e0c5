use crate::caps::domain::audio_format::AudioFormat;
use crate::caps::domain::caps::{Caps, CapsValue};
use crate::caps::domain::media_kind::{MediaInfo, MediaKind, Schema};
use crate::caps::domain::tensor_info::parse_tensor_infos;
use crate::caps::domain::video_format::VideoFormat;
use crate::shared::constants::{
    AUDIO_CAPS_NAME, IMAGE_CAPS_NAMES, MAX_AUDIO_CHANNELS, MAX_TENSOR_SLOTS, MAX_VIDEO_DIMENSION,
    OCTET_CAPS_NAME, TENSORS_CAPS_NAME, TEXT_CAPS_NAME, VIDEO_CAPS_NAME,
};
use crate::shared::error::SchemaError;

/// Maps negotiated caps to a media kind and its record sizing.
pub fn resolve(caps: &Caps) -> Result<MediaInfo, SchemaError> {
    let name = caps.name();
    let info = if name == TENSORS_CAPS_NAME {
        MediaInfo::new(MediaKind::Tensor, resolve_tensors(caps)?)
    } else if name == VIDEO_CAPS_NAME {
        MediaInfo::new(MediaKind::Video, resolve_video(caps)?)
    } else if name == AUDIO_CAPS_NAME {
        MediaInfo::new(MediaKind::Audio, resolve_audio(caps)?)
    } else if name == TEXT_CAPS_NAME {
        if let Some(format) = caps.get_str("format") {
            if format != "utf8" {
                return Err(SchemaError::malformed(format!(
                    "unsupported text format \"{format}\""
                )));
            }
        }
        MediaInfo::new(MediaKind::Text, Schema::SizeUnknown)
    } else if name == OCTET_CAPS_NAME {
        MediaInfo::new(MediaKind::Octet, Schema::SizeUnknown)
    } else if IMAGE_CAPS_NAMES.contains(&name) {
        MediaInfo::new(MediaKind::Image, Schema::WholeFile)
    } else {
        log::error!("Could not get a media type from caps {caps}");
        return Err(SchemaError::UnrecognizedSchema(name.to_string()));
    };

    log::debug!("Resolved {} caps to {:?}", info.kind, info.schema);
    Ok(info)
}

fn resolve_tensors(caps: &Caps) -> Result<Schema, SchemaError> {
    if let Some(format) = caps.get_str("format") {
        match format {
            "static" => {}
            "flexible" => {
                return Err(SchemaError::malformed(
                    "flexible tensors carry per-buffer headers; record size is not fixed",
                ))
            }
            other => {
                return Err(SchemaError::malformed(format!(
                    "unknown tensor format \"{other}\""
                )))
            }
        }
    }

    let dimensions = tensor_field(caps, "dimensions")?;
    let types = tensor_field(caps, "types")?;
    let infos = parse_tensor_infos(&dimensions, &types)?;

    if let Some(value) = caps.get("num_tensors") {
        let declared = value
            .as_int()
            .ok_or_else(|| SchemaError::malformed("num_tensors is not an integer"))?;
        if declared < 1 || declared > MAX_TENSOR_SLOTS as i64 || declared as usize != infos.len() {
            return Err(SchemaError::malformed(format!(
                "num_tensors={declared} but {} tensors described",
                infos.len()
            )));
        }
    }

    let slot_sizes = infos
        .iter()
        .map(|info| info.size())
        .collect::<Result<Vec<_>, _>>()?;
    for (i, size) in slot_sizes.iter().enumerate() {
        log::debug!("Tensor slot {i} size is {size}");
    }
    Ok(Schema::Tensors { slot_sizes })
}

fn resolve_video(caps: &Caps) -> Result<Schema, SchemaError> {
    let format: VideoFormat = required_str(caps, "format")?.parse()?;
    let width = required_positive(caps, "width", MAX_VIDEO_DIMENSION)?;
    let height = required_positive(caps, "height", MAX_VIDEO_DIMENSION)?;
    let record_size = format.frame_size(width, height);
    log::debug!("format({format:?}), width({width}), height({height}): {record_size} bytes/frame");
    Ok(Schema::Fixed { record_size })
}

fn resolve_audio(caps: &Caps) -> Result<Schema, SchemaError> {
    let format: AudioFormat = required_str(caps, "format")?.parse()?;
    let rate = required_positive(caps, "rate", i32::MAX as i64)?;
    let channels = required_positive(caps, "channels", MAX_AUDIO_CHANNELS)?;
    if let Some(layout) = caps.get_str("layout") {
        if layout != "interleaved" {
            return Err(SchemaError::malformed(format!(
                "unsupported audio layout \"{layout}\""
            )));
        }
    }
    let record_size = format.chunk_size(channels, rate);
    log::debug!(
        "format({format:?}), depth({}), rate({rate}), channels({channels}): {record_size} bytes/s",
        format.depth()
    );
    Ok(Schema::Fixed { record_size })
}

fn required_str<'a>(caps: &'a Caps, key: &str) -> Result<&'a str, SchemaError> {
    caps.get_str(key).ok_or_else(|| {
        SchemaError::malformed(format!("{} caps requires string field \"{key}\"", caps.name()))
    })
}

/// A single rank-1 dimension such as `dimensions=4` parses as an integer.
fn tensor_field(caps: &Caps, key: &str) -> Result<String, SchemaError> {
    match caps.get(key) {
        Some(CapsValue::Str(s)) => Ok(s.clone()),
        Some(CapsValue::Int(v)) => Ok(v.to_string()),
        _ => Err(SchemaError::malformed(format!(
            "tensors caps requires field \"{key}\""
        ))),
    }
}

fn required_positive(caps: &Caps, key: &str, max: i64) -> Result<usize, SchemaError> {
    match caps.get_int(key) {
        Some(v) if (1..=max).contains(&v) => Ok(v as usize),
        Some(v) => Err(SchemaError::malformed(format!(
            "field \"{key}\" must be in 1..={max}, got {v}"
        ))),
        None => Err(SchemaError::malformed(format!(
            "{} caps requires integer field \"{key}\"",
            caps.name()
        ))),
    }
}
