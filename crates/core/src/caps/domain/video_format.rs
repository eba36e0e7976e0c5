use std::str::FromStr;

use crate::shared::error::SchemaError;

/// Raw video pixel formats accepted as record layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoFormat {
    Rgb,
    Bgr,
    Rgbx,
    Bgrx,
    Xrgb,
    Xbgr,
    Rgba,
    Bgra,
    Argb,
    Abgr,
    Gray8,
    Gray16Le,
    Gray16Be,
    I420,
    Yv12,
    Nv12,
    Nv21,
}

impl FromStr for VideoFormat {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RGB" => Ok(VideoFormat::Rgb),
            "BGR" => Ok(VideoFormat::Bgr),
            "RGBx" => Ok(VideoFormat::Rgbx),
            "BGRx" => Ok(VideoFormat::Bgrx),
            "xRGB" => Ok(VideoFormat::Xrgb),
            "xBGR" => Ok(VideoFormat::Xbgr),
            "RGBA" => Ok(VideoFormat::Rgba),
            "BGRA" => Ok(VideoFormat::Bgra),
            "ARGB" => Ok(VideoFormat::Argb),
            "ABGR" => Ok(VideoFormat::Abgr),
            "GRAY8" => Ok(VideoFormat::Gray8),
            "GRAY16_LE" => Ok(VideoFormat::Gray16Le),
            "GRAY16_BE" => Ok(VideoFormat::Gray16Be),
            "I420" => Ok(VideoFormat::I420),
            "YV12" => Ok(VideoFormat::Yv12),
            "NV12" => Ok(VideoFormat::Nv12),
            "NV21" => Ok(VideoFormat::Nv21),
            other => Err(SchemaError::malformed(format!(
                "unsupported video format \"{other}\""
            ))),
        }
    }
}

fn round_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

impl VideoFormat {
    /// Number of memory planes in the default layout.
    pub fn plane_count(self) -> usize {
        match self {
            VideoFormat::I420 | VideoFormat::Yv12 => 3,
            VideoFormat::Nv12 | VideoFormat::Nv21 => 2,
            _ => 1,
        }
    }

    /// Bytes per frame in the default raw-video layout: every plane's row
    /// stride is padded to 4 bytes and chroma dimensions round up.
    pub fn frame_size(self, width: usize, height: usize) -> usize {
        match self {
            VideoFormat::Rgb | VideoFormat::Bgr => round_up(width * 3, 4) * height,
            VideoFormat::Rgbx
            | VideoFormat::Bgrx
            | VideoFormat::Xrgb
            | VideoFormat::Xbgr
            | VideoFormat::Rgba
            | VideoFormat::Bgra
            | VideoFormat::Argb
            | VideoFormat::Abgr => width * 4 * height,
            VideoFormat::Gray8 => round_up(width, 4) * height,
            VideoFormat::Gray16Le | VideoFormat::Gray16Be => round_up(width * 2, 4) * height,
            VideoFormat::I420 | VideoFormat::Yv12 => {
                let luma_stride = round_up(width, 4);
                let chroma_stride = round_up(round_up(width, 2) / 2, 4);
                let rows = round_up(height, 2);
                luma_stride * rows + 2 * chroma_stride * (rows / 2)
            }
            VideoFormat::Nv12 | VideoFormat::Nv21 => {
                let stride = round_up(width, 4);
                let rows = round_up(height, 2);
                stride * rows + stride * (rows / 2)
            }
        }
    }
}
