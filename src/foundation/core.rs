use crate::foundation::error::{KaleidoError, KaleidoResult};

pub use kurbo::{Affine, Vec2};

/// Interleaved 8-bit channel layout of a pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelLayout {
    Rgb8,
    Rgba8,
}

impl PixelLayout {
    pub fn from_channels(channels: usize) -> KaleidoResult<Self> {
        match channels {
            3 => Ok(Self::Rgb8),
            4 => Ok(Self::Rgba8),
            other => Err(KaleidoError::invalid_parameter(format!(
                "pixel buffers must have 3 or 4 channels, got {other}"
            ))),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    pub fn color_type(self) -> image::ColorType {
        match self {
            Self::Rgb8 => image::ColorType::Rgb8,
            Self::Rgba8 => image::ColorType::Rgba8,
        }
    }
}

/// Byte length of a `width x height` buffer in `layout`, checked for overflow.
pub(crate) fn buffer_len(width: u32, height: u32, layout: PixelLayout) -> KaleidoResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(layout.channels()))
        .ok_or_else(|| KaleidoError::invalid_parameter("pixel buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
