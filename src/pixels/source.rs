use std::sync::Arc;

use image::{DynamicImage, ImageBuffer, Rgb, Rgba, imageops};

use crate::foundation::core::{PixelLayout, buffer_len};
use crate::foundation::error::{KaleidoError, KaleidoResult};

/// Longest side of the interactive preview source; larger images are downscaled first.
pub const PREVIEW_MAX_DIM: u32 = 4096;

/// Immutable, row-major 8-bit source buffer (RGB or RGBA).
///
/// Never mutated after construction. Share it as `Arc<SourceImage>` between the scheduler and the
/// engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl SourceImage {
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> KaleidoResult<Self> {
        let layout = PixelLayout::from_channels(channels)?;
        Self::with_layout(width, height, layout, data)
    }

    pub fn with_layout(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> KaleidoResult<Self> {
        if width == 0 || height == 0 {
            return Err(KaleidoError::invalid_parameter(
                "source dimensions must be > 0",
            ));
        }
        let expected = buffer_len(width, height, layout)?;
        if data.len() != expected {
            return Err(KaleidoError::invalid_parameter(format!(
                "source buffer is {} bytes, expected {expected} for {width}x{height}x{}",
                data.len(),
                layout.channels()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Adopt a decoded image. RGB8/RGBA8 keep their layout; anything else is converted to RGBA8
    /// when it carries alpha and RGB8 otherwise.
    pub fn from_dynamic(img: DynamicImage) -> KaleidoResult<Self> {
        let (w, h) = (img.width(), img.height());
        match img {
            DynamicImage::ImageRgb8(buf) => Self::with_layout(w, h, PixelLayout::Rgb8, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => {
                Self::with_layout(w, h, PixelLayout::Rgba8, buf.into_raw())
            }
            other if other.color().has_alpha() => {
                Self::with_layout(w, h, PixelLayout::Rgba8, other.to_rgba8().into_raw())
            }
            other => Self::with_layout(w, h, PixelLayout::Rgb8, other.to_rgb8().into_raw()),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Channel slice of the pixel at `(x, y)`. Callers must stay in bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.layout.channels();
        let i = (y * self.width as usize + x) * c;
        &self.data[i..i + c]
    }

    /// Lanczos3-downscaled copy whose longest side is `max_dim`, or `None` if it already fits.
    pub fn downscaled_to_fit(&self, max_dim: u32) -> KaleidoResult<Option<Self>> {
        if max_dim == 0 {
            return Err(KaleidoError::invalid_parameter("max_dim must be > 0"));
        }
        let longest = self.width.max(self.height);
        if longest <= max_dim {
            return Ok(None);
        }
        let scale = f64::from(max_dim) / f64::from(longest);
        let nw = ((f64::from(self.width) * scale).round() as u32).clamp(1, max_dim);
        let nh = ((f64::from(self.height) * scale).round() as u32).clamp(1, max_dim);

        let data = match self.layout {
            PixelLayout::Rgb8 => {
                let buf = ImageBuffer::<Rgb<u8>, _>::from_raw(self.width, self.height, self.data.clone())
                    .ok_or_else(|| KaleidoError::compute("source buffer does not match dimensions"))?;
                imageops::resize(&buf, nw, nh, imageops::FilterType::Lanczos3).into_raw()
            }
            PixelLayout::Rgba8 => {
                let buf = ImageBuffer::<Rgba<u8>, _>::from_raw(self.width, self.height, self.data.clone())
                    .ok_or_else(|| KaleidoError::compute("source buffer does not match dimensions"))?;
                imageops::resize(&buf, nw, nh, imageops::FilterType::Lanczos3).into_raw()
            }
        };
        tracing::debug!(from_w = self.width, from_h = self.height, nw, nh, "downscaled source");
        Self::with_layout(nw, nh, self.layout, data).map(Some)
    }
}

/// Source used for interactive previews: `source` itself when it fits within `max_dim`,
/// otherwise a downscaled copy.
pub fn prepare_preview(source: &Arc<SourceImage>, max_dim: u32) -> KaleidoResult<Arc<SourceImage>> {
    match source.downscaled_to_fit(max_dim)? {
        Some(small) => Ok(Arc::new(small)),
        None => Ok(Arc::clone(source)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/source.rs"]
mod tests;
