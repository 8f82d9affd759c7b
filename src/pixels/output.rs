use image::{DynamicImage, ImageBuffer};

use crate::foundation::core::PixelLayout;
use crate::foundation::error::{KaleidoError, KaleidoResult};
use crate::pixels::source::SourceImage;

/// Requested output canvas size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputSpec {
    pub width: u32,
    pub height: u32,
}

impl OutputSpec {
    pub fn new(width: u32, height: u32) -> KaleidoResult<Self> {
        if width == 0 || height == 0 {
            return Err(KaleidoError::invalid_parameter(
                "output width and height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// `spec`, or the source dimensions when unspecified.
    pub fn resolve(spec: Option<Self>, source: &SourceImage) -> Self {
        spec.unwrap_or(Self {
            width: source.width(),
            height: source.height(),
        })
    }
}

/// Rendered pixels. Same channel layout as the source they were sampled from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

impl RenderResult {
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.layout.channels();
        let i = (y as usize * self.width as usize + x as usize) * c;
        &self.data[i..i + c]
    }

    /// Hand the buffer to the `image` crate for display scaling or encoding.
    pub fn into_dynamic(self) -> KaleidoResult<DynamicImage> {
        let (w, h) = (self.width, self.height);
        let bad_len = || KaleidoError::compute("render buffer does not match its dimensions");
        Ok(match self.layout {
            PixelLayout::Rgb8 => {
                DynamicImage::ImageRgb8(ImageBuffer::from_raw(w, h, self.data).ok_or_else(bad_len)?)
            }
            PixelLayout::Rgba8 => {
                DynamicImage::ImageRgba8(ImageBuffer::from_raw(w, h, self.data).ok_or_else(bad_len)?)
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/output.rs"]
mod tests;
