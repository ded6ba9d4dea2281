//! Raster abstraction and the batching renderer built on top of it.

pub(crate) mod batch;
pub(crate) mod cpu;
pub(crate) mod raster;
pub(crate) mod recording;

use crate::foundation::error::{DotweaveError, DotweaveResult};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Convert premultiplied pixels to straight alpha (for PNG export).
    pub fn into_straight(mut self) -> Self {
        if !self.premultiplied {
            return self;
        }
        for px in self.data.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        self.premultiplied = false;
        self
    }

    /// Write the frame as a PNG file (straight alpha).
    #[tracing::instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn write_png(&self, path: &std::path::Path) -> DotweaveResult<()> {
        let straight = self.clone().into_straight();
        let img = image::RgbaImage::from_raw(straight.width, straight.height, straight.data)
            .ok_or_else(|| DotweaveError::raster("frame buffer size mismatch"))?;
        img.save(path)
            .map_err(|e| DotweaveError::raster(format!("write png '{}': {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "frame exported");
        Ok(())
    }

    /// RGBA of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
