use std::sync::Arc;

use crate::foundation::core::Point;
use crate::foundation::error::{DotweaveError, DotweaveResult};
use crate::foundation::math::Fnv1a64;

/// Premultiplied RGBA8 pixels, tightly packed, row-major.
#[derive(Debug, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    rgba8_premul: Vec<u8>,
    content_hash: u64,
}

impl ImageData {
    /// Wrap premultiplied pixels. Fails when the byte length does not match the size.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> DotweaveResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(DotweaveError::validation(format!(
                "image byte length {} does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }
        let mut h = Fnv1a64::new_default();
        h.write_u64(u64::from(width));
        h.write_u64(u64::from(height));
        h.write_bytes(&rgba8_premul);
        Ok(Self {
            width,
            height,
            rgba8_premul,
            content_hash: h.finish(),
        })
    }

    /// Premultiply straight-alpha pixels and wrap them.
    pub fn from_straight(width: u32, height: u32, mut rgba8: Vec<u8>) -> DotweaveResult<Self> {
        for px in rgba8.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = (((u16::from(*c) * a) + 127) / 255) as u8;
            }
        }
        Self::from_premul(width, height, rgba8)
    }

    /// Convert a decoded `image` buffer.
    pub fn from_image(img: &image::RgbaImage) -> DotweaveResult<Self> {
        Self::from_straight(img.width(), img.height(), img.as_raw().clone())
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Hash of size and pixels, used to key pattern batches.
    pub fn content_hash(&self) -> u64 {
        self.content_hash
    }
}

/// Pattern tiling behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Repeat {
    /// Tile on both axes.
    #[default]
    Both,
    /// Tile horizontally only.
    X,
    /// Tile vertically only.
    Y,
    /// Draw once; edges extend.
    None,
}

/// Image-backed paint.
#[derive(Clone, Debug)]
pub struct Pattern {
    image: Arc<ImageData>,
    repeat: Repeat,
    origin: Point,
}

impl Pattern {
    /// Tile `image` from the surface origin.
    pub fn new(image: Arc<ImageData>, repeat: Repeat) -> Self {
        Self {
            image,
            repeat,
            origin: Point::ZERO,
        }
    }

    /// Move the tiling origin.
    pub fn with_origin(mut self, origin: impl Into<Point>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Source pixels.
    pub fn image(&self) -> &Arc<ImageData> {
        &self.image
    }

    /// Tiling behavior.
    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    /// Tiling origin.
    pub fn origin(&self) -> Point {
        self.origin
    }
}
