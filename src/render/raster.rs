use std::fmt::Write as _;
use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rect, Rgba8};
use crate::foundation::error::DotweaveResult;
use crate::paint::ResolvedPaint;
use crate::paint::pattern::ImageData;
use crate::render::FrameRGBA;

/// How source pixels combine with what is already on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CompositeMode {
    /// Draw over existing content.
    #[default]
    SourceOver,
    /// Draw under existing content.
    DestinationOver,
    /// Additive.
    Lighter,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
    /// Overlay blend.
    Overlay,
    /// Keep the darker channel.
    Darken,
    /// Keep the lighter channel.
    Lighten,
    /// Absolute difference.
    Difference,
    /// Exclusive or.
    Xor,
    /// Draw only where existing content is.
    SourceAtop,
    /// Erase existing content where drawing.
    DestinationOut,
}

/// The `(filter, composite, opacity)` triple applied to a draw call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualEffects {
    /// Filter identifier produced by an external filter registry, used as-is.
    pub filter: Option<String>,
    /// Composite mode.
    pub composite: CompositeMode,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for VisualEffects {
    fn default() -> Self {
        Self {
            filter: None,
            composite: CompositeMode::SourceOver,
            opacity: 1.0,
        }
    }
}

impl VisualEffects {
    /// Effects drawing under existing content ("destination-over").
    pub fn under() -> Self {
        Self {
            composite: CompositeMode::DestinationOver,
            ..Self::default()
        }
    }

    /// Replace the opacity, clamped to `[0, 1]`.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Replace the composite mode.
    pub fn with_composite(mut self, composite: CompositeMode) -> Self {
        self.composite = composite;
        self
    }

    /// Replace the filter identifier.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub(crate) fn write_key(&self, out: &mut String) {
        let _ = write!(
            out,
            "|{}|{:?}|{}",
            self.filter.as_deref().unwrap_or(""),
            self.composite,
            self.opacity
        );
    }
}

/// Line cap style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Rounded end.
    Round,
    /// Square end extending past the endpoint.
    Square,
}

/// Line join style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut corner.
    Bevel,
}

/// Stroke geometry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineStyle {
    /// Stroke width in pixels.
    pub width: f64,
    /// Cap style.
    pub cap: LineCap,
    /// Join style.
    pub join: LineJoin,
    /// Dash pattern; empty draws solid lines.
    pub dash: Vec<f64>,
    /// Dash phase.
    pub dash_offset: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

impl LineStyle {
    /// Solid line of the given width.
    pub fn width(width: f64) -> Self {
        Self {
            width: width.max(0.0),
            ..Self::default()
        }
    }

    /// Replace the cap style.
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    /// Replace the join style.
    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    /// Replace the dash pattern.
    pub fn with_dash(mut self, dash: impl Into<Vec<f64>>, offset: f64) -> Self {
        self.dash = dash.into();
        self.dash_offset = offset;
        self
    }

    pub(crate) fn write_key(&self, out: &mut String) {
        let _ = write!(
            out,
            "|{}|{:?}|{:?}|{:?}|{}",
            self.width, self.cap, self.join, self.dash, self.dash_offset
        );
    }
}

/// Immediate-mode 2D raster context.
///
/// Implementations keep the current transform, paint, line style and effects as state; draw calls
/// use whatever state is current. [`crate::Render`] owns one of these and minimizes state changes.
pub trait RasterContext {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the surface. Content is discarded.
    fn resize(&mut self, width: u32, height: u32) -> DotweaveResult<()>;

    /// Start a frame, clearing to `color` (transparent when `None`).
    fn clear(&mut self, color: Option<Rgba8>);

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Replace the current paint.
    fn set_paint(&mut self, paint: &ResolvedPaint);

    /// Replace the current stroke geometry.
    fn set_line_style(&mut self, style: &LineStyle);

    /// Replace the current visual effects.
    fn set_effects(&mut self, effects: &VisualEffects);

    /// Fill `path` (non-zero winding) with the current state.
    fn fill_path(&mut self, path: &BezPath);

    /// Stroke `path` with the current state.
    fn stroke_path(&mut self, path: &BezPath);

    /// Draw `image` scaled into `dest` with the current transform and effects.
    fn draw_image(&mut self, image: &Arc<ImageData>, dest: Rect);

    /// Finish the frame and make it visible.
    fn present(&mut self) -> DotweaveResult<()>;

    /// Pixels of the last presented frame, for surfaces that keep them.
    fn read_frame(&self) -> Option<FrameRGBA> {
        None
    }
}
