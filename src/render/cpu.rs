use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use vello_cpu::peniko::Extend;

use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8};
use crate::foundation::error::{DotweaveError, DotweaveResult};
use crate::paint::ResolvedPaint;
use crate::paint::gradient::GradientKind;
use crate::paint::pattern::{ImageData, Repeat};
use crate::render::FrameRGBA;
use crate::render::raster::{
    CompositeMode, LineCap, LineJoin, LineStyle, RasterContext, VisualEffects,
};

/// CPU raster surface backed by `vello_cpu`.
///
/// Draw calls are recorded into a `vello_cpu::RenderContext` and rasterized into the surface
/// pixmap on [`RasterContext::present`].
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    paint: CpuPaint,
    line: LineStyle,
    effects: VisualEffects,
    images: HashMap<u64, vello_cpu::Image>,
    warned_filters: HashSet<String>,
}

#[derive(Clone)]
enum CpuPaint {
    Solid(Rgba8),
    Gradient(vello_cpu::peniko::Gradient),
    Image(vello_cpu::Image, Point),
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("cached_images", &self.images.len())
            .finish()
    }
}

impl CpuSurface {
    /// Create a transparent surface. Both sides must be in `1..=u16::MAX`.
    pub fn new(width: u32, height: u32) -> DotweaveResult<Self> {
        let (w, h) = surface_size(width, height)?;
        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            paint: CpuPaint::Solid(Rgba8::WHITE),
            line: LineStyle::default(),
            effects: VisualEffects::default(),
            images: HashMap::new(),
            warned_filters: HashSet::new(),
        })
    }

    /// Copy the last presented frame out as straight-alpha RGBA8.
    pub fn read_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
        .into_straight()
    }

    fn image_for(&mut self, image: &Arc<ImageData>, repeat: Repeat) -> DotweaveResult<vello_cpu::Image> {
        let key = image.content_hash();
        let base = match self.images.get(&key) {
            Some(img) => img.clone(),
            None => {
                let pixmap = image_premul_bytes_to_pixmap(image.data(), image.width(), image.height())?;
                let img = vello_cpu::Image {
                    image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                    sampler: vello_cpu::peniko::ImageSampler::default(),
                };
                self.images.insert(key, img.clone());
                img
            }
        };
        let (x_extend, y_extend) = match repeat {
            Repeat::Both => (Extend::Repeat, Extend::Repeat),
            Repeat::X => (Extend::Repeat, Extend::Pad),
            Repeat::Y => (Extend::Pad, Extend::Repeat),
            Repeat::None => (Extend::Pad, Extend::Pad),
        };
        Ok(vello_cpu::Image {
            image: base.image,
            sampler: vello_cpu::peniko::ImageSampler {
                x_extend,
                y_extend,
                ..vello_cpu::peniko::ImageSampler::default()
            },
        })
    }

    fn check_filter(&mut self) {
        let Some(filter) = self.effects.filter.as_deref() else {
            return;
        };
        if filter == "none" || self.warned_filters.contains(filter) {
            return;
        }
        tracing::warn!(filter, "cpu surface does not support filters; drawing unfiltered");
        self.warned_filters.insert(filter.to_owned());
    }

    fn draw_with_state(&mut self, draw: impl FnOnce(&mut vello_cpu::RenderContext)) {
        self.check_filter();
        let effects = &self.effects;
        let mut opacity = effects.opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }

        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match &self.paint {
            CpuPaint::Solid(c) => {
                let a = (f64::from(c.a) * opacity).round() as u8;
                opacity = 1.0;
                self.ctx
                    .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, a));
            }
            CpuPaint::Gradient(g) => self.ctx.set_paint(g.clone()),
            CpuPaint::Image(img, origin) => {
                self.ctx
                    .set_paint_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
                self.ctx.set_paint(img.clone());
            }
        }

        let blend = blend_mode(effects.composite);
        if let Some(mode) = blend {
            self.ctx.push_blend_layer(mode);
        }
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity as f32);
        }
        draw(&mut self.ctx);
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        if blend.is_some() {
            self.ctx.pop_layer();
        }
    }
}

impl RasterContext for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn resize(&mut self, width: u32, height: u32) -> DotweaveResult<()> {
        let (w, h) = surface_size(width, height)?;
        if (w, h) == (self.width, self.height) {
            return Ok(());
        }
        tracing::debug!(width, height, "cpu surface resized");
        self.width = w;
        self.height = h;
        self.ctx = vello_cpu::RenderContext::new(w, h);
        self.pixmap = vello_cpu::Pixmap::new(w, h);
        Ok(())
    }

    fn clear(&mut self, color: Option<Rgba8>) {
        self.ctx.reset();
        self.paint = CpuPaint::Solid(Rgba8::WHITE);
        self.line = LineStyle::default();
        self.effects = VisualEffects::default();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if let Some(c) = color
            && c.a > 0
        {
            self.ctx
                .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(self.width),
                f64::from(self.height),
            ));
        }
    }

    fn set_transform(&mut self, transform: Affine) {
        self.ctx.set_transform(affine_to_cpu(transform));
    }

    fn set_paint(&mut self, paint: &ResolvedPaint) {
        self.paint = match paint {
            ResolvedPaint::Solid(c) => CpuPaint::Solid(*c),
            ResolvedPaint::Gradient(g) => {
                let stops: Vec<vello_cpu::peniko::ColorStop> = g
                    .stops()
                    .iter()
                    .map(|s| {
                        let c = s.color;
                        vello_cpu::peniko::ColorStop::from((
                            s.offset as f32,
                            vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a),
                        ))
                    })
                    .collect();
                let base = match g.kind() {
                    GradientKind::Linear { start, end } => vello_cpu::peniko::Gradient::new_linear(
                        point_to_cpu(start),
                        point_to_cpu(end),
                    ),
                    GradientKind::Radial { center, radius } => {
                        vello_cpu::peniko::Gradient::new_radial(point_to_cpu(center), radius as f32)
                    }
                    GradientKind::Conic { center, start_deg } => {
                        let start = start_deg.to_radians() as f32;
                        vello_cpu::peniko::Gradient::new_sweep(
                            point_to_cpu(center),
                            start,
                            start + std::f32::consts::TAU,
                        )
                    }
                };
                CpuPaint::Gradient(base.with_stops(stops.as_slice()))
            }
            ResolvedPaint::Pattern(p) => match self.image_for(p.image(), p.repeat()) {
                Ok(img) => CpuPaint::Image(img, p.origin()),
                Err(e) => {
                    tracing::warn!(error = %e, "pattern image rejected; using transparent paint");
                    CpuPaint::Solid(Rgba8::TRANSPARENT)
                }
            },
        };
    }

    fn set_line_style(&mut self, style: &LineStyle) {
        self.line = style.clone();
        let cap = match style.cap {
            LineCap::Butt => vello_cpu::kurbo::Cap::Butt,
            LineCap::Round => vello_cpu::kurbo::Cap::Round,
            LineCap::Square => vello_cpu::kurbo::Cap::Square,
        };
        let join = match style.join {
            LineJoin::Miter => vello_cpu::kurbo::Join::Miter,
            LineJoin::Round => vello_cpu::kurbo::Join::Round,
            LineJoin::Bevel => vello_cpu::kurbo::Join::Bevel,
        };
        let mut stroke = vello_cpu::kurbo::Stroke::new(style.width)
            .with_caps(cap)
            .with_join(join);
        if !style.dash.is_empty() {
            stroke = stroke.with_dashes(style.dash_offset, style.dash.iter().copied());
        }
        self.ctx.set_stroke(stroke);
    }

    fn set_effects(&mut self, effects: &VisualEffects) {
        self.effects = effects.clone();
    }

    fn fill_path(&mut self, path: &BezPath) {
        let path = bezpath_to_cpu(path);
        self.draw_with_state(|ctx| ctx.fill_path(&path));
    }

    fn stroke_path(&mut self, path: &BezPath) {
        if self.line.width <= 0.0 {
            return;
        }
        let path = bezpath_to_cpu(path);
        self.draw_with_state(|ctx| ctx.stroke_path(&path));
    }

    fn draw_image(&mut self, image: &Arc<ImageData>, dest: Rect) {
        if image.width() == 0 || image.height() == 0 || dest.area() <= 0.0 {
            return;
        }
        let img = match self.image_for(image, Repeat::None) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!(error = %e, "image rejected by cpu surface");
                return;
            }
        };
        let saved = std::mem::replace(&mut self.paint, CpuPaint::Image(img, dest.origin()));
        let sx = dest.width() / f64::from(image.width());
        let sy = dest.height() / f64::from(image.height());
        let rect = vello_cpu::kurbo::Rect::new(dest.x0, dest.y0, dest.x1, dest.y1);
        let paint_xf = vello_cpu::kurbo::Affine::translate((dest.x0, dest.y0))
            * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy);
        self.draw_with_state(|ctx| {
            ctx.set_paint_transform(paint_xf);
            ctx.fill_rect(&rect);
        });
        self.paint = saved;
    }

    fn present(&mut self) -> DotweaveResult<()> {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }

    fn read_frame(&self) -> Option<FrameRGBA> {
        Some(CpuSurface::read_frame(self))
    }
}

fn surface_size(width: u32, height: u32) -> DotweaveResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| DotweaveError::raster("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| DotweaveError::raster("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(DotweaveError::raster(format!(
            "surface size {width}x{height} is empty"
        )));
    }
    Ok((w, h))
}

fn blend_mode(mode: CompositeMode) -> Option<vello_cpu::peniko::BlendMode> {
    use vello_cpu::peniko::{BlendMode, Compose, Mix};

    let (mix, compose) = match mode {
        CompositeMode::SourceOver => return None,
        CompositeMode::DestinationOver => (Mix::Normal, Compose::DestOver),
        CompositeMode::Lighter => (Mix::Normal, Compose::Plus),
        CompositeMode::Xor => (Mix::Normal, Compose::Xor),
        CompositeMode::SourceAtop => (Mix::Normal, Compose::SrcAtop),
        CompositeMode::DestinationOut => (Mix::Normal, Compose::DestOut),
        CompositeMode::Multiply => (Mix::Multiply, Compose::SrcOver),
        CompositeMode::Screen => (Mix::Screen, Compose::SrcOver),
        CompositeMode::Overlay => (Mix::Overlay, Compose::SrcOver),
        CompositeMode::Darken => (Mix::Darken, Compose::SrcOver),
        CompositeMode::Lighten => (Mix::Lighten, Compose::SrcOver),
        CompositeMode::Difference => (Mix::Difference, Compose::SrcOver),
    };
    Some(BlendMode::new(mix, compose))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> DotweaveResult<vello_cpu::Pixmap> {
    let (w, h) = surface_size(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(DotweaveError::raster("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
