//! Ready-made helpers for dot effect callbacks.
//!
//! Everything here draws through the batching renderer under destination-over compositing, so
//! lines issued while dots are drawing never cover dots drawn earlier in the same frame.

use crate::foundation::core::{BezPath, Lerp, Rgba8};
use crate::paint::ResolvedPaint;
use crate::render::raster::{LineStyle, VisualEffects};
use crate::scene::dot::Dot;
use crate::scene::drawable::DrawCtx;
use crate::scene::object::SceneObject;
use crate::scene::shape::DotSample;

const OPACITY_STEP: f64 = 0.05;

/// Stroke a line from `dot` to each of its connections, fading out as the sample ratio grows.
///
/// Connections resolve through the shape snapshot; ids that no longer exist are skipped.
pub fn draw_connections(
    ctx: &mut DrawCtx<'_>,
    dot: &Dot,
    sample: &DotSample<'_>,
    color: Rgba8,
    line: &LineStyle,
) {
    let opacity = quantize(dot.opacity() * (1.0 - sample.ratio));
    if opacity <= ctx.visibility_threshold() {
        return;
    }
    let from = dot.pos();
    let mut path = BezPath::new();
    for id in dot.connections() {
        if let Some(to) = sample.shape.find(*id) {
            path.move_to(from);
            path.line_to(to.pos);
        }
    }
    if path.is_empty() {
        return;
    }
    let effects = VisualEffects::under().with_opacity(opacity);
    ctx.render
        .batch_stroke(path, &ResolvedPaint::Solid(color), line, &effects);
}

/// Stroke a line from `dot` to every sibling closer than `limit`, fading with distance.
///
/// Returns how many lines were queued.
pub fn connect_within(
    ctx: &mut DrawCtx<'_>,
    dot: &Dot,
    sample: &DotSample<'_>,
    limit: f64,
    color: Rgba8,
    line: &LineStyle,
) -> usize {
    if !(limit.is_finite() && limit > 0.0) {
        return 0;
    }
    let from = dot.pos();
    let paint = ResolvedPaint::Solid(color);
    let mut drawn = 0;
    for other in sample.shape.dots() {
        if other.id == dot.id() {
            continue;
        }
        let d = from.distance(other.pos);
        if d >= limit {
            continue;
        }
        let opacity = quantize(dot.opacity() * (1.0 - d / limit));
        if opacity <= ctx.visibility_threshold() {
            continue;
        }
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(other.pos);
        let effects = VisualEffects::under().with_opacity(opacity);
        ctx.render.batch_stroke(path, &paint, line, &effects);
        drawn += 1;
    }
    drawn
}

/// Interpolate an opacity from `near` (ratio 0) to `far` (ratio 1), clamped to `[0, 1]`.
pub fn ratio_opacity(ratio: f64, near: f64, far: f64) -> f64 {
    f64::lerp(&near, &far, ratio.clamp(0.0, 1.0)).clamp(0.0, 1.0)
}

/// Interpolate a radius from `near` (ratio 0) to `far` (ratio 1). Never negative.
pub fn ratio_radius(ratio: f64, near: f64, far: f64) -> f64 {
    f64::lerp(&near, &far, ratio.clamp(0.0, 1.0)).max(0.0)
}

// Coarse opacity steps keep the number of style groups bounded.
fn quantize(opacity: f64) -> f64 {
    ((opacity / OPACITY_STEP).round() * OPACITY_STEP).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/fx.rs"]
mod tests;
