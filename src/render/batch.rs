use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rect, Rgba8};
use crate::foundation::error::DotweaveResult;
use crate::paint::ResolvedPaint;
use crate::paint::pattern::ImageData;
use crate::render::FrameRGBA;
use crate::render::raster::{LineStyle, RasterContext, VisualEffects};

/// Per-frame renderer counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Style groups flushed by [`Render::draw_batched`].
    pub batched_groups: usize,
    /// Paths replayed from style groups.
    pub batched_paths: usize,
    /// Strokes, fills and images issued immediately.
    pub direct_draws: usize,
    /// Times a full style (paint, line, effects) was applied to the raster context.
    pub style_applications: usize,
    /// Deferred draw callbacks executed.
    pub deferred: usize,
}

struct Batch {
    paint: ResolvedPaint,
    line: Option<LineStyle>,
    effects: VisualEffects,
    paths: Vec<BezPath>,
}

#[derive(Default)]
struct BatchMap {
    index: HashMap<String, usize>,
    groups: Vec<Batch>,
}

impl BatchMap {
    fn push(
        &mut self,
        key: &str,
        path: BezPath,
        paint: &ResolvedPaint,
        line: Option<&LineStyle>,
        effects: &VisualEffects,
    ) {
        if let Some(&i) = self.index.get(key) {
            self.groups[i].paths.push(path);
            return;
        }
        self.index.insert(key.to_owned(), self.groups.len());
        self.groups.push(Batch {
            paint: paint.clone(),
            line: line.cloned(),
            effects: effects.clone(),
            paths: vec![path],
        });
    }

    fn take(&mut self) -> Vec<Batch> {
        self.index.clear();
        std::mem::take(&mut self.groups)
    }
}

type DeferredDraw = Box<dyn FnOnce(&mut dyn RasterContext)>;

/// Stateful batching façade over a [`RasterContext`].
///
/// Batched strokes and fills are grouped by a style signature and replayed once per frame by
/// [`Render::draw_batched`], strokes first, each group in the order its style was first seen.
/// Direct draws go to the raster context immediately and therefore land under every batched draw
/// of the same frame; callers needing strict z-order across styles must draw directly.
pub struct Render {
    raster: Box<dyn RasterContext>,
    transform: Affine,
    strokes: BatchMap,
    fills: BatchMap,
    deferred: Vec<DeferredDraw>,
    key: String,
    stats: RenderStats,
}

impl std::fmt::Debug for Render {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Render")
            .field("size", &self.raster.size())
            .field("transform", &self.transform)
            .field("stroke_groups", &self.strokes.groups.len())
            .field("fill_groups", &self.fills.groups.len())
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

impl Render {
    /// Wrap a raster context.
    pub fn new(raster: Box<dyn RasterContext>) -> Self {
        Self {
            raster,
            transform: Affine::IDENTITY,
            strokes: BatchMap::default(),
            fills: BatchMap::default(),
            deferred: Vec::new(),
            key: String::new(),
            stats: RenderStats::default(),
        }
    }

    /// Surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.raster.size()
    }

    /// Surface bounds as a rectangle at the origin.
    pub fn viewport(&self) -> Rect {
        let (w, h) = self.raster.size();
        Rect::new(0.0, 0.0, f64::from(w), f64::from(h))
    }

    /// Counters of the frame in progress (or the last finished frame).
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Current transform set by enclosing [`Render::with_transform`] brackets.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Direct access to the raster context.
    pub fn raster(&mut self) -> &mut dyn RasterContext {
        self.raster.as_mut()
    }

    /// Pixels of the last presented frame, when the raster context keeps them.
    pub fn read_frame(&self) -> Option<FrameRGBA> {
        self.raster.read_frame()
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> DotweaveResult<()> {
        self.raster.resize(width, height)
    }

    /// Start a frame: reset counters and queues, clear the surface.
    pub fn begin_frame(&mut self, clear: Option<Rgba8>) {
        self.stats = RenderStats::default();
        self.transform = Affine::IDENTITY;
        self.strokes.take();
        self.fills.take();
        self.deferred.clear();
        self.raster.clear(clear);
    }

    /// Finish a frame: flush pending batches and present the surface.
    pub fn end_frame(&mut self) -> DotweaveResult<()> {
        self.draw_batched();
        self.raster.present()
    }

    /// Run `f` with `transform` appended to the current transform.
    ///
    /// Batched calls made inside the bracket fall back to direct draws.
    pub fn with_transform<R>(&mut self, transform: Affine, f: impl FnOnce(&mut Self) -> R) -> R {
        let prev = self.transform;
        self.transform = prev * transform;
        let out = f(self);
        self.transform = prev;
        out
    }

    /// Queue a stroke for the style group matching `paint`, `line` and `effects`.
    pub fn batch_stroke(
        &mut self,
        path: BezPath,
        paint: &ResolvedPaint,
        line: &LineStyle,
        effects: &VisualEffects,
    ) {
        if self.transform != Affine::IDENTITY {
            self.stroke(&path, paint, line, effects);
            return;
        }
        self.key.clear();
        paint.write_key(&mut self.key);
        line.write_key(&mut self.key);
        effects.write_key(&mut self.key);
        self.strokes
            .push(&self.key, path, paint, Some(line), effects);
    }

    /// Queue a fill for the style group matching `paint` and `effects`.
    pub fn batch_fill(&mut self, path: BezPath, paint: &ResolvedPaint, effects: &VisualEffects) {
        if self.transform != Affine::IDENTITY {
            self.fill(&path, paint, effects);
            return;
        }
        self.key.clear();
        paint.write_key(&mut self.key);
        effects.write_key(&mut self.key);
        self.fills.push(&self.key, path, paint, None, effects);
    }

    /// Stroke `path` immediately under the current transform.
    pub fn stroke(
        &mut self,
        path: &BezPath,
        paint: &ResolvedPaint,
        line: &LineStyle,
        effects: &VisualEffects,
    ) {
        self.apply_style(self.transform, paint, Some(line), effects);
        self.raster.stroke_path(path);
        self.stats.direct_draws += 1;
    }

    /// Fill `path` immediately under the current transform.
    pub fn fill(&mut self, path: &BezPath, paint: &ResolvedPaint, effects: &VisualEffects) {
        self.apply_style(self.transform, paint, None, effects);
        self.raster.fill_path(path);
        self.stats.direct_draws += 1;
    }

    /// Draw `image` into `dest` immediately under the current transform.
    pub fn image(&mut self, image: &Arc<ImageData>, dest: Rect, effects: &VisualEffects) {
        self.raster.set_transform(self.transform);
        self.raster.set_effects(effects);
        self.raster.draw_image(image, dest);
        self.stats.direct_draws += 1;
    }

    /// Run `draw` against the raster context after this frame's batches are flushed.
    pub fn defer(&mut self, draw: impl FnOnce(&mut dyn RasterContext) + 'static) {
        self.deferred.push(Box::new(draw));
    }

    /// Replay every queued group (strokes, then fills), then the deferred callbacks.
    ///
    /// Queues are empty afterwards, so calling this twice in a frame draws nothing new.
    pub fn draw_batched(&mut self) {
        let strokes = self.strokes.take();
        let fills = self.fills.take();
        let mut paths = 0usize;
        let groups = strokes.len() + fills.len();

        for batch in &strokes {
            self.apply_style(Affine::IDENTITY, &batch.paint, batch.line.as_ref(), &batch.effects);
            for path in &batch.paths {
                self.raster.stroke_path(path);
            }
            paths += batch.paths.len();
        }
        for batch in &fills {
            self.apply_style(Affine::IDENTITY, &batch.paint, None, &batch.effects);
            for path in &batch.paths {
                self.raster.fill_path(path);
            }
            paths += batch.paths.len();
        }

        let deferred = std::mem::take(&mut self.deferred);
        let deferred_count = deferred.len();
        if deferred_count > 0 {
            self.raster.set_transform(Affine::IDENTITY);
        }
        for draw in deferred {
            draw(self.raster.as_mut());
        }

        self.stats.batched_groups += groups;
        self.stats.batched_paths += paths;
        self.stats.deferred += deferred_count;
        if groups > 0 || deferred_count > 0 {
            tracing::trace!(groups, paths, deferred = deferred_count, "batches flushed");
        }
    }

    fn apply_style(
        &mut self,
        transform: Affine,
        paint: &ResolvedPaint,
        line: Option<&LineStyle>,
        effects: &VisualEffects,
    ) {
        self.raster.set_transform(transform);
        self.raster.set_paint(paint);
        if let Some(line) = line {
            self.raster.set_line_style(line);
        }
        self.raster.set_effects(effects);
        self.stats.style_applications += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
