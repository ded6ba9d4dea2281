use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rect, Rgba8};
use crate::foundation::error::{DotweaveError, DotweaveResult};
use crate::paint::ResolvedPaint;
use crate::paint::pattern::ImageData;
use crate::render::raster::{LineStyle, RasterContext, VisualEffects};

/// One call received by a [`RecordingContext`].
#[derive(Clone, Debug)]
pub enum RasterOp {
    /// Frame start.
    Clear(Option<Rgba8>),
    /// Transform change.
    SetTransform(Affine),
    /// Paint change, carrying the paint signature.
    SetPaint(String),
    /// Stroke geometry change.
    SetLineStyle(LineStyle),
    /// Effects change.
    SetEffects(VisualEffects),
    /// Filled path, with its bounding box.
    Fill(Rect),
    /// Stroked path, with its bounding box.
    Stroke(Rect),
    /// Image draw into a destination rectangle.
    Image(Rect),
    /// Frame end.
    Present,
}

/// Shared handle to the operations recorded by a [`RecordingContext`].
#[derive(Clone, Debug, Default)]
pub struct OpLog(Rc<RefCell<Vec<RasterOp>>>);

impl OpLog {
    /// Snapshot of every recorded operation.
    pub fn ops(&self) -> Vec<RasterOp> {
        self.0.borrow().clone()
    }

    /// Number of recorded operations matching `pred`.
    pub fn count(&self, pred: impl Fn(&RasterOp) -> bool) -> usize {
        self.0.borrow().iter().filter(|op| pred(op)).count()
    }

    /// Operations recorded since the last [`RasterOp::Clear`].
    pub fn last_frame(&self) -> Vec<RasterOp> {
        let ops = self.0.borrow();
        let start = ops
            .iter()
            .rposition(|op| matches!(op, RasterOp::Clear(_)))
            .unwrap_or(0);
        ops[start..].to_vec()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, op: RasterOp) {
        self.0.borrow_mut().push(op);
    }
}

/// Headless raster context that records every call instead of drawing.
#[derive(Debug)]
pub struct RecordingContext {
    width: u32,
    height: u32,
    log: OpLog,
}

impl RecordingContext {
    /// Create a recorder pretending to be a `width` x `height` surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            log: OpLog::default(),
        }
    }

    /// Handle to the recorded operations. Stays valid after the recorder is boxed.
    pub fn log(&self) -> OpLog {
        self.log.clone()
    }
}

impl RasterContext for RecordingContext {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> DotweaveResult<()> {
        if width == 0 || height == 0 {
            return Err(DotweaveError::raster(format!(
                "surface size {width}x{height} is empty"
            )));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn clear(&mut self, color: Option<Rgba8>) {
        self.log.push(RasterOp::Clear(color));
    }

    fn set_transform(&mut self, transform: Affine) {
        self.log.push(RasterOp::SetTransform(transform));
    }

    fn set_paint(&mut self, paint: &ResolvedPaint) {
        let mut key = String::new();
        paint.write_key(&mut key);
        self.log.push(RasterOp::SetPaint(key));
    }

    fn set_line_style(&mut self, style: &LineStyle) {
        self.log.push(RasterOp::SetLineStyle(style.clone()));
    }

    fn set_effects(&mut self, effects: &VisualEffects) {
        self.log.push(RasterOp::SetEffects(effects.clone()));
    }

    fn fill_path(&mut self, path: &BezPath) {
        use kurbo::Shape as _;
        self.log.push(RasterOp::Fill(path.bounding_box()));
    }

    fn stroke_path(&mut self, path: &BezPath) {
        use kurbo::Shape as _;
        self.log.push(RasterOp::Stroke(path.bounding_box()));
    }

    fn draw_image(&mut self, _image: &Arc<ImageData>, dest: Rect) {
        self.log.push(RasterOp::Image(dest));
    }

    fn present(&mut self) -> DotweaveResult<()> {
        self.log.push(RasterOp::Present);
        Ok(())
    }
}
