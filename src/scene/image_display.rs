use std::any::Any;

use crate::animation::anim::{AnimQueue, Animated};
use crate::foundation::core::{Point, Rect, Vec2};
use crate::media::{MediaErrorKind, MediaPoll, MediaSource};
use crate::scene::drawable::{DrawCtx, Drawable, SceneCtx};
use crate::scene::object::{ObjectCore, PosDecl, SceneObject};

type MediaErrorFn = Box<dyn FnMut(&mut ImageDisplay, MediaErrorKind)>;

/// Draws the current frame of a [`MediaSource`], centered on its position.
pub struct ImageDisplay {
    core: ObjectCore,
    source: Box<dyn MediaSource>,
    size: Option<Vec2>,
    frame_size: Option<Vec2>,
    on_error: Option<MediaErrorFn>,
    last_error: Option<MediaErrorKind>,
    anims: AnimQueue<ImageDisplay>,
}

impl std::fmt::Debug for ImageDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageDisplay")
            .field("core", &self.core)
            .field("size", &self.size)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl ImageDisplay {
    /// Display `source` at `pos`, at the frame's natural size.
    pub fn new(pos: impl Into<PosDecl>, source: impl MediaSource + 'static) -> Self {
        Self::with_core(ObjectCore::new(pos), source)
    }

    /// Display built around an explicit core.
    pub fn with_core(core: ObjectCore, source: impl MediaSource + 'static) -> Self {
        Self {
            core,
            source: Box::new(source),
            size: None,
            frame_size: None,
            on_error: None,
            last_error: None,
            anims: AnimQueue::default(),
        }
    }

    /// Draw at a fixed size instead of the frame size. Non-positive sizes are ignored.
    pub fn with_size(mut self, size: impl Into<Vec2>) -> Self {
        let size = size.into();
        if size.x > 0.0 && size.y > 0.0 && size.x.is_finite() && size.y.is_finite() {
            self.size = Some(size);
        }
        self
    }

    /// Called once per failure; a recovered source that fails again reports again.
    pub fn on_error(mut self, f: impl FnMut(&mut ImageDisplay, MediaErrorKind) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Replace the source. Clears the failure state.
    pub fn set_source(&mut self, source: impl MediaSource + 'static) {
        self.source = Box::new(source);
        self.frame_size = None;
        self.last_error = None;
    }

    /// Most recent failure, if the source is currently failing.
    pub fn last_error(&self) -> Option<MediaErrorKind> {
        self.last_error
    }

    fn draw_size(&self) -> Vec2 {
        self.size.or(self.frame_size).unwrap_or(Vec2::ZERO)
    }

    fn report(&mut self, kind: MediaErrorKind) {
        if self.last_error == Some(kind) {
            return;
        }
        self.last_error = Some(kind);
        tracing::warn!(id = %self.core.id(), error = %kind, "media source failed");
        if let Some(mut f) = self.on_error.take() {
            f(self, kind);
            if self.on_error.is_none() {
                self.on_error = Some(f);
            }
        }
    }
}

impl Animated for ImageDisplay {
    fn anim_queue(&mut self) -> &mut AnimQueue<Self> {
        &mut self.anims
    }
}

impl SceneObject for ImageDisplay {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }
}

impl Drawable for ImageDisplay {
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>) {
        let parent = ctx.parent();
        let placements = ctx.placements;
        self.core.initialize(ctx.ids, parent, placements);
    }

    fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
        self.run_anims(ctx.time);
        if let Some(p) = self.core.follow_anchor(ctx.placements()) {
            self.core.translate(p - self.core.pos());
        }

        let image = match self.source.poll(ctx.time) {
            MediaPoll::Pending => return,
            MediaPoll::Failed(kind) => {
                self.report(kind);
                return;
            }
            MediaPoll::Ready(image) => image,
        };
        self.last_error = None;
        self.frame_size = Some(Vec2::new(
            f64::from(image.width()),
            f64::from(image.height()),
        ));
        if self.core.opacity() <= ctx.visibility_threshold() {
            return;
        }
        let size = self.draw_size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let dest = Rect::from_center_size(self.core.pos(), size.to_size());
        let effects = self.core.effects().clone();
        let xf = self.core.transform_about(None);
        ctx.render
            .with_transform(xf, |r| r.image(&image, dest, &effects));
    }

    fn bounds(&self) -> Rect {
        let local = Rect::from_center_size(self.core.pos(), self.draw_size().to_size());
        self.core.transformed_bounds(local)
    }

    fn contains(&self, point: Point, accurate: bool) -> bool {
        if !accurate {
            return self.bounds().contains(point);
        }
        let local = Rect::from_center_size(self.core.pos(), self.draw_size().to_size());
        match self.core.untransform(point, None) {
            Some(p) => local.contains(p),
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/image_display.rs"]
mod tests;
