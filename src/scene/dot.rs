use std::any::Any;

use kurbo::Shape as _;

use crate::animation::anim::{Anim, AnimQueue, Animated};
use crate::animation::ease::Ease;
use crate::foundation::core::{BezPath, Lerp, ObjId, Point, Rect};
use crate::scene::drawable::{DrawCtx, Drawable, SceneCtx};
use crate::scene::object::{ObjectCore, PosDecl, SceneObject};
use crate::scene::shape::{DotEffectFn, DotSample, ShapeFrame};

const PATH_TOLERANCE: f64 = 0.1;

/// Default dot radius in pixels.
pub const DEFAULT_RADIUS: f64 = 2.0;

#[derive(Debug)]
struct PathCache {
    pos: Point,
    radius: f64,
    path: BezPath,
}

/// Leaf circle drawable with proximity effects and connections to sibling dots.
#[derive(Debug)]
pub struct Dot {
    core: ObjectCore,
    radius: f64,
    connections: Vec<ObjId>,
    path: Option<PathCache>,
    anims: AnimQueue<Dot>,
}

/// What a shape hands to a dot while drawing its children.
pub(crate) struct EffectCall<'s> {
    pub(crate) effect: &'s mut DotEffectFn,
    pub(crate) frame: &'s ShapeFrame,
    pub(crate) setup: Option<&'s (dyn Any + 'static)>,
}

impl Dot {
    /// Dot at `pos` with the given radius. Negative or non-finite radii become `0`.
    pub fn new(pos: impl Into<PosDecl>, radius: f64) -> Self {
        Self::with_core(ObjectCore::new(pos), radius)
    }

    /// Dot built around an explicit core (paint, effects, anchor, margin).
    pub fn with_core(core: ObjectCore, radius: f64) -> Self {
        Self {
            core,
            radius: sanitize_radius(radius),
            connections: Vec::new(),
            path: None,
            anims: AnimQueue::default(),
        }
    }

    /// Radius in pixels.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Replace the radius. Negative or non-finite radii become `0`.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = sanitize_radius(radius);
    }

    /// Animate the radius to `target`.
    pub fn radius_to(&mut self, target: f64, duration_ms: f64, ease: Ease, unique: bool) {
        let mut from = None;
        self.play_anim(
            Anim::new(duration_ms, ease, move |dot: &mut Dot, f| {
                let start = *from.get_or_insert(dot.radius);
                dot.set_radius(f64::lerp(&start, &target, f.progress));
            }),
            unique,
            false,
        );
    }

    /// Ids of the dots this dot connects to, in insertion order.
    pub fn connections(&self) -> &[ObjId] {
        &self.connections
    }

    /// Add a connection. Self links and duplicates are ignored.
    pub fn connect(&mut self, id: ObjId) {
        if id != self.core.id() && !self.connections.contains(&id) {
            self.connections.push(id);
        }
    }

    /// Remove a connection. Returns `false` when it did not exist.
    pub fn disconnect(&mut self, id: ObjId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| *c != id);
        self.connections.len() != before
    }

    /// Drop every connection.
    pub fn clear_connections(&mut self) {
        self.connections.clear();
    }

    /// Uninitialized copy with the same placement, radius, style and connections.
    ///
    /// Returns `None` before initialization, since positions and anchors are not resolved yet.
    pub fn duplicate(&self) -> Option<Dot> {
        let core = self.core.duplicate()?;
        Some(Self {
            core,
            radius: self.radius,
            connections: self.connections.clone(),
            path: None,
            anims: AnimQueue::default(),
        })
    }

    /// Circle outline at the current position and radius, rebuilt only when either changed.
    pub fn path(&mut self) -> &BezPath {
        let (pos, radius) = (self.core.pos(), self.radius);
        let cache = match self.path.take() {
            Some(c) if c.pos == pos && c.radius == radius => c,
            _ => PathCache {
                pos,
                radius,
                path: kurbo::Circle::new(pos, radius).to_path(PATH_TOLERANCE),
            },
        };
        &self.path.insert(cache).path
    }

    fn visible_opacity(&self) -> f64 {
        let alpha = self
            .core
            .paint()
            .solid()
            .map(|c| c.alpha_f64())
            .unwrap_or(1.0);
        self.core.opacity() * alpha
    }

    pub(crate) fn draw_in(&mut self, ctx: &mut DrawCtx<'_>, call: Option<EffectCall<'_>>) {
        self.run_anims(ctx.time);
        if let Some(p) = self.core.follow_anchor(ctx.placements()) {
            self.core.translate(p - self.core.pos());
        }

        if self.radius > 0.0 && self.visible_opacity() > ctx.visibility_threshold() {
            let bounds = self.bounds();
            let paint = self.core.paint_mut().resolve(bounds, ctx.placements());
            let effects = self.core.effects().clone();
            let xf = self.core.transform_about(None);
            let path = self.path().clone();
            ctx.render.with_transform(xf, |r| r.batch_fill(path, &paint, &effects));
        }

        let Some(call) = call else {
            return;
        };
        if !self
            .core
            .is_active(self.bounds(), ctx.viewport(), ctx.default_margin())
        {
            return;
        }
        let sample = DotSample::new(self.core.pos(), call.frame, call.setup);
        (call.effect)(ctx, self, &sample);
    }
}

fn sanitize_radius(radius: f64) -> f64 {
    if radius.is_finite() { radius.max(0.0) } else { 0.0 }
}

impl Animated for Dot {
    fn anim_queue(&mut self) -> &mut AnimQueue<Self> {
        &mut self.anims
    }
}

impl SceneObject for Dot {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }
}

impl Drawable for Dot {
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>) {
        let parent = ctx.parent();
        let placements = ctx.placements;
        self.core.initialize(ctx.ids, parent, placements);
    }

    fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
        self.draw_in(ctx, None);
    }

    fn bounds(&self) -> Rect {
        let p = self.core.pos();
        let r = self.radius;
        self.core
            .transformed_bounds(Rect::new(p.x - r, p.y - r, p.x + r, p.y + r))
    }

    fn contains(&self, point: Point, accurate: bool) -> bool {
        if !accurate {
            return self.bounds().contains(point);
        }
        match self.core.untransform(point, None) {
            Some(local) => local.distance(self.core.pos()) <= self.radius,
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
#[path = "../../tests/unit/scene/dot.rs"]
mod tests;
