use std::any::Any;

use kurbo::Shape as _;

use crate::animation::anim::{AnimQueue, Animated};
use crate::foundation::core::{BezPath, ObjId, Point, Rect, Vec2};
use crate::foundation::math::Fnv1a64;
use crate::paint::Paint;
use crate::render::raster::VisualEffects;
use crate::scene::drawable::{DrawCtx, Drawable, Placements, SceneCtx};
use crate::scene::object::{ObjectCore, SceneObject};
use crate::scene::shape::Shape;

/// A [`Shape`] whose dots, connected in order, outline a filled closed path.
pub struct FilledShape {
    shape: Shape,
    fill: Paint,
    fill_effects: VisualEffects,
    dynamic_updates: bool,
    path: BezPath,
    signature: Option<u64>,
    path_builds: u64,
    anims: AnimQueue<FilledShape>,
}

impl std::fmt::Debug for FilledShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilledShape")
            .field("shape", &self.shape)
            .field("dynamic_updates", &self.dynamic_updates)
            .field("path_builds", &self.path_builds)
            .finish()
    }
}

impl FilledShape {
    /// Fill the outline of `shape` with `fill`.
    pub fn new(shape: Shape, fill: impl Into<Paint>) -> Self {
        Self {
            shape,
            fill: fill.into(),
            fill_effects: VisualEffects::default(),
            dynamic_updates: false,
            path: BezPath::new(),
            signature: None,
            path_builds: 0,
            anims: AnimQueue::default(),
        }
    }

    /// Rebuild the path every frame, even when dot positions did not change.
    pub fn with_dynamic_updates(mut self, dynamic: bool) -> Self {
        self.dynamic_updates = dynamic;
        self
    }

    /// Effects applied to the fill.
    pub fn with_fill_effects(mut self, effects: VisualEffects) -> Self {
        self.fill_effects = effects;
        self
    }

    /// The underlying shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The underlying shape, mutably.
    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// Fill paint.
    pub fn fill(&self) -> &Paint {
        &self.fill
    }

    /// Replace the fill paint.
    pub fn set_fill(&mut self, fill: impl Into<Paint>) {
        self.fill = fill.into();
    }

    /// Current fill path (empty until the first update).
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Number of times the path was rebuilt.
    pub fn path_builds(&self) -> u64 {
        self.path_builds
    }

    /// Rebuild the closed path through the dots when their positions changed since the last
    /// build (always with dynamic updates). Returns `true` when a rebuild happened.
    pub fn update_path(&mut self) -> bool {
        let signature = self.dots_signature();
        if !self.dynamic_updates && self.signature == Some(signature) {
            return false;
        }
        let mut path = BezPath::new();
        let mut pts = self.shape.dots().iter().map(|d| d.pos());
        if let Some(first) = pts.next() {
            path.move_to(first);
            for p in pts {
                path.line_to(p);
            }
            path.close_path();
        }
        self.path = path;
        self.signature = Some(signature);
        self.path_builds += 1;
        true
    }

    fn dots_signature(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u64(self.shape.len() as u64);
        for dot in self.shape.dots() {
            let p = dot.pos();
            h.write_f64(p.x);
            h.write_f64(p.y);
        }
        h.finish()
    }
}

impl Animated for FilledShape {
    fn anim_queue(&mut self) -> &mut AnimQueue<Self> {
        &mut self.anims
    }
}

impl SceneObject for FilledShape {
    fn core(&self) -> &ObjectCore {
        self.shape.core()
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        self.shape.core_mut()
    }

    fn set_pos(&mut self, pos: Point) {
        self.shape.set_pos(pos);
    }

    fn set_rotation(&mut self, deg: f64) {
        self.shape.set_rotation(deg);
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.shape.set_scale(scale);
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.shape.set_opacity(opacity);
        self.fill_effects = std::mem::take(&mut self.fill_effects).with_opacity(opacity);
    }
}

impl Drawable for FilledShape {
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>) {
        self.shape.initialize(ctx);
        self.update_path();
    }

    fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
        self.run_anims(ctx.time);
        self.shape.run_anims(ctx.time);
        self.shape.follow_anchor(ctx.placements());
        self.update_path();

        if !self.path.is_empty() && self.fill_effects.opacity > ctx.visibility_threshold() {
            let bounds = self.path.bounding_box();
            let paint = self.fill.resolve(bounds, ctx.placements());
            if !paint.is_transparent() {
                ctx.render
                    .batch_fill(self.path.clone(), &paint, &self.fill_effects);
            }
        }
        self.shape.draw_dots(ctx);
    }

    fn bounds(&self) -> Rect {
        if self.path.is_empty() {
            return self.shape.bounds();
        }
        self.path.bounding_box().union(self.shape.bounds())
    }

    fn contains(&self, point: Point, accurate: bool) -> bool {
        if self.shape.is_empty() {
            return false;
        }
        if accurate {
            self.path.winding(point) != 0 || self.shape.contains(point, true)
        } else {
            self.bounds().contains(point)
        }
    }

    fn place(&self, out: &mut Placements) {
        out.insert(self.id(), self.pos(), self.bounds());
        for dot in self.shape.dots() {
            dot.place(out);
        }
    }

    fn hit(&self, id: ObjId, point: Point, accurate: bool) -> Option<bool> {
        if id == self.id() {
            return Some(self.contains(point, accurate));
        }
        self.shape.hit(id, point, accurate)
    }

    fn bounds_of(&self, id: ObjId) -> Option<Rect> {
        if id == self.id() {
            return Some(self.bounds());
        }
        self.shape.bounds_of(id)
    }

    fn remove_child(&mut self, id: ObjId) -> bool {
        self.shape.remove_child(id)
    }

    fn sweep_children(&mut self) {
        self.shape.sweep_children();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/filled.rs"]
mod tests;
