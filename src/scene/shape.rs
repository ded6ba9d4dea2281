use std::any::Any;
use std::collections::HashMap;

use crate::animation::anim::{AnimQueue, Animated};
use crate::foundation::core::{Affine, ObjId, Point, Rect, Vec2};
use crate::foundation::math::{rotate_around, scale_around};
use crate::scene::dot::{DEFAULT_RADIUS, Dot, EffectCall};
use crate::scene::drawable::{DrawCtx, Drawable, Placements, SceneCtx};
use crate::scene::object::{ObjectCore, ParentRef, PosDecl, SceneObject};

/// Default proximity limit in pixels.
pub const DEFAULT_LIMIT: f64 = 100.0;

/// Per-dot effect callback: `(ctx, dot, sample)`.
pub type DotEffectFn = Box<dyn FnMut(&mut DrawCtx<'_>, &mut Dot, &DotSample<'_>)>;

/// Per-frame shape setup callback; its result is handed to every dot effect of that frame.
pub type ShapeSetupFn = Box<dyn FnMut(&mut DrawCtx<'_>, &ShapeFrame) -> Box<dyn Any>>;

type DotGenFn = Box<dyn FnOnce(&mut SceneCtx<'_>, ParentRef) -> Vec<Dot>>;

/// How a shape declares its dots. Dot positions are relative to the shape position.
pub enum DotsDecl {
    /// Explicit dots.
    List(Vec<Dot>),
    /// Whitespace or `;` separated `x,y` (or `x,y,radius`) entries. Malformed entries are skipped.
    Template(String),
    /// Generator run once at initialization.
    Generate(DotGenFn),
}

impl std::fmt::Debug for DotsDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List(d) => f.debug_tuple("List").field(&d.len()).finish(),
            Self::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Self::Generate(_) => f.write_str("Generate(..)"),
        }
    }
}

impl From<Vec<Dot>> for DotsDecl {
    fn from(d: Vec<Dot>) -> Self {
        Self::List(d)
    }
}

impl From<Dot> for DotsDecl {
    fn from(d: Dot) -> Self {
        Self::List(vec![d])
    }
}

impl From<&str> for DotsDecl {
    fn from(t: &str) -> Self {
        Self::Template(t.to_owned())
    }
}

/// Where shape proximity is measured from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RatioTarget {
    /// The pointer position.
    #[default]
    Pointer,
    /// A fixed surface position.
    Fixed(Point),
    /// Another object's position.
    Object(ObjId),
}

/// Position and radius of one dot in a [`ShapeFrame`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotPlacement {
    /// Dot id.
    pub id: ObjId,
    /// Dot position at the start of the dot pass.
    pub pos: Point,
    /// Dot radius at the start of the dot pass.
    pub radius: f64,
}

/// Snapshot of a shape taken before its dots draw.
///
/// Effect callbacks read sibling positions from here, which keeps them consistent within a frame.
#[derive(Clone, Debug)]
pub struct ShapeFrame {
    /// Shape id.
    pub id: ObjId,
    /// Shape position.
    pub pos: Point,
    /// Proximity limit.
    pub limit: f64,
    /// Resolved ratio target position.
    pub ratio_pos: Point,
    dots: Vec<DotPlacement>,
}

impl ShapeFrame {
    /// Dots sorted by id.
    pub fn dots(&self) -> &[DotPlacement] {
        &self.dots
    }

    /// Placement of dot `id`; stale ids resolve to nothing.
    pub fn find(&self, id: ObjId) -> Option<&DotPlacement> {
        self.dots
            .binary_search_by_key(&id, |d| d.id)
            .ok()
            .map(|i| &self.dots[i])
    }
}

/// Proximity sample handed to a dot effect.
#[derive(Clone, Copy, Debug)]
pub struct DotSample<'a> {
    /// `min(1, raw_ratio)`.
    pub ratio: f64,
    /// `distance / limit`, uncapped.
    pub raw_ratio: f64,
    /// Distance from the dot to the ratio target.
    pub distance: f64,
    /// `raw_ratio < 1`.
    pub within_limit: bool,
    /// The owning shape.
    pub shape: &'a ShapeFrame,
    /// Result of the shape setup callback for this frame.
    pub setup: Option<&'a (dyn Any + 'static)>,
}

impl<'a> DotSample<'a> {
    pub(crate) fn new(
        pos: Point,
        shape: &'a ShapeFrame,
        setup: Option<&'a (dyn Any + 'static)>,
    ) -> Self {
        let distance = pos.distance(shape.ratio_pos);
        let raw_ratio = distance / shape.limit;
        Self {
            ratio: raw_ratio.min(1.0),
            raw_ratio,
            distance,
            within_limit: raw_ratio < 1.0,
            shape,
            setup,
        }
    }

    /// Downcast the setup result.
    pub fn setup_as<T: 'static>(&self) -> Option<&'a T> {
        self.setup.and_then(|s| s.downcast_ref::<T>())
    }
}

/// Ordered container of dots with group transforms and per-dot proximity effects.
pub struct Shape {
    core: ObjectCore,
    dots: Vec<Dot>,
    decl: Option<DotsDecl>,
    pending_links: Vec<(usize, usize)>,
    dot_radius: f64,
    limit: f64,
    ratio_target: RatioTarget,
    effect: Option<DotEffectFn>,
    setup: Option<ShapeSetupFn>,
    anims: AnimQueue<Shape>,
    // Untransformed offsets from the shape position, as of the last group transform.
    rest_offsets: HashMap<ObjId, Vec2>,
}

fn invert(linear: Affine) -> Option<Affine> {
    (linear.determinant().abs() > f64::EPSILON).then(|| linear.inverse())
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shape")
            .field("core", &self.core)
            .field("dots", &self.dots.len())
            .field("limit", &self.limit)
            .field("ratio_target", &self.ratio_target)
            .field("has_effect", &self.effect.is_some())
            .finish()
    }
}

impl Shape {
    /// Shape at `pos` with the given dots.
    pub fn new(pos: impl Into<PosDecl>, dots: impl Into<DotsDecl>) -> Self {
        Self::with_core(ObjectCore::new(pos), dots)
    }

    /// Shape built around an explicit core.
    pub fn with_core(core: ObjectCore, dots: impl Into<DotsDecl>) -> Self {
        Self {
            core,
            dots: Vec::new(),
            decl: Some(dots.into()),
            pending_links: Vec::new(),
            dot_radius: DEFAULT_RADIUS,
            limit: DEFAULT_LIMIT,
            ratio_target: RatioTarget::Pointer,
            effect: None,
            setup: None,
            anims: AnimQueue::default(),
            rest_offsets: HashMap::new(),
        }
    }

    /// Dots from a generator run at initialization.
    pub fn generated(
        pos: impl Into<PosDecl>,
        generate: impl FnOnce(&mut SceneCtx<'_>, ParentRef) -> Vec<Dot> + 'static,
    ) -> Self {
        Self::new(pos, DotsDecl::Generate(Box::new(generate)))
    }

    /// Replace the proximity limit.
    pub fn with_limit(mut self, limit: f64) -> Self {
        self.set_limit(limit);
        self
    }

    /// Replace the ratio target.
    pub fn with_ratio_target(mut self, target: RatioTarget) -> Self {
        self.ratio_target = target;
        self
    }

    /// Radius of dots created from templates.
    pub fn with_dot_radius(mut self, radius: f64) -> Self {
        if radius.is_finite() && radius >= 0.0 {
            self.dot_radius = radius;
        }
        self
    }

    /// Install the per-dot effect callback.
    pub fn on_dot(
        mut self,
        effect: impl FnMut(&mut DrawCtx<'_>, &mut Dot, &DotSample<'_>) + 'static,
    ) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    /// Install the per-frame setup callback.
    pub fn with_setup(
        mut self,
        setup: impl FnMut(&mut DrawCtx<'_>, &ShapeFrame) -> Box<dyn Any> + 'static,
    ) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    /// Proximity limit in pixels.
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Replace the proximity limit. Non-positive or non-finite values reset to the default.
    pub fn set_limit(&mut self, limit: f64) {
        self.limit = if limit.is_finite() && limit > 0.0 {
            limit
        } else {
            DEFAULT_LIMIT
        };
    }

    /// Ratio target.
    pub fn ratio_target(&self) -> RatioTarget {
        self.ratio_target
    }

    /// Replace the ratio target.
    pub fn set_ratio_target(&mut self, target: RatioTarget) {
        self.ratio_target = target;
    }

    /// Dots in draw order.
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    /// Mutable dots in draw order.
    pub fn dots_mut(&mut self) -> &mut [Dot] {
        &mut self.dots
    }

    /// Number of dots.
    pub fn len(&self) -> usize {
        self.dots.len()
    }

    /// Return `true` without dots.
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Dot `id`.
    pub fn dot(&self, id: ObjId) -> Option<&Dot> {
        self.dots.iter().find(|d| d.id() == id)
    }

    /// Mutable dot `id`.
    pub fn dot_mut(&mut self, id: ObjId) -> Option<&mut Dot> {
        self.dots.iter_mut().find(|d| d.id() == id)
    }

    /// Initialize `dot` relative to the shape position and append it.
    ///
    /// A freshly declared dot is placed through the shape's current rotation and scale.
    pub fn add_dot(&mut self, mut dot: Dot, ctx: &mut SceneCtx<'_>) -> ObjId {
        let parent = ParentRef {
            id: self.core.id(),
            pos: self.core.pos(),
        };
        let fresh = !dot.core().is_initialized();
        ctx.init_child(&mut dot, parent);
        let id = dot.id();
        if fresh && dot.core().anchor().is_none() {
            let local = dot.pos().to_vec2();
            let placed = parent.pos + (self.group_linear() * local.to_point()).to_vec2();
            let delta = placed - dot.pos();
            dot.core_mut().translate(delta);
            self.rest_offsets.insert(id, local);
        }
        self.dots.push(dot);
        id
    }

    /// Remove dot `id`, returning it.
    pub fn remove_dot(&mut self, id: ObjId) -> Option<Dot> {
        let i = self.dots.iter().position(|d| d.id() == id)?;
        Some(self.dots.remove(i))
    }

    /// Remove every dot in `ids`; returns how many were removed.
    pub fn remove_dots(&mut self, ids: &[ObjId]) -> usize {
        let before = self.dots.len();
        self.dots.retain(|d| !ids.contains(&d.id()));
        before - self.dots.len()
    }

    /// Connect dot `a` to dot `b`. Returns `false` when `a` is unknown.
    pub fn connect(&mut self, a: ObjId, b: ObjId) -> bool {
        match self.dot_mut(a) {
            Some(dot) => {
                dot.connect(b);
                true
            }
            None => false,
        }
    }

    /// Translate every dot by `delta` without moving the shape itself.
    pub fn translate_dots(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        for dot in &mut self.dots {
            dot.core_mut().translate(delta);
        }
    }

    /// Rotate every dot position by `deg` degrees around `center`.
    pub fn rotate_dots_around(&mut self, deg: f64, center: Point) {
        for dot in &mut self.dots {
            let delta = rotate_around(dot.pos(), center, deg) - dot.pos();
            dot.core_mut().translate(delta);
        }
    }

    /// Scale every dot offset from `center` component-wise.
    pub fn scale_dots_around(&mut self, scale: Vec2, center: Point) {
        for dot in &mut self.dots {
            let delta = scale_around(dot.pos(), center, scale) - dot.pos();
            dot.core_mut().translate(delta);
        }
    }

    /// Snapshot used by effect callbacks this frame.
    pub fn frame(&self, ctx: &DrawCtx<'_>) -> ShapeFrame {
        let ratio_pos = match self.ratio_target {
            RatioTarget::Pointer => ctx.pointer.pos(),
            RatioTarget::Fixed(p) => Some(p),
            RatioTarget::Object(id) => ctx.placements().pos_of(id),
        }
        .unwrap_or(Point::new(f64::INFINITY, f64::INFINITY));
        let mut dots: Vec<DotPlacement> = self
            .dots
            .iter()
            .map(|d| DotPlacement {
                id: d.id(),
                pos: d.pos(),
                radius: d.radius(),
            })
            .collect();
        dots.sort_unstable_by_key(|d| d.id);
        ShapeFrame {
            id: self.core.id(),
            pos: self.core.pos(),
            limit: self.limit,
            ratio_pos,
            dots,
        }
    }

    /// Uninitialized copy: same placement, style, limit, dots and links; callbacks and animations
    /// are not carried over. `None` before initialization.
    pub fn duplicate(&self) -> Option<Shape> {
        let core = self.core.duplicate()?;
        let inverse = self.group_inverse();
        let mut dots = Vec::with_capacity(self.dots.len());
        for dot in &self.dots {
            let mut copy = dot.duplicate()?;
            copy.clear_connections();
            copy.core_mut().redeclare(self.local_offset(dot, inverse).to_point());
            dots.push(copy);
        }
        let mut links = Vec::new();
        for (i, dot) in self.dots.iter().enumerate() {
            for target in dot.connections() {
                if let Some(j) = self.dots.iter().position(|d| d.id() == *target) {
                    links.push((i, j));
                }
            }
        }
        let mut out = Shape::with_core(core, dots)
            .with_limit(self.limit)
            .with_ratio_target(self.ratio_target)
            .with_dot_radius(self.dot_radius);
        out.pending_links = links;
        Some(out)
    }

    // Rotation then scale, without translation.
    fn group_linear(&self) -> Affine {
        Affine::rotate(self.core.rotation().to_radians())
            * Affine::scale_non_uniform(self.core.scale().x, self.core.scale().y)
    }

    fn group_inverse(&self) -> Option<Affine> {
        invert(self.group_linear())
    }

    // Offset of `dot` from the shape position with the group transform undone.
    fn local_offset(&self, dot: &Dot, inverse: Option<Affine>) -> Vec2 {
        let offset = dot.pos() - self.core.pos();
        match (inverse, self.rest_offsets.get(&dot.id())) {
            (Some(inv), _) => (inv * offset.to_point()).to_vec2(),
            (None, Some(saved)) => *saved,
            (None, None) => offset,
        }
    }

    /// Re-place every dot after the group transform changed from `prev`.
    ///
    /// Offsets are recovered through the inverse of `prev`; when `prev` is degenerate (a zero
    /// scale) the offsets recorded before the collapse are used instead.
    fn regroup(&mut self, prev: Affine) {
        let center = self.core.pos();
        let next = self.group_linear();
        let inverse = invert(prev);
        let locals: Vec<Vec2> = self
            .dots
            .iter()
            .map(|dot| self.local_offset(dot, inverse))
            .collect();
        let mut rest = HashMap::with_capacity(self.dots.len());
        for (dot, local) in self.dots.iter_mut().zip(locals) {
            let delta = center + (next * local.to_point()).to_vec2() - dot.pos();
            dot.core_mut().translate(delta);
            rest.insert(dot.id(), local);
        }
        self.rest_offsets = rest;
    }

    pub(crate) fn follow_anchor(&mut self, placements: &Placements) {
        if let Some(p) = self.core.follow_anchor(placements) {
            let delta = p - self.core.pos();
            self.translate_dots(delta);
            self.core.translate(delta);
        }
    }

    pub(crate) fn draw_dots(&mut self, ctx: &mut DrawCtx<'_>) {
        if self.effect.is_none() {
            for dot in &mut self.dots {
                dot.draw_in(ctx, None);
            }
            return;
        }
        let frame = self.frame(ctx);
        let setup = match self.setup.as_mut() {
            Some(s) => Some(s(ctx, &frame)),
            None => None,
        };
        let Some(effect) = self.effect.as_mut() else {
            return;
        };
        for dot in &mut self.dots {
            let call = EffectCall {
                effect: &mut *effect,
                frame: &frame,
                setup: setup.as_deref(),
            };
            dot.draw_in(ctx, Some(call));
        }
    }

    fn dots_from_template(&self, template: &str) -> Vec<Dot> {
        template
            .split(|c: char| c.is_whitespace() || c == ';')
            .filter(|t| !t.is_empty())
            .filter_map(|token| {
                let nums: Vec<f64> = token
                    .split(',')
                    .map(|n| n.trim().parse::<f64>())
                    .collect::<Result<_, _>>()
                    .ok()?;
                let (x, y, r) = match nums.as_slice() {
                    [x, y] => (*x, *y, self.dot_radius),
                    [x, y, r] => (*x, *y, *r),
                    _ => return None,
                };
                let core = ObjectCore::new((x, y))
                    .with_paint(self.core.paint().clone())
                    .with_effects(self.core.effects().clone());
                Some(Dot::with_core(core, r))
            })
            .collect()
    }
}

impl Animated for Shape {
    fn anim_queue(&mut self) -> &mut AnimQueue<Self> {
        &mut self.anims
    }
}

impl SceneObject for Shape {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn set_pos(&mut self, pos: Point) {
        let delta = pos - self.core.pos();
        self.core.set_pos(pos);
        if self.core.pos() == pos {
            self.translate_dots(delta);
        }
    }

    fn set_rotation(&mut self, deg: f64) {
        if !deg.is_finite() {
            return;
        }
        let prev = self.group_linear();
        self.core.set_rotation(deg);
        self.regroup(prev);
    }

    fn set_scale(&mut self, scale: Vec2) {
        if !(scale.x.is_finite() && scale.y.is_finite()) {
            return;
        }
        let prev = self.group_linear();
        self.core.set_scale(scale);
        self.regroup(prev);
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.core.set_opacity(opacity);
        let opacity = self.core.opacity();
        for dot in &mut self.dots {
            dot.set_opacity(opacity);
        }
    }
}

impl Drawable for Shape {
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>) {
        let parent = ctx.parent();
        let placements = ctx.placements;
        if !self.core.initialize(ctx.ids, parent, placements) {
            return;
        }
        let dots = match self.decl.take() {
            Some(DotsDecl::List(d)) => d,
            Some(DotsDecl::Template(t)) => self.dots_from_template(&t),
            Some(DotsDecl::Generate(f)) => {
                let me = ParentRef {
                    id: self.core.id(),
                    pos: self.core.pos(),
                };
                f(ctx, me)
            }
            None => Vec::new(),
        };
        self.dots.reserve(dots.len());
        for dot in dots {
            self.add_dot(dot, ctx);
        }
        for (i, j) in std::mem::take(&mut self.pending_links) {
            let id_at = |k: usize| self.dots.get(k).map(|d| d.id());
            if let (Some(a), Some(b)) = (id_at(i), id_at(j)) {
                self.connect(a, b);
            }
        }
        tracing::trace!(id = %self.core.id(), dots = self.dots.len(), "shape initialized");
    }

    fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
        self.run_anims(ctx.time);
        self.follow_anchor(ctx.placements());
        self.draw_dots(ctx);
    }

    fn bounds(&self) -> Rect {
        let mut it = self.dots.iter().map(|d| d.bounds());
        match it.next() {
            Some(first) => it.fold(first, |acc, b| acc.union(b)),
            None => Rect::from_origin_size(self.core.pos(), (0.0, 0.0)),
        }
    }

    fn contains(&self, point: Point, accurate: bool) -> bool {
        if self.dots.is_empty() {
            return false;
        }
        if accurate {
            self.dots.iter().any(|d| d.contains(point, true))
        } else {
            self.bounds().contains(point)
        }
    }

    fn place(&self, out: &mut Placements) {
        out.insert(self.id(), self.pos(), self.bounds());
        for dot in &self.dots {
            dot.place(out);
        }
    }

    fn hit(&self, id: ObjId, point: Point, accurate: bool) -> Option<bool> {
        if id == self.id() {
            return Some(self.contains(point, accurate));
        }
        self.dot(id).map(|d| d.contains(point, accurate))
    }

    fn bounds_of(&self, id: ObjId) -> Option<Rect> {
        if id == self.id() {
            return Some(self.bounds());
        }
        self.dot(id).map(|d| d.bounds())
    }

    fn remove_child(&mut self, id: ObjId) -> bool {
        self.remove_dot(id).is_some()
    }

    fn sweep_children(&mut self) {
        self.dots.retain(|d| !d.core().removal_requested());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/shape.rs"]
mod tests;
