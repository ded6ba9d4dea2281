use crate::animation::anim::{Anim, Animated};
use crate::animation::ease::Ease;
use crate::foundation::core::{Affine, IdGen, Lerp, ObjId, Point, Rect, Vec2};
use crate::paint::Paint;
use crate::render::raster::{CompositeMode, VisualEffects};
use crate::scene::drawable::Placements;

/// Identity and position of the object that owns a child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParentRef {
    /// Parent id.
    pub id: ObjId,
    /// Parent position at the time the child was initialized.
    pub pos: Point,
}

type PosFn = Box<dyn FnOnce(&ObjectCore, Option<ParentRef>) -> Point>;

/// How an object's position is declared before initialization.
pub enum PosDecl {
    /// Literal position.
    At(Point),
    /// Computed once at initialization from the object and its parent.
    Computed(PosFn),
}

impl std::fmt::Debug for PosDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::At(p) => f.debug_tuple("At").field(p).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Point> for PosDecl {
    fn from(p: Point) -> Self {
        Self::At(p)
    }
}

impl From<(f64, f64)> for PosDecl {
    fn from(p: (f64, f64)) -> Self {
        Self::At(p.into())
    }
}

/// Live anchor: the drawn position is the anchor's position plus an offset.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Anchor {
    target: ObjId,
    offset: Vec2,
    last: Option<Point>,
}

/// Distance outside the viewport within which an object still runs its effects.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ActivationMargin {
    /// Active while the bounds intersect the viewport grown by this many pixels.
    Px(f64),
    /// Always active.
    Always,
}

/// State shared by every scene object: identity, placement, transform, style and lifecycle flags.
#[derive(Debug)]
pub struct ObjectCore {
    id: ObjId,
    parent: Option<ObjId>,
    decl: Option<PosDecl>,
    pos: Point,
    anchor: Option<Anchor>,
    rotation: f64,
    scale: Vec2,
    margin: Option<ActivationMargin>,
    paint: Paint,
    effects: VisualEffects,
    initialized: bool,
    removal_requested: bool,
}

impl Default for ObjectCore {
    fn default() -> Self {
        Self::new(Point::ZERO)
    }
}

impl ObjectCore {
    /// Core declared at a position (resolved at initialization).
    pub fn new(pos: impl Into<PosDecl>) -> Self {
        Self {
            id: IdGen::UNASSIGNED,
            parent: None,
            decl: Some(pos.into()),
            pos: Point::ZERO,
            anchor: None,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            margin: None,
            paint: Paint::default(),
            effects: VisualEffects::default(),
            initialized: false,
            removal_requested: false,
        }
    }

    /// Core whose position is computed at initialization.
    pub fn computed(f: impl FnOnce(&ObjectCore, Option<ParentRef>) -> Point + 'static) -> Self {
        Self::new(PosDecl::Computed(Box::new(f)))
    }

    /// Follow `target`: the declared position becomes an offset from the target's position.
    pub fn anchored_to(mut self, target: ObjId) -> Self {
        self.anchor = Some(Anchor {
            target,
            offset: Vec2::ZERO,
            last: None,
        });
        self
    }

    /// Replace the paint.
    pub fn with_paint(mut self, paint: impl Into<Paint>) -> Self {
        self.paint = paint.into();
        self
    }

    /// Replace the visual effects.
    pub fn with_effects(mut self, effects: VisualEffects) -> Self {
        self.effects = effects;
        self
    }

    /// Replace the activation margin.
    pub fn with_margin(mut self, margin: ActivationMargin) -> Self {
        self.margin = Some(sanitize_margin(margin));
        self
    }

    /// Replace the rotation in degrees.
    pub fn with_rotation(mut self, deg: f64) -> Self {
        self.set_rotation(deg);
        self
    }

    /// Replace the scale.
    pub fn with_scale(mut self, scale: impl Into<Vec2>) -> Self {
        self.set_scale(scale.into());
        self
    }

    /// Assigned id, or [`IdGen::UNASSIGNED`] before registration.
    pub fn id(&self) -> ObjId {
        self.id
    }

    /// Owning object, if any.
    pub fn parent(&self) -> Option<ObjId> {
        self.parent
    }

    /// Return `true` once the declared position was resolved.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resolved position.
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Anchor target, if anchored.
    pub fn anchor(&self) -> Option<ObjId> {
        self.anchor.map(|a| a.target)
    }

    /// Move to `pos`. For anchored objects this moves the offset from the anchor.
    pub fn set_pos(&mut self, pos: Point) {
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return;
        }
        if let Some(anchor) = &mut self.anchor {
            let base = anchor.last.unwrap_or(Point::ZERO);
            anchor.offset = pos - base;
        }
        self.pos = pos;
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Replace the rotation in degrees. Non-finite values are ignored.
    pub fn set_rotation(&mut self, deg: f64) {
        if deg.is_finite() {
            self.rotation = deg;
        }
    }

    /// Scale factors.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Replace the scale. Non-finite components are ignored.
    pub fn set_scale(&mut self, scale: Vec2) {
        if scale.x.is_finite() && scale.y.is_finite() {
            self.scale = scale;
        }
    }

    /// Explicit activation margin, if one was set.
    pub fn margin(&self) -> Option<ActivationMargin> {
        self.margin
    }

    /// Replace the activation margin.
    pub fn set_margin(&mut self, margin: ActivationMargin) {
        self.margin = Some(sanitize_margin(margin));
    }

    /// Paint.
    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    /// Mutable paint (resolution caches live inside it).
    pub fn paint_mut(&mut self) -> &mut Paint {
        &mut self.paint
    }

    /// Replace the paint.
    pub fn set_paint(&mut self, paint: impl Into<Paint>) {
        self.paint = paint.into();
    }

    /// Visual effects.
    pub fn effects(&self) -> &VisualEffects {
        &self.effects
    }

    /// Replace the visual effects.
    pub fn set_effects(&mut self, effects: VisualEffects) {
        self.effects = effects;
    }

    /// Opacity from the visual effects.
    pub fn opacity(&self) -> f64 {
        self.effects.opacity
    }

    /// Replace the opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.effects = std::mem::take(&mut self.effects).with_opacity(opacity);
    }

    /// Replace the composite mode.
    pub fn set_composite(&mut self, composite: CompositeMode) {
        self.effects.composite = composite;
    }

    /// Ask the runtime to remove this object after the current draw pass.
    pub fn request_removal(&mut self) {
        self.removal_requested = true;
    }

    /// Return `true` once [`ObjectCore::request_removal`] was called.
    pub fn removal_requested(&self) -> bool {
        self.removal_requested
    }

    /// Return `true` when rotation or scale differ from identity.
    pub fn is_transformed(&self) -> bool {
        self.rotation != 0.0 || self.scale != Vec2::new(1.0, 1.0)
    }

    /// Drawing transform: rotate then scale about `pivot` (the object position by default).
    pub fn transform_about(&self, pivot: Option<Point>) -> Affine {
        if !self.is_transformed() {
            return Affine::IDENTITY;
        }
        let pivot = pivot.unwrap_or(self.pos).to_vec2();
        Affine::translate(pivot)
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-pivot)
    }

    /// Map a surface point into the object's untransformed space.
    ///
    /// Returns `None` when the transform is degenerate (zero scale).
    pub fn untransform(&self, p: Point, pivot: Option<Point>) -> Option<Point> {
        if !self.is_transformed() {
            return Some(p);
        }
        let xf = self.transform_about(pivot);
        if xf.determinant().abs() < f64::EPSILON {
            return None;
        }
        Some(xf.inverse() * p)
    }

    /// Bounding box of `local` after the drawing transform.
    pub fn transformed_bounds(&self, local: Rect) -> Rect {
        if !self.is_transformed() {
            return local;
        }
        self.transform_about(None).transform_rect_bbox(local)
    }

    /// Return `true` when `bounds` warrant running effects this frame.
    pub fn is_active(&self, bounds: Rect, viewport: Rect, default_margin: f64) -> bool {
        match self.margin.unwrap_or(ActivationMargin::Px(default_margin)) {
            ActivationMargin::Always => true,
            ActivationMargin::Px(m) => {
                let area = viewport.inflate(m, m);
                bounds.x1 >= area.x0
                    && bounds.x0 <= area.x1
                    && bounds.y1 >= area.y0
                    && bounds.y0 <= area.y1
            }
        }
    }

    /// Assign an id and resolve the declared position. Runs once; later calls are no-ops.
    ///
    /// Returns `false` when the core was already initialized.
    pub(crate) fn initialize(
        &mut self,
        ids: &mut IdGen,
        parent: Option<ParentRef>,
        placements: &Placements,
    ) -> bool {
        if self.initialized {
            return false;
        }
        if self.id == IdGen::UNASSIGNED {
            self.id = ids.next_id();
        }
        self.parent = parent.map(|p| p.id);
        let declared = match self.decl.take() {
            Some(PosDecl::At(p)) => p,
            Some(PosDecl::Computed(f)) => f(self, parent),
            None => self.pos,
        };
        let declared = if declared.x.is_finite() && declared.y.is_finite() {
            declared
        } else {
            Point::ZERO
        };
        self.pos = declared;
        if let Some(anchor) = &mut self.anchor {
            anchor.offset = declared.to_vec2();
            if let Some(base) = placements.pos_of(anchor.target) {
                anchor.last = Some(base);
                self.pos = base + anchor.offset;
            }
        }
        self.initialized = true;
        true
    }

    /// Replace the declared position of a core that is not initialized yet.
    pub(crate) fn redeclare(&mut self, pos: Point) {
        if !self.initialized {
            self.decl = Some(PosDecl::At(pos));
        }
    }

    /// Shift by `delta` without touching an anchor offset.
    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }

    /// New anchored position when the anchor moved since the last check.
    pub(crate) fn follow_anchor(&mut self, placements: &Placements) -> Option<Point> {
        let anchor = self.anchor.as_mut()?;
        let base = placements.pos_of(anchor.target)?;
        if anchor.last == Some(base) {
            return None;
        }
        anchor.last = Some(base);
        Some(base + anchor.offset)
    }

    /// Uninitialized copy of placement, transform and style; animations and callbacks are not
    /// carried over. `None` before initialization.
    pub(crate) fn duplicate(&self) -> Option<Self> {
        if !self.initialized {
            return None;
        }
        Some(Self {
            id: IdGen::UNASSIGNED,
            parent: None,
            decl: Some(PosDecl::At(match self.anchor {
                Some(a) => a.offset.to_point(),
                None => self.pos,
            })),
            pos: Point::ZERO,
            anchor: self.anchor.map(|a| Anchor { last: None, ..a }),
            rotation: self.rotation,
            scale: self.scale,
            margin: self.margin,
            paint: self.paint.clone(),
            effects: self.effects.clone(),
            initialized: false,
            removal_requested: false,
        })
    }
}

fn sanitize_margin(margin: ActivationMargin) -> ActivationMargin {
    match margin {
        ActivationMargin::Px(m) if !m.is_finite() => ActivationMargin::Always,
        other => other,
    }
}

/// The transformable, anchorable kernel shared by every scene object.
///
/// Containers override the setters to move their children along (group transforms).
pub trait SceneObject {
    /// Shared state.
    fn core(&self) -> &ObjectCore;

    /// Mutable shared state.
    fn core_mut(&mut self) -> &mut ObjectCore;

    /// Object id.
    fn id(&self) -> ObjId {
        self.core().id()
    }

    /// Current position.
    fn pos(&self) -> Point {
        self.core().pos()
    }

    /// Move to `pos`.
    fn set_pos(&mut self, pos: Point) {
        self.core_mut().set_pos(pos);
    }

    /// Move by `delta`.
    fn move_by(&mut self, delta: Vec2) {
        let pos = self.pos() + delta;
        self.set_pos(pos);
    }

    /// Rotation in degrees.
    fn rotation(&self) -> f64 {
        self.core().rotation()
    }

    /// Rotate to `deg` degrees.
    fn set_rotation(&mut self, deg: f64) {
        self.core_mut().set_rotation(deg);
    }

    /// Scale factors.
    fn scale(&self) -> Vec2 {
        self.core().scale()
    }

    /// Scale to `scale`.
    fn set_scale(&mut self, scale: Vec2) {
        self.core_mut().set_scale(scale);
    }

    /// Opacity.
    fn opacity(&self) -> f64 {
        self.core().opacity()
    }

    /// Replace the opacity.
    fn set_opacity(&mut self, opacity: f64) {
        self.core_mut().set_opacity(opacity);
    }
}

/// Tweening helpers available on every animated scene object.
///
/// Start values are captured when the animation first samples, so queued (backlog) animations
/// start from wherever the previous one left the object.
pub trait Motion: SceneObject + Animated {
    /// Animate the position to `target`.
    fn move_to(&mut self, target: impl Into<Point>, duration_ms: f64, ease: Ease, unique: bool) {
        let target = target.into();
        let mut from = None;
        self.play_anim(
            Anim::new(duration_ms, ease, move |obj: &mut Self, f| {
                let start = *from.get_or_insert_with(|| obj.pos());
                obj.set_pos(<Point as Lerp>::lerp(&start, &target, f.progress));
            }),
            unique,
            false,
        );
    }

    /// Animate the rotation to `deg` degrees.
    fn rotate_to(&mut self, deg: f64, duration_ms: f64, ease: Ease, unique: bool) {
        let mut from = None;
        self.play_anim(
            Anim::new(duration_ms, ease, move |obj: &mut Self, f| {
                let start = *from.get_or_insert_with(|| obj.rotation());
                obj.set_rotation(f64::lerp(&start, &deg, f.progress));
            }),
            unique,
            false,
        );
    }

    /// Animate the scale to `target`.
    fn scale_to(&mut self, target: impl Into<Vec2>, duration_ms: f64, ease: Ease, unique: bool) {
        let target = target.into();
        let mut from = None;
        self.play_anim(
            Anim::new(duration_ms, ease, move |obj: &mut Self, f| {
                let start = *from.get_or_insert_with(|| obj.scale());
                obj.set_scale(<Vec2 as Lerp>::lerp(&start, &target, f.progress));
            }),
            unique,
            false,
        );
    }

    /// Animate the opacity to `target`.
    fn opacity_to(&mut self, target: f64, duration_ms: f64, ease: Ease, unique: bool) {
        let mut from = None;
        self.play_anim(
            Anim::new(duration_ms, ease, move |obj: &mut Self, f| {
                let start = *from.get_or_insert_with(|| obj.opacity());
                obj.set_opacity(f64::lerp(&start, &target, f.progress));
            }),
            unique,
            false,
        );
    }
}

impl<T: SceneObject + Animated> Motion for T {}

#[cfg(test)]
#[path = "../../tests/unit/scene/object.rs"]
mod tests;
