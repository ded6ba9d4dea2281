use std::any::Any;
use std::collections::HashMap;

use crate::foundation::core::{IdGen, ObjId, Point, Rect};
use crate::input::pointer::Pointer;
use crate::paint::BoundsLookup;
use crate::render::batch::Render;
use crate::scene::object::{ParentRef, SceneObject};

/// Position and bounds of one object, as seen at the start of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Object position.
    pub pos: Point,
    /// Object bounds.
    pub bounds: Rect,
}

/// Per-frame snapshot of where every object (and every shape child) is.
///
/// Anchors and anchored paints read this snapshot, so lookups never borrow live objects.
#[derive(Debug, Default)]
pub struct Placements {
    map: HashMap<ObjId, Placement>,
}

impl Placements {
    /// Record `id`.
    pub fn insert(&mut self, id: ObjId, pos: Point, bounds: Rect) {
        self.map.insert(id, Placement { pos, bounds });
    }

    /// Placement of `id`.
    pub fn get(&self, id: ObjId) -> Option<Placement> {
        self.map.get(&id).copied()
    }

    /// Position of `id`.
    pub fn pos_of(&self, id: ObjId) -> Option<Point> {
        self.map.get(&id).map(|p| p.pos)
    }

    /// Number of recorded objects.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Return `true` when nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }
}

impl BoundsLookup for Placements {
    fn bounds_of(&self, id: ObjId) -> Option<Rect> {
        self.map.get(&id).map(|p| p.bounds)
    }
}

/// Context for one-time initialization and structural edits (anything allocating ids).
pub struct SceneCtx<'a> {
    pub(crate) ids: &'a mut IdGen,
    pub(crate) placements: &'a Placements,
    pub(crate) viewport: Rect,
    pub(crate) parent: Option<ParentRef>,
}

impl<'a> SceneCtx<'a> {
    pub(crate) fn new(ids: &'a mut IdGen, placements: &'a Placements, viewport: Rect) -> Self {
        Self {
            ids,
            placements,
            viewport,
            parent: None,
        }
    }

    /// Surface bounds.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// The object being initialized with this context, if it is a child.
    pub fn parent(&self) -> Option<ParentRef> {
        self.parent
    }

    /// Last known placements of other objects.
    pub fn placements(&self) -> &Placements {
        self.placements
    }

    /// Allocate a fresh id.
    pub fn next_id(&mut self) -> ObjId {
        self.ids.next_id()
    }

    /// Initialize `child` as owned by `parent`.
    pub fn init_child<D: Drawable + ?Sized>(&mut self, child: &mut D, parent: ParentRef) {
        let prev = self.parent.replace(parent);
        child.initialize(self);
        self.parent = prev;
    }

    /// Initialize a top-level object.
    pub fn init_root<D: Drawable + ?Sized>(&mut self, obj: &mut D) {
        let prev = self.parent.take();
        obj.initialize(self);
        self.parent = prev;
    }
}

/// Per-frame drawing context handed to [`Drawable::draw`].
pub struct DrawCtx<'a> {
    /// Batching renderer.
    pub render: &'a mut Render,
    /// Pointer state for this frame.
    pub pointer: &'a Pointer,
    /// Frame time in milliseconds (skip-corrected).
    pub time: f64,
    /// Seconds since the previous drawn frame, clamped.
    pub delta: f64,
    pub(crate) placements: &'a Placements,
    pub(crate) ids: &'a mut IdGen,
    pub(crate) spawned: &'a mut Vec<Box<dyn Drawable>>,
    pub(crate) removals: &'a mut Vec<ObjId>,
    pub(crate) viewport: Rect,
    pub(crate) visibility_threshold: f64,
    pub(crate) default_margin: f64,
}

impl DrawCtx<'_> {
    /// Surface bounds.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Placements snapshot taken at the start of the frame.
    pub fn placements(&self) -> &Placements {
        self.placements
    }

    /// Opacity at or below which fills are skipped.
    pub fn visibility_threshold(&self) -> f64 {
        self.visibility_threshold
    }

    /// Margin used by objects without an explicit activation margin.
    pub fn default_margin(&self) -> f64 {
        self.default_margin
    }

    /// Initialize `obj` and hand it to the runtime; it draws from the next frame on.
    pub fn spawn(&mut self, mut obj: Box<dyn Drawable>) -> ObjId {
        let mut scene = SceneCtx::new(&mut *self.ids, self.placements, self.viewport);
        scene.init_root(obj.as_mut());
        let id = obj.id();
        tracing::debug!(%id, "object spawned");
        self.spawned.push(obj);
        id
    }

    /// Remove `id` (top-level object or shape child) once the draw pass completes.
    pub fn remove(&mut self, id: ObjId) {
        if !self.removals.contains(&id) {
            self.removals.push(id);
        }
    }

    /// Return `true` when `id` was already scheduled for removal this frame.
    pub fn is_removed(&self, id: ObjId) -> bool {
        self.removals.contains(&id)
    }
}

/// Runtime-facing drawable contract.
pub trait Drawable: SceneObject + Any {
    /// One-time setup: assign ids, resolve declared positions, build children.
    ///
    /// The runtime calls this exactly once, before the object first draws.
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>);

    /// Advance animations and issue draw calls for one frame.
    fn draw(&mut self, ctx: &mut DrawCtx<'_>);

    /// Surface-space bounds.
    fn bounds(&self) -> Rect;

    /// Point containment; `accurate` selects shape-exact tests over bounds checks.
    fn contains(&self, point: Point, accurate: bool) -> bool {
        let _ = accurate;
        self.bounds().contains(point)
    }

    /// Record this object (and its children) in the frame snapshot.
    fn place(&self, out: &mut Placements) {
        out.insert(self.id(), self.pos(), self.bounds());
    }

    /// Hit test object `id` if it is this object or one of its children.
    fn hit(&self, id: ObjId, point: Point, accurate: bool) -> Option<bool> {
        (id == self.id()).then(|| self.contains(point, accurate))
    }

    /// Bounds of object `id` if it is this object or one of its children.
    fn bounds_of(&self, id: ObjId) -> Option<Rect> {
        (id == self.id()).then(|| self.bounds())
    }

    /// Drop child `id`. Returns `false` when no such child exists.
    fn remove_child(&mut self, id: ObjId) -> bool {
        let _ = id;
        false
    }

    /// Drop children that asked for removal during the last draw.
    fn sweep_children(&mut self) {}

    /// Upcast for typed registry access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed registry access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
#[path = "../../tests/unit/scene/drawable.rs"]
mod tests;
