use crate::foundation::core::{ObjId, Point, Rect};
use crate::input::listeners::HitTest;
use crate::scene::drawable::{Drawable, Placements};

/// Top-level objects: those handed in through [`crate::Runtime::add`] and those spawned by the
/// scene itself while drawing. External objects draw first, each list in insertion order.
#[derive(Default)]
pub struct Registry {
    external: Vec<Box<dyn Drawable>>,
    owned: Vec<Box<dyn Drawable>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("external", &self.external.len())
            .field("owned", &self.owned.len())
            .finish()
    }
}

impl Registry {
    pub(crate) fn push_external(&mut self, obj: Box<dyn Drawable>) {
        self.external.push(obj);
    }

    pub(crate) fn push_owned(&mut self, obj: Box<dyn Drawable>) {
        self.owned.push(obj);
    }

    /// Number of top-level objects.
    pub fn len(&self) -> usize {
        self.external.len() + self.owned.len()
    }

    /// Return `true` without objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Objects added from outside.
    pub fn external(&self) -> &[Box<dyn Drawable>] {
        &self.external
    }

    /// Objects spawned while drawing.
    pub fn owned(&self) -> &[Box<dyn Drawable>] {
        &self.owned
    }

    /// All top-level objects in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Drawable> {
        self.external
            .iter()
            .chain(self.owned.iter())
            .map(|b| b.as_ref())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Drawable>> {
        self.external.iter_mut().chain(self.owned.iter_mut())
    }

    /// Top-level object `id`.
    pub fn find(&self, id: ObjId) -> Option<&dyn Drawable> {
        self.iter().find(|o| o.id() == id)
    }

    pub(crate) fn find_mut(&mut self, id: ObjId) -> Option<&mut Box<dyn Drawable>> {
        self.iter_mut().find(|o| o.id() == id)
    }

    /// Remove top-level object `id`, or child `id` of any object. Unknown ids are ignored.
    pub(crate) fn remove(&mut self, id: ObjId) -> bool {
        for list in [&mut self.external, &mut self.owned] {
            if let Some(i) = list.iter().position(|o| o.id() == id) {
                list.remove(i);
                return true;
            }
        }
        self.iter_mut().any(|o| o.remove_child(id))
    }

    /// Drop objects (and children) that requested removal.
    pub(crate) fn sweep(&mut self) -> usize {
        let before = self.len();
        for list in [&mut self.external, &mut self.owned] {
            list.retain(|o| !o.core().removal_requested());
            for o in list.iter_mut() {
                o.sweep_children();
            }
        }
        before - self.len()
    }

    pub(crate) fn place_all(&self, out: &mut Placements) {
        out.clear();
        for o in self.iter() {
            o.place(out);
        }
    }
}

impl HitTest for Registry {
    fn hit(&self, id: ObjId, point: Point, accurate: bool) -> Option<bool> {
        self.iter().find_map(|o| o.hit(id, point, accurate))
    }

    fn bounds_of(&self, id: ObjId) -> Option<Rect> {
        self.iter().find_map(|o| o.bounds_of(id))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/registry.rs"]
mod tests;
