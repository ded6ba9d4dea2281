use kurbo::Shape as _;

use crate::foundation::core::{BezPath, ObjId, Point, Rect};
use crate::input::pointer::Button;

/// Pointer event categories a listener can register for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// The pointer moved while over the target.
    Move,
    /// The pointer crossed into the target.
    Enter,
    /// The pointer crossed out of the target.
    Leave,
    /// A button was pressed over the target.
    Down(Button),
    /// A button was released over the target.
    Up(Button),
}

/// Handle returned by [`Listeners::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Frozen hit region.
#[derive(Clone, Debug, PartialEq)]
pub enum HitRegion {
    /// Axis-aligned range check.
    Rect(Rect),
    /// Non-zero winding test.
    Path(BezPath),
}

impl HitRegion {
    /// Point containment.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Rect(r) => r.contains(p),
            Self::Path(path) => path.winding(p) != 0,
        }
    }
}

/// What a listener is attached to.
#[derive(Clone, Debug, PartialEq)]
pub enum ListenerTarget {
    /// Live object, hit-tested through its own containment each time.
    Object(ObjId),
    /// Snapshot region that never moves.
    Region(HitRegion),
    /// The whole surface.
    Anywhere,
}

impl From<ObjId> for ListenerTarget {
    fn from(id: ObjId) -> Self {
        Self::Object(id)
    }
}

impl From<Rect> for ListenerTarget {
    fn from(r: Rect) -> Self {
        Self::Region(HitRegion::Rect(r))
    }
}

/// Event handed to listener callbacks.
#[derive(Clone, Debug)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerEventKind,
    /// Pointer surface position (`None` after leaving the surface).
    pub pos: Option<Point>,
    /// The listener being invoked.
    pub listener: ListenerId,
    /// Runtime time in milliseconds.
    pub time: f64,
}

/// Object lookup used for live-target hit tests.
pub trait HitTest {
    /// Containment of `point` in object `id`, or `None` when the object does not exist.
    fn hit(&self, id: ObjId, point: Point, accurate: bool) -> Option<bool>;

    /// Bounds of object `id`.
    fn bounds_of(&self, id: ObjId) -> Option<Rect>;
}

/// When enter/leave transitions are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HitMode {
    /// Only on pointer moves, comparing the previous and current position.
    #[default]
    Optimized,
    /// Every frame, against the last known containment; follows moving targets.
    Accurate,
}

type ListenerFn = Box<dyn FnMut(&PointerEvent)>;

struct Listener {
    id: ListenerId,
    kind: PointerEventKind,
    target: ListenerTarget,
    accurate: bool,
    inside: bool,
    callback: ListenerFn,
}

impl Listener {
    fn contains(&self, pos: Option<Point>, hits: &dyn HitTest) -> bool {
        let Some(p) = pos else {
            return false;
        };
        match &self.target {
            ListenerTarget::Anywhere => true,
            ListenerTarget::Region(r) => r.contains(p),
            ListenerTarget::Object(id) => hits.hit(*id, p, self.accurate).unwrap_or(false),
        }
    }

    fn fire(&mut self, kind: PointerEventKind, pos: Option<Point>, time: f64) {
        let ev = PointerEvent {
            kind,
            pos,
            listener: self.id,
            time,
        };
        (self.callback)(&ev);
    }
}

/// Pointer listener registry.
#[derive(Default)]
pub struct Listeners {
    next: u64,
    entries: Vec<Listener>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    /// Register `callback` for `kind` events on `target`.
    ///
    /// `accurate` selects shape-exact containment for live targets.
    pub fn add(
        &mut self,
        target: impl Into<ListenerTarget>,
        kind: PointerEventKind,
        accurate: bool,
        callback: impl FnMut(&PointerEvent) + 'static,
    ) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.entries.push(Listener {
            id,
            kind,
            target: target.into(),
            accurate,
            inside: false,
            callback: Box::new(callback),
        });
        id
    }

    /// Drop listener `id`. Returns `false` when it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    /// Drop every listener attached to object `id`; returns how many were removed.
    pub fn remove_target(&mut self, id: ObjId) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|l| l.target != ListenerTarget::Object(id));
        before - self.entries.len()
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` without listeners.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pointer moved from `prev` to `pos`.
    ///
    /// Fires move listeners whose target contains `pos`; in optimized mode also fires enter/leave
    /// listeners whose containment changed between the two positions.
    pub fn dispatch_move(
        &mut self,
        prev: Option<Point>,
        pos: Option<Point>,
        hits: &dyn HitTest,
        mode: HitMode,
        time: f64,
    ) {
        for l in &mut self.entries {
            match l.kind {
                PointerEventKind::Move => {
                    if pos.is_some() && l.contains(pos, hits) {
                        l.fire(PointerEventKind::Move, pos, time);
                    }
                }
                PointerEventKind::Enter | PointerEventKind::Leave
                    if mode == HitMode::Optimized =>
                {
                    let was = l.contains(prev, hits);
                    let now = l.contains(pos, hits);
                    l.inside = now;
                    match (l.kind, was, now) {
                        (PointerEventKind::Enter, false, true)
                        | (PointerEventKind::Leave, true, false) => l.fire(l.kind, pos, time),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    /// A button changed state at `pos`.
    pub fn dispatch_button(
        &mut self,
        button: Button,
        down: bool,
        pos: Option<Point>,
        hits: &dyn HitTest,
        time: f64,
    ) {
        let kind = if down {
            PointerEventKind::Down(button)
        } else {
            PointerEventKind::Up(button)
        };
        for l in &mut self.entries {
            if l.kind == kind && l.contains(pos, hits) {
                l.fire(kind, pos, time);
            }
        }
    }

    /// Per-frame pass: in accurate mode, re-test enter/leave containment against the last known
    /// state so targets moving under a still pointer still trigger.
    pub fn dispatch_frame(
        &mut self,
        pos: Option<Point>,
        hits: &dyn HitTest,
        mode: HitMode,
        time: f64,
    ) {
        if mode != HitMode::Accurate {
            return;
        }
        for l in &mut self.entries {
            if !matches!(l.kind, PointerEventKind::Enter | PointerEventKind::Leave) {
                continue;
            }
            let now = l.contains(pos, hits);
            let was = std::mem::replace(&mut l.inside, now);
            match (l.kind, was, now) {
                (PointerEventKind::Enter, false, true) | (PointerEventKind::Leave, true, false) => {
                    l.fire(l.kind, pos, time)
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/listeners.rs"]
mod tests;
