use std::any::Any;
use std::sync::Arc;

use crate::animation::anim::{AnimQueue, Animated};
use crate::foundation::core::{ObjId, Point, Rect, Vec2};
use crate::scene::dot::{DEFAULT_RADIUS, Dot};
use crate::scene::drawable::{DrawCtx, Drawable, Placements, SceneCtx};
use crate::scene::object::{ObjectCore, PosDecl, SceneObject};
use crate::scene::shape::Shape;
use crate::scene::symbols::Symbols;

/// Default distance in pixels between adjacent symbol cells.
pub const DEFAULT_GAP: f64 = 10.0;

/// Dots generated for one character of a [`Grid`].
#[derive(Clone, Debug, PartialEq)]
pub struct CharGroup {
    ch: char,
    origin: Vec2,
    ids: Vec<ObjId>,
}

impl CharGroup {
    /// The character this group renders.
    pub fn ch(&self) -> char {
        self.ch
    }

    /// Top-left cell offset from the grid position.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Ids of the generated dots, in symbol order.
    pub fn ids(&self) -> &[ObjId] {
        &self.ids
    }
}

/// Outcome of [`Grid::set_keys`], as group indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridDiff {
    /// Groups left untouched.
    pub kept: Vec<usize>,
    /// Groups whose previous dots were deleted (changed or dropped positions).
    pub removed: Vec<usize>,
    /// Groups generated from scratch.
    pub created: Vec<usize>,
}

/// Shape whose dots spell out `keys` using a symbol table.
pub struct Grid {
    shape: Shape,
    keys: String,
    symbols: Arc<Symbols>,
    gap: Vec2,
    letter_spacing: f64,
    line_spacing: f64,
    dot_radius: f64,
    groups: Vec<CharGroup>,
    anims: AnimQueue<Grid>,
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("shape", &self.shape)
            .field("keys", &self.keys)
            .field("gap", &self.gap)
            .field("groups", &self.groups.len())
            .finish()
    }
}

impl Grid {
    /// Grid at `pos` spelling `keys` with the built-in symbol table.
    pub fn new(pos: impl Into<PosDecl>, keys: impl Into<String>) -> Self {
        Self::from_shape(Shape::new(pos, Vec::<Dot>::new()), keys)
    }

    /// Grid built around a configured shape (effects, limit, ratio target).
    ///
    /// Dots already declared on the shape are kept alongside the generated ones.
    pub fn from_shape(shape: Shape, keys: impl Into<String>) -> Self {
        Self {
            shape,
            keys: keys.into(),
            symbols: Arc::new(Symbols::builtin()),
            gap: Vec2::new(DEFAULT_GAP, DEFAULT_GAP),
            letter_spacing: 1.0,
            line_spacing: 0.0,
            dot_radius: DEFAULT_RADIUS,
            groups: Vec::new(),
            anims: AnimQueue::default(),
        }
    }

    /// Built around an explicit core.
    pub fn with_core(core: ObjectCore, keys: impl Into<String>) -> Self {
        Self::from_shape(Shape::with_core(core, Vec::<Dot>::new()), keys)
    }

    /// Replace the symbol table.
    pub fn with_symbols(mut self, symbols: Arc<Symbols>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Pixel distance between cells. Non-finite components are ignored.
    pub fn with_gap(mut self, gap: impl Into<Vec2>) -> Self {
        let gap = gap.into();
        if gap.x.is_finite() && gap.y.is_finite() {
            self.gap = gap;
        }
        self
    }

    /// Extra cells between characters.
    pub fn with_letter_spacing(mut self, cells: f64) -> Self {
        if cells.is_finite() {
            self.letter_spacing = cells;
        }
        self
    }

    /// Extra cells between rows.
    pub fn with_line_spacing(mut self, cells: f64) -> Self {
        if cells.is_finite() {
            self.line_spacing = cells;
        }
        self
    }

    /// Radius of generated dots.
    pub fn with_dot_radius(mut self, radius: f64) -> Self {
        if radius.is_finite() && radius >= 0.0 {
            self.dot_radius = radius;
        }
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

    /// Current text.
    pub fn keys(&self) -> &str {
        &self.keys
    }

    /// One group per character of `keys`, newlines included (they carry no dots).
    pub fn groups(&self) -> &[CharGroup] {
        &self.groups
    }

    /// Symbol table in use.
    pub fn symbols(&self) -> &Arc<Symbols> {
        &self.symbols
    }

    /// Replace the text, regenerating only the characters that changed.
    ///
    /// A group is kept when both its character and its cell origin are unchanged, so its dots
    /// keep their ids, animations and connections. Before initialization only the text is stored.
    pub fn set_keys(&mut self, keys: &str, ctx: &mut SceneCtx<'_>) -> GridDiff {
        self.keys = keys.to_owned();
        if !self.shape.core().is_initialized() {
            return GridDiff::default();
        }
        self.rebuild(ctx)
    }

    fn layout(&self) -> Vec<(char, Vec2)> {
        let advance = (f64::from(self.symbols.width()) + self.letter_spacing) * self.gap.x;
        let row = (f64::from(self.symbols.height()) + self.line_spacing) * self.gap.y;
        let mut cursor = Vec2::ZERO;
        let mut out = Vec::with_capacity(self.keys.len());
        for ch in self.keys.chars() {
            if ch == '\n' {
                out.push((ch, cursor));
                cursor = Vec2::new(0.0, cursor.y + row);
                continue;
            }
            out.push((ch, cursor));
            cursor.x += advance;
        }
        out
    }

    fn rebuild(&mut self, ctx: &mut SceneCtx<'_>) -> GridDiff {
        let layout = self.layout();
        let mut diff = GridDiff::default();
        let old = std::mem::take(&mut self.groups);
        let mut groups = Vec::with_capacity(layout.len());

        for (i, (ch, origin)) in layout.into_iter().enumerate() {
            match old.get(i) {
                Some(g) if g.ch == ch && g.origin == origin => {
                    groups.push(g.clone());
                    diff.kept.push(i);
                    continue;
                }
                Some(g) => {
                    self.shape.remove_dots(&g.ids);
                    diff.removed.push(i);
                }
                None => {}
            }
            groups.push(self.generate(ch, origin, ctx));
            diff.created.push(i);
        }
        for (i, g) in old.iter().enumerate().skip(groups.len()) {
            self.shape.remove_dots(&g.ids);
            diff.removed.push(i);
        }
        self.groups = groups;
        tracing::trace!(
            id = %self.shape.id(),
            kept = diff.kept.len(),
            removed = diff.removed.len(),
            created = diff.created.len(),
            "grid keys updated"
        );
        diff
    }

    fn generate(&mut self, ch: char, origin: Vec2, ctx: &mut SceneCtx<'_>) -> CharGroup {
        let mut group = CharGroup {
            ch,
            origin,
            ids: Vec::new(),
        };
        let symbols = Arc::clone(&self.symbols);
        let Some(def) = symbols.get(ch) else {
            return group;
        };

        let mut cells = Vec::with_capacity(def.len());
        for sd in def {
            let (cx, cy) = symbols.cell_xy(sd.cell);
            let local = Point::new(
                origin.x + f64::from(cx) * self.gap.x,
                origin.y + f64::from(cy) * self.gap.y,
            );
            let core = ObjectCore::new(local)
                .with_paint(self.shape.core().paint().clone())
                .with_effects(self.shape.core().effects().clone());
            let id = self
                .shape
                .add_dot(Dot::with_core(core, self.dot_radius), ctx);
            cells.push((sd.cell, id));
            group.ids.push(id);
        }

        let id_at = |x: i32, y: i32| -> Option<ObjId> {
            if x < 0 || y < 0 || x >= i32::from(symbols.width()) || y >= i32::from(symbols.height())
            {
                return None;
            }
            let cell = (y * i32::from(symbols.width()) + x) as u16;
            cells.iter().find(|(c, _)| *c == cell).map(|(_, id)| *id)
        };
        for (sd, &(_, id)) in def.iter().zip(&cells) {
            let (cx, cy) = symbols.cell_xy(sd.cell);
            for (dx, dy) in sd.links.offsets() {
                if let Some(target) = id_at(i32::from(cx) + dx, i32::from(cy) + dy) {
                    self.shape.connect(id, target);
                }
            }
        }
        group
    }
}

impl Animated for Grid {
    fn anim_queue(&mut self) -> &mut AnimQueue<Self> {
        &mut self.anims
    }
}

impl SceneObject for Grid {
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
    }
}

impl Drawable for Grid {
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>) {
        if self.shape.core().is_initialized() {
            return;
        }
        self.shape.initialize(ctx);
        self.rebuild(ctx);
    }

    fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
        self.run_anims(ctx.time);
        self.shape.draw(ctx);
    }

    fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    fn contains(&self, point: Point, accurate: bool) -> bool {
        self.shape.contains(point, accurate)
    }

    fn place(&self, out: &mut Placements) {
        self.shape.place(out);
    }

    fn hit(&self, id: ObjId, point: Point, accurate: bool) -> Option<bool> {
        self.shape.hit(id, point, accurate)
    }

    fn bounds_of(&self, id: ObjId) -> Option<Rect> {
        self.shape.bounds_of(id)
    }

    fn remove_child(&mut self, id: ObjId) -> bool {
        for g in &mut self.groups {
            g.ids.retain(|i| *i != id);
        }
        self.shape.remove_child(id)
    }

    fn sweep_children(&mut self) {
        self.shape.sweep_children();
        let shape = &self.shape;
        for g in &mut self.groups {
            g.ids.retain(|i| shape.dot(*i).is_some());
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
#[path = "../../tests/unit/scene/grid.rs"]
mod tests;
