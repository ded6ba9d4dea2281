//! Headless drawing harness shared by scene unit tests.

use crate::foundation::core::{IdGen, ObjId, Point, Rect};
use crate::input::pointer::Pointer;
use crate::render::batch::Render;
use crate::render::recording::{OpLog, RecordingContext};
use crate::scene::drawable::{DrawCtx, Drawable, Placements, SceneCtx};

pub(crate) struct Harness {
    pub(crate) render: Render,
    pub(crate) log: OpLog,
    pub(crate) pointer: Pointer,
    pub(crate) placements: Placements,
    pub(crate) ids: IdGen,
    pub(crate) spawned: Vec<Box<dyn Drawable>>,
    pub(crate) removals: Vec<ObjId>,
}

impl Harness {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let rec = RecordingContext::new(width, height);
        let log = rec.log();
        Self {
            render: Render::new(Box::new(rec)),
            log,
            pointer: Pointer::default(),
            placements: Placements::default(),
            ids: IdGen::default(),
            spawned: Vec::new(),
            removals: Vec::new(),
        }
    }

    pub(crate) fn viewport(&self) -> Rect {
        self.render.viewport()
    }

    pub(crate) fn scene(&mut self) -> SceneCtx<'_> {
        let viewport = self.render.viewport();
        SceneCtx::new(&mut self.ids, &self.placements, viewport)
    }

    pub(crate) fn init<D: Drawable>(&mut self, obj: &mut D) {
        self.scene().init_root(obj);
    }

    pub(crate) fn point_at(&mut self, p: Point) {
        self.pointer.move_to(p);
    }

    /// Draw one frame containing only `obj`.
    pub(crate) fn draw<D: Drawable>(&mut self, obj: &mut D, time: f64) {
        self.placements.clear();
        obj.place(&mut self.placements);
        self.render.begin_frame(None);
        let viewport = self.render.viewport();
        let mut ctx = DrawCtx {
            render: &mut self.render,
            pointer: &self.pointer,
            time,
            delta: 1.0 / 60.0,
            placements: &self.placements,
            ids: &mut self.ids,
            spawned: &mut self.spawned,
            removals: &mut self.removals,
            viewport,
            visibility_threshold: 0.01,
            default_margin: 50.0,
        };
        obj.draw(&mut ctx);
        self.render.end_frame().unwrap();
    }
}
