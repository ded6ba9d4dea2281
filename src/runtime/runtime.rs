use std::cell::Cell;
use std::rc::Rc;

use crate::foundation::core::{IdGen, ObjId, Point, Vec2};
use crate::foundation::error::DotweaveResult;
use crate::input::listeners::{
    HitRegion, HitTest, ListenerId, ListenerTarget, Listeners, PointerEvent, PointerEventKind,
};
use crate::input::pointer::{Button, Pointer};
use crate::render::FrameRGBA;
use crate::render::batch::Render;
use crate::render::cpu::CpuSurface;
use crate::render::raster::RasterContext;
use crate::render::recording::{OpLog, RecordingContext};
use crate::runtime::clock::FrameClock;
use crate::runtime::opts::RuntimeOpts;
use crate::runtime::registry::Registry;
use crate::runtime::timing::{FrameTick, FrameTimer};
use crate::scene::drawable::{DrawCtx, Drawable, Placements, SceneCtx};

/// Cloneable stop switch for a running [`Runtime::run`] loop.
///
/// Stopping is advisory: the frame in progress completes and the loop exits before the next one.
#[derive(Clone, Debug, Default)]
pub struct LoopHandle(Rc<Cell<bool>>);

impl LoopHandle {
    /// Request the loop to stop.
    pub fn stop(&self) {
        self.0.set(true);
    }

    /// Return `true` once a stop was requested and not yet consumed.
    pub fn stop_requested(&self) -> bool {
        self.0.get()
    }
}

/// Frame loop, object registry and input wiring.
pub struct Runtime {
    opts: RuntimeOpts,
    render: Render,
    registry: Registry,
    ids: IdGen,
    placements: Placements,
    pointer: Pointer,
    listeners: Listeners,
    timer: FrameTimer,
    stop: LoopHandle,
    running: bool,
    time: f64,
    frames: u64,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("render", &self.render)
            .field("registry", &self.registry)
            .field("listeners", &self.listeners)
            .field("running", &self.running)
            .field("time", &self.time)
            .field("frames", &self.frames)
            .finish()
    }
}

impl Runtime {
    /// Runtime drawing into `raster`.
    pub fn new(raster: Box<dyn RasterContext>, opts: RuntimeOpts) -> Self {
        let opts = opts.sanitize();
        Self {
            render: Render::new(raster),
            registry: Registry::default(),
            ids: IdGen::default(),
            placements: Placements::default(),
            pointer: Pointer::new(opts.pointer),
            listeners: Listeners::default(),
            timer: FrameTimer::new(opts.max_delta_time, opts.skip_threshold_ms, opts.fps_limit),
            stop: LoopHandle::default(),
            running: false,
            time: 0.0,
            frames: 0,
            opts,
        }
    }

    /// Runtime over a [`CpuSurface`].
    pub fn cpu(width: u32, height: u32, opts: RuntimeOpts) -> DotweaveResult<Self> {
        Ok(Self::new(Box::new(CpuSurface::new(width, height)?), opts))
    }

    /// Headless runtime over a [`RecordingContext`], plus the log of raster calls it makes.
    pub fn recording(width: u32, height: u32, opts: RuntimeOpts) -> (Self, OpLog) {
        let raster = RecordingContext::new(width, height);
        let log = raster.log();
        (Self::new(Box::new(raster), opts), log)
    }

    /// Active options (sanitized).
    pub fn opts(&self) -> &RuntimeOpts {
        &self.opts
    }

    /// Batching renderer.
    pub fn render(&self) -> &Render {
        &self.render
    }

    /// Batching renderer, mutably.
    pub fn render_mut(&mut self) -> &mut Render {
        &mut self.render
    }

    /// Pointer state.
    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    /// Top-level objects.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Placement snapshot taken at the start of the last drawn frame.
    pub fn placements(&self) -> &Placements {
        &self.placements
    }

    /// Skip-corrected time of the last drawn frame (ms).
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of drawn frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Pixels of the last presented frame, when the surface keeps them.
    pub fn read_frame(&self) -> Option<FrameRGBA> {
        self.render.read_frame()
    }

    /// Initialize `obj` and register it. It draws from the next frame on.
    #[tracing::instrument(skip(self, obj), fields(kind = std::any::type_name::<D>()))]
    pub fn add<D: Drawable>(&mut self, obj: D) -> ObjId {
        self.add_boxed(Box::new(obj))
    }

    /// Initialize and register an already boxed object.
    pub fn add_boxed(&mut self, mut obj: Box<dyn Drawable>) -> ObjId {
        let viewport = self.render.viewport();
        let mut ctx = SceneCtx::new(&mut self.ids, &self.placements, viewport);
        ctx.init_root(obj.as_mut());
        let id = obj.id();
        self.registry.push_external(obj);
        tracing::debug!(%id, "object added");
        id
    }

    /// Remove a top-level object or any shape child, plus listeners attached to it.
    ///
    /// Unknown ids are ignored. Returns `true` when something was removed.
    pub fn remove(&mut self, id: ObjId) -> bool {
        let removed = self.registry.remove(id);
        let listeners = self.listeners.remove_target(id);
        if removed {
            tracing::debug!(%id, listeners, "object removed");
        }
        removed
    }

    /// Typed access to top-level object `id`.
    pub fn get<T: Drawable>(&self, id: ObjId) -> Option<&T> {
        self.registry.find(id)?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to top-level object `id`.
    pub fn get_mut<T: Drawable>(&mut self, id: ObjId) -> Option<&mut T> {
        self.registry
            .find_mut(id)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Mutate object `id` with a scene context that can allocate ids (e.g. to add dots or change
    /// grid text). Returns `None` when `id` is not a `T`.
    pub fn edit<T: Drawable, R>(
        &mut self,
        id: ObjId,
        f: impl FnOnce(&mut T, &mut SceneCtx<'_>) -> R,
    ) -> Option<R> {
        let viewport = self.render.viewport();
        let obj = self
            .registry
            .find_mut(id)?
            .as_any_mut()
            .downcast_mut::<T>()?;
        let mut ctx = SceneCtx::new(&mut self.ids, &self.placements, viewport);
        Some(f(obj, &mut ctx))
    }

    /// Every top-level object of type `T`, in draw order.
    pub fn get_objs<T: Drawable>(&self) -> Vec<&T> {
        self.registry
            .iter()
            .filter_map(|o| o.as_any().downcast_ref::<T>())
            .collect()
    }

    /// Process one host callback at raw timestamp `raw` (ms).
    ///
    /// Baseline, skip-recovery and throttled callbacks return without drawing. A drawn frame
    /// clears the surface, draws every object, flushes batches, applies removals and spawns, then
    /// evaluates per-frame listeners.
    pub fn draw_frame(&mut self, raw: f64) -> DotweaveResult<FrameTick> {
        let tick = self.timer.tick(raw);
        let FrameTick::Draw { time, delta } = tick else {
            return Ok(tick);
        };
        self.time = time;
        self.pointer.update_motion(delta);
        self.registry.place_all(&mut self.placements);
        self.render.begin_frame(self.opts.clear_color);

        let viewport = self.render.viewport();
        let mut spawned: Vec<Box<dyn Drawable>> = Vec::new();
        let mut removals: Vec<ObjId> = Vec::new();
        for obj in self.registry.iter_mut() {
            if removals.contains(&obj.id()) {
                continue;
            }
            let mut ctx = DrawCtx {
                render: &mut self.render,
                pointer: &self.pointer,
                time,
                delta,
                placements: &self.placements,
                ids: &mut self.ids,
                spawned: &mut spawned,
                removals: &mut removals,
                viewport,
                visibility_threshold: self.opts.visibility_threshold,
                default_margin: self.opts.default_activation_margin,
            };
            obj.draw(&mut ctx);
        }
        let presented = self.render.end_frame();
        let stats = self.render.stats();
        tracing::trace!(
            time,
            groups = stats.batched_groups,
            paths = stats.batched_paths,
            direct = stats.direct_draws,
            "frame flushed"
        );

        for id in removals {
            self.remove(id);
        }
        self.registry.sweep();
        for obj in spawned {
            self.registry.push_owned(obj);
        }
        self.listeners
            .dispatch_frame(self.pointer.pos(), &self.registry, self.opts.hit_mode, time);
        self.frames += 1;
        presented?;
        Ok(tick)
    }

    /// Handle that stops [`Runtime::run`]; clone it into callbacks.
    pub fn loop_handle(&self) -> LoopHandle {
        self.stop.clone()
    }

    /// Mark the loop as running. The next callback re-establishes the time baseline.
    pub fn start_loop(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.stop.0.set(false);
        self.timer.reset();
        tracing::debug!("loop started");
    }

    /// Request the loop to stop before its next frame.
    pub fn stop_loop(&mut self) {
        self.stop.stop();
    }

    /// Return `true` while the loop runs.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Drive frames from `clock` until a stop is requested. Returns the number of drawn frames.
    #[tracing::instrument(skip(self, clock))]
    pub fn run(&mut self, clock: &mut dyn FrameClock) -> DotweaveResult<u64> {
        self.run_while(clock, |_| true)
    }

    /// Drive at most `callbacks` clock ticks (drawn or not).
    pub fn run_frames(&mut self, clock: &mut dyn FrameClock, callbacks: u64) -> DotweaveResult<u64> {
        let mut left = callbacks;
        self.run_while(clock, move |_| {
            if left == 0 {
                return false;
            }
            left -= 1;
            true
        })
    }

    fn run_while(
        &mut self,
        clock: &mut dyn FrameClock,
        mut keep_going: impl FnMut(&Self) -> bool,
    ) -> DotweaveResult<u64> {
        self.start_loop();
        let mut drawn = 0;
        let result = loop {
            if self.stop.stop_requested() || !keep_going(self) {
                break Ok(drawn);
            }
            let t = clock.next_frame();
            match self.draw_frame(t) {
                Ok(FrameTick::Draw { .. }) => drawn += 1,
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };
        self.running = false;
        self.stop.0.set(false);
        tracing::debug!(drawn, "loop stopped");
        result
    }

    /// Pointer moved to host position `raw`.
    pub fn pointer_move(&mut self, raw: Point) {
        let prev = self.pointer.pos();
        let pos = self.pointer.move_to(raw);
        self.listeners.dispatch_move(
            prev,
            Some(pos),
            &self.registry,
            self.opts.hit_mode,
            self.time,
        );
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) {
        let prev = self.pointer.pos();
        self.pointer.leave();
        self.listeners
            .dispatch_move(prev, None, &self.registry, self.opts.hit_mode, self.time);
    }

    /// Button state change. Repeated identical states are ignored.
    pub fn pointer_button(&mut self, button: Button, down: bool) {
        if !self.pointer.set_button(button, down) {
            return;
        }
        self.listeners.dispatch_button(
            button,
            down,
            self.pointer.pos(),
            &self.registry,
            self.time,
        );
    }

    /// Offset between host and surface coordinates.
    pub fn set_pointer_offset(&mut self, offset: Vec2) {
        self.pointer.set_offset(offset);
    }

    /// Register a pointer listener.
    ///
    /// With `force_static`, an object target is frozen to its current bounds and stops following
    /// the object.
    pub fn add_listener(
        &mut self,
        target: impl Into<ListenerTarget>,
        kind: PointerEventKind,
        accurate: bool,
        force_static: bool,
        callback: impl FnMut(&PointerEvent) + 'static,
    ) -> ListenerId {
        let mut target = target.into();
        if force_static
            && let ListenerTarget::Object(id) = target
            && let Some(bounds) = self.registry.bounds_of(id)
        {
            target = ListenerTarget::Region(HitRegion::Rect(bounds));
        }
        self.listeners.add(target, kind, accurate, callback)
    }

    /// Drop listener `id`.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Resize the surface. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> DotweaveResult<()> {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring degenerate resize");
            return Ok(());
        }
        self.render.resize(width, height)?;
        tracing::debug!(width, height, "surface resized");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/runtime.rs"]
mod tests;
