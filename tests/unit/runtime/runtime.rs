use std::any::Any;
use std::cell::RefCell;

use super::*;
use crate::foundation::core::Rect;
use crate::render::recording::RasterOp;
use crate::runtime::clock::FixedStepClock;
use crate::scene::dot::Dot;
use crate::scene::object::{ObjectCore, SceneObject};

/// Test object that runs a closure every frame.
struct Scripted {
    core: ObjectCore,
    script: Box<dyn FnMut(&mut ObjectCore, &mut DrawCtx<'_>)>,
}

impl Scripted {
    fn new(script: impl FnMut(&mut ObjectCore, &mut DrawCtx<'_>) + 'static) -> Self {
        Self {
            core: ObjectCore::default(),
            script: Box::new(script),
        }
    }
}

impl SceneObject for Scripted {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }
}

impl Drawable for Scripted {
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>) {
        let parent = ctx.parent();
        let placements = ctx.placements;
        self.core.initialize(ctx.ids, parent, placements);
    }

    fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
        (self.script)(&mut self.core, ctx);
    }

    fn bounds(&self) -> Rect {
        Rect::ZERO
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn recording() -> (Runtime, OpLog) {
    Runtime::recording(200, 100, RuntimeOpts::default())
}

#[test]
fn first_callback_draws_nothing() {
    let (mut rt, log) = recording();
    rt.add(Dot::new((10.0, 10.0), 2.0));
    assert_eq!(rt.draw_frame(0.0).unwrap(), FrameTick::Baseline);
    assert!(log.ops().is_empty());
    assert!(matches!(rt.draw_frame(16.0).unwrap(), FrameTick::Draw { .. }));
    assert_eq!(log.count(|op| matches!(op, RasterOp::Fill(_))), 1);
    assert_eq!(rt.frames(), 1);
    assert_eq!(rt.time(), 16.0);
}

#[test]
fn typed_access_by_id() {
    let (mut rt, _) = recording();
    let id = rt.add(Dot::new((10.0, 10.0), 2.0));
    rt.add(Dot::new((20.0, 10.0), 3.0));
    assert_eq!(rt.get::<Dot>(id).map(Dot::radius), Some(2.0));
    assert!(rt.get::<Scripted>(id).is_none());
    rt.get_mut::<Dot>(id).unwrap().set_radius(5.0);
    assert_eq!(rt.get::<Dot>(id).unwrap().radius(), 5.0);
    assert_eq!(rt.get_objs::<Dot>().len(), 2);

    let dbl = rt.edit::<Dot, _>(id, |d, _ctx| d.radius() * 2.0);
    assert_eq!(dbl, Some(10.0));
}

#[test]
fn removal_drops_listeners_too() {
    let (mut rt, _) = recording();
    let id = rt.add(Dot::new((10.0, 10.0), 2.0));
    rt.add_listener(id, PointerEventKind::Enter, false, false, |_| {});
    rt.add_listener(Rect::new(0.0, 0.0, 5.0, 5.0), PointerEventKind::Enter, false, false, |_| {});
    assert!(rt.remove(id));
    assert!(!rt.remove(id));
    assert_eq!(rt.listeners.len(), 1);
    assert!(rt.registry().is_empty());
}

#[test]
fn spawned_objects_draw_from_the_next_frame() {
    let (mut rt, log) = recording();
    let mut done = false;
    rt.add(Scripted::new(move |_core, ctx| {
        if !done {
            ctx.spawn(Box::new(Dot::new((50.0, 50.0), 2.0)));
            done = true;
        }
    }));
    rt.draw_frame(0.0).unwrap();
    rt.draw_frame(16.0).unwrap();
    assert_eq!(rt.registry().owned().len(), 1);
    assert_eq!(log.count(|op| matches!(op, RasterOp::Fill(_))), 0);
    rt.draw_frame(32.0).unwrap();
    assert_eq!(log.count(|op| matches!(op, RasterOp::Fill(_))), 1);
}

#[test]
fn removals_apply_after_the_draw_pass() {
    let (mut rt, log) = recording();
    let victim = Rc::new(Cell::new(ObjId(0)));
    let target = Rc::clone(&victim);
    rt.add(Scripted::new(move |_core, ctx| ctx.remove(target.get())));
    victim.set(rt.add(Dot::new((10.0, 10.0), 2.0)));
    let selfish = rt.add(Scripted::new(|core, _ctx| core.request_removal()));

    rt.draw_frame(0.0).unwrap();
    rt.draw_frame(16.0).unwrap();
    // the dot was scheduled before its turn, so it was skipped
    assert_eq!(log.count(|op| matches!(op, RasterOp::Fill(_))), 0);
    assert!(rt.registry().find(victim.get()).is_none());
    assert!(rt.registry().find(selfish).is_none());
    assert_eq!(rt.registry().len(), 1);
}

#[test]
fn loop_handle_stops_after_the_current_frame() {
    let (mut rt, _) = recording();
    let handle = rt.loop_handle();
    let frames = Rc::new(Cell::new(0));
    let seen = Rc::clone(&frames);
    rt.add(Scripted::new(move |_core, _ctx| {
        seen.set(seen.get() + 1);
        if seen.get() == 5 {
            handle.stop();
        }
    }));
    let mut clock = FixedStepClock::new(16.0);
    assert_eq!(rt.run(&mut clock).unwrap(), 5);
    assert_eq!(frames.get(), 5);
    assert!(!rt.is_running());
    assert!(!rt.loop_handle().stop_requested());
}

#[test]
fn run_frames_counts_callbacks() {
    let (mut rt, _) = recording();
    let mut clock = FixedStepClock::new(16.0);
    assert_eq!(rt.run_frames(&mut clock, 11).unwrap(), 10);
    // a restarted loop needs a fresh baseline
    assert_eq!(rt.run_frames(&mut clock, 3).unwrap(), 2);
}

#[test]
fn stalled_clock_does_not_jump_animation_time() {
    let (mut rt, _) = recording();
    let mut clock = FixedStepClock::new(16.0);
    rt.run_frames(&mut clock, 3).unwrap();
    assert_eq!(rt.time(), 32.0);
    clock.stall(5000.0);
    assert_eq!(rt.draw_frame(clock.next_frame()).unwrap(), FrameTick::Skipped);
    assert!(matches!(
        rt.draw_frame(clock.next_frame()).unwrap(),
        FrameTick::Draw { time, .. } if time == 48.0
    ));
}

#[test]
fn enter_listener_fires_on_crossing_only() {
    let (mut rt, _) = recording();
    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    rt.add_listener(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        PointerEventKind::Enter,
        false,
        false,
        move |_| seen.set(seen.get() + 1),
    );
    rt.pointer_move(Point::new(150.0, 50.0));
    rt.pointer_move(Point::new(50.0, 50.0));
    rt.pointer_move(Point::new(60.0, 50.0));
    rt.pointer_leave();
    rt.pointer_move(Point::new(60.0, 50.0));
    assert_eq!(hits.get(), 2);
}

#[test]
fn force_static_freezes_object_targets() {
    let (mut rt, _) = recording();
    let id = rt.add(Dot::new((10.0, 10.0), 5.0));
    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    rt.add_listener(id, PointerEventKind::Move, false, true, move |_| {
        seen.set(seen.get() + 1)
    });
    rt.get_mut::<Dot>(id).unwrap().set_pos(Point::new(150.0, 50.0));
    rt.pointer_move(Point::new(10.0, 10.0));
    rt.pointer_move(Point::new(150.0, 50.0));
    assert_eq!(hits.get(), 1);
}

#[test]
fn buttons_fire_only_on_state_changes() {
    let (mut rt, _) = recording();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    rt.add_listener(
        ListenerTarget::Anywhere,
        PointerEventKind::Down(Button::Primary),
        false,
        false,
        move |ev| sink.borrow_mut().push(ev.pos),
    );
    rt.set_pointer_offset(Vec2::new(10.0, 0.0));
    rt.pointer_move(Point::new(20.0, 5.0));
    rt.pointer_button(Button::Primary, true);
    rt.pointer_button(Button::Primary, true);
    rt.pointer_button(Button::Primary, false);
    assert_eq!(*events.borrow(), vec![Some(Point::new(10.0, 5.0))]);
}

#[test]
fn resize_ignores_zero_sizes() {
    let (mut rt, _) = recording();
    rt.resize(0, 50).unwrap();
    assert_eq!(rt.render().size(), (200, 100));
    rt.resize(300, 150).unwrap();
    assert_eq!(rt.render().viewport(), Rect::new(0.0, 0.0, 300.0, 150.0));
}

#[test]
fn clear_color_reaches_the_surface() {
    let opts = RuntimeOpts {
        clear_color: Some(crate::foundation::core::Rgba8::BLACK),
        ..RuntimeOpts::default()
    };
    let (mut rt, log) = Runtime::recording(10, 10, opts);
    rt.draw_frame(0.0).unwrap();
    rt.draw_frame(16.0).unwrap();
    assert!(matches!(
        log.ops().first(),
        Some(RasterOp::Clear(Some(c))) if *c == crate::foundation::core::Rgba8::BLACK
    ));
}
