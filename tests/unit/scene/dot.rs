use kurbo::Shape as _;

use super::*;
use crate::foundation::core::Rgba8;
use crate::render::recording::RasterOp;
use crate::scene::drawable::Placements;
use crate::test_support::Harness;

#[test]
fn radius_is_sanitized() {
    assert_eq!(Dot::new((0.0, 0.0), -3.0).radius(), 0.0);
    assert_eq!(Dot::new((0.0, 0.0), f64::NAN).radius(), 0.0);
    let mut d = Dot::new((0.0, 0.0), 2.0);
    d.set_radius(f64::INFINITY);
    assert_eq!(d.radius(), 0.0);
}

#[test]
fn connections_ignore_self_and_duplicates() {
    let mut h = Harness::new(10, 10);
    let mut d = Dot::new((0.0, 0.0), 1.0);
    h.init(&mut d);
    d.connect(d.id());
    d.connect(ObjId(40));
    d.connect(ObjId(40));
    d.connect(ObjId(41));
    assert_eq!(d.connections(), &[ObjId(40), ObjId(41)]);
    assert!(d.disconnect(ObjId(40)));
    assert!(!d.disconnect(ObjId(40)));
    assert_eq!(d.connections(), &[ObjId(41)]);
}

fn assert_rect_near(a: Rect, b: Rect) {
    let close = |x: f64, y: f64| (x - y).abs() < 1e-6;
    assert!(
        close(a.x0, b.x0) && close(a.y0, b.y0) && close(a.x1, b.x1) && close(a.y1, b.y1),
        "{a:?} != {b:?}"
    );
}

#[test]
fn path_follows_radius_and_position() {
    let mut d = Dot::new((10.0, 10.0), 2.0);
    let mut h = Harness::new(20, 20);
    h.init(&mut d);
    assert_rect_near(d.path().bounding_box(), Rect::new(8.0, 8.0, 12.0, 12.0));

    d.set_radius(4.0);
    assert_rect_near(d.path().bounding_box(), Rect::new(6.0, 6.0, 14.0, 14.0));

    d.set_pos(Point::new(0.0, 0.0));
    assert_rect_near(d.path().bounding_box(), Rect::new(-4.0, -4.0, 4.0, 4.0));
}

#[test]
fn duplicate_requires_initialization() {
    let d = Dot::new((1.0, 2.0), 3.0);
    assert!(d.duplicate().is_none());

    let mut h = Harness::new(10, 10);
    let mut d = Dot::with_core(ObjectCore::new((1.0, 2.0)).with_paint(Rgba8::BLACK), 3.0);
    h.init(&mut d);
    d.connect(ObjId(9));
    let mut copy = d.duplicate().unwrap();
    assert!(!copy.core().is_initialized());
    assert_eq!(copy.radius(), 3.0);
    assert_eq!(copy.connections(), &[ObjId(9)]);

    h.init(&mut copy);
    assert_ne!(copy.id(), d.id());
    assert_eq!(copy.pos(), d.pos());
    assert_eq!(copy.core().paint().solid(), Some(Rgba8::BLACK));
}

#[test]
fn radius_animation_starts_from_the_current_radius() {
    let mut d = Dot::new((0.0, 0.0), 2.0);
    d.radius_to(6.0, 100.0, Ease::Linear, true);
    d.run_anims(0.0);
    assert_eq!(d.radius(), 2.0);
    d.run_anims(50.0);
    assert!((d.radius() - 4.0).abs() < 1e-9);
    d.run_anims(100.0);
    assert_eq!(d.radius(), 6.0);
}

#[test]
fn draw_batches_one_fill() {
    let mut h = Harness::new(50, 50);
    let mut d = Dot::new((25.0, 25.0), 3.0);
    h.init(&mut d);
    h.draw(&mut d, 0.0);
    assert_eq!(h.render.stats().batched_paths, 1);
    assert_eq!(h.log.count(|op| matches!(op, RasterOp::Fill(_))), 1);
}

#[test]
fn transformed_dots_draw_directly() {
    let mut h = Harness::new(50, 50);
    let mut d = Dot::with_core(ObjectCore::new((25.0, 25.0)).with_scale((2.0, 1.0)), 3.0);
    h.init(&mut d);
    h.draw(&mut d, 0.0);
    let stats = h.render.stats();
    assert_eq!(stats.direct_draws, 1);
    assert_eq!(stats.batched_paths, 0);
    assert_eq!(d.bounds(), Rect::new(19.0, 22.0, 31.0, 28.0));
}

#[test]
fn invisible_dots_are_not_drawn() {
    let mut h = Harness::new(50, 50);
    let mut zero = Dot::new((25.0, 25.0), 0.0);
    h.init(&mut zero);
    h.draw(&mut zero, 0.0);

    let mut faded = Dot::with_core(
        ObjectCore::new((25.0, 25.0)).with_paint(Rgba8::WHITE.with_alpha(0.005)),
        3.0,
    );
    h.init(&mut faded);
    h.draw(&mut faded, 0.0);
    assert_eq!(h.log.count(|op| matches!(op, RasterOp::Fill(_))), 0);
}

#[test]
fn accurate_hit_uses_the_circle() {
    let mut h = Harness::new(50, 50);
    let mut d = Dot::new((10.0, 10.0), 5.0);
    h.init(&mut d);
    let corner = Point::new(14.5, 14.5);
    assert!(d.contains(corner, false));
    assert!(!d.contains(corner, true));
    assert!(d.contains(Point::new(13.0, 10.0), true));
}

#[test]
fn anchored_dot_resolves_against_the_snapshot() {
    let mut h = Harness::new(50, 50);
    h.placements.insert(ObjId(77), Point::new(10.0, 10.0), Rect::ZERO);
    let mut d = Dot::with_core(ObjectCore::new((5.0, 0.0)).anchored_to(ObjId(77)), 1.0);
    h.init(&mut d);
    assert_eq!(d.pos(), Point::new(15.0, 10.0));

    let mut moved = Placements::default();
    moved.insert(ObjId(77), Point::new(20.0, 30.0), Rect::ZERO);
    assert_eq!(d.core_mut().follow_anchor(&moved), Some(Point::new(25.0, 30.0)));
    assert_eq!(d.core_mut().follow_anchor(&moved), None);
}
