use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::render::recording::RasterOp;
use crate::test_support::Harness;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Seen {
    ratio: f64,
    raw_ratio: f64,
    within: bool,
}

fn sampling(shape: Shape) -> (Shape, Rc<RefCell<Vec<Seen>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let shape = shape.on_dot(move |_ctx, _dot, s| {
        sink.borrow_mut().push(Seen {
            ratio: s.ratio,
            raw_ratio: s.raw_ratio,
            within: s.within_limit,
        });
    });
    (shape, seen)
}

#[test]
fn dots_are_declared_relative_to_the_shape() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((50.0, 40.0), vec![Dot::new((0.0, 0.0), 1.0), Dot::new((10.0, -5.0), 1.0)]);
    h.init(&mut s);
    assert_eq!(s.dots()[0].pos(), Point::new(50.0, 40.0));
    assert_eq!(s.dots()[1].pos(), Point::new(60.0, 35.0));
    assert_eq!(s.dots()[1].core().parent(), Some(s.id()));
    assert!(s.dots()[0].id() > s.id());
}

#[test]
fn template_skips_malformed_entries() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((0.0, 0.0), "0,0 10,0;20,0,5 bad 1,2,3,4")
        .with_dot_radius(1.5);
    h.init(&mut s);
    let radii: Vec<f64> = s.dots().iter().map(Dot::radius).collect();
    assert_eq!(radii, vec![1.5, 1.5, 5.0]);
    assert_eq!(s.dots()[2].pos(), Point::new(20.0, 0.0));
}

#[test]
fn generator_sees_its_parent() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::generated((30.0, 30.0), |_ctx, parent| {
        assert_eq!(parent.pos, Point::new(30.0, 30.0));
        (0..3).map(|i| Dot::new((f64::from(i), 0.0), 1.0)).collect()
    });
    h.init(&mut s);
    assert_eq!(s.len(), 3);
    assert_eq!(s.dots()[2].pos(), Point::new(32.0, 30.0));
}

#[test]
fn group_transforms_move_the_dots() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((0.0, 0.0), vec![Dot::new((10.0, 0.0), 1.0)]);
    h.init(&mut s);

    s.set_pos(Point::new(5.0, 5.0));
    assert_eq!(s.dots()[0].pos(), Point::new(15.0, 5.0));

    s.set_rotation(90.0);
    let p = s.dots()[0].pos();
    assert!((p.x - 5.0).abs() < 1e-9 && (p.y - 15.0).abs() < 1e-9, "{p:?}");

    s.set_scale(Vec2::new(2.0, 2.0));
    let p = s.dots()[0].pos();
    assert!((p.x - 5.0).abs() < 1e-9 && (p.y - 25.0).abs() < 1e-9, "{p:?}");

    s.set_opacity(0.25);
    assert_eq!(s.dots()[0].opacity(), 0.25);
}

fn near(p: Point, x: f64, y: f64) -> bool {
    (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9
}

#[test]
fn declared_rotation_applies_to_initial_dots() {
    let mut h = Harness::new(100, 100);
    let core = ObjectCore::new((50.0, 50.0)).with_rotation(90.0);
    let mut s = Shape::with_core(core, vec![Dot::new((10.0, 0.0), 1.0)]);
    h.init(&mut s);
    let p = s.dots()[0].pos();
    assert!(near(p, 50.0, 60.0), "{p:?}");

    s.set_rotation(0.0);
    let p = s.dots()[0].pos();
    assert!(near(p, 60.0, 50.0), "{p:?}");
}

#[test]
fn declared_scale_applies_to_initial_dots() {
    let mut h = Harness::new(100, 100);
    let core = ObjectCore::new((50.0, 50.0)).with_scale((2.0, 3.0));
    let mut s = Shape::with_core(core, vec![Dot::new((10.0, 10.0), 1.0)]);
    h.init(&mut s);
    assert!(near(s.dots()[0].pos(), 70.0, 80.0), "{:?}", s.dots()[0].pos());
}

#[test]
fn zero_scale_can_be_undone() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((50.0, 50.0), vec![Dot::new((10.0, 0.0), 1.0)]);
    h.init(&mut s);

    s.set_scale(Vec2::new(0.0, 0.0));
    assert!(near(s.dots()[0].pos(), 50.0, 50.0));

    s.set_scale(Vec2::new(1.0, 1.0));
    let p = s.dots()[0].pos();
    assert!(near(p, 60.0, 50.0), "{p:?}");

    s.set_rotation(90.0);
    s.set_scale(Vec2::new(0.0, 1.0));
    s.set_scale(Vec2::new(2.0, 2.0));
    let p = s.dots()[0].pos();
    assert!(near(p, 50.0, 70.0), "{p:?}");
}

#[test]
fn duplicate_of_a_rotated_shape_lands_on_the_same_spots() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((50.0, 50.0), vec![Dot::new((10.0, 0.0), 1.0)]);
    h.init(&mut s);
    s.set_rotation(90.0);

    let mut copy = s.duplicate().unwrap();
    h.init(&mut copy);
    let p = copy.dots()[0].pos();
    assert!(near(p, 50.0, 60.0), "{p:?}");
}

#[test]
fn ratio_boundaries_follow_the_limit() {
    let mut h = Harness::new(400, 100);
    let dots = vec![
        Dot::new((0.0, 0.0), 1.0),
        Dot::new((100.0, 0.0), 1.0),
        Dot::new((200.0, 0.0), 1.0),
    ];
    let (mut s, seen) = sampling(
        Shape::new((0.0, 50.0), dots)
            .with_limit(100.0)
            .with_ratio_target(RatioTarget::Fixed(Point::new(0.0, 50.0))),
    );
    h.init(&mut s);
    h.draw(&mut s, 0.0);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert_eq!(
        seen[0],
        Seen {
            ratio: 0.0,
            raw_ratio: 0.0,
            within: true
        }
    );
    assert_eq!((seen[1].ratio, seen[1].raw_ratio, seen[1].within), (1.0, 1.0, false));
    assert_eq!((seen[2].ratio, seen[2].raw_ratio, seen[2].within), (1.0, 2.0, false));
}

#[test]
fn missing_pointer_reads_as_out_of_range() {
    let mut h = Harness::new(100, 100);
    let (mut s, seen) = sampling(Shape::new((50.0, 50.0), vec![Dot::new((0.0, 0.0), 1.0)]));
    h.init(&mut s);
    h.draw(&mut s, 0.0);
    assert_eq!(seen.borrow()[0].ratio, 1.0);
    assert!(!seen.borrow()[0].within);

    h.point_at(Point::new(50.0, 60.0));
    h.draw(&mut s, 16.0);
    assert!((seen.borrow()[1].raw_ratio - 0.1).abs() < 1e-12);
}

#[test]
fn object_ratio_target_reads_the_snapshot() {
    let mut h = Harness::new(100, 100);
    let (mut s, seen) = sampling(
        Shape::new((0.0, 0.0), vec![Dot::new((10.0, 10.0), 1.0), Dot::new((60.0, 10.0), 1.0)])
            .with_limit(50.0),
    );
    h.init(&mut s);
    let first = s.dots()[0].id();
    s.set_ratio_target(RatioTarget::Object(first));
    h.draw(&mut s, 0.0);
    let seen = seen.borrow();
    assert_eq!(seen[0].ratio, 0.0);
    assert_eq!(seen[1].raw_ratio, 1.0);
}

#[test]
fn setup_result_reaches_every_dot() {
    let mut h = Harness::new(100, 100);
    let total = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&total);
    let mut s = Shape::new((10.0, 10.0), "0,0 5,0 10,0")
        .with_setup(|_ctx, frame| Box::new(frame.dots().len() as u32))
        .on_dot(move |_ctx, _dot, sample| {
            *sink.borrow_mut() += sample.setup_as::<u32>().copied().unwrap_or(0);
            assert!(sample.setup_as::<String>().is_none());
        });
    h.init(&mut s);
    h.draw(&mut s, 0.0);
    assert_eq!(*total.borrow(), 9);
}

#[test]
fn dots_outside_the_active_area_skip_effects_but_draw() {
    let mut h = Harness::new(100, 100);
    let (mut s, seen) = sampling(Shape::new(
        (0.0, 0.0),
        vec![Dot::new((50.0, 50.0), 2.0), Dot::new((500.0, 50.0), 2.0)],
    ));
    h.init(&mut s);
    h.draw(&mut s, 0.0);
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(h.log.count(|op| matches!(op, RasterOp::Fill(_))), 2);
}

#[test]
fn frame_snapshot_is_sorted_and_drops_stale_ids() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((0.0, 0.0), "0,0 1,1 2,2");
    h.init(&mut s);
    let last = s.dots()[2].id();
    let removed = s.remove_dot(s.dots()[1].id()).unwrap();

    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    s = s.on_dot(move |_ctx, _dot, sample| {
        let f = sample.shape;
        *sink.borrow_mut() = Some((f.dots().len(), f.find(last).is_some(), f.find(removed.id()).is_some()));
    });
    h.draw(&mut s, 0.0);
    assert_eq!(*seen.borrow(), Some((2, true, false)));
}

#[test]
fn invalid_limit_falls_back_to_default() {
    let mut s = Shape::new((0.0, 0.0), Vec::<Dot>::new()).with_limit(-4.0);
    assert_eq!(s.limit(), DEFAULT_LIMIT);
    s.set_limit(25.0);
    assert_eq!(s.limit(), 25.0);
    s.set_limit(f64::NAN);
    assert_eq!(s.limit(), DEFAULT_LIMIT);
}

#[test]
fn duplicate_keeps_dots_and_links() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((20.0, 20.0), "0,0 10,0").with_limit(42.0);
    h.init(&mut s);
    let (a, b) = (s.dots()[0].id(), s.dots()[1].id());
    s.connect(a, b);

    let mut copy = s.duplicate().unwrap();
    h.init(&mut copy);
    assert_eq!(copy.len(), 2);
    assert_eq!(copy.limit(), 42.0);
    assert_eq!(copy.dots()[1].pos(), Point::new(30.0, 20.0));
    assert_eq!(copy.dots()[0].connections(), &[copy.dots()[1].id()]);
    assert_ne!(copy.dots()[0].id(), a);
}

#[test]
fn removal_requests_are_swept() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((0.0, 0.0), "0,0 1,0 2,0");
    h.init(&mut s);
    s.dots_mut()[1].core_mut().request_removal();
    s.sweep_children();
    assert_eq!(s.len(), 2);
    assert!(!s.remove_child(ObjId(999)));
}

#[test]
fn empty_shape_contains_nothing() {
    let mut h = Harness::new(100, 100);
    let mut s = Shape::new((10.0, 10.0), Vec::<Dot>::new());
    h.init(&mut s);
    assert!(!s.contains(Point::new(10.0, 10.0), false));
    assert_eq!(s.bounds(), Rect::new(10.0, 10.0, 10.0, 10.0));
}
