use super::*;
use crate::scene::dot::Dot;

fn init(core: &mut ObjectCore, ids: &mut IdGen) -> bool {
    core.initialize(ids, None, &Placements::default())
}

#[test]
fn initialization_assigns_an_id_once() {
    let mut ids = IdGen::default();
    let mut core = ObjectCore::new((3.0, 4.0));
    assert_eq!(core.id(), IdGen::UNASSIGNED);
    assert!(init(&mut core, &mut ids));
    let id = core.id();
    assert_ne!(id, IdGen::UNASSIGNED);
    assert_eq!(core.pos(), Point::new(3.0, 4.0));
    assert!(!init(&mut core, &mut ids));
    assert_eq!(core.id(), id);
}

#[test]
fn computed_position_sees_the_parent() {
    let mut ids = IdGen::default();
    let mut core = ObjectCore::computed(|_core, parent| {
        let p = parent.map(|p| p.pos).unwrap_or(Point::ZERO);
        p + Vec2::new(1.0, 2.0)
    });
    let parent = ParentRef {
        id: ObjId(42),
        pos: Point::new(10.0, 10.0),
    };
    core.initialize(&mut ids, Some(parent), &Placements::default());
    assert_eq!(core.pos(), Point::new(11.0, 12.0));
    assert_eq!(core.parent(), Some(ObjId(42)));
}

#[test]
fn non_finite_values_are_ignored() {
    let mut ids = IdGen::default();
    let mut core = ObjectCore::new((f64::NAN, 1.0));
    init(&mut core, &mut ids);
    assert_eq!(core.pos(), Point::ZERO);

    core.set_pos(Point::new(f64::INFINITY, 0.0));
    assert_eq!(core.pos(), Point::ZERO);
    core.set_rotation(f64::NAN);
    assert_eq!(core.rotation(), 0.0);
    core.set_scale(Vec2::new(f64::NAN, 1.0));
    assert_eq!(core.scale(), Vec2::new(1.0, 1.0));
    core.set_opacity(3.0);
    assert_eq!(core.opacity(), 1.0);
    core.set_opacity(-1.0);
    assert_eq!(core.opacity(), 0.0);
}

#[test]
fn transform_pivots_on_the_position() {
    let mut ids = IdGen::default();
    let mut core = ObjectCore::new((10.0, 10.0));
    init(&mut core, &mut ids);
    assert_eq!(core.transform_about(None), Affine::IDENTITY);
    assert!(!core.is_transformed());

    core.set_scale(Vec2::new(2.0, 2.0));
    let xf = core.transform_about(None);
    assert_eq!(xf * Point::new(10.0, 10.0), Point::new(10.0, 10.0));
    assert_eq!(xf * Point::new(12.0, 10.0), Point::new(14.0, 10.0));
    assert_eq!(core.untransform(Point::new(14.0, 10.0), None), Some(Point::new(12.0, 10.0)));

    core.set_scale(Vec2::new(0.0, 1.0));
    assert_eq!(core.untransform(Point::new(14.0, 10.0), None), None);
}

#[test]
fn activation_margin_controls_effects() {
    let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
    let outside = Rect::new(130.0, 10.0, 132.0, 12.0);
    let core = ObjectCore::default();
    assert!(core.is_active(outside, viewport, 50.0));
    assert!(!core.is_active(outside, viewport, 20.0));

    let always = ObjectCore::default().with_margin(ActivationMargin::Always);
    assert!(always.is_active(Rect::new(1e6, 1e6, 1e6, 1e6), viewport, 0.0));

    let nan = ObjectCore::default().with_margin(ActivationMargin::Px(f64::NAN));
    assert_eq!(nan.margin(), Some(ActivationMargin::Always));
}

#[test]
fn anchors_keep_their_offset() {
    let mut ids = IdGen::default();
    let mut placements = Placements::default();
    placements.insert(ObjId(7), Point::new(100.0, 0.0), Rect::ZERO);
    let mut core = ObjectCore::new((10.0, 0.0)).anchored_to(ObjId(7));
    core.initialize(&mut ids, None, &placements);
    assert_eq!(core.pos(), Point::new(110.0, 0.0));

    core.set_pos(Point::new(120.0, 5.0));
    placements.insert(ObjId(7), Point::new(200.0, 0.0), Rect::ZERO);
    assert_eq!(core.follow_anchor(&placements), Some(Point::new(220.0, 5.0)));
}

#[test]
fn missing_anchor_target_keeps_the_declared_position() {
    let mut ids = IdGen::default();
    let mut core = ObjectCore::new((10.0, 0.0)).anchored_to(ObjId(7));
    init(&mut core, &mut ids);
    assert_eq!(core.pos(), Point::new(10.0, 0.0));
    assert_eq!(core.follow_anchor(&Placements::default()), None);
}

#[test]
fn duplicate_copies_style_but_not_identity() {
    let mut ids = IdGen::default();
    let core = ObjectCore::new((1.0, 1.0)).with_rotation(30.0);
    assert!(core.duplicate().is_none());

    let mut core = core;
    init(&mut core, &mut ids);
    core.request_removal();
    let mut copy = core.duplicate().unwrap();
    assert!(!copy.is_initialized());
    assert!(!copy.removal_requested());
    assert_eq!(copy.rotation(), 30.0);
    init(&mut copy, &mut ids);
    assert_eq!(copy.pos(), core.pos());
    assert_ne!(copy.id(), core.id());
}

#[test]
fn motion_tweens_from_the_current_value() {
    let mut dot = Dot::new((0.0, 0.0), 1.0);
    dot.move_to((100.0, 0.0), 100.0, Ease::Linear, true);
    dot.run_anims(0.0);
    dot.run_anims(25.0);
    assert_eq!(dot.pos(), Point::new(25.0, 0.0));
    dot.run_anims(100.0);
    assert_eq!(dot.pos(), Point::new(100.0, 0.0));
}

#[test]
fn queued_motions_chain() {
    let mut dot = Dot::new((0.0, 0.0), 1.0);
    dot.move_to((10.0, 0.0), 100.0, Ease::Linear, true);
    dot.move_to((10.0, 10.0), 100.0, Ease::Linear, true);
    dot.run_anims(0.0);
    dot.run_anims(100.0);
    assert_eq!(dot.pos(), Point::new(10.0, 0.0));
    dot.run_anims(100.0);
    dot.run_anims(150.0);
    assert_eq!(dot.pos(), Point::new(10.0, 5.0));
}

#[test]
fn concurrent_motions_run_together() {
    let mut dot = Dot::new((0.0, 0.0), 1.0);
    dot.rotate_to(90.0, 100.0, Ease::Linear, false);
    dot.opacity_to(0.0, 100.0, Ease::Linear, false);
    dot.scale_to((3.0, 3.0), 100.0, Ease::Linear, false);
    dot.run_anims(0.0);
    dot.run_anims(50.0);
    assert_eq!(dot.rotation(), 45.0);
    assert_eq!(dot.opacity(), 0.5);
    assert_eq!(dot.scale(), Vec2::new(2.0, 2.0));
}
