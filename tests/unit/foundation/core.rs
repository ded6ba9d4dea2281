use super::*;

#[test]
fn id_gen_is_monotonic_and_never_hands_out_zero() {
    let mut ids = IdGen::default();
    let a = ids.next_id();
    let b = ids.next_id();
    assert_ne!(a, IdGen::UNASSIGNED);
    assert!(b > a);
    assert_eq!(ids.issued(), 2);
}

#[test]
fn premul_matches_straight_alpha() {
    assert_eq!(Rgba8::new(255, 128, 0, 255).to_premul(), [255, 128, 0, 255]);
    assert_eq!(Rgba8::new(255, 255, 255, 0).to_premul(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::new(255, 0, 0, 128).to_premul(), [128, 0, 0, 128]);
}

#[test]
fn with_alpha_clamps_input() {
    assert_eq!(Rgba8::WHITE.with_alpha(2.0).a, 255);
    assert_eq!(Rgba8::WHITE.with_alpha(-1.0).a, 0);
    assert_eq!(Rgba8::WHITE.with_alpha(0.5).a, 128);
}

#[test]
fn lerp_allows_overshoot_for_points() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 0.0);
    let p = <Point as Lerp>::lerp(&a, &b, 1.2);
    assert!((p.x - 12.0).abs() < 1e-9);
}
