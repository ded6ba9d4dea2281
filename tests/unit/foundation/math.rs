use super::*;

#[test]
fn fnv_is_order_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_f64(1.0);
    a.write_f64(2.0);
    let mut b = Fnv1a64::new_default();
    b.write_f64(2.0);
    b.write_f64(1.0);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn fnv_treats_signed_zero_as_equal() {
    let mut a = Fnv1a64::new_default();
    a.write_f64(0.0);
    let mut b = Fnv1a64::new_default();
    b.write_f64(-0.0);
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn wrap_degrees_stays_in_half_open_range() {
    assert_eq!(wrap_degrees(190.0), -170.0);
    assert_eq!(wrap_degrees(-190.0), 170.0);
    assert_eq!(wrap_degrees(180.0), 180.0);
    assert_eq!(wrap_degrees(-180.0), 180.0);
    assert_eq!(wrap_degrees(720.0 + 10.0), 10.0);
}

#[test]
fn rotate_quarter_turn_about_center() {
    let p = rotate_around(Point::new(20.0, 10.0), Point::new(10.0, 10.0), 90.0);
    assert!((p.x - 10.0).abs() < 1e-9);
    assert!((p.y - 20.0).abs() < 1e-9);
}

#[test]
fn scale_around_center() {
    let p = scale_around(
        Point::new(20.0, 10.0),
        Point::new(10.0, 10.0),
        Vec2::new(2.0, 3.0),
    );
    assert_eq!(p, Point::new(30.0, 10.0));
}
