use super::*;

#[test]
fn positions_are_offset_into_surface_space() {
    let mut p = Pointer::default();
    assert_eq!(p.pos(), None);
    p.set_offset(Vec2::new(100.0, 20.0));
    assert_eq!(p.move_to(Point::new(110.0, 25.0)), Point::new(10.0, 5.0));
    assert_eq!(p.raw_pos(), Some(Point::new(110.0, 25.0)));
    p.move_to(Point::new(120.0, 25.0));
    assert_eq!(p.last_pos(), Some(Point::new(10.0, 5.0)));
    assert_eq!(p.pos(), Some(Point::new(20.0, 5.0)));
}

#[test]
fn buttons_report_changes_and_reset_on_leave() {
    let mut p = Pointer::default();
    assert!(p.set_button(Button::Primary, true));
    assert!(!p.set_button(Button::Primary, true));
    assert!(p.is_down(Button::Primary));
    assert!(!p.is_down(Button::Secondary));

    p.move_to(Point::new(1.0, 1.0));
    p.leave();
    assert_eq!(p.pos(), None);
    assert_eq!(p.last_pos(), Some(Point::new(1.0, 1.0)));
    assert!(!p.is_down(Button::Primary));
}

#[test]
fn speed_and_direction_are_smoothed() {
    let mut p = Pointer::default();
    p.move_to(Point::new(0.0, 0.0));
    p.update_motion(0.1);
    assert_eq!(p.speed(), 0.0);

    p.move_to(Point::new(10.0, 0.0));
    p.update_motion(0.1);
    assert!((p.speed() - 15.0).abs() < 1e-9);
    assert_eq!(p.dir(), 0.0);

    p.move_to(Point::new(10.0, 10.0));
    p.update_motion(0.1);
    assert!((p.speed() - 27.75).abs() < 1e-9);
    assert!((p.dir() - 36.0).abs() < 1e-9);
}

#[test]
fn direction_turns_the_short_way_round() {
    let mut p = Pointer::new(PointerOpts {
        dir_decay: 0.0,
        ..PointerOpts::default()
    });
    p.move_to(Point::new(0.0, 0.0));
    p.update_motion(0.1);
    p.move_to(Point::new(-10.0, 1.0));
    p.update_motion(0.1);
    let west = p.dir();
    assert!(west > 170.0, "{west}");
    p.move_to(Point::new(-20.0, 0.0));
    p.update_motion(0.1);
    assert!(p.dir() > 170.0 || p.dir() <= -170.0);
}

#[test]
fn idle_speed_decays_to_zero() {
    let mut p = Pointer::default();
    p.move_to(Point::new(0.0, 0.0));
    p.update_motion(0.016);
    p.move_to(Point::new(50.0, 0.0));
    p.update_motion(0.016);
    assert!(p.speed() > 0.0);
    for _ in 0..200 {
        p.update_motion(0.016);
    }
    assert_eq!(p.speed(), 0.0);
}

#[test]
fn invalid_delta_is_ignored() {
    let mut p = Pointer::default();
    p.move_to(Point::new(0.0, 0.0));
    p.update_motion(0.1);
    p.move_to(Point::new(10.0, 0.0));
    p.update_motion(0.0);
    p.update_motion(f64::NAN);
    assert_eq!(p.speed(), 0.0);
}

#[test]
fn options_are_sanitized() {
    let opts = PointerOpts {
        speed_decay: 1.5,
        speed_snap: -1.0,
        dir_decay: f64::NAN,
    }
    .sanitize();
    assert_eq!(opts, PointerOpts::default());
}
