use super::*;

fn timer() -> FrameTimer {
    FrameTimer::new(0.13, 250.0, None)
}

#[test]
fn first_callback_only_sets_the_baseline() {
    let mut t = timer();
    assert_eq!(t.tick(500.0), FrameTick::Baseline);
    assert_eq!(
        t.tick(516.0),
        FrameTick::Draw {
            time: 516.0,
            delta: 0.016
        }
    );
    assert_eq!(t.drawn(), 1);
}

#[test]
fn delta_is_clamped() {
    let mut t = timer();
    t.tick(0.0);
    let FrameTick::Draw { delta, .. } = t.tick(200.0) else {
        panic!("expected a draw");
    };
    assert_eq!(delta, 0.13);
}

#[test]
fn long_pauses_are_absorbed() {
    let mut t = timer();
    t.tick(0.0);
    t.tick(16.0);
    assert_eq!(t.tick(3016.0), FrameTick::Skipped);
    assert_eq!(t.skip_offset(), 3000.0);
    assert_eq!(
        t.tick(3032.0),
        FrameTick::Draw {
            time: 32.0,
            delta: 0.016
        }
    );
}

#[test]
fn clock_going_backwards_is_a_skip() {
    let mut t = timer();
    t.tick(100.0);
    assert_eq!(t.tick(50.0), FrameTick::Skipped);
    assert_eq!(t.skip_offset(), -50.0);
    assert_eq!(t.tick(66.0), FrameTick::Draw { time: 116.0, delta: 0.016 });
}

#[test]
fn fps_limit_drops_early_callbacks() {
    let mut t = FrameTimer::new(0.13, 250.0, Some(30.0));
    t.tick(0.0);
    assert_eq!(t.tick(16.0), FrameTick::Throttled);
    // within the slack of the 33.3 ms interval
    assert!(matches!(t.tick(33.0), FrameTick::Draw { .. }));
    assert_eq!(t.tick(50.0), FrameTick::Throttled);
    assert!(matches!(t.tick(67.0), FrameTick::Draw { .. }));
    assert_eq!(t.drawn(), 2);
}

#[test]
fn reset_restarts_from_a_new_baseline() {
    let mut t = timer();
    t.tick(0.0);
    t.tick(16.0);
    t.reset();
    assert_eq!(t.tick(10_000.0), FrameTick::Baseline);
    assert_eq!(t.skip_offset(), 0.0);
}
