use super::*;

#[test]
fn first_step_only_latches() {
    let mut c = AnimClock::new(100.0, Ease::Linear);
    assert!(c.is_pending());
    assert_eq!(c.step(500.0), ClockStep::Latched);
    assert_eq!(c.progress(), 0.0);
    assert_eq!(c.step(550.0), ClockStep::Progress(0.5));
}

#[test]
fn finite_clock_finishes_once() {
    let mut c = AnimClock::new(100.0, Ease::Linear);
    c.step(0.0);
    assert_eq!(c.step(100.0), ClockStep::Finished);
    assert!(c.is_finished());
    assert_eq!(c.play_count(), 1);
    assert_eq!(c.step(200.0), ClockStep::Idle);
    assert_eq!(c.progress(), 1.0);
}

#[test]
fn infinite_clock_cycles_and_relatches() {
    let mut c = AnimClock::new(-100.0, Ease::Linear);
    assert!(c.is_infinite());
    c.step(0.0);
    assert_eq!(c.step(50.0), ClockStep::Progress(0.5));
    assert_eq!(c.step(120.0), ClockStep::Cycle);
    assert_eq!(c.play_count(), 1);
    assert!(c.is_pending());
    assert_eq!(c.step(130.0), ClockStep::Latched);
    assert_eq!(c.step(180.0), ClockStep::Progress(0.5));
}

#[test]
fn eased_progress_is_reported_but_raw_progress_is_stored() {
    let mut c = AnimClock::new(100.0, Ease::InQuad);
    c.step(0.0);
    assert_eq!(c.step(50.0), ClockStep::Progress(0.25));
    assert_eq!(c.progress(), 0.5);
}

#[test]
fn non_finite_duration_defaults_to_zero() {
    let mut c = AnimClock::new(f64::NAN, Ease::Linear);
    c.step(0.0);
    assert_eq!(c.step(0.0), ClockStep::Finished);
}
