use std::time::{Duration, Instant};

/// Source of frame timestamps for [`crate::Runtime::run`].
pub trait FrameClock {
    /// Wait for the next refresh (if the clock paces) and return its timestamp in ms.
    fn next_frame(&mut self) -> f64;
}

/// Synthetic timestamps `0, step, 2*step, ...`; never sleeps.
#[derive(Clone, Debug)]
pub struct FixedStepClock {
    next: f64,
    step_ms: f64,
}

impl FixedStepClock {
    /// Clock advancing `step_ms` per frame. Non-positive steps fall back to 60 Hz.
    pub fn new(step_ms: f64) -> Self {
        Self {
            next: 0.0,
            step_ms: if step_ms.is_finite() && step_ms > 0.0 {
                step_ms
            } else {
                1000.0 / 60.0
            },
        }
    }

    /// Jump the next timestamp forward by `ms`, simulating a stalled host.
    pub fn stall(&mut self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            self.next += ms;
        }
    }
}

impl FrameClock for FixedStepClock {
    fn next_frame(&mut self) -> f64 {
        let t = self.next;
        self.next += self.step_ms;
        t
    }
}

/// Wall-clock timestamps paced to a target refresh rate.
#[derive(Clone, Debug)]
pub struct RealtimeClock {
    origin: Option<Instant>,
    interval: Duration,
    deadline: Option<Instant>,
}

impl RealtimeClock {
    /// Clock ticking at `hz`. Non-positive rates fall back to 60 Hz.
    pub fn new(hz: f64) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 60.0 };
        Self {
            origin: None,
            interval: Duration::from_secs_f64(1.0 / hz),
            deadline: None,
        }
    }
}

impl FrameClock for RealtimeClock {
    fn next_frame(&mut self) -> f64 {
        let now = Instant::now();
        let origin = *self.origin.get_or_insert(now);
        if let Some(deadline) = self.deadline
            && deadline > now
        {
            std::thread::sleep(deadline - now);
        }
        let now = Instant::now();
        self.deadline = Some(now + self.interval);
        now.duration_since(origin).as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/clock.rs"]
mod tests;
