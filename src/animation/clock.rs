use crate::animation::ease::Ease;

/// Outcome of advancing an [`AnimClock`] to a timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockStep {
    /// First sample: the start time was latched and no animation step happens.
    Latched,
    /// Running sample carrying eased progress.
    Progress(f64),
    /// An infinite clock completed a cycle; callers sample progress `1` and the clock restarts.
    Cycle,
    /// A finite clock completed; callers sample progress `1` and run end handlers.
    Finished,
    /// The clock already finished earlier; nothing to do.
    Idle,
}

/// Time-progress generator with easing and repeat semantics.
///
/// Durations are in milliseconds. A negative duration repeats forever with period `|duration|`.
#[derive(Clone, Debug)]
pub struct AnimClock {
    duration_ms: f64,
    ease: Ease,
    start_time: Option<f64>,
    progress: f64,
    play_count: u32,
    finished: bool,
}

impl AnimClock {
    /// Create a pending clock. Non-finite durations are treated as `0`.
    pub fn new(duration_ms: f64, ease: Ease) -> Self {
        Self {
            duration_ms: if duration_ms.is_finite() {
                duration_ms
            } else {
                0.0
            },
            ease,
            start_time: None,
            progress: 0.0,
            play_count: 0,
            finished: false,
        }
    }

    /// Signed duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Return `true` when the clock repeats forever.
    pub fn is_infinite(&self) -> bool {
        self.duration_ms < 0.0
    }

    /// Return `true` when no start time has been latched yet.
    pub fn is_pending(&self) -> bool {
        self.start_time.is_none() && !self.finished
    }

    /// Return `true` once a finite clock completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pre-easing progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Number of completed cycles.
    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    /// Easing curve applied to progress.
    pub fn ease(&self) -> Ease {
        self.ease
    }

    /// Restart from the pending state, keeping the play count.
    pub fn reset(&mut self) {
        self.start_time = None;
        self.progress = 0.0;
        self.finished = false;
    }

    /// Advance to `time` (milliseconds).
    pub fn step(&mut self, time: f64) -> ClockStep {
        if self.finished {
            return ClockStep::Idle;
        }
        let Some(start) = self.start_time else {
            self.start_time = Some(time);
            self.progress = 0.0;
            return ClockStep::Latched;
        };

        let period = self.duration_ms.abs();
        let elapsed = (time - start).max(0.0);
        if elapsed < period {
            self.progress = elapsed / period;
            return ClockStep::Progress(self.ease.apply(self.progress));
        }

        self.play_count = self.play_count.saturating_add(1);
        if self.is_infinite() {
            self.start_time = None;
            self.progress = 0.0;
            ClockStep::Cycle
        } else {
            self.progress = 1.0;
            self.finished = true;
            ClockStep::Finished
        }
    }

    /// Force completion of a finite or infinite clock.
    pub(crate) fn finish_now(&mut self) {
        self.progress = 1.0;
        self.finished = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clock.rs"]
mod tests;
