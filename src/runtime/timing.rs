/// What the runtime should do with one host callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameTick {
    /// First callback: the timestamp baseline was recorded, nothing draws.
    Baseline,
    /// The gap since the previous callback was anomalous; it is absorbed into the skip offset
    /// and nothing draws or animates.
    Skipped,
    /// Arrived before the fps limit allows another frame; dropped.
    Throttled,
    /// Draw a frame.
    Draw {
        /// Skip-corrected time in milliseconds.
        time: f64,
        /// Seconds since the previous drawn frame, clamped.
        delta: f64,
    },
}

// Frames landing within this many ms of the fps interval still count as on time.
const THROTTLE_SLACK_MS: f64 = 0.5;

/// Turns raw host timestamps into skip-corrected frame times and clamped deltas.
#[derive(Clone, Debug)]
pub struct FrameTimer {
    max_delta: f64,
    skip_threshold_ms: f64,
    min_interval_ms: Option<f64>,
    last: Option<f64>,
    skip_offset: f64,
    drawn: u64,
}

impl FrameTimer {
    /// Timer with a delta cap (s), skip threshold (ms) and optional fps limit.
    pub fn new(max_delta: f64, skip_threshold_ms: f64, fps_limit: Option<f64>) -> Self {
        Self {
            max_delta,
            skip_threshold_ms,
            min_interval_ms: fps_limit
                .filter(|f| f.is_finite() && *f > 0.0)
                .map(|f| 1000.0 / f),
            last: None,
            skip_offset: 0.0,
            drawn: 0,
        }
    }

    /// Accumulated time removed from the raw clock by skip-recovery frames.
    pub fn skip_offset(&self) -> f64 {
        self.skip_offset
    }

    /// Number of [`FrameTick::Draw`] results so far.
    pub fn drawn(&self) -> u64 {
        self.drawn
    }

    /// Forget the baseline; the next callback starts over.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Classify the callback at raw timestamp `raw` (ms).
    pub fn tick(&mut self, raw: f64) -> FrameTick {
        let Some(last) = self.last else {
            self.last = Some(raw);
            return FrameTick::Baseline;
        };
        let gap = raw - last;
        if !gap.is_finite() || gap < 0.0 || gap > self.skip_threshold_ms {
            if gap.is_finite() {
                self.skip_offset += gap;
            }
            self.last = Some(raw);
            tracing::debug!(gap_ms = gap, offset_ms = self.skip_offset, "skip-recovery frame");
            return FrameTick::Skipped;
        }
        if let Some(min) = self.min_interval_ms
            && gap + THROTTLE_SLACK_MS < min
        {
            return FrameTick::Throttled;
        }
        self.last = Some(raw);
        self.drawn += 1;
        let delta = (gap / 1000.0).min(self.max_delta);
        let time = raw - self.skip_offset;
        tracing::trace!(time, delta, "frame tick");
        FrameTick::Draw { time, delta }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/timing.rs"]
mod tests;
