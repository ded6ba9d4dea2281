use crate::foundation::core::{Point, Vec2};
use crate::foundation::math::wrap_degrees;

/// Pointer buttons tracked by [`Pointer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Button {
    /// Left / primary.
    Primary,
    /// Wheel / middle.
    Middle,
    /// Right / secondary.
    Secondary,
    /// Browser back.
    Back,
    /// Browser forward.
    Forward,
}

impl Button {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Middle => 1,
            Self::Secondary => 2,
            Self::Back => 3,
            Self::Forward => 4,
        }
    }
}

/// Smoothing parameters for pointer speed and direction.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PointerOpts {
    /// Weight of the previous speed in the exponential average.
    pub speed_decay: f64,
    /// Smoothed speeds below this (px/s) snap to `0`.
    pub speed_snap: f64,
    /// Weight of the previous direction in the angular average.
    pub dir_decay: f64,
}

impl Default for PointerOpts {
    fn default() -> Self {
        Self {
            speed_decay: 0.85,
            speed_snap: 0.01,
            dir_decay: 0.6,
        }
    }
}

impl PointerOpts {
    /// Replace out-of-range values with defaults.
    pub fn sanitize(self) -> Self {
        let d = Self::default();
        let unit = |v: f64, fallback: f64| {
            if v.is_finite() && (0.0..=1.0).contains(&v) {
                v
            } else {
                fallback
            }
        };
        Self {
            speed_decay: unit(self.speed_decay, d.speed_decay),
            speed_snap: if self.speed_snap.is_finite() && self.speed_snap >= 0.0 {
                self.speed_snap
            } else {
                d.speed_snap
            },
            dir_decay: unit(self.dir_decay, d.dir_decay),
        }
    }
}

/// Normalized pointer state.
///
/// Positions are surface coordinates: the raw host position minus the surface offset.
/// `None` means the pointer is outside the surface (or never entered it).
#[derive(Clone, Debug, Default)]
pub struct Pointer {
    opts: PointerOpts,
    raw: Option<Point>,
    offset: Vec2,
    pos: Option<Point>,
    last_pos: Option<Point>,
    frame_pos: Option<Point>,
    buttons: [bool; Button::COUNT],
    speed: f64,
    dir: f64,
}

impl Pointer {
    /// Pointer with the given smoothing parameters.
    pub fn new(opts: PointerOpts) -> Self {
        Self {
            opts: opts.sanitize(),
            ..Self::default()
        }
    }

    /// Current surface position.
    pub fn pos(&self) -> Option<Point> {
        self.pos
    }

    /// Surface position before the latest move.
    pub fn last_pos(&self) -> Option<Point> {
        self.last_pos
    }

    /// Latest host position, without the surface offset.
    pub fn raw_pos(&self) -> Option<Point> {
        self.raw
    }

    /// Offset subtracted from raw positions.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Replace the surface offset and re-derive the surface position.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.pos = self.raw.map(|r| r - offset);
    }

    /// Return `true` while `button` is held.
    pub fn is_down(&self, button: Button) -> bool {
        self.buttons[button.index()]
    }

    /// Smoothed speed in px/s.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Smoothed direction of travel in degrees, `(-180, 180]`, `0` pointing along +x.
    pub fn dir(&self) -> f64 {
        self.dir
    }

    /// Record a host move. Returns the new surface position.
    pub(crate) fn move_to(&mut self, raw: Point) -> Point {
        self.last_pos = self.pos;
        self.raw = Some(raw);
        let pos = raw - self.offset;
        self.pos = Some(pos);
        pos
    }

    /// The pointer left the surface.
    pub(crate) fn leave(&mut self) {
        self.last_pos = self.pos;
        self.raw = None;
        self.pos = None;
        self.buttons = [false; Button::COUNT];
    }

    pub(crate) fn set_button(&mut self, button: Button, down: bool) -> bool {
        let slot = &mut self.buttons[button.index()];
        let changed = *slot != down;
        *slot = down;
        changed
    }

    /// Per-frame smoothing of speed and direction from the distance travelled since the last
    /// frame. `delta` is in seconds; non-positive deltas leave the state untouched.
    pub(crate) fn update_motion(&mut self, delta: f64) {
        if !(delta > 0.0 && delta.is_finite()) {
            return;
        }
        let travelled = match (self.frame_pos, self.pos) {
            (Some(a), Some(b)) => b - a,
            _ => Vec2::ZERO,
        };
        self.frame_pos = self.pos;

        let inst = travelled.hypot() / delta;
        let decay = self.opts.speed_decay;
        self.speed = self.speed * decay + inst * (1.0 - decay);
        if self.speed < self.opts.speed_snap {
            self.speed = 0.0;
        }

        if travelled != Vec2::ZERO {
            let target = travelled.y.atan2(travelled.x).to_degrees();
            let diff = wrap_degrees(target - self.dir);
            self.dir = wrap_degrees(self.dir + diff * (1.0 - self.opts.dir_decay));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/pointer.rs"]
mod tests;
