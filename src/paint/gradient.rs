use std::fmt::Write as _;
use std::sync::Arc;

use crate::foundation::core::{ObjId, Point, Rect, Rgba8};
use crate::paint::BoundsLookup;

/// One gradient color stop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorStop {
    /// Offset along the gradient in `[0, 1]`.
    pub offset: f64,
    /// Stop color.
    pub color: Rgba8,
}

/// Gradient geometry.
///
/// Coordinates are absolute surface coordinates for [`GradientAnchor::Absolute`] gradients and
/// fractions of the anchor bounds otherwise (`(0, 0)` top-left, `(1, 1)` bottom-right; radii are
/// fractions of the larger half-extent).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum GradientKind {
    /// Linear gradient between two points.
    Linear {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
    },
    /// Radial gradient around a center.
    Radial {
        /// Center point.
        center: Point,
        /// Outer radius.
        radius: f64,
    },
    /// Conic (sweep) gradient around a center.
    Conic {
        /// Center point.
        center: Point,
        /// Start angle in degrees.
        start_deg: f64,
    },
}

/// What a gradient's coordinates are relative to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradientAnchor {
    /// Static, absolute coordinates. Resolved once.
    #[default]
    Absolute,
    /// Relative to the painted object's bounds; follows it as it moves or resizes.
    Owner,
    /// Relative to another object's bounds.
    Object(ObjId),
}

/// A gradient paint with optional anchoring.
#[derive(Clone, Debug)]
pub struct Gradient {
    kind: GradientKind,
    stops: Vec<ColorStop>,
    anchor: GradientAnchor,
    cache: Option<(Rect, Arc<ResolvedGradient>)>,
}

impl Gradient {
    /// Linear gradient from `start` to `end`.
    pub fn linear(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Self::new(GradientKind::Linear {
            start: start.into(),
            end: end.into(),
        })
    }

    /// Radial gradient.
    pub fn radial(center: impl Into<Point>, radius: f64) -> Self {
        Self::new(GradientKind::Radial {
            center: center.into(),
            radius: radius.max(0.0),
        })
    }

    /// Conic gradient.
    pub fn conic(center: impl Into<Point>, start_deg: f64) -> Self {
        Self::new(GradientKind::Conic {
            center: center.into(),
            start_deg,
        })
    }

    fn new(kind: GradientKind) -> Self {
        Self {
            kind,
            stops: Vec::new(),
            anchor: GradientAnchor::Absolute,
            cache: None,
        }
    }

    /// Append a color stop. Offsets are clamped to `[0, 1]` and kept sorted.
    pub fn stop(mut self, offset: f64, color: Rgba8) -> Self {
        let offset = if offset.is_finite() {
            offset.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
        self.cache = None;
        self
    }

    /// Make coordinates relative to the painted object's bounds.
    pub fn anchored_to_owner(mut self) -> Self {
        self.anchor = GradientAnchor::Owner;
        self.cache = None;
        self
    }

    /// Make coordinates relative to another object's bounds.
    pub fn anchored_to(mut self, id: ObjId) -> Self {
        self.anchor = GradientAnchor::Object(id);
        self.cache = None;
        self
    }

    /// Gradient geometry.
    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    /// Color stops, sorted by offset.
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Anchoring mode.
    pub fn anchor(&self) -> GradientAnchor {
        self.anchor
    }

    /// Return `true` when the gradient follows an object's geometry.
    pub fn is_dynamic(&self) -> bool {
        self.anchor != GradientAnchor::Absolute
    }

    /// Resolve into absolute coordinates, reusing the cached value while the anchor is unchanged.
    pub fn resolve(&mut self, owner_bounds: Rect, lookup: &dyn BoundsLookup) -> Arc<ResolvedGradient> {
        let frame = match self.anchor {
            GradientAnchor::Absolute => Rect::ZERO,
            GradientAnchor::Owner => owner_bounds,
            GradientAnchor::Object(id) => lookup.bounds_of(id).unwrap_or(owner_bounds),
        };
        if let Some((cached_frame, resolved)) = &self.cache
            && *cached_frame == frame
        {
            return resolved.clone();
        }

        let kind = match self.anchor {
            GradientAnchor::Absolute => self.kind,
            _ => relative_to(self.kind, frame),
        };
        let resolved = Arc::new(ResolvedGradient::new(kind, self.stops.clone()));
        self.cache = Some((frame, resolved.clone()));
        resolved
    }
}

fn relative_to(kind: GradientKind, frame: Rect) -> GradientKind {
    let map = |p: Point| {
        Point::new(
            frame.x0 + p.x * frame.width(),
            frame.y0 + p.y * frame.height(),
        )
    };
    let half_extent = frame.width().max(frame.height()) / 2.0;
    match kind {
        GradientKind::Linear { start, end } => GradientKind::Linear {
            start: map(start),
            end: map(end),
        },
        GradientKind::Radial { center, radius } => GradientKind::Radial {
            center: map(center),
            radius: radius * half_extent,
        },
        GradientKind::Conic { center, start_deg } => GradientKind::Conic {
            center: map(center),
            start_deg,
        },
    }
}

/// Gradient in absolute surface coordinates, with its cache key.
#[derive(Debug, PartialEq)]
pub struct ResolvedGradient {
    kind: GradientKind,
    stops: Vec<ColorStop>,
    key: String,
}

impl ResolvedGradient {
    fn new(kind: GradientKind, stops: Vec<ColorStop>) -> Self {
        let mut key = String::new();
        match kind {
            GradientKind::Linear { start, end } => {
                let _ = write!(key, "l{},{},{},{}", start.x, start.y, end.x, end.y);
            }
            GradientKind::Radial { center, radius } => {
                let _ = write!(key, "r{},{},{}", center.x, center.y, radius);
            }
            GradientKind::Conic { center, start_deg } => {
                let _ = write!(key, "c{},{},{}", center.x, center.y, start_deg);
            }
        }
        for s in &stops {
            let c = s.color;
            let _ = write!(key, "|{}:{},{},{},{}", s.offset, c.r, c.g, c.b, c.a);
        }
        Self { kind, stops, key }
    }

    /// Absolute geometry.
    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    /// Color stops, sorted by offset.
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Internal cache key. Not a stable format.
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/gradient.rs"]
mod tests;
