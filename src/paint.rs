//! Renderable paint sources.
//!
//! A [`Paint`] is what scene objects hold; a [`ResolvedPaint`] is what the raster layer consumes.
//! Resolution is where anchored gradients pick up the current geometry of the object they follow.

pub(crate) mod gradient;
pub(crate) mod pattern;

use std::sync::Arc;

use crate::foundation::core::{ObjId, Rect, Rgba8};
use crate::paint::gradient::{Gradient, ResolvedGradient};
use crate::paint::pattern::Pattern;

/// Geometry lookup used when resolving paints anchored to other objects.
pub trait BoundsLookup {
    /// Current bounds of object `id`, if it is known.
    fn bounds_of(&self, id: ObjId) -> Option<Rect>;
}

/// Lookup that knows no objects. Anchored paints fall back to the owner's bounds.
pub struct NoBounds;

impl BoundsLookup for NoBounds {
    fn bounds_of(&self, _id: ObjId) -> Option<Rect> {
        None
    }
}

/// A renderable paint source.
#[derive(Clone, Debug)]
pub enum Paint {
    /// Solid color.
    Solid(Rgba8),
    /// Linear, radial or conic gradient.
    Gradient(Gradient),
    /// Repeated image.
    Pattern(Pattern),
}

impl Default for Paint {
    fn default() -> Self {
        Self::Solid(Rgba8::WHITE)
    }
}

impl From<Rgba8> for Paint {
    fn from(c: Rgba8) -> Self {
        Self::Solid(c)
    }
}

impl From<Gradient> for Paint {
    fn from(g: Gradient) -> Self {
        Self::Gradient(g)
    }
}

impl From<Pattern> for Paint {
    fn from(p: Pattern) -> Self {
        Self::Pattern(p)
    }
}

impl Paint {
    /// Resolve to a raster-ready value.
    ///
    /// `owner_bounds` are the bounds of the object being painted; anchored gradients use them (or
    /// the bounds of their anchor object found through `lookup`).
    pub fn resolve(&mut self, owner_bounds: Rect, lookup: &dyn BoundsLookup) -> ResolvedPaint {
        match self {
            Self::Solid(c) => ResolvedPaint::Solid(*c),
            Self::Gradient(g) => ResolvedPaint::Gradient(g.resolve(owner_bounds, lookup)),
            Self::Pattern(p) => ResolvedPaint::Pattern(p.clone()),
        }
    }

    /// Solid color, if this is one.
    pub fn solid(&self) -> Option<Rgba8> {
        match self {
            Self::Solid(c) => Some(*c),
            _ => None,
        }
    }
}

/// Raster-ready paint value.
#[derive(Clone, Debug)]
pub enum ResolvedPaint {
    /// Solid color.
    Solid(Rgba8),
    /// Gradient in absolute surface coordinates.
    Gradient(Arc<ResolvedGradient>),
    /// Image pattern.
    Pattern(Pattern),
}

impl Default for ResolvedPaint {
    fn default() -> Self {
        Self::Solid(Rgba8::WHITE)
    }
}

impl ResolvedPaint {
    /// Append a compact signature of this paint to `out`.
    ///
    /// Two paints with equal signatures render identically, which is what style batching relies on.
    pub fn write_key(&self, out: &mut String) {
        use std::fmt::Write as _;
        match self {
            Self::Solid(c) => {
                let _ = write!(out, "s{},{},{},{}", c.r, c.g, c.b, c.a);
            }
            Self::Gradient(g) => {
                out.push('g');
                out.push_str(g.key());
            }
            Self::Pattern(p) => {
                let _ = write!(out, "p{:x}:{:?}", p.image().content_hash(), p.repeat());
            }
        }
    }

    /// Return `true` when the paint cannot produce visible pixels.
    pub fn is_transparent(&self) -> bool {
        match self {
            Self::Solid(c) => c.a == 0,
            Self::Gradient(g) => g.stops().iter().all(|s| s.color.a == 0),
            Self::Pattern(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/paint/paint.rs"]
mod tests;
