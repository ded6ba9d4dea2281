//! Dotweave is a retained-mode 2D scene graph and animation runtime for generative dot effects.
//!
//! A [`Runtime`] owns a set of [`Drawable`] objects and draws them once per frame through a
//! batching [`Render`] façade onto a [`RasterContext`]:
//!
//! - [`Dot`]s grouped in [`Shape`]s react to a proximity ratio through per-dot effect callbacks
//! - [`FilledShape`] fills the outline of its dots, [`Grid`] spells text with a [`Symbols`] table
//! - [`CpuSurface`] rasterizes with `vello_cpu`; [`RecordingContext`] records calls headlessly
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod animation;
/// Pointer state and listeners.
pub mod input;
/// Media-source contract.
pub mod media;
pub(crate) mod paint;
/// Raster abstraction and batching renderer.
pub mod render;
/// Frame loop and registry.
pub mod runtime;
/// Scene objects.
pub mod scene;

pub use crate::foundation::core::{Affine, BezPath, IdGen, Lerp, ObjId, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{DotweaveError, DotweaveResult};

pub use crate::animation::anim::{Anim, AnimFrame, AnimQueue, AnimStatus, Animated};
pub use crate::animation::clock::{AnimClock, ClockStep};
pub use crate::animation::ease::Ease;

pub use crate::paint::gradient::{ColorStop, Gradient, GradientAnchor, GradientKind};
pub use crate::paint::pattern::{ImageData, Pattern, Repeat};
pub use crate::paint::{BoundsLookup, NoBounds, Paint, ResolvedPaint};

pub use crate::render::FrameRGBA;
pub use crate::render::batch::{Render, RenderStats};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::raster::{
    CompositeMode, LineCap, LineJoin, LineStyle, RasterContext, VisualEffects,
};
pub use crate::render::recording::{OpLog, RasterOp, RecordingContext};

pub use crate::scene::dot::{DEFAULT_RADIUS, Dot};
pub use crate::scene::drawable::{DrawCtx, Drawable, Placement, Placements, SceneCtx};
pub use crate::scene::filled::FilledShape;
pub use crate::scene::grid::{CharGroup, DEFAULT_GAP, Grid, GridDiff};
pub use crate::scene::image_display::ImageDisplay;
pub use crate::scene::object::{
    ActivationMargin, Motion, ObjectCore, ParentRef, PosDecl, SceneObject,
};
pub use crate::scene::shape::{
    DEFAULT_LIMIT, DotEffectFn, DotPlacement, DotSample, DotsDecl, RatioTarget, Shape,
    ShapeFrame, ShapeSetupFn,
};
pub use crate::scene::symbols::{Links, SymbolDot, Symbols};

pub use crate::input::listeners::{
    HitMode, HitRegion, HitTest, ListenerId, ListenerTarget, Listeners, PointerEvent,
    PointerEventKind,
};
pub use crate::input::pointer::{Button, Pointer, PointerOpts};

pub use crate::media::{
    ImageSequence, MediaErrorKind, MediaHandle, MediaPoll, MediaSource, SharedSource, StillImage,
};

pub use crate::runtime::clock::{FixedStepClock, FrameClock, RealtimeClock};
pub use crate::runtime::opts::RuntimeOpts;
pub use crate::runtime::registry::Registry;
pub use crate::runtime::runtime::{LoopHandle, Runtime};
pub use crate::runtime::timing::{FrameTick, FrameTimer};

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
