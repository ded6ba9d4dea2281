//! Retained scene objects.
//!
//! Every object owns an [`object::ObjectCore`] (position, transform, paint, anchor) and implements
//! [`drawable::Drawable`]. Containers own their children directly: a [`shape::Shape`] owns its
//! dots, a [`filled::FilledShape`] and a [`grid::Grid`] own a shape.

pub(crate) mod dot;
pub(crate) mod drawable;
pub(crate) mod filled;
pub mod fx;
pub(crate) mod grid;
pub(crate) mod image_display;
pub(crate) mod object;
pub(crate) mod shape;
pub(crate) mod symbols;
