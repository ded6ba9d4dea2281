//! Frame loop, timing and object registry.

pub(crate) mod clock;
pub(crate) mod opts;
pub(crate) mod registry;
#[allow(clippy::module_inception)]
pub(crate) mod runtime;
pub(crate) mod timing;
