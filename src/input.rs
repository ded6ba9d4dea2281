//! Pointer state and pointer listeners.

pub(crate) mod listeners;
pub(crate) mod pointer;
