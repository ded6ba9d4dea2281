/// Convenience result type used across dotweave.
pub type DotweaveResult<T> = Result<T, DotweaveError>;

/// Top-level error taxonomy used by fallible engine APIs.
///
/// Most scene-level misconfiguration is defaulted rather than reported; these variants cover the
/// boundaries where defaulting is not possible (raster surfaces, config files, explicit tables).
#[derive(thiserror::Error, Debug)]
pub enum DotweaveError {
    /// Invalid user-provided data that cannot be defaulted.
    #[error("validation error: {0}")]
    Validation(String),

    /// Raster surface creation, resize or readback failures.
    #[error("raster error: {0}")]
    Raster(String),

    /// Errors while loading or parsing runtime configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Media source failures surfaced outside of the per-object error callback.
    #[error("media error: {0}")]
    Media(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DotweaveError {
    /// Build a [`DotweaveError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DotweaveError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`DotweaveError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`DotweaveError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
