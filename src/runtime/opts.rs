use std::path::Path;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{DotweaveError, DotweaveResult};
use crate::input::listeners::HitMode;
use crate::input::pointer::PointerOpts;

/// Runtime configuration.
///
/// Every field has a default; out-of-range values are replaced by their default in
/// [`RuntimeOpts::sanitize`] instead of being rejected.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RuntimeOpts {
    /// Upper bound for frame delta, in seconds.
    pub max_delta_time: f64,
    /// A callback arriving this many ms later than expected is a skip-recovery frame.
    pub skip_threshold_ms: f64,
    /// Drop frames arriving sooner than `1000 / fps_limit` ms after the last drawn one.
    pub fps_limit: Option<f64>,
    /// When enter/leave listeners are evaluated.
    pub hit_mode: HitMode,
    /// Color the surface is cleared to each frame; `None` clears to transparent.
    pub clear_color: Option<Rgba8>,
    /// Opacity at or below which fills are skipped.
    pub visibility_threshold: f64,
    /// Activation margin in pixels for objects without their own.
    pub default_activation_margin: f64,
    /// Pointer smoothing.
    pub pointer: PointerOpts,
}

impl Default for RuntimeOpts {
    fn default() -> Self {
        Self {
            max_delta_time: 0.13,
            skip_threshold_ms: 250.0,
            fps_limit: None,
            hit_mode: HitMode::Optimized,
            clear_color: None,
            visibility_threshold: 0.01,
            default_activation_margin: 50.0,
            pointer: PointerOpts::default(),
        }
    }
}

impl RuntimeOpts {
    /// Parse JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> DotweaveResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| DotweaveError::config(format!("parse runtime options: {e}")))?;
        Ok(opts.sanitize())
    }

    /// Read and parse a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> DotweaveResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| {
            DotweaveError::config(format!("read runtime options '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    /// Apply `DOTWEAVE_MAX_DELTA_TIME`, `DOTWEAVE_FPS_LIMIT` and `DOTWEAVE_SKIP_THRESHOLD_MS`.
    /// Unparseable or non-positive values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str| {
            get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
        };
        if let Some(v) = positive("DOTWEAVE_MAX_DELTA_TIME") {
            self.max_delta_time = v;
        }
        if let Some(v) = positive("DOTWEAVE_FPS_LIMIT") {
            self.fps_limit = Some(v);
        }
        if let Some(v) = positive("DOTWEAVE_SKIP_THRESHOLD_MS") {
            self.skip_threshold_ms = v;
        }
        self
    }

    /// Replace non-finite or negative values with defaults.
    pub fn sanitize(mut self) -> Self {
        let d = Self::default();
        let positive = |v: f64, fallback: f64| {
            if v.is_finite() && v > 0.0 { v } else { fallback }
        };
        self.max_delta_time = positive(self.max_delta_time, d.max_delta_time);
        self.skip_threshold_ms = positive(self.skip_threshold_ms, d.skip_threshold_ms);
        self.fps_limit = self.fps_limit.filter(|v| v.is_finite() && *v > 0.0);
        self.visibility_threshold = if self.visibility_threshold.is_finite() {
            self.visibility_threshold.clamp(0.0, 1.0)
        } else {
            d.visibility_threshold
        };
        self.default_activation_margin = if self.default_activation_margin.is_finite()
            && self.default_activation_margin >= 0.0
        {
            self.default_activation_margin
        } else {
            d.default_activation_margin
        };
        self.pointer = self.pointer.sanitize();
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/opts.rs"]
mod tests;
