use serde::Deserialize;

use crate::foundation::error::{FxgError, FxgResult};

/// Options for [`crate::FxgTranscoder`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TranscodeOpts {
    /// Maximum distance, in pixels, between a curve and the quadratic edges approximating it.
    pub curve_tolerance_px: f64,
}

impl Default for TranscodeOpts {
    fn default() -> Self {
        Self {
            curve_tolerance_px: 0.05,
        }
    }
}

impl TranscodeOpts {
    /// Return options with a different curve flattening tolerance.
    pub fn with_curve_tolerance_px(mut self, tolerance: f64) -> Self {
        self.curve_tolerance_px = tolerance;
        self
    }

    pub(crate) fn validate(&self) -> FxgResult<()> {
        if !self.curve_tolerance_px.is_finite() || self.curve_tolerance_px <= 0.0 {
            return Err(FxgError::validation(format!(
                "curve_tolerance_px must be finite and > 0, got {}",
                self.curve_tolerance_px
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcode/opts.rs"]
mod tests;
