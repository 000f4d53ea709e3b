//! Resolution fallback between a base view and detail views.
//!
//! The base view (typically low resolution but covering everything) only
//! contributes where the detail views are not trusted: when their summed
//! weight at a voxel is below the threshold `T`, the base receives
//! `T - sum`, otherwise nothing. This keeps the total weight at least `T`
//! wherever the base covers the voxel.

use crate::error::FusionError;

pub const DEFAULT_THRESHOLD: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolutionFallback {
    threshold: f64,
}

impl Default for ResolutionFallback {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ResolutionFallback {
    pub fn new(threshold: f64) -> Result<Self, FusionError> {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(FusionError::InvalidFallbackThreshold { threshold });
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Synthesized base weight given the summed detail weight at a voxel.
    #[inline]
    pub fn base_weight(&self, detail_weight: f64) -> f64 {
        if detail_weight < self.threshold {
            self.threshold - detail_weight
        } else {
            0.0
        }
    }
}
