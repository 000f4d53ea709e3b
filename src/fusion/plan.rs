//! Immutable description of one fusion run.
//!
//! [`FusionPlan`] carries the output geometry and resource choices shared by
//! the combiner and the memory estimator. [`FusionParams`] groups the numeric
//! knobs of the combiner itself. Both deserialize from JSON with defaults for
//! every omitted field.

use super::geometry::OutputGeometry;
use crate::error::FusionError;
use crate::volume::BoundingBox;
use serde::{Deserialize, Serialize};

/// Sample type of the fused volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    #[default]
    Float32,
    UInt16,
    UInt8,
}

impl PixelType {
    /// Map a selection index (0 = 32-bit float, 1 = 16-bit, 2 = 8-bit).
    pub fn from_index(index: usize) -> Result<Self, FusionError> {
        match index {
            0 => Ok(PixelType::Float32),
            1 => Ok(PixelType::UInt16),
            2 => Ok(PixelType::UInt8),
            _ => Err(FusionError::UnsupportedPixelType { index }),
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelType::Float32 => 4,
            PixelType::UInt16 => 2,
            PixelType::UInt8 => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PixelType::Float32 => "32-bit floating point",
            PixelType::UInt16 => "16-bit unsigned integer",
            PixelType::UInt8 => "8-bit unsigned integer",
        }
    }
}

/// How the fused volume is backed while it is produced and consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    /// Computed lazily on access.
    #[default]
    Virtual,
    /// Computed lazily with a bounded cache of finished blocks.
    Cached,
    /// Fully materialized before use.
    Precomputed,
}

impl CacheStrategy {
    pub fn from_index(index: usize) -> Result<Self, FusionError> {
        match index {
            0 => Ok(CacheStrategy::Virtual),
            1 => Ok(CacheStrategy::Cached),
            2 => Ok(CacheStrategy::Precomputed),
            _ => Err(FusionError::UnsupportedCacheStrategy { index }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionPlan {
    /// Output region in world coordinates (inclusive corners).
    pub bounding_box: BoundingBox,
    /// Isotropic output downsampling (1 = world resolution).
    pub downsampling: f64,
    pub pixel_type: PixelType,
    pub cache_strategy: CacheStrategy,
    /// Content-based weighting requested (costs one float field per input voxel).
    pub content_based: bool,
    /// Non-rigid correction requested (displacement-field overhead).
    pub non_rigid: bool,
    /// Keep the z-anisotropy of the acquisition instead of resampling isotropically.
    pub preserve_anisotropy: bool,
    /// z-spacing relative to xy, used when `preserve_anisotropy` is set.
    pub anisotropy_factor: f64,
}

impl Default for FusionPlan {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox::default(),
            downsampling: 1.0,
            pixel_type: PixelType::Float32,
            cache_strategy: CacheStrategy::Virtual,
            content_based: false,
            non_rigid: false,
            preserve_anisotropy: false,
            anisotropy_factor: 1.0,
        }
    }
}

impl FusionPlan {
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            ..Default::default()
        }
    }

    pub fn with_downsampling(mut self, downsampling: f64) -> Self {
        self.downsampling = downsampling;
        self
    }

    pub fn with_pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }

    pub fn with_cache_strategy(mut self, cache_strategy: CacheStrategy) -> Self {
        self.cache_strategy = cache_strategy;
        self
    }

    pub fn with_content_based(mut self, content_based: bool) -> Self {
        self.content_based = content_based;
        self
    }

    pub fn with_non_rigid(mut self, non_rigid: bool) -> Self {
        self.non_rigid = non_rigid;
        self
    }

    pub fn with_anisotropy(mut self, factor: f64) -> Self {
        self.preserve_anisotropy = true;
        self.anisotropy_factor = factor;
        self
    }

    /// z-scaling applied to the output grid (1 unless anisotropy is preserved).
    pub fn effective_anisotropy(&self) -> f64 {
        if self.preserve_anisotropy {
            self.anisotropy_factor
        } else {
            1.0
        }
    }

    pub fn validate(&self) -> Result<(), FusionError> {
        if self.bounding_box.is_empty() {
            return Err(FusionError::EmptyBoundingBox {
                min: self.bounding_box.min,
                max: self.bounding_box.max,
            });
        }
        if !(self.downsampling.is_finite() && self.downsampling > 0.0) {
            return Err(FusionError::InvalidDownsampling {
                downsampling: self.downsampling,
            });
        }
        if self.preserve_anisotropy
            && !(self.anisotropy_factor.is_finite() && self.anisotropy_factor > 0.0)
        {
            return Err(FusionError::InvalidAnisotropy {
                factor: self.anisotropy_factor,
            });
        }
        Ok(())
    }

    /// Validate the plan and derive the output voxel grid.
    pub fn output_geometry(&self) -> Result<OutputGeometry, FusionError> {
        self.validate()?;
        Ok(OutputGeometry::from_plan(self))
    }
}

/// Numeric parameters of the combiner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionParams {
    /// Distance (voxels) over which weights rise from 0 to 1.
    pub blending_range: f64,
    /// Worker threads; 0 uses one per available core.
    pub threads: usize,
    /// Detail weight below which the base view fills in.
    pub fallback_threshold: f64,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            blending_range: 40.0,
            threads: 0,
            fallback_threshold: super::fallback::DEFAULT_THRESHOLD,
        }
    }
}

impl FusionParams {
    pub fn validate(&self) -> Result<(), FusionError> {
        if !(self.blending_range.is_finite() && self.blending_range > 0.0) {
            return Err(FusionError::InvalidBlendingRange {
                range: self.blending_range,
            });
        }
        if !(self.fallback_threshold.is_finite() && self.fallback_threshold > 0.0) {
            return Err(FusionError::InvalidFallbackThreshold {
                threshold: self.fallback_threshold,
            });
        }
        Ok(())
    }
}
