//! Pre-flight memory estimate for a fusion plan.
//!
//! The estimate is the sum of three terms, all in MiB:
//! - input: pixels of the largest input group at the resolution that has to be
//!   loaded. Lazily streamed sources are capped at 90% of the memory budget.
//! - processing: one `f32` weight per input pixel when content-based weighting
//!   is requested.
//! - output: the fused volume, reduced for virtual or cached backing (only a
//!   fraction is alive at once) and scaled by 1.5 for non-rigid correction.
//!
//! Nothing here touches voxel data; callers use the result to pick a plan
//! (downsampling, pixel type, cache strategy) that fits before fusing.

use crate::error::FusionError;
use crate::fusion::{CacheStrategy, FusionPlan, OutputGeometry};
use serde::{Deserialize, Serialize};

pub const MIB: f64 = 1024.0 * 1024.0;

/// Share of the memory budget a streamed loader is expected to fill.
const VIRTUAL_INPUT_BUDGET_FRACTION: f64 = 0.9;
/// Multi-resolution sources are assumed to load data 1.5× finer than the output.
const MULTIRES_OVERSAMPLING: f64 = 1.5;
const WEIGHT_BYTES_PER_PIXEL: f64 = 4.0;
const NON_RIGID_OVERHEAD: f64 = 1.5;
const CACHE_EXPONENT: f64 = 0.3;

/// What the estimator needs to know about the source dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetProperties {
    pub input_bytes_per_pixel: usize,
    /// Pixel count of the largest group of inputs fused together.
    pub max_input_pixels: u64,
    /// Views contributing to the output region; informational, the input
    /// terms follow `max_input_pixels`.
    pub input_views: usize,
    /// Inputs are streamed on demand rather than held in memory.
    pub virtual_loader: bool,
    /// Inputs provide a resolution pyramid.
    pub multi_resolution: bool,
    /// Memory available to the process.
    pub memory_budget_bytes: u64,
}

impl Default for DatasetProperties {
    fn default() -> Self {
        Self {
            input_bytes_per_pixel: 2,
            max_input_pixels: 0,
            input_views: 0,
            virtual_loader: false,
            multi_resolution: false,
            memory_budget_bytes: 8 * 1024 * 1024 * 1024,
        }
    }
}

impl DatasetProperties {
    /// Derive the largest group size from per-view pixel counts grouped the
    /// way views are fused together (e.g. one group per channel or tile).
    pub fn with_input_groups(mut self, groups: &[Vec<u64>]) -> Self {
        self.max_input_pixels = groups
            .iter()
            .map(|g| g.iter().sum::<u64>())
            .max()
            .unwrap_or(0);
        self.input_views = groups.iter().map(Vec::len).sum();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemoryEstimate {
    pub output_dims: [usize; 3],
    pub output_pixels: u128,
    pub input_views: usize,
    /// Fused volume size before backing-strategy adjustment.
    pub fused_mb: f64,
    pub input_mb: f64,
    pub processing_mb: f64,
    pub output_mb: f64,
    pub total_mb: f64,
}

impl MemoryEstimate {
    /// `"Fused image: X MB, required total memory ~Y MB"`.
    pub fn summary(&self) -> String {
        format!(
            "Fused image: {:.0} MB, required total memory ~{:.0} MB",
            self.fused_mb, self.total_mb
        )
    }

    /// `"N views, largest group X MB"` for the input side of the estimate.
    pub fn input_summary(&self) -> String {
        format!(
            "{} views, largest group {:.0} MB",
            self.input_views, self.input_mb
        )
    }

    /// Whether the estimate fits into `budget_bytes`.
    pub fn fits(&self, budget_bytes: u64) -> bool {
        self.total_mb <= budget_bytes as f64 / MIB
    }
}

pub fn estimate_memory(
    plan: &FusionPlan,
    dataset: &DatasetProperties,
) -> Result<MemoryEstimate, FusionError> {
    let geometry = plan.output_geometry()?;
    Ok(estimate_for_geometry(plan, &geometry, dataset))
}

fn estimate_for_geometry(
    plan: &FusionPlan,
    geometry: &OutputGeometry,
    dataset: &DatasetProperties,
) -> MemoryEstimate {
    let output_pixels = geometry.pixel_count();
    let fused_mb = output_pixels as f64 * plan.pixel_type.bytes_per_pixel() as f64 / MIB;

    let input_mb = input_term_mb(plan, dataset);
    let processing_mb = processing_term_mb(plan, dataset);
    let output_mb = output_term_mb(fused_mb, plan.cache_strategy, plan.non_rigid);

    MemoryEstimate {
        output_dims: geometry.dims,
        output_pixels,
        input_views: dataset.input_views,
        fused_mb,
        input_mb,
        processing_mb,
        output_mb,
        total_mb: input_mb + processing_mb + output_mb,
    }
}

fn input_downsampling(plan: &FusionPlan, dataset: &DatasetProperties) -> f64 {
    if dataset.multi_resolution {
        plan.downsampling / MULTIRES_OVERSAMPLING
    } else {
        1.0
    }
}

/// Memory for the input data that has to be resident during fusion.
pub fn input_term_mb(plan: &FusionPlan, dataset: &DatasetProperties) -> f64 {
    let pixels = dataset.max_input_pixels as f64 / input_downsampling(plan, dataset);
    let full_mb = pixels / MIB * dataset.input_bytes_per_pixel as f64;
    if dataset.virtual_loader {
        let budget_mb = dataset.memory_budget_bytes as f64 / MIB;
        full_mb.min(VIRTUAL_INPUT_BUDGET_FRACTION * budget_mb)
    } else {
        full_mb
    }
}

/// Intermediate weight fields for content-based weighting.
pub fn processing_term_mb(plan: &FusionPlan, dataset: &DatasetProperties) -> f64 {
    if !plan.content_based {
        return 0.0;
    }
    let pixels = if dataset.multi_resolution {
        dataset.max_input_pixels as f64
    } else {
        dataset.max_input_pixels as f64 / input_downsampling(plan, dataset)
    };
    pixels / MIB * WEIGHT_BYTES_PER_PIXEL
}

/// Resident share of a fused volume of `fused_mb` under `strategy`.
pub fn output_term_mb(fused_mb: f64, strategy: CacheStrategy, non_rigid: bool) -> f64 {
    let divisor = fused_mb.powf(CACHE_EXPONENT).round().max(1.0);
    let resident = match strategy {
        CacheStrategy::Virtual => fused_mb / divisor,
        CacheStrategy::Cached => 2.0 * (fused_mb / divisor).round(),
        CacheStrategy::Precomputed => fused_mb,
    };
    if non_rigid {
        resident * NON_RIGID_OVERHEAD
    } else {
        resident
    }
}
