#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod blend;
pub mod diagnostics;
pub mod error;
pub mod estimate;
pub mod fusion;
pub mod volume;

// Scheduling and tool configuration.
pub mod config;
pub mod portion;

// --- High-level re-exports -------------------------------------------------

// Main entry points: weights, fusion, estimate.
pub use crate::blend::{weights_for_volume, weights_from_mask, WeightField};
pub use crate::error::{FusionError, SampleError};
pub use crate::estimate::{estimate_memory, DatasetProperties, MemoryEstimate};
pub use crate::fusion::{
    fuse, FusedVolume, FusionInput, FusionParams, FusionPlan, FusionResult, Fuser, PixelType,
};

// Run reports returned alongside the fused volume.
pub use crate::diagnostics::FusionReport;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use view_fusion::prelude::*;
///
/// # fn main() -> Result<(), FusionError> {
/// let low = Volume::<u16>::filled([64, 64, 64], 100);
/// let high = Volume::<u16>::filled([32, 64, 64], 400).with_origin([16, 0, 0]);
/// let high_weights = weights_for_volume(&high, None, 8.0)?;
///
/// let plan = FusionPlan::new(low.bounds()).with_pixel_type(PixelType::UInt16);
/// let inputs = vec![
///     FusionInput::base(&low),
///     FusionInput::detail(&high, Some(&high_weights)),
/// ];
/// let result = fuse(plan, FusionParams::default(), inputs)?;
/// println!("covered={} elapsed_ms={:.3}", result.report.covered_voxels, result.report.elapsed_ms);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::volume::{BoundingBox, Mask, Volume, VolumeView};
    pub use crate::{
        fuse, weights_for_volume, FusionError, FusionInput, FusionParams, FusionPlan, PixelType,
    };
}
