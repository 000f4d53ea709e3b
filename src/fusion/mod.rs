//! Weighted fusion of co-registered views into one output volume.
//!
//! Purpose
//! - Combine overlapping views of different resolution so that seams vanish
//!   and the sharpest data dominates wherever it is trusted.
//!
//! Design
//! - [`FusionPlan`] fixes the output geometry and pixel type; together with
//!   [`FusionParams`] it is immutable for the duration of a run.
//! - [`Fuser`] validates plan, parameters and inputs up front, then runs one
//!   task per [`Portion`](crate::portion::Portion) on a fixed-size pool.
//! - The base view (if any) is blended in through [`ResolutionFallback`].
//!
//! Notes
//! - Inputs are sampled with nearest-neighbour lookup in the world frame.
//! - Output arithmetic per voxel does not depend on scheduling, so repeated
//!   runs are bit-identical for any worker count.

pub mod combiner;
pub mod fallback;
pub mod geometry;
pub mod pixel;
pub mod plan;

pub use combiner::{fuse, FusionInput, FusionProgress, FusionResult, Fuser, InputRole, ProgressFn};
pub use fallback::ResolutionFallback;
pub use geometry::OutputGeometry;
pub use pixel::{FusedVolume, OutputPixel};
pub use plan::{CacheStrategy, FusionParams, FusionPlan, PixelType};
