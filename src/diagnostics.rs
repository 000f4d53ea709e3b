//! Serializable run reports for tools and logs.
use crate::fusion::{OutputGeometry, PixelType};
use crate::volume::Mask;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct FusionReport {
    pub output_dims: [usize; 3],
    pub pixel_type: PixelType,
    pub portions: usize,
    pub workers: usize,
    /// Voxels where at least one view contributed.
    pub covered_voxels: usize,
    /// Voxels left at the background value.
    pub background_voxels: usize,
    pub elapsed_ms: f64,
}

impl FusionReport {
    pub fn coverage_fraction(&self) -> f64 {
        let total = self.covered_voxels + self.background_voxels;
        if total == 0 {
            0.0
        } else {
            self.covered_voxels as f64 / total as f64
        }
    }
}

/// Summary of one view's weight field.
#[derive(Clone, Debug, Serialize)]
pub struct WeightFieldReport {
    pub view: usize,
    pub dims: [usize; 3],
    pub origin: [i64; 3],
    pub covered_voxels: usize,
    pub mean_weight: f64,
    pub elapsed_ms: f64,
}

impl WeightFieldReport {
    pub fn new(view: usize, mask: &Mask, weights: &[f32], origin: [i64; 3], elapsed_ms: f64) -> Self {
        let covered_voxels = mask.data.iter().filter(|&&m| m != 0).count();
        let mean_weight = if weights.is_empty() {
            0.0
        } else {
            weights.iter().map(|&w| w as f64).sum::<f64>() / weights.len() as f64
        };
        Self {
            view,
            dims: mask.dims,
            origin,
            covered_voxels,
            mean_weight,
            elapsed_ms,
        }
    }
}

/// Everything written by the fusion demo.
#[derive(Clone, Debug, Serialize)]
pub struct FusionDemoReport {
    pub geometry: OutputGeometry,
    pub weights: Vec<WeightFieldReport>,
    pub fusion: FusionReport,
}
