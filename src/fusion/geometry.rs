//! Output voxel grid derived from a plan's bounding box.
//!
//! - Per-axis dimensions are `round(extent / downsampling)` with
//!   `extent = max - min + 1`, never less than one voxel.
//! - With anisotropy preserved, the z corners are first rescaled to
//!   `floor(min / f)` and `ceil(max / f)`, and output slices are `f` world
//!   units apart (times the downsampling).
//! - Output voxel `idx` samples world position `grid_min + idx ⊙ step`,
//!   rounded to the nearest world voxel.

use super::plan::FusionPlan;
use nalgebra::Vector3;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutputGeometry {
    pub dims: [usize; 3],
    /// World position of output voxel `[0, 0, 0]`.
    pub grid_min: Vector3<f64>,
    /// World distance between neighbouring output voxels along each axis.
    pub step: Vector3<f64>,
}

impl OutputGeometry {
    /// Geometry of a plan that already passed [`FusionPlan::validate`].
    pub fn from_plan(plan: &FusionPlan) -> Self {
        let bb = plan.bounding_box;
        let ds = plan.downsampling;
        let aniso = plan.effective_anisotropy();

        let mut min = Vector3::new(bb.min[0] as f64, bb.min[1] as f64, bb.min[2] as f64);
        let mut max = Vector3::new(bb.max[0] as f64, bb.max[1] as f64, bb.max[2] as f64);
        if plan.preserve_anisotropy {
            min.z = (min.z / aniso).floor();
            max.z = (max.z / aniso).ceil();
        }

        let extent = max - min + Vector3::repeat(1.0);
        let mut dims = [0usize; 3];
        for d in 0..3 {
            dims[d] = ((extent[d] / ds).round() as usize).max(1);
        }

        Self {
            dims,
            grid_min: Vector3::new(min.x, min.y, min.z * aniso),
            step: Vector3::new(ds, ds, ds * aniso),
        }
    }

    /// Voxel count of a grid known to fit in memory (see [`Self::checked_num_voxels`]).
    pub fn num_voxels(&self) -> usize {
        self.dims.iter().product()
    }

    /// Voxel count, `None` when it does not fit in `usize`.
    pub fn checked_num_voxels(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Voxel count without overflow, for sizing plans that may be infeasible.
    pub fn pixel_count(&self) -> u128 {
        self.dims.iter().map(|&d| d as u128).product()
    }

    /// Nearest world voxel sampled by output voxel `idx`.
    #[inline]
    pub fn world_position(&self, idx: [usize; 3]) -> [i64; 3] {
        let p = self.grid_min
            + Vector3::new(idx[0] as f64, idx[1] as f64, idx[2] as f64).component_mul(&self.step);
        [p.x.round() as i64, p.y.round() as i64, p.z.round() as i64]
    }

    /// Human-readable size, e.g. `"100 x 100 x 50 pixels"`.
    pub fn dimensions_label(&self) -> String {
        format!("{} x {} x {} pixels", self.dims[0], self.dims[1], self.dims[2])
    }
}
