use serde::{Deserialize, Serialize};

/// Integer box in world coordinates with inclusive `min` and `max` corners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [i64; 3],
    pub max: [i64; 3],
}

impl BoundingBox {
    pub fn new(min: [i64; 3], max: [i64; 3]) -> Self {
        Self { min, max }
    }

    /// Box covering `dims` voxels starting at `origin`.
    pub fn from_origin_dims(origin: [i64; 3], dims: [usize; 3]) -> Self {
        let mut max = [0i64; 3];
        for d in 0..3 {
            max[d] = origin[d] + dims[d] as i64 - 1;
        }
        Self { min: origin, max }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|d| self.max[d] < self.min[d])
    }

    /// Number of voxels along each axis (`max - min + 1`, zero when inverted).
    pub fn extent(&self) -> [u64; 3] {
        let mut out = [0u64; 3];
        for d in 0..3 {
            let span = self.max[d] as i128 - self.min[d] as i128 + 1;
            out[d] = span.clamp(0, u64::MAX as i128) as u64;
        }
        out
    }

    /// Voxel count, saturating at `u128::MAX`.
    pub fn num_voxels(&self) -> u128 {
        self.extent()
            .iter()
            .fold(1u128, |acc, &e| acc.saturating_mul(e as u128))
    }

    #[inline]
    pub fn contains(&self, p: [i64; 3]) -> bool {
        (0..3).all(|d| p[d] >= self.min[d] && p[d] <= self.max[d])
    }

    /// Smallest box enclosing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        for d in 0..3 {
            out.min[d] = out.min[d].min(other.min[d]);
            out.max[d] = out.max[d].max(other.max[d]);
        }
        out
    }

    /// Overlap of both boxes, `None` when they are disjoint.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let mut out = *self;
        for d in 0..3 {
            out.min[d] = out.min[d].max(other.min[d]);
            out.max[d] = out.max[d].min(other.max[d]);
        }
        (!out.is_empty()).then_some(out)
    }
}
