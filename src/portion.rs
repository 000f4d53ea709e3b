//! Partitioning of an output volume's linear index space into portions.
//!
//! A portion is a contiguous run of linear voxel indices and is the unit of
//! parallel work during fusion. Portions produced here are ordered, never
//! overlap and cover `[0, total)` without gaps, which is what allows workers
//! to write the shared output buffer through disjoint slices.
//!
//! Linear indices use row-major order with `x` varying fastest:
//! `i = x + nx * (y + ny * z)`.

use crate::error::FusionError;
use serde::Serialize;
use std::ops::Range;

/// Smallest number of voxels worth a task of its own once the volume is large
/// enough to feed every worker.
pub const MIN_PORTION_VOXELS: usize = 64 * 64 * 64;

/// Contiguous slice `[start, start + len)` of the output's linear index space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Portion {
    start: usize,
    len: usize,
}

impl Portion {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last index covered by this portion.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Split `total` voxels into balanced portions for `parallelism` workers.
///
/// Volumes no larger than the worker count get one voxel per portion. Larger
/// volumes get `max(parallelism, total / MIN_PORTION_VOXELS)` portions whose
/// sizes differ by at most one voxel.
pub fn divide_into_portions(total: usize, parallelism: usize) -> Vec<Portion> {
    if total == 0 {
        return Vec::new();
    }
    let parallelism = parallelism.max(1);
    let count = if total <= parallelism {
        total
    } else {
        parallelism.max(total / MIN_PORTION_VOXELS)
    };

    let base = total / count;
    let remainder = total % count;
    let mut portions = Vec::with_capacity(count);
    let mut start = 0usize;
    for id in 0..count {
        let len = base + usize::from(id < remainder);
        portions.push(Portion::new(start, len));
        start += len;
    }
    debug_assert_eq!(start, total);
    portions
}

/// Check that `portions` are ordered and tile `[0, total)` exactly.
pub fn validate_partition(portions: &[Portion], total: usize) -> Result<(), FusionError> {
    let mut expected = 0usize;
    for portion in portions {
        if portion.start() != expected || portion.is_empty() {
            return Err(FusionError::InvalidPartition {
                total,
                at: expected,
            });
        }
        expected = portion.end();
    }
    if expected != total {
        return Err(FusionError::InvalidPartition {
            total,
            at: expected.min(total),
        });
    }
    Ok(())
}

/// Hand out one mutable slice per portion.
///
/// The portions must partition `data` (see [`validate_partition`]); the
/// returned slices are therefore pairwise disjoint.
pub fn split_by_portions<'a, T>(data: &'a mut [T], portions: &[Portion]) -> Vec<&'a mut [T]> {
    let mut chunks = Vec::with_capacity(portions.len());
    let mut rest = data;
    for portion in portions {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(portion.len());
        chunks.push(head);
        rest = tail;
    }
    chunks
}

/// Bijection between linear indices and `[x, y, z]` positions of a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelIndexer {
    dims: [usize; 3],
}

impl VoxelIndexer {
    pub fn new(dims: [usize; 3]) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of voxels addressed by this indexer.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn linear(&self, pos: [usize; 3]) -> usize {
        pos[0] + self.dims[0] * (pos[1] + self.dims[1] * pos[2])
    }

    #[inline]
    pub fn position(&self, index: usize) -> [usize; 3] {
        let [nx, ny, _] = self.dims;
        let x = index % nx;
        let yz = index / nx;
        [x, yz % ny, yz / ny]
    }

    /// Positions visited by `portion`, in linear order.
    pub fn positions(&self, portion: Portion) -> impl Iterator<Item = [usize; 3]> + '_ {
        portion.range().map(move |i| self.position(i))
    }
}
