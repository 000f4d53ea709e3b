//! Exact L1 (taxicab) distance transform of a coverage mask.
//!
//! Every covered voxel receives the L1 distance to the nearest uncovered voxel;
//! uncovered voxels hold 0. Positions just outside the volume count as
//! uncovered, so a covered voxel on the volume edge has distance 1.
//!
//! The L1 metric is separable: one forward and one backward sweep per axis
//! (x, then y, then z) yields the exact result. The x and y sweeps stay within
//! one z-plane and run plane-parallel when the `parallel` feature is enabled.

use crate::volume::{Mask, Volume};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-voxel taxicab distance to the nearest uncovered voxel.
pub type DistanceField = Volume<u32>;

const UNREACHED: u32 = u32::MAX;

pub fn distance_transform(mask: &Mask) -> DistanceField {
    let mut field = mask.map(|m| if m != 0 { UNREACHED } else { 0 });
    if field.is_empty() {
        return field;
    }
    let [nx, ny, nz] = field.dims;
    let plane = nx * ny;

    #[cfg(feature = "parallel")]
    field
        .data
        .par_chunks_mut(plane)
        .for_each(|slab| sweep_plane(slab, nx, ny));
    #[cfg(not(feature = "parallel"))]
    field
        .data
        .chunks_mut(plane)
        .for_each(|slab| sweep_plane(slab, nx, ny));

    for xy in 0..plane {
        sweep(&mut field.data, xy, plane, nz);
    }
    field
}

fn sweep_plane(slab: &mut [u32], nx: usize, ny: usize) {
    for y in 0..ny {
        sweep(slab, y * nx, 1, nx);
    }
    for x in 0..nx {
        sweep(slab, x, nx, ny);
    }
}

/// 1-D min-plus pass over `len` samples starting at `start` with `stride`.
fn sweep(data: &mut [u32], start: usize, stride: usize, len: usize) {
    // the voxel before the first sample lies outside the volume
    let mut prev = 0u32;
    for k in 0..len {
        let i = start + k * stride;
        let v = data[i].min(prev.saturating_add(1));
        data[i] = v;
        prev = v;
    }
    prev = 0;
    for k in (0..len).rev() {
        let i = start + k * stride;
        let v = data[i].min(prev.saturating_add(1));
        data[i] = v;
        prev = v;
    }
}
