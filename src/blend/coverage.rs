//! Coverage derived from an acquisition mask and the view's own content.
//!
//! Resampled views are padded with zeros wherever the camera saw nothing. A
//! voxel counts as covered when the mask (if any) allows it and either its
//! sample is non-zero or it is not embedded in padding. A voxel is embedded in
//! padding when, along at least one of the six axis directions, the next
//! `empty_run` samples are all zero (samples beyond the volume edge read as
//! zero).

use crate::error::FusionError;
use crate::volume::{Mask, Sample, Volume};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const DIRECTIONS: [(usize, isize); 6] = [(0, 1), (0, -1), (1, 1), (1, -1), (2, 1), (2, -1)];

pub fn content_coverage<T: Sample>(
    volume: &Volume<T>,
    mask: Option<&Mask>,
    empty_run: usize,
) -> Result<Mask, FusionError> {
    if let Some(mask) = mask {
        if !mask.same_shape(volume) {
            return Err(FusionError::ShapeMismatch {
                context: "coverage mask".to_string(),
                expected: volume.dims,
                found: mask.dims,
            });
        }
    }

    let mut out = Mask::new(volume.dims).with_origin(volume.origin);
    if out.is_empty() {
        return Ok(out);
    }
    let [nx, ny, _] = volume.dims;
    let plane = nx * ny;

    let fill_plane = |(z, slab): (usize, &mut [u8])| {
        for (i, dst) in slab.iter_mut().enumerate() {
            let pos = [i % nx, i / nx, z];
            let allowed = mask.map_or(true, |m| m.get(pos) != 0);
            let covered = allowed
                && (volume.get(pos).to_f64() != 0.0 || !embedded_in_padding(volume, pos, empty_run));
            *dst = u8::from(covered);
        }
    };

    #[cfg(feature = "parallel")]
    out.data.par_chunks_mut(plane).enumerate().for_each(fill_plane);
    #[cfg(not(feature = "parallel"))]
    out.data.chunks_mut(plane).enumerate().for_each(fill_plane);

    Ok(out)
}

fn embedded_in_padding<T: Sample>(volume: &Volume<T>, pos: [usize; 3], empty_run: usize) -> bool {
    DIRECTIONS.iter().any(|&(axis, step)| {
        (1..=empty_run as isize).all(|k| {
            let coord = pos[axis] as isize + step * k;
            if coord < 0 || coord as usize >= volume.dims[axis] {
                return true;
            }
            let mut probe = pos;
            probe[axis] = coord as usize;
            volume.get(probe).to_f64() == 0.0
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_padding_outside_content_is_uncovered() {
        // content occupies x in 2..6 of a 10-wide volume
        let mut vol = Volume::<u8>::new([10, 3, 3]);
        for z in 0..3 {
            for y in 0..3 {
                for x in 2..6 {
                    vol.set([x, y, z], 50);
                }
            }
        }
        let mask = content_coverage(&vol, None, 3).unwrap();
        assert_eq!(mask.get([3, 1, 1]), 1);
        assert_eq!(mask.get([9, 1, 1]), 0);
    }

    #[test]
    fn dark_voxels_inside_content_stay_covered() {
        let mut vol = Volume::<u16>::filled([9, 9, 9], 10);
        vol.set([4, 4, 4], 0);
        let mask = content_coverage(&vol, None, 2).unwrap();
        assert_eq!(mask.get([4, 4, 4]), 1);
    }

    #[test]
    fn mask_excludes_voxels() {
        let vol = Volume::<u8>::filled([4, 4, 4], 9);
        let mut acq = Mask::filled([4, 4, 4], 1);
        acq.set([0, 0, 0], 0);
        let mask = content_coverage(&vol, Some(&acq), 1).unwrap();
        assert_eq!(mask.get([0, 0, 0]), 0);
        assert_eq!(mask.get([1, 0, 0]), 1);
    }

    #[test]
    fn mask_shape_must_match() {
        let vol = Volume::<u8>::new([4, 4, 4]);
        let acq = Mask::new([4, 4, 3]);
        assert!(matches!(
            content_coverage(&vol, Some(&acq), 1),
            Err(FusionError::ShapeMismatch { .. })
        ));
    }
}
