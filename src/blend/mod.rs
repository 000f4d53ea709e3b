//! Per-view blending weights derived from coverage.
//!
//! Pipeline
//! - Coverage: a binary mask per view, either supplied by the acquisition or
//!   derived from content (see [`coverage::content_coverage`]). Missing masks
//!   mean the whole view is covered.
//! - Distance: exact taxicab distance of each covered voxel to the nearest
//!   uncovered one ([`distance::distance_transform`]).
//! - Weight: the distance is mapped through a cosine falloff
//!   ([`curve::BlendingCurve`]) so weights rise smoothly from 0 at the
//!   coverage boundary to 1 at the blending range.
//!
//! Weight fields always have exactly the shape and origin of their view.

pub mod coverage;
pub mod curve;
pub mod distance;

pub use coverage::content_coverage;
pub use curve::BlendingCurve;
pub use distance::{distance_transform, DistanceField};

use crate::error::FusionError;
use crate::volume::{Mask, Volume, VolumeView};
use log::debug;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-voxel fusion confidence in `[0, 1]`.
pub type WeightField = Volume<f32>;

/// Map a distance field through the blending curve.
pub fn weights_from_distance(distance: &DistanceField, curve: &BlendingCurve) -> WeightField {
    let mut out = WeightField::new(distance.dims).with_origin(distance.origin);

    #[cfg(feature = "parallel")]
    out.data
        .par_iter_mut()
        .zip(distance.data.par_iter())
        .for_each(|(w, &d)| *w = curve.weight(d as f64) as f32);
    #[cfg(not(feature = "parallel"))]
    out.data
        .iter_mut()
        .zip(distance.data.iter())
        .for_each(|(w, &d)| *w = curve.weight(d as f64) as f32);

    out
}

/// Validate `range`, then blend `distance` into a weight field.
pub fn blend_weights(distance: &DistanceField, range: f64) -> Result<WeightField, FusionError> {
    let curve = BlendingCurve::new(range)?;
    Ok(weights_from_distance(distance, &curve))
}

/// Distance transform followed by blending.
pub fn weights_from_mask(mask: &Mask, range: f64) -> Result<WeightField, FusionError> {
    let curve = BlendingCurve::new(range)?;
    let start = Instant::now();
    let distance = distance_transform(mask);
    let weights = weights_from_distance(&distance, &curve);
    debug!(
        "blend weights {:?} range={} elapsed_ms={:.3}",
        mask.dims,
        range,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(weights)
}

/// Weight field for `volume`, treating a missing mask as full coverage.
pub fn weights_for_volume(
    volume: &dyn VolumeView,
    mask: Option<&Mask>,
    range: f64,
) -> Result<WeightField, FusionError> {
    let dims = volume.dims();
    match mask {
        Some(mask) if mask.dims != dims => Err(FusionError::ShapeMismatch {
            context: "coverage mask".to_string(),
            expected: dims,
            found: mask.dims,
        }),
        Some(mask) => {
            let mut weights = weights_from_mask(mask, range)?;
            weights.origin = volume.origin();
            Ok(weights)
        }
        None => {
            let full = Mask::filled(dims, 1).with_origin(volume.origin());
            weights_from_mask(&full, range)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_share_shape_and_origin() {
        let vol = Volume::<u16>::new([6, 5, 4]).with_origin([3, 2, 1]);
        let weights = weights_for_volume(&vol, None, 2.0).unwrap();
        assert_eq!(weights.dims, vol.dims);
        assert_eq!(weights.origin, vol.origin);
    }

    #[test]
    fn interior_is_fully_trusted_and_edges_fade() {
        let mask = Mask::filled([11, 11, 11], 1);
        let weights = weights_from_mask(&mask, 3.0).unwrap();
        assert_eq!(weights.get([5, 5, 5]), 1.0);
        let edge = weights.get([0, 5, 5]);
        assert!(edge > 0.0 && edge < 1.0, "edge weight {edge}");
    }

    #[test]
    fn uncovered_voxels_get_zero_weight() {
        let mut mask = Mask::filled([5, 5, 5], 1);
        mask.set([2, 2, 2], 0);
        let weights = weights_from_mask(&mask, 4.0).unwrap();
        assert_eq!(weights.get([2, 2, 2]), 0.0);
    }

    #[test]
    fn invalid_range_is_rejected_before_work() {
        let mask = Mask::filled([2, 2, 2], 1);
        assert_eq!(
            weights_from_mask(&mask, 0.0).unwrap_err(),
            FusionError::InvalidBlendingRange { range: 0.0 }
        );
    }

    #[test]
    fn mismatched_mask_is_rejected() {
        let vol = Volume::<u8>::new([4, 4, 4]);
        let mask = Mask::filled([4, 4, 5], 1);
        assert!(matches!(
            weights_for_volume(&vol, Some(&mask), 2.0),
            Err(FusionError::ShapeMismatch { .. })
        ));
    }
}
