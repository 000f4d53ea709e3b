use crate::error::FusionError;
use std::f64::consts::PI;

/// Table resolution: entries cover ratios `0, 0.001, ..., 1.0`.
const LOOKUP_STEPS: usize = 1000;

/// Cosine ease-in from 0 at the coverage boundary to 1 at the blending range.
///
/// `weight(d) = (cos((1 - d/r)·π) + 1) / 2` for `d < r`, and `1` beyond. The
/// curve is tabulated once; ratios that round onto the zero entry but belong
/// to a covered voxel (`d > 0`) are evaluated exactly so they stay positive.
#[derive(Clone, Debug)]
pub struct BlendingCurve {
    range: f64,
    lookup: Vec<f64>,
}

impl BlendingCurve {
    pub fn new(range: f64) -> Result<Self, FusionError> {
        if !(range.is_finite() && range > 0.0) {
            return Err(FusionError::InvalidBlendingRange { range });
        }
        let lookup = (0..=LOOKUP_STEPS)
            .map(|i| cosine_falloff(i as f64 / LOOKUP_STEPS as f64))
            .collect();
        Ok(Self { range, lookup })
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    #[inline]
    pub fn weight(&self, distance: f64) -> f64 {
        let ratio = distance / self.range;
        if ratio >= 1.0 {
            return 1.0;
        }
        if ratio <= 0.0 {
            return 0.0;
        }
        let w = self.lookup[(ratio * LOOKUP_STEPS as f64).round() as usize];
        if w > 0.0 {
            w
        } else {
            cosine_falloff(ratio)
        }
    }
}

#[inline]
fn cosine_falloff(ratio: f64) -> f64 {
    (((1.0 - ratio) * PI).cos() + 1.0) / 2.0
}
