use super::{BoundingBox, Volume};
use crate::error::SampleError;

/// Numeric voxel type that can be read as `f64`.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(impl Sample for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_sample!(u8, u16, u32, f32, f64);

/// Read-only, position-indexed access to an input volume.
///
/// Positions passed to [`VolumeView::sample`] are local (relative to
/// [`VolumeView::origin`]) and always inside [`VolumeView::dims`]. Sources
/// that load lazily may fail; in-memory volumes never do.
pub trait VolumeView: Sync {
    fn dims(&self) -> [usize; 3];

    /// World coordinate of local voxel `[0, 0, 0]`.
    fn origin(&self) -> [i64; 3];

    fn sample(&self, pos: [usize; 3]) -> Result<f64, SampleError>;

    fn bounds(&self) -> BoundingBox {
        BoundingBox::from_origin_dims(self.origin(), self.dims())
    }

    /// Local position of world voxel `world`, `None` when outside the volume.
    #[inline]
    fn local_position(&self, world: [i64; 3]) -> Option<[usize; 3]> {
        let dims = self.dims();
        let origin = self.origin();
        let mut local = [0usize; 3];
        for d in 0..3 {
            let offset = world[d] - origin[d];
            if offset < 0 || offset as usize >= dims[d] {
                return None;
            }
            local[d] = offset as usize;
        }
        Some(local)
    }
}

impl<T: Sample> VolumeView for Volume<T> {
    #[inline]
    fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    fn origin(&self) -> [i64; 3] {
        self.origin
    }

    #[inline]
    fn sample(&self, pos: [usize; 3]) -> Result<f64, SampleError> {
        Ok(self.get(pos).to_f64())
    }
}
