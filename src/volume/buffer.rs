//! Owned 3-D voxel buffer in row-major layout (`x` fastest, then `y`, `z`).
//!
//! Used for input views held in memory, masks, distance and weight fields and
//! for the fused output. The origin places voxel `[0, 0, 0]` in the common
//! world frame shared by all views of a dataset.
use super::BoundingBox;
use crate::error::FusionError;
use crate::portion::VoxelIndexer;

#[derive(Clone, Debug, PartialEq)]
pub struct Volume<T> {
    /// Voxels along x, y and z
    pub dims: [usize; 3],
    /// World coordinate of voxel `[0, 0, 0]`
    pub origin: [i64; 3],
    /// Backing storage in row-major order
    pub data: Vec<T>,
}

/// Binary coverage indicator; non-zero marks voxels the acquisition covers.
pub type Mask = Volume<u8>;

impl<T: Copy + Default> Volume<T> {
    /// Construct a default-initialized buffer at the world origin.
    pub fn new(dims: [usize; 3]) -> Self {
        Self::filled(dims, T::default())
    }
}

impl<T: Copy> Volume<T> {
    pub fn filled(dims: [usize; 3], value: T) -> Self {
        Self {
            dims,
            origin: [0; 3],
            data: vec![value; dims.iter().product()],
        }
    }

    /// Wrap existing samples, checking that their count matches `dims`.
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Result<Self, FusionError> {
        let expected: usize = dims.iter().product();
        if data.len() != expected {
            return Err(FusionError::BufferLength {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            dims,
            origin: [0; 3],
            data,
        })
    }

    pub fn with_origin(mut self, origin: [i64; 3]) -> Self {
        self.origin = origin;
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn indexer(&self) -> VoxelIndexer {
        VoxelIndexer::new(self.dims)
    }

    #[inline]
    pub fn idx(&self, pos: [usize; 3]) -> usize {
        pos[0] + self.dims[0] * (pos[1] + self.dims[1] * pos[2])
    }

    #[inline]
    pub fn get(&self, pos: [usize; 3]) -> T {
        self.data[self.idx(pos)]
    }

    #[inline]
    pub fn set(&mut self, pos: [usize; 3], v: T) {
        let i = self.idx(pos);
        self.data[i] = v;
    }

    /// World-space box covered by this volume.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_origin_dims(self.origin, self.dims)
    }

    /// The `z`-th xy-plane.
    pub fn slice_z(&self, z: usize) -> &[T] {
        let plane = self.dims[0] * self.dims[1];
        &self.data[z * plane..(z + 1) * plane]
    }

    pub fn same_shape<U>(&self, other: &Volume<U>) -> bool {
        self.dims == other.dims
    }

    /// Apply `f` voxel-wise, keeping shape and origin.
    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> Volume<U> {
        Volume {
            dims: self.dims,
            origin: self.origin,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}
