//! Error types raised by weight generation, fusion and memory estimation.
//!
//! Configuration problems are reported before any voxel is touched. Worker
//! failures carry the portion that was being processed together with the
//! sample error raised by the input volume.

use crate::portion::Portion;

/// Failure while reading a sample from an input volume.
///
/// In-memory volumes never produce this; lazily loaded sources use it to
/// surface I/O or decoding problems from inside a worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleError {
    pub message: String,
}

impl SampleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SampleError {}

/// Reasons why a fusion run or an estimate is rejected or aborted.
#[derive(Clone, Debug, PartialEq)]
pub enum FusionError {
    InvalidBlendingRange {
        range: f64,
    },
    InvalidFallbackThreshold {
        threshold: f64,
    },
    EmptyBoundingBox {
        min: [i64; 3],
        max: [i64; 3],
    },
    InvalidDownsampling {
        downsampling: f64,
    },
    InvalidAnisotropy {
        factor: f64,
    },
    UnsupportedPixelType {
        index: usize,
    },
    UnsupportedCacheStrategy {
        index: usize,
    },
    OutputTooLarge {
        dims: [usize; 3],
    },
    BufferLength {
        expected: usize,
        found: usize,
    },
    ShapeMismatch {
        context: String,
        expected: [usize; 3],
        found: [usize; 3],
    },
    NoInputs,
    MultipleBaseInputs {
        first: usize,
        second: usize,
    },
    InvalidPartition {
        total: usize,
        at: usize,
    },
    ThreadPool {
        message: String,
    },
    Worker {
        portion: Portion,
        source: SampleError,
    },
}

impl std::fmt::Display for FusionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FusionError::InvalidBlendingRange { range } => {
                write!(f, "blending range must be positive and finite (got {range})")
            }
            FusionError::InvalidFallbackThreshold { threshold } => write!(
                f,
                "fallback threshold must be positive and finite (got {threshold})"
            ),
            FusionError::EmptyBoundingBox { min, max } => {
                write!(f, "bounding box is empty (min={min:?}, max={max:?})")
            }
            FusionError::InvalidDownsampling { downsampling } => {
                write!(f, "downsampling must be positive and finite (got {downsampling})")
            }
            FusionError::InvalidAnisotropy { factor } => {
                write!(f, "anisotropy factor must be positive and finite (got {factor})")
            }
            FusionError::UnsupportedPixelType { index } => {
                write!(f, "unsupported pixel type index {index}")
            }
            FusionError::UnsupportedCacheStrategy { index } => {
                write!(f, "unsupported cache strategy index {index}")
            }
            FusionError::OutputTooLarge { dims } => {
                write!(f, "output grid {dims:?} has more voxels than can be addressed")
            }
            FusionError::BufferLength { expected, found } => {
                write!(f, "buffer holds {found} samples, shape requires {expected}")
            }
            FusionError::ShapeMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "{context}: shape {found:?} does not match volume shape {expected:?}"
            ),
            FusionError::NoInputs => f.write_str("fusion requires at least one input volume"),
            FusionError::MultipleBaseInputs { first, second } => write!(
                f,
                "only one base input is allowed (inputs {first} and {second} are both base)"
            ),
            FusionError::InvalidPartition { total, at } => write!(
                f,
                "portions do not partition [0, {total}) (first mismatch at index {at})"
            ),
            FusionError::ThreadPool { message } => {
                write!(f, "failed to build worker pool: {message}")
            }
            FusionError::Worker { portion, source } => write!(
                f,
                "portion [{}, {}) failed: {source}",
                portion.start(),
                portion.end()
            ),
        }
    }
}

impl std::error::Error for FusionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FusionError::Worker { source, .. } => Some(source),
            _ => None,
        }
    }
}
