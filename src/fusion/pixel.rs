use super::plan::PixelType;
use crate::volume::{Sample, Volume, VolumeView};

/// Sample type the combiner can write.
///
/// `Default` is the background value used where no view contributes.
pub trait OutputPixel: Sample {
    const PIXEL_TYPE: PixelType;

    /// Convert a normalized fused value, rounding and clamping integer types.
    fn from_fused(value: f64) -> Self;

    fn into_fused(volume: Volume<Self>) -> FusedVolume;
}

impl OutputPixel for f32 {
    const PIXEL_TYPE: PixelType = PixelType::Float32;

    #[inline]
    fn from_fused(value: f64) -> Self {
        value as f32
    }

    fn into_fused(volume: Volume<Self>) -> FusedVolume {
        FusedVolume::Float32(volume)
    }
}

impl OutputPixel for u16 {
    const PIXEL_TYPE: PixelType = PixelType::UInt16;

    #[inline]
    fn from_fused(value: f64) -> Self {
        value.round().clamp(0.0, u16::MAX as f64) as u16
    }

    fn into_fused(volume: Volume<Self>) -> FusedVolume {
        FusedVolume::UInt16(volume)
    }
}

impl OutputPixel for u8 {
    const PIXEL_TYPE: PixelType = PixelType::UInt8;

    #[inline]
    fn from_fused(value: f64) -> Self {
        value.round().clamp(0.0, u8::MAX as f64) as u8
    }

    fn into_fused(volume: Volume<Self>) -> FusedVolume {
        FusedVolume::UInt8(volume)
    }
}

/// Fused output in the pixel type requested by the plan.
#[derive(Clone, Debug, PartialEq)]
pub enum FusedVolume {
    Float32(Volume<f32>),
    UInt16(Volume<u16>),
    UInt8(Volume<u8>),
}

impl FusedVolume {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            FusedVolume::Float32(_) => PixelType::Float32,
            FusedVolume::UInt16(_) => PixelType::UInt16,
            FusedVolume::UInt8(_) => PixelType::UInt8,
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.as_view().dims()
    }

    pub fn as_view(&self) -> &dyn VolumeView {
        match self {
            FusedVolume::Float32(v) => v,
            FusedVolume::UInt16(v) => v,
            FusedVolume::UInt8(v) => v,
        }
    }

    /// Voxel value as `f64`.
    pub fn value(&self, pos: [usize; 3]) -> f64 {
        match self {
            FusedVolume::Float32(v) => v.get(pos).to_f64(),
            FusedVolume::UInt16(v) => v.get(pos).to_f64(),
            FusedVolume::UInt8(v) => v.get(pos).to_f64(),
        }
    }

    pub fn as_f32(&self) -> Option<&Volume<f32>> {
        match self {
            FusedVolume::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&Volume<u16>> {
        match self {
            FusedVolume::UInt16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<&Volume<u8>> {
        match self {
            FusedVolume::UInt8(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_types_round_and_clamp() {
        assert_eq!(u16::from_fused(12.5), 13);
        assert_eq!(u16::from_fused(-4.0), 0);
        assert_eq!(u16::from_fused(70_000.0), u16::MAX);
        assert_eq!(u8::from_fused(254.6), 255);
        assert_eq!(u8::from_fused(300.0), 255);
    }

    #[test]
    fn float_keeps_value() {
        assert_eq!(f32::from_fused(0.125), 0.125);
    }

    #[test]
    fn fused_volume_reports_type_and_value() {
        let mut vol = Volume::<u16>::new([2, 2, 2]);
        vol.set([1, 1, 1], 9);
        let fused = FusedVolume::UInt16(vol);
        assert_eq!(fused.pixel_type(), PixelType::UInt16);
        assert_eq!(fused.dims(), [2, 2, 2]);
        assert_eq!(fused.value([1, 1, 1]), 9.0);
        assert!(fused.as_f32().is_none());
    }
}
