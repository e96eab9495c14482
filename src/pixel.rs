/// Pixel memory layout of a decoded HG-X frame.
///
/// HG-X stores channels in Windows bitmap order, so multi-channel frames
/// come out as BGR/BGRA, not RGB.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3 channels, 8-bit BGR.
    Bgr8,
    /// 4 channels, 8-bit BGRA.
    Bgra8,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Bgr8 => 3,
            Self::Bgra8 => 4,
        }
    }

    /// Layout for a depth given in bits, as stored in HG-X headers. Only
    /// the 24- and 32-bit depths ever occur in standard frames.
    #[cfg(feature = "zlib")]
    pub(crate) fn from_depth_bits(depth_bits: u32) -> Option<Self> {
        match depth_bits {
            24 => Some(Self::Bgr8),
            32 => Some(Self::Bgra8),
            _ => None,
        }
    }
}
