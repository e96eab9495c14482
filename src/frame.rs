//! Frame-level decode: validation, stream decompression, run-length
//! expansion, and plane unfiltering, in that order. Each stage returns a
//! typed error and later stages never run after a failure, so a corrupt
//! stream can never leave partial pixels in a caller's buffer.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use crate::delta;
use crate::error::HgxError;
use crate::limits::{Limits, MAX_PIXEL_BYTES};
use crate::rle;

/// Pixel geometry of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel, 1–4.
    pub depth_bytes: u32,
    /// Row length in bytes, including any alignment padding.
    pub stride: u32,
}

impl FrameGeometry {
    /// Geometry with the container's row alignment:
    /// `stride = (width * depth_bytes + 3) & !3`.
    pub fn with_aligned_stride(width: u32, height: u32, depth_bytes: u32) -> Self {
        let stride = width.saturating_mul(depth_bytes).saturating_add(3) & !3;
        Self {
            width,
            height,
            depth_bytes,
            stride,
        }
    }

    /// Total image bytes, `stride * height`.
    pub fn image_bytes(&self) -> usize {
        self.stride as usize * self.height as usize
    }

    pub(crate) fn validate(&self, limits: &Limits) -> Result<(), HgxError> {
        if self.width == 0 || self.height == 0 {
            return Err(HgxError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(1..=4).contains(&self.depth_bytes) {
            return Err(HgxError::InvalidDepthBytes(self.depth_bytes));
        }
        if u64::from(self.stride) < u64::from(self.width) * u64::from(self.depth_bytes) {
            return Err(HgxError::InvalidHeader(alloc::format!(
                "stride {} shorter than row of {} {}-byte pixels",
                self.stride,
                self.width,
                self.depth_bytes
            )));
        }
        if u64::from(self.stride) * u64::from(self.height) > MAX_PIXEL_BYTES as u64 {
            return Err(HgxError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        limits.check(self.width, self.height)?;
        limits.check_memory(self.image_bytes())?;
        Ok(())
    }
}

/// Decode a frame from already-decompressed data and command streams into
/// a caller-provided, zero-initialized buffer.
///
/// `out` must hold both the expanded intermediate length (declared inside
/// the command stream) and the `stride * height` image region; on success
/// the image occupies `out[..geometry.image_bytes()]` and the number of
/// bytes the expansion produced is returned. On error `out` is untouched.
pub fn decode_frame_raw_into(
    data: &[u8],
    cmd: &[u8],
    out: &mut [u8],
    geometry: FrameGeometry,
    limits: &Limits,
    stop: &dyn Stop,
) -> Result<usize, HgxError> {
    if out.len() > MAX_PIXEL_BYTES {
        return Err(HgxError::DimensionsTooLarge {
            width: geometry.width,
            height: geometry.height,
        });
    }
    geometry.validate(limits)?;

    let unrle = rle::expand(data, cmd, limits, stop)?;
    if out.len() < unrle.len() {
        return Err(HgxError::BufferTooSmall {
            needed: unrle.len(),
            actual: out.len(),
        });
    }

    delta::unfilter(
        &unrle,
        out,
        geometry.height,
        geometry.depth_bytes,
        geometry.stride,
        stop,
    )?;
    Ok(unrle.len())
}

/// Decode a frame from already-decompressed data and command streams,
/// allocating the output buffer.
pub fn decode_frame_raw(
    data: &[u8],
    cmd: &[u8],
    geometry: FrameGeometry,
    limits: &Limits,
    stop: &dyn Stop,
) -> Result<Vec<u8>, HgxError> {
    geometry.validate(limits)?;

    let unrle = rle::expand(data, cmd, limits, stop)?;
    let image_bytes = geometry.image_bytes();
    if image_bytes < unrle.len() {
        return Err(HgxError::BufferTooSmall {
            needed: unrle.len(),
            actual: image_bytes,
        });
    }

    let mut out = vec![0u8; image_bytes];
    delta::unfilter(
        &unrle,
        &mut out,
        geometry.height,
        geometry.depth_bytes,
        geometry.stride,
        stop,
    )?;
    Ok(out)
}

/// One zlib-compressed stream plus the decompressed length its header
/// declared for it.
#[cfg(feature = "zlib")]
#[derive(Clone, Copy, Debug)]
pub struct CompressedStream<'a> {
    pub bytes: &'a [u8],
    pub raw_len: usize,
}

#[cfg(feature = "zlib")]
pub(crate) fn decompress(
    stream: CompressedStream<'_>,
    limits: &Limits,
) -> Result<Vec<u8>, HgxError> {
    use std::io::Read;

    if stream.raw_len > MAX_PIXEL_BYTES {
        return Err(HgxError::CorruptStream("declared raw length too large"));
    }
    limits.check_memory(stream.raw_len)?;

    let mut out = Vec::with_capacity(stream.raw_len);
    let decoder = flate2::bufread::ZlibDecoder::new(stream.bytes);
    decoder
        .take(stream.raw_len as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|_| HgxError::CorruptStream("zlib stream is corrupt"))?;
    if out.len() != stream.raw_len {
        return Err(HgxError::CorruptStream("decompressed length mismatch"));
    }
    Ok(out)
}

/// Decode a frame from its two zlib-compressed streams, allocating the
/// output buffer.
#[cfg(feature = "zlib")]
pub fn decode_frame(
    data: CompressedStream<'_>,
    cmd: CompressedStream<'_>,
    geometry: FrameGeometry,
    limits: &Limits,
    stop: &dyn Stop,
) -> Result<Vec<u8>, HgxError> {
    geometry.validate(limits)?;
    let raw_data = decompress(data, limits)?;
    stop.check()?;
    let raw_cmd = decompress(cmd, limits)?;
    decode_frame_raw(&raw_data, &raw_cmd, geometry, limits, stop)
}

/// Decode a frame from its two zlib-compressed streams into a
/// caller-provided, zero-initialized buffer. Returns the expanded
/// intermediate length.
#[cfg(feature = "zlib")]
pub fn decode_frame_into(
    data: CompressedStream<'_>,
    cmd: CompressedStream<'_>,
    out: &mut [u8],
    geometry: FrameGeometry,
    limits: &Limits,
    stop: &dyn Stop,
) -> Result<usize, HgxError> {
    geometry.validate(limits)?;
    let raw_data = decompress(data, limits)?;
    stop.check()?;
    let raw_cmd = decompress(cmd, limits)?;
    decode_frame_raw_into(&raw_data, &raw_cmd, out, geometry, limits, stop)
}
