//! HG-2/HG-3 container parsing and whole-file decoding.
//!
//! Both containers start with a 12-byte header (`"HG-2"` or `"HG-3"`
//! signature, header size, type field) followed by a chain of frame
//! records. HG-2 chains fixed-layout image structs; HG-3 chains frames of
//! 16-byte tags (`stdinfo`, `img####`, `img_al`, `img_jpg`, ...). Every
//! offset and length is untrusted and range-checked before use.

mod hg2;
mod hg3;

use alloc::vec::Vec;
use core::ops::Range;

use crate::error::HgxError;
use crate::info::HgxFormat;

#[cfg(feature = "zlib")]
use enough::Stop;

#[cfg(feature = "zlib")]
use crate::limits::Limits;

#[cfg(feature = "zlib")]
use crate::frame::{CompressedStream, FrameGeometry, decode_frame};
#[cfg(feature = "zlib")]
use crate::pixel::PixelLayout;

// ── Byte cursor ─────────────────────────────────────────────────────

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn set_position(&mut self, pos: usize) -> Result<(), HgxError> {
        if pos > self.data.len() {
            return Err(HgxError::UnexpectedEof);
        }
        self.pos = pos;
        Ok(())
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32, HgxError> {
        let bytes: [u8; 4] = self
            .data
            .get(self.pos..self.pos + 4)
            .and_then(|s| s.try_into().ok())
            .ok_or(HgxError::UnexpectedEof)?;
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], HgxError> {
        let bytes: [u8; N] = self
            .data
            .get(self.pos..self.pos + N)
            .and_then(|s| s.try_into().ok())
            .ok_or(HgxError::UnexpectedEof)?;
        self.pos += N;
        Ok(bytes)
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<(), HgxError> {
        let new_pos = self.pos.checked_add(n).ok_or(HgxError::UnexpectedEof)?;
        self.set_position(new_pos)
    }

    /// Range of `n` bytes at the current position, advancing past it.
    pub(crate) fn range(&mut self, n: usize) -> Result<Range<usize>, HgxError> {
        let start = self.pos;
        self.skip(n)?;
        Ok(start..self.pos)
    }
}

// ── Frame model ─────────────────────────────────────────────────────

/// Byte ranges of one frame's two zlib streams within the file, plus the
/// decompressed lengths the header declared for them.
#[derive(Clone, Debug)]
#[cfg_attr(not(feature = "zlib"), allow(dead_code))]
pub struct PixelStreams {
    pub(crate) data: Range<usize>,
    pub(crate) data_raw_len: usize,
    pub(crate) cmd: Range<usize>,
    pub(crate) cmd_raw_len: usize,
}

/// How a frame's pixel data is stored.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum FrameKind {
    /// Standard RLE + delta-filtered pixels (decodable by this crate).
    Pixels(PixelStreams),
    /// JPEG-compressed pixels (`img_jpg` tag, HG-3 only).
    Jpeg,
    /// JPEG pixels with a separate alpha mask (`img_jpg` + `img_al`).
    JpegAlpha,
    /// Standalone alpha mask (`img_al` tag, HG-3 only).
    Alpha,
}

/// Header metadata for one frame.
#[derive(Clone, Debug)]
pub struct FrameInfo {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub depth_bits: u32,
    /// Canvas size the frame is placed on.
    pub total_width: u32,
    pub total_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub kind: FrameKind,
}

/// A parsed HG-2/HG-3 file: header metadata for every frame, borrowing the
/// file bytes so frames can be decoded on demand.
#[derive(Debug)]
pub struct HgxFile<'a> {
    pub format: HgxFormat,
    pub frames: Vec<FrameInfo>,
    #[cfg_attr(not(feature = "zlib"), allow(dead_code))]
    data: &'a [u8],
}

impl<'a> HgxFile<'a> {
    /// Parse the container and all frame headers. No pixel data is touched.
    pub fn parse(data: &'a [u8]) -> Result<Self, HgxError> {
        let mut cur = Cursor::new(data);
        let signature: [u8; 4] = cur.array()?;
        let format = match &signature {
            b"HG-2" => HgxFormat::Hg2,
            b"HG-3" => HgxFormat::Hg3,
            _ => return Err(HgxError::UnrecognizedFormat),
        };
        let header_size = cur.u32_le()?;
        if header_size < 12 {
            return Err(HgxError::InvalidHeader(alloc::format!(
                "header size {header_size} is smaller than the fixed header"
            )));
        }
        let hdr_type = cur.u32_le()?;

        let frames = match format {
            HgxFormat::Hg2 => hg2::parse_frames(data, hdr_type)?,
            HgxFormat::Hg3 => hg3::parse_frames(data)?,
        };

        Ok(Self {
            format,
            frames,
            data,
        })
    }
}

#[cfg(feature = "zlib")]
impl<'a> HgxFile<'a> {
    /// Decode one frame to pixels.
    ///
    /// Rows come out bottom-up, as stored; see
    /// [`DecodedFrame::flip_vertical`].
    pub fn decode_frame(
        &self,
        index: usize,
        limits: &Limits,
        stop: &dyn Stop,
    ) -> Result<DecodedFrame, HgxError> {
        let frame = self.frames.get(index).ok_or_else(|| {
            HgxError::InvalidHeader(alloc::format!(
                "frame {index} out of range ({} frames)",
                self.frames.len()
            ))
        })?;

        let streams = match &frame.kind {
            FrameKind::Pixels(streams) => streams,
            FrameKind::Jpeg | FrameKind::JpegAlpha => {
                return Err(HgxError::UnsupportedVariant(
                    "JPEG-compressed frame".into(),
                ));
            }
            FrameKind::Alpha => {
                return Err(HgxError::UnsupportedVariant(
                    "standalone alpha-mask frame".into(),
                ));
            }
        };

        let layout = PixelLayout::from_depth_bits(frame.depth_bits).ok_or_else(|| {
            HgxError::UnsupportedVariant(alloc::format!(
                "depth of {} bits per pixel",
                frame.depth_bits
            ))
        })?;
        let depth_bytes = (frame.depth_bits + 7) / 8;
        let geometry = FrameGeometry::with_aligned_stride(frame.width, frame.height, depth_bytes);

        let pixels = decode_frame(
            CompressedStream {
                bytes: &self.data[streams.data.clone()],
                raw_len: streams.data_raw_len,
            },
            CompressedStream {
                bytes: &self.data[streams.cmd.clone()],
                raw_len: streams.cmd_raw_len,
            },
            geometry,
            limits,
            stop,
        )?;

        Ok(DecodedFrame {
            pixels,
            width: frame.width,
            height: frame.height,
            stride: geometry.stride as usize,
            layout,
            offset_x: frame.offset_x,
            offset_y: frame.offset_y,
            total_width: frame.total_width,
            total_height: frame.total_height,
        })
    }
}

// ── Decoded output ──────────────────────────────────────────────────

/// One decoded frame. `pixels` is `stride * height` bytes of bottom-up
/// BGR(A) rows, the order the format stores them in.
#[cfg(feature = "zlib")]
#[derive(Clone, Debug)]
pub struct DecodedFrame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Row length in bytes (rows are 4-byte aligned).
    pub stride: usize,
    pub layout: PixelLayout,
    pub offset_x: u32,
    pub offset_y: u32,
    pub total_width: u32,
    pub total_height: u32,
}

#[cfg(feature = "zlib")]
impl DecodedFrame {
    /// Reverse the row order in place (bottom-up to top-down or back).
    pub fn flip_vertical(&mut self) {
        let stride = self.stride;
        if stride == 0 {
            return;
        }
        let mut scanline = alloc::vec![0u8; stride];
        let mid = self.pixels.len() / 2;
        let (top, bottom) = self.pixels.split_at_mut(mid);

        for (a, b) in top
            .chunks_exact_mut(stride)
            .zip(bottom.rchunks_exact_mut(stride))
        {
            scanline.copy_from_slice(a);
            a.copy_from_slice(b);
            b.copy_from_slice(&scanline);
        }
    }
}

// ── Top-level entry points ──────────────────────────────────────────

/// Decode the first frame of an HG-2/HG-3 file.
#[cfg(feature = "zlib")]
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodedFrame, HgxError> {
    decode_with_limits(data, &Limits::default(), stop)
}

/// Decode the first frame of an HG-2/HG-3 file with resource limits.
#[cfg(feature = "zlib")]
pub fn decode_with_limits(
    data: &[u8],
    limits: &Limits,
    stop: impl Stop,
) -> Result<DecodedFrame, HgxError> {
    HgxFile::parse(data)?.decode_frame(0, limits, &stop)
}
