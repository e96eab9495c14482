//! Header-only probe. Parses frame metadata without touching pixel data,
//! so it is cheap enough to run on untrusted files before deciding whether
//! to decode them.

use crate::error::HgxError;
use crate::hgx::HgxFile;

/// Which of the two HG-X container revisions a file uses.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HgxFormat {
    /// `"HG-2"` signature, fixed-layout frame structs.
    Hg2,
    /// `"HG-3"` signature, tagged frame records.
    Hg3,
}

/// Summary of an HG-X file, taken from the first frame's header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HgxInfo {
    pub format: HgxFormat,
    /// First frame's width in pixels.
    pub width: u32,
    /// First frame's height in pixels.
    pub height: u32,
    /// First frame's depth in bits per pixel.
    pub depth_bits: u32,
    pub frame_count: usize,
}

impl HgxInfo {
    /// Probe a file's headers.
    pub fn from_bytes(data: &[u8]) -> Result<Self, HgxError> {
        let file = HgxFile::parse(data)?;
        let first = file
            .frames
            .first()
            .ok_or_else(|| HgxError::InvalidHeader("file has no frames".into()))?;
        Ok(Self {
            format: file.format,
            width: first.width,
            height: first.height,
            depth_bits: first.depth_bits,
            frame_count: file.frames.len(),
        })
    }
}
