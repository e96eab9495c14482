//! HG-3 frame chain.
//!
//! Each frame starts with an 8-byte header (`offset_next`, `id`) and a run
//! of 16-byte tags. The first tag is always `stdinfo` and carries the frame
//! geometry; an `img####` tag carries the standard pixel streams, while
//! `img_al` and `img_jpg` mark the alpha-mask and JPEG variants. A tag's
//! `length` field covers its body (streams included), so the next tag sits
//! at `body + length`; a zero `offset_next` ends the tag run, and a zero
//! frame `offset_next` ends the chain.

use alloc::vec::Vec;

use super::{Cursor, FrameInfo, FrameKind, PixelStreams};
use crate::error::HgxError;

struct Tag {
    signature: [u8; 8],
    offset_next: u32,
    length: u32,
}

impl Tag {
    fn read(cur: &mut Cursor<'_>) -> Result<Self, HgxError> {
        Ok(Self {
            signature: cur.array()?,
            offset_next: cur.u32_le()?,
            length: cur.u32_le()?,
        })
    }

    /// Signature with the trailing NUL padding stripped.
    fn name(&self) -> &[u8] {
        let end = self
            .signature
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.signature.len());
        &self.signature[..end]
    }

    /// `img` followed by frame digits, e.g. `img0000`. The `img_al` and
    /// `img_jpg` tags fall through because `_` is not a digit.
    fn is_pixel_image(&self) -> bool {
        let name = self.name();
        match name.strip_prefix(b"img") {
            Some(digits) => !digits.is_empty() && digits.iter().all(u8::is_ascii_digit),
            None => false,
        }
    }
}

pub(super) fn parse_frames(data: &[u8]) -> Result<Vec<FrameInfo>, HgxError> {
    let mut frames = Vec::new();
    let mut frame_start = 12usize;

    loop {
        let mut cur = Cursor::new(data);
        cur.set_position(frame_start)?;

        let frame_next = cur.u32_le()?;
        let id = cur.u32_le()?;

        // Geometry always comes first.
        let stdinfo = Tag::read(&mut cur)?;
        if stdinfo.name() != b"stdinfo" || stdinfo.length < 40 {
            return Err(HgxError::InvalidHeader(
                "frame does not start with a stdinfo tag".into(),
            ));
        }
        let body = cur.position();
        let width = cur.u32_le()?;
        let height = cur.u32_le()?;
        let depth_bits = cur.u32_le()?;
        let offset_x = cur.u32_le()?;
        let offset_y = cur.u32_le()?;
        let total_width = cur.u32_le()?;
        let total_height = cur.u32_le()?;
        // transparency flag and base x/y are not needed for decoding
        cur.set_position(
            body.checked_add(stdinfo.length as usize)
                .ok_or(HgxError::UnexpectedEof)?,
        )?;

        let mut streams = None;
        let mut has_jpeg = false;
        let mut has_alpha = false;
        let mut more = stdinfo.offset_next != 0;

        while more {
            let tag = Tag::read(&mut cur)?;
            let body = cur.position();

            if tag.is_pixel_image() && streams.is_none() {
                cur.skip(8)?; // unknown field and a repeated height
                let comp_data_len = cur.u32_le()? as usize;
                let raw_data_len = cur.u32_le()? as usize;
                let comp_cmd_len = cur.u32_le()? as usize;
                let raw_cmd_len = cur.u32_le()? as usize;
                let data_range = cur.range(comp_data_len)?;
                let cmd_range = cur.range(comp_cmd_len)?;
                streams = Some(PixelStreams {
                    data: data_range,
                    data_raw_len: raw_data_len,
                    cmd: cmd_range,
                    cmd_raw_len: raw_cmd_len,
                });
            } else if tag.name() == b"img_al" {
                has_alpha = true;
            } else if tag.name() == b"img_jpg" {
                has_jpeg = true;
            }
            // other tags (ats####, cptype, imgmode, ...) carry no pixels

            cur.set_position(
                body.checked_add(tag.length as usize)
                    .ok_or(HgxError::UnexpectedEof)?,
            )?;
            more = tag.offset_next != 0;
        }

        let kind = match (streams, has_jpeg, has_alpha) {
            (Some(streams), _, _) => FrameKind::Pixels(streams),
            (None, true, true) => FrameKind::JpegAlpha,
            (None, true, false) => FrameKind::Jpeg,
            (None, false, true) => FrameKind::Alpha,
            (None, false, false) => {
                return Err(HgxError::InvalidHeader(alloc::format!(
                    "frame {id} has no image tag"
                )));
            }
        };

        frames.push(FrameInfo {
            id,
            width,
            height,
            depth_bits,
            total_width,
            total_height,
            offset_x,
            offset_y,
            kind,
        });

        if frame_next == 0 {
            break;
        }
        // The link must advance, or the chain would loop forever.
        let next = frame_start
            .checked_add(frame_next as usize)
            .ok_or(HgxError::UnexpectedEof)?;
        if next >= data.len() {
            return Err(HgxError::InvalidHeader(alloc::format!(
                "frame link {next} points past the {}-byte file",
                data.len()
            )));
        }
        frame_start = next;
    }

    Ok(frames)
}
