//! HG-2 frame chain.
//!
//! Each frame is a 68-byte image struct (optionally followed by an 8-byte
//! base-offset extension when the header type is 0x25), then the two zlib
//! streams back to back. `offset_next` links frames relative to the frame
//! start; zero ends the chain.

use alloc::vec::Vec;

use super::{Cursor, FrameInfo, FrameKind, PixelStreams};
use crate::error::HgxError;

const TYPE_WITH_BASE: u32 = 0x25;

pub(super) fn parse_frames(data: &[u8], hdr_type: u32) -> Result<Vec<FrameInfo>, HgxError> {
    let mut frames = Vec::new();
    let mut start = 12usize;

    loop {
        let mut cur = Cursor::new(data);
        cur.set_position(start)?;

        let width = cur.u32_le()?;
        let height = cur.u32_le()?;
        let depth_bits = cur.u32_le()?;
        cur.skip(8)?; // two unknown fields

        let comp_data_len = cur.u32_le()? as usize;
        let raw_data_len = cur.u32_le()? as usize;
        let comp_cmd_len = cur.u32_le()? as usize;
        let raw_cmd_len = cur.u32_le()? as usize;

        cur.skip(4)?; // extra length
        let id = cur.u32_le()?;
        let total_width = cur.u32_le()?;
        let total_height = cur.u32_le()?;
        let offset_x = cur.u32_le()?;
        let offset_y = cur.u32_le()?;
        cur.skip(4)?; // transparency flag
        let offset_next = cur.u32_le()?;

        if hdr_type == TYPE_WITH_BASE {
            cur.skip(8)?; // base x/y extension
        }

        let data_range = cur.range(comp_data_len)?;
        let cmd_range = cur.range(comp_cmd_len)?;

        frames.push(FrameInfo {
            id,
            width,
            height,
            depth_bits,
            total_width,
            total_height,
            offset_x,
            offset_y,
            kind: FrameKind::Pixels(PixelStreams {
                data: data_range,
                data_raw_len: raw_data_len,
                cmd: cmd_range,
                cmd_raw_len: raw_cmd_len,
            }),
        });

        if offset_next == 0 {
            break;
        }
        // The link must advance, or the chain would loop forever.
        let next = start
            .checked_add(offset_next as usize)
            .ok_or(HgxError::UnexpectedEof)?;
        if next >= data.len() {
            return Err(HgxError::InvalidHeader(alloc::format!(
                "frame link {next} points past the {}-byte file",
                data.len()
            )));
        }
        start = next;
    }

    Ok(frames)
}
