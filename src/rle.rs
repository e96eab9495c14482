//! Run-length expansion of the HG-X data stream.
//!
//! The command stream is a side-channel bitstream: one flag bit giving the
//! type of the first run, the total output length as an Elias-gamma value,
//! then alternating copy/zero-fill run lengths. Copy runs take bytes from
//! the data stream; zero-fill runs only advance the output cursor (the
//! output starts zeroed).

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use crate::bits::BitReader;
use crate::error::HgxError;
use crate::limits::{Limits, MAX_PIXEL_BYTES};

/// Expand `data` according to the command stream in `cmd`.
///
/// The declared total must be matched exactly by the sum of run lengths,
/// and every copy run must fit both the remaining output space and the
/// remaining data bytes. Any violation is [`HgxError::CorruptStream`];
/// nothing is ever written past the declared total.
pub(crate) fn expand(
    data: &[u8],
    cmd: &[u8],
    limits: &Limits,
    stop: &dyn Stop,
) -> Result<Vec<u8>, HgxError> {
    let mut bits = BitReader::new(cmd);

    let mut copy = bits.bit();
    let total = bits
        .elias_gamma()
        .ok_or(HgxError::CorruptStream("command stream truncated"))?
        as usize;

    if total > MAX_PIXEL_BYTES {
        return Err(HgxError::CorruptStream("declared output length too large"));
    }
    limits.check_memory(total)?;

    let mut out = vec![0u8; total];
    let mut offset = 0usize;
    let mut data_pos = 0usize;
    let mut runs = 0u32;

    while offset < total {
        runs += 1;
        if runs % 1024 == 0 {
            stop.check()?;
        }

        let n = bits
            .elias_gamma()
            .ok_or(HgxError::CorruptStream("command stream truncated"))?
            as usize;

        // A run may not overshoot the declared total.
        let end = match offset.checked_add(n) {
            Some(end) if end <= total => end,
            _ => return Err(HgxError::CorruptStream("run exceeds declared length")),
        };

        if copy {
            let data_end = match data_pos.checked_add(n) {
                Some(e) if e <= data.len() => e,
                _ => return Err(HgxError::CorruptStream("copy run exceeds data stream")),
            };
            out[offset..end].copy_from_slice(&data[data_pos..data_end]);
            data_pos = data_end;
        }
        // Zero-fill runs: the buffer is already zeroed, only advance.

        offset = end;
        copy = !copy;
    }

    Ok(out)
}
