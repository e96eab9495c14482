//! Bit-plane deinterleave and delta unfilter.
//!
//! The run-length-expanded buffer holds four equal contiguous sections,
//! each contributing one 2-bit slice of every output byte. Regrouping goes
//! through four 256-entry lookup tables that spread a section byte's four
//! 2-bit pairs across the four byte lanes of a u32. The regrouped bytes are
//! zig-zag encoded deltas: unpack, then integrate left-to-right across the
//! first row (per channel) and top-to-bottom across rows.

use enough::Stop;

use crate::error::HgxError;

/// Spread the four 2-bit pairs of `i` one per byte lane: bits 6-7 land in
/// the highest lane, bits 0-1 in the lowest.
const fn spread(i: u32) -> u32 {
    let mut val = i & 0xC0;
    val <<= 6;
    val |= i & 0x30;
    val <<= 6;
    val |= i & 0x0C;
    val <<= 6;
    val |= i & 0x03;
    val
}

const fn regroup_table(shift: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = spread(i as u32) << shift;
        i += 1;
    }
    table
}

// Pure functions of the index, shared read-only across concurrent decodes.
// One table per 2-bit slot: section 1 holds the high pair of each output
// byte, section 4 the low pair.
static TABLE1: [u32; 256] = regroup_table(6);
static TABLE2: [u32; 256] = regroup_table(4);
static TABLE3: [u32; 256] = regroup_table(2);
static TABLE4: [u32; 256] = regroup_table(0);

/// Undo the zig-zag byte encoding: low bit is the sign flag.
fn unpack_val(c: u8) -> u8 {
    if c & 1 != 0 { (c >> 1) ^ 0xFF } else { c >> 1 }
}

/// Deinterleave `src` into `out` and integrate the delta filter in place.
///
/// `src` must be a multiple of 4 bytes (one byte per section per output
/// group); `out` must hold both the deinterleaved bytes and the full
/// `stride * height` image region. All additions are wrapping; overflow is
/// part of the encoding, not an error.
pub(crate) fn unfilter(
    src: &[u8],
    out: &mut [u8],
    height: u32,
    depth_bytes: u32,
    stride: u32,
    stop: &dyn Stop,
) -> Result<(), HgxError> {
    if src.len() % 4 != 0 {
        return Err(HgxError::InvalidData(alloc::format!(
            "intermediate length {} is not a multiple of 4",
            src.len()
        )));
    }

    let stride = stride as usize;
    let height = height as usize;
    let depth = depth_bytes as usize;

    let needed = src.len().max(stride * height);
    if out.len() < needed {
        return Err(HgxError::BufferTooSmall {
            needed,
            actual: out.len(),
        });
    }

    let sect_len = src.len() / 4;
    let (sect1, rest) = src.split_at(sect_len);
    let (sect2, rest) = rest.split_at(sect_len);
    let (sect3, sect4) = rest.split_at(sect_len);

    for (i, (((b1, b2), b3), b4)) in sect1.iter().zip(sect2).zip(sect3).zip(sect4).enumerate() {
        if i % 4096 == 0 {
            stop.check()?;
        }
        let val = TABLE1[usize::from(*b1)]
            | TABLE2[usize::from(*b2)]
            | TABLE3[usize::from(*b3)]
            | TABLE4[usize::from(*b4)];

        let group = &mut out[i * 4..i * 4 + 4];
        group[0] = unpack_val(val as u8);
        group[1] = unpack_val((val >> 8) as u8);
        group[2] = unpack_val((val >> 16) as u8);
        group[3] = unpack_val((val >> 24) as u8);
    }

    // Horizontal pass: within the first row, each channel byte is a delta
    // against the same channel one pixel to the left.
    for x in depth..stride {
        out[x] = out[x].wrapping_add(out[x - depth]);
    }

    // Vertical pass: each row is a delta against the row above.
    for y in 1..height {
        if y % 64 == 0 {
            stop.check()?;
        }
        let (prev_rows, cur_rows) = out.split_at_mut(y * stride);
        let prev = &prev_rows[(y - 1) * stride..];
        let cur = &mut cur_rows[..stride];
        for (c, p) in cur.iter_mut().zip(prev) {
            *c = c.wrapping_add(*p);
        }
    }

    Ok(())
}
