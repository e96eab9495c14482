//! Bit-level cursor over the RLE command stream.

/// Sequential LSB-first bit reader.
///
/// Reading past the end of the buffer does not fail immediately: the reader
/// yields `true` forever and latches an exhausted flag. The constant ones
/// force any in-progress Elias-gamma decode to terminate, and the flag turns
/// the result into a decode error instead of an out-of-bounds read.
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit: u32,
    exhausted: bool,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit: 0,
            exhausted: false,
        }
    }

    /// Next bit, LSB-first within each byte.
    pub(crate) fn bit(&mut self) -> bool {
        match self.data.get(self.pos) {
            Some(&byte) => {
                let b = (byte >> self.bit) & 1 != 0;
                self.bit += 1;
                if self.bit == 8 {
                    self.bit = 0;
                    self.pos += 1;
                }
                b
            }
            None => {
                self.exhausted = true;
                true
            }
        }
    }

    /// Decode one Elias-gamma value: a unary run of zero bits giving the
    /// magnitude, a terminating one bit, then that many explicit bits.
    /// The encoding cannot produce zero.
    ///
    /// Returns `None` if the buffer ran out mid-value or the unary prefix
    /// claims 32+ digits (not producible by a sane encoder; a genuine
    /// 32-digit value would not fit in u32 anyway).
    pub(crate) fn elias_gamma(&mut self) -> Option<u32> {
        let mut digits = 0u32;
        while !self.bit() {
            digits += 1;
            if digits >= 32 {
                return None;
            }
        }

        let mut value = 1u32 << digits;
        for k in (0..digits).rev() {
            if self.bit() {
                value |= 1 << k;
            }
        }

        if self.exhausted { None } else { Some(value) }
    }
}
