//! Bit-level reader over a byte buffer
//!
//! DEFLATE packs its fields LSB-first within each byte; the reader tracks an
//! absolute bit position so stored blocks can re-align to byte boundaries.

use crate::error::{Result, TileError};

/// LSB-first bit cursor over a borrowed byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute position in bits from the start of `data`.
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Read a single bit.
    #[inline]
    pub fn bit(&mut self) -> Result<u32> {
        let byte_idx = self.bit_pos >> 3;
        let byte = *self
            .data
            .get(byte_idx)
            .ok_or_else(|| TileError::Deflate("premature end of bit stream".to_string()))?;
        let bit = (byte >> (self.bit_pos & 7)) & 1;
        self.bit_pos += 1;
        Ok(u32::from(bit))
    }

    /// Read `n` bits (n ≤ 16), LSB-first.
    pub fn bits(&mut self, n: u32) -> Result<u32> {
        let mut value = 0u32;
        for i in 0..n {
            value |= self.bit()? << i;
        }
        Ok(value)
    }

    /// Discard bits up to the next byte boundary (stored-block alignment).
    pub fn byte_align(&mut self) {
        self.bit_pos = (self.bit_pos + 7) & !7;
    }

    /// Copy `len` bytes from the current (byte-aligned) position.
    pub fn take_aligned(&mut self, len: usize) -> Result<&'a [u8]> {
        debug_assert_eq!(self.bit_pos & 7, 0);
        let start = self.bit_pos >> 3;
        let end = start
            .checked_add(len)
            .ok_or_else(|| TileError::Deflate("stored block length overflow".to_string()))?;
        if end > self.data.len() {
            return Err(TileError::Deflate(
                "stored block extends past end of stream".to_string(),
            ));
        }
        self.bit_pos = end << 3;
        Ok(&self.data[start..end])
    }
}
