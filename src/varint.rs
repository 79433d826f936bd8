//! Base-128 variable-length integer decoding
//!
//! Little-endian LEB128 as used by the archive directory serialization and
//! the compact tile schema: the low 7 bits of each byte contribute to the
//! value at an increasing shift, the high bit marks continuation.

use crate::error::{Result, TileError};

/// Read one varint from `buf` starting at `*pos`, advancing `*pos` past it.
///
/// No overflow check beyond the host integer width; callers are expected to
/// feed well-formed input. Fails only when the buffer ends mid-sequence.
pub fn read_varint(buf: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = *buf
            .get(*pos)
            .ok_or_else(|| TileError::Format("varint truncated at end of buffer".to_string()))?;
        *pos += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

/// Zigzag decode: maps unsigned n back to signed (0→0, 1→-1, 2→1, 3→-2, ...)
#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}
