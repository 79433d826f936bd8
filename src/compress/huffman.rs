//! Canonical Huffman decoding tables
//!
//! Tables are built from code-length arrays only (RFC 1951 §3.2.2): codes of
//! the same length are assigned consecutively in symbol order. Decoding walks
//! the lengths shortest-first, comparing against the first code of each
//! length, so no explicit tree is materialized.

use super::bits::BitReader;
use crate::error::{Result, TileError};

/// Longest code length DEFLATE permits.
pub const MAX_BITS: usize = 15;

/// Decode table: per-length code counts plus symbols sorted by code.
pub struct HuffmanTable {
    count: [u16; MAX_BITS + 1],
    symbol: Vec<u16>,
}

impl HuffmanTable {
    /// Build a table from per-symbol code lengths (0 = symbol unused).
    ///
    /// Over-subscribed length sets are a format error. Incomplete sets are
    /// accepted; DEFLATE legitimately emits single-code distance trees.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let mut count = [0u16; MAX_BITS + 1];
        for &len in lengths {
            if len as usize > MAX_BITS {
                return Err(TileError::Deflate(format!("code length {len} exceeds 15")));
            }
            count[len as usize] += 1;
        }

        // Kraft check: more codes of some length than the bit-space allows
        let mut left: i32 = 1;
        for len in 1..=MAX_BITS {
            left <<= 1;
            left -= i32::from(count[len]);
            if left < 0 {
                return Err(TileError::Deflate(
                    "over-subscribed Huffman code lengths".to_string(),
                ));
            }
        }

        // Offsets of the first symbol of each length within `symbol`
        let mut offset = [0u16; MAX_BITS + 1];
        for len in 1..MAX_BITS {
            offset[len + 1] = offset[len] + count[len];
        }

        let mut symbol = vec![0u16; lengths.iter().filter(|&&l| l != 0).count()];
        for (sym, &len) in lengths.iter().enumerate() {
            if len != 0 {
                symbol[offset[len as usize] as usize] = sym as u16;
                offset[len as usize] += 1;
            }
        }

        Ok(Self { count, symbol })
    }

    /// Decode one symbol from the bit stream.
    pub fn decode(&self, br: &mut BitReader<'_>) -> Result<u16> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;
        for len in 1..=MAX_BITS {
            code |= br.bit()? as i32;
            let count = i32::from(self.count[len]);
            if code - first < count {
                return Ok(self.symbol[(index + (code - first)) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }
        Err(TileError::Deflate("invalid Huffman code".to_string()))
    }
}

/// Fixed literal/length table (RFC 1951 §3.2.6): 0..=143 use 8 bits,
/// 144..=255 use 9, 256..=279 use 7, 280..=287 use 8.
pub fn fixed_literal_table() -> Result<HuffmanTable> {
    let mut lengths = [0u8; 288];
    for (sym, len) in lengths.iter_mut().enumerate() {
        *len = match sym {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
    }
    HuffmanTable::from_lengths(&lengths)
}

/// Fixed distance table: all 32 symbols at 5 bits.
pub fn fixed_distance_table() -> Result<HuffmanTable> {
    HuffmanTable::from_lengths(&[5u8; 32])
}
