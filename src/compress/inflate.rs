//! DEFLATE decoder (RFC 1951)
//!
//! Supports all three block types: stored, fixed-Huffman, and dynamic-Huffman.
//! Back-references are copied byte by byte so overlapping runs (distance <
//! length) replicate correctly.

use super::bits::BitReader;
use super::huffman::{fixed_distance_table, fixed_literal_table, HuffmanTable};
use crate::error::{Result, TileError};

// =============================================================================
// Fixed Tables (RFC 1951 §3.2.5)
// =============================================================================

/// Base match lengths for literal/length symbols 257..=285.
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115,
    131, 163, 195, 227, 258,
];

/// Extra bits consumed after literal/length symbols 257..=285.
const LENGTH_EXTRA: [u32; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distances for distance symbols 0..=29.
const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits consumed after distance symbols 0..=29.
const DIST_EXTRA: [u32; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12,
    13, 13,
];

/// Transmission order of the 19 code-length code lengths (§3.2.7).
const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

// =============================================================================
// Inflate
// =============================================================================

/// Decompress a raw DEFLATE stream.
///
/// `size_hint` presizes the output buffer (the gzip trailer's ISIZE field is
/// the usual source); it is advisory only and the buffer grows as needed.
pub fn inflate(data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
    let mut out: Vec<u8> = Vec::with_capacity(size_hint.min(1 << 24).max(64));
    let mut br = BitReader::new(data);

    loop {
        let bfinal = br.bits(1)?;
        let btype = br.bits(2)?;
        match btype {
            0 => inflate_stored(&mut br, &mut out)?,
            1 => {
                let literal = fixed_literal_table()?;
                let distance = fixed_distance_table()?;
                inflate_block(&mut br, &mut out, &literal, &distance)?;
            }
            2 => {
                let (literal, distance) = read_dynamic_tables(&mut br)?;
                inflate_block(&mut br, &mut out, &literal, &distance)?;
            }
            _ => {
                return Err(TileError::Deflate(format!(
                    "unsupported block type {btype}"
                )))
            }
        }
        if bfinal == 1 {
            break;
        }
    }

    Ok(out)
}

/// Stored block: byte-align, then LEN raw bytes with a one's-complement check.
fn inflate_stored(br: &mut BitReader<'_>, out: &mut Vec<u8>) -> Result<()> {
    br.byte_align();
    let len = br.bits(16)? as usize;
    let nlen = br.bits(16)? as usize;
    if len != !nlen & 0xffff {
        return Err(TileError::Deflate(
            "stored block length complement mismatch".to_string(),
        ));
    }
    out.extend_from_slice(br.take_aligned(len)?);
    Ok(())
}

/// Dynamic block header: decode the code-length alphabet, then use it to read
/// the literal/length and distance code lengths (with 16/17/18 repeats).
fn read_dynamic_tables(br: &mut BitReader<'_>) -> Result<(HuffmanTable, HuffmanTable)> {
    let hlit = br.bits(5)? as usize + 257;
    let hdist = br.bits(5)? as usize + 1;
    let hclen = br.bits(4)? as usize + 4;

    let mut cl_lengths = [0u8; 19];
    for i in 0..hclen {
        cl_lengths[CODE_LENGTH_ORDER[i]] = br.bits(3)? as u8;
    }
    let cl_table = HuffmanTable::from_lengths(&cl_lengths)?;

    let total = hlit + hdist;
    let mut lengths = vec![0u8; total];
    let mut i = 0;
    while i < total {
        let sym = cl_table.decode(br)?;
        match sym {
            0..=15 => {
                lengths[i] = sym as u8;
                i += 1;
            }
            16 => {
                if i == 0 {
                    return Err(TileError::Deflate(
                        "repeat code with no previous length".to_string(),
                    ));
                }
                let prev = lengths[i - 1];
                let repeat = 3 + br.bits(2)? as usize;
                if i + repeat > total {
                    return Err(TileError::Deflate("length repeat overruns table".to_string()));
                }
                lengths[i..i + repeat].fill(prev);
                i += repeat;
            }
            17 | 18 => {
                let repeat = if sym == 17 {
                    3 + br.bits(3)? as usize
                } else {
                    11 + br.bits(7)? as usize
                };
                if i + repeat > total {
                    return Err(TileError::Deflate("zero repeat overruns table".to_string()));
                }
                // lengths already zeroed
                i += repeat;
            }
            _ => {
                return Err(TileError::Deflate(format!(
                    "invalid code-length symbol {sym}"
                )))
            }
        }
    }

    let literal = HuffmanTable::from_lengths(&lengths[..hlit])?;
    let distance = HuffmanTable::from_lengths(&lengths[hlit..])?;
    Ok((literal, distance))
}

/// Symbol loop shared by fixed and dynamic blocks.
fn inflate_block(
    br: &mut BitReader<'_>,
    out: &mut Vec<u8>,
    literal: &HuffmanTable,
    distance: &HuffmanTable,
) -> Result<()> {
    loop {
        let sym = literal.decode(br)?;
        match sym {
            0..=255 => out.push(sym as u8),
            256 => return Ok(()),
            257..=285 => {
                let idx = (sym - 257) as usize;
                let length = LENGTH_BASE[idx] as usize + br.bits(LENGTH_EXTRA[idx])? as usize;

                let dsym = distance.decode(br)? as usize;
                if dsym >= DIST_BASE.len() {
                    return Err(TileError::Deflate(format!(
                        "invalid distance symbol {dsym}"
                    )));
                }
                let dist = DIST_BASE[dsym] as usize + br.bits(DIST_EXTRA[dsym])? as usize;
                if dist > out.len() {
                    return Err(TileError::Deflate(
                        "back-reference before start of output".to_string(),
                    ));
                }

                // Byte-by-byte so overlapping runs (dist < length) self-copy
                let start = out.len() - dist;
                for j in 0..length {
                    let byte = out[start + j];
                    out.push(byte);
                }
            }
            _ => {
                return Err(TileError::Deflate(format!(
                    "invalid literal/length symbol {sym}"
                )))
            }
        }
    }
}
