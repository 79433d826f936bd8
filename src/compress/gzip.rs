//! Gzip envelope parsing (RFC 1952)
//!
//! Validates the signature, skips the optional header fields, hands the
//! payload to the DEFLATE decoder, and checks the trailer. The trailer's
//! ISIZE presizes the output buffer; its CRC32 is verified but a mismatch
//! only logs a warning, it never fails the tile.

use tracing::warn;

use super::inflate::inflate;
use crate::error::{Result, TileError};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const METHOD_DEFLATE: u8 = 0x08;

// Header flag bits
const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

/// Fixed header (10) plus trailer (8).
const MIN_STREAM_LEN: usize = 18;

/// Decompress a complete gzip stream.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < MIN_STREAM_LEN {
        return Err(TileError::Gzip(format!(
            "stream too short: {} bytes",
            data.len()
        )));
    }
    if data[0..2] != GZIP_MAGIC {
        return Err(TileError::Gzip(format!(
            "bad magic: {:#04x} {:#04x}",
            data[0], data[1]
        )));
    }
    if data[2] != METHOD_DEFLATE {
        return Err(TileError::Gzip(format!(
            "unsupported compression method {:#04x}",
            data[2]
        )));
    }

    let flags = data[3];
    // Bytes 4..8 = mtime, 8 = XFL, 9 = OS; none affect decoding
    let mut pos = 10usize;

    if flags & FEXTRA != 0 {
        if pos + 2 > data.len() {
            return Err(TileError::Gzip("truncated FEXTRA length".to_string()));
        }
        let xlen = u16::from_le_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2 + xlen;
    }
    if flags & FNAME != 0 {
        pos = skip_zero_terminated(data, pos, "FNAME")?;
    }
    if flags & FCOMMENT != 0 {
        pos = skip_zero_terminated(data, pos, "FCOMMENT")?;
    }
    if flags & FHCRC != 0 {
        pos += 2;
    }

    if pos + 8 > data.len() {
        return Err(TileError::Gzip("header overruns stream".to_string()));
    }

    let trailer = &data[data.len() - 8..];
    let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let isize = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

    let out = inflate(&data[pos..data.len() - 8], isize as usize)?;

    // Size/checksum mismatches are logged, not fatal: the trailer is a
    // presizing hint here, not a correctness gate
    if out.len() != isize as usize {
        warn!(
            expected = isize,
            actual = out.len(),
            "gzip ISIZE disagrees with inflated length"
        );
    }
    let actual_crc = crc32fast::hash(&out);
    if actual_crc != expected_crc {
        warn!("gzip CRC32 mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}");
    }

    Ok(out)
}

/// Advance past a NUL-terminated header field starting at `pos`.
fn skip_zero_terminated(data: &[u8], pos: usize, field: &str) -> Result<usize> {
    let rest = data
        .get(pos..)
        .ok_or_else(|| TileError::Gzip(format!("truncated {field} field")))?;
    match rest.iter().position(|&b| b == 0) {
        Some(idx) => Ok(pos + idx + 1),
        None => Err(TileError::Gzip(format!("unterminated {field} field"))),
    }
}
