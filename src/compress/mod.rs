//! Compression codecs for archive internals and tile payloads
//!
//! The archive header advertises one codec for directory blobs and one for
//! tile bodies. Only raw (0x01) and gzip (0x02) are supported; anything else
//! surfaces as an `Unsupported` error at decompression time rather than being
//! silently passed through.
//!
//! The DEFLATE decoder is implemented from scratch (RFC 1951/1952); no codec
//! library is involved.

mod bits;
mod gzip;
mod huffman;
mod inflate;

pub use gzip::gunzip;
pub use inflate::inflate;

use bytes::Bytes;
use serde::Serialize;

use crate::error::{Result, TileError};

/// Codec identifiers as stored in the archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Compression {
    /// 0x01 — bytes are stored verbatim
    None,
    /// 0x02 — gzip envelope around a DEFLATE stream
    Gzip,
    /// Any other code (brotli, zstd, vendor extensions); not decodable here
    Other(u8),
}

impl Compression {
    /// Map a header codec byte to a `Compression`.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Compression::None,
            0x02 => Compression::Gzip,
            other => Compression::Other(other),
        }
    }

    /// The raw header byte for this codec.
    pub fn code(&self) -> u8 {
        match self {
            Compression::None => 0x01,
            Compression::Gzip => 0x02,
            Compression::Other(code) => *code,
        }
    }
}

/// Decompress `data` according to `codec`.
///
/// Raw data passes through without copying. Unsupported codecs fail; the
/// caller decides whether that aborts a single tile or the whole open.
pub fn decompress(codec: Compression, data: Bytes) -> Result<Bytes> {
    match codec {
        Compression::None => Ok(data),
        Compression::Gzip => Ok(Bytes::from(gunzip(&data)?)),
        Compression::Other(code) => Err(TileError::Unsupported(format!(
            "compression codec {code:#04x}"
        ))),
    }
}
