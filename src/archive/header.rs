//! Fixed 127-byte archive header
//!
//! All multi-byte integers are little-endian. Geographic coordinates are
//! stored as signed 32-bit integers scaled by 1e7.

use serde::Serialize;
use tracing::warn;

use super::{HEADER_SIZE, MAGIC, MAX_SPEC_VERSION};
use crate::compress::Compression;
use crate::error::{Result, TileError};

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// Parsed archive header.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub spec_version: u8,

    // Region byte ranges
    pub root_offset: u64,
    pub root_length: u64,
    pub metadata_offset: u64,
    pub metadata_length: u64,
    pub leaf_offset: u64,
    pub leaf_length: u64,
    pub tile_data_offset: u64,
    pub tile_data_length: u64,

    // Statistics
    pub addressed_tiles: u64,
    pub tile_entries: u64,
    pub tile_contents: u64,

    /// Tile blobs appear in tile-ID order within the data region
    pub clustered: bool,

    /// Codec for root/leaf directories and metadata
    pub internal_compression: Compression,
    /// Codec for tile bodies
    pub tile_compression: Compression,
    /// Payload kind (1 = vector tiles)
    pub tile_type: u8,

    pub min_zoom: u8,
    pub max_zoom: u8,

    pub bounds: GeoBounds,
    pub center_zoom: u8,
    pub center_lon: f64,
    pub center_lat: f64,
}

impl Header {
    /// Parse the first 127 bytes of an archive.
    ///
    /// Fatal on bad magic or a spec version newer than this reader; merely
    /// warns on the deprecated pre-3 versions.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(TileError::Format(format!(
                "header truncated: {} bytes",
                buf.len()
            )));
        }
        if &buf[0..7] != MAGIC {
            return Err(TileError::Format("bad archive magic".to_string()));
        }

        let spec_version = buf[7];
        if spec_version > MAX_SPEC_VERSION {
            return Err(TileError::Format(format!(
                "unsupported spec version {spec_version}"
            )));
        }
        if spec_version < MAX_SPEC_VERSION {
            warn!("archive uses deprecated spec version {spec_version}");
        }

        Ok(Self {
            spec_version,
            root_offset: le_u64(buf, 8),
            root_length: le_u64(buf, 16),
            metadata_offset: le_u64(buf, 24),
            metadata_length: le_u64(buf, 32),
            leaf_offset: le_u64(buf, 40),
            leaf_length: le_u64(buf, 48),
            tile_data_offset: le_u64(buf, 56),
            tile_data_length: le_u64(buf, 64),
            addressed_tiles: le_u64(buf, 72),
            tile_entries: le_u64(buf, 80),
            tile_contents: le_u64(buf, 88),
            clustered: buf[96] == 1,
            internal_compression: Compression::from_code(buf[97]),
            tile_compression: Compression::from_code(buf[98]),
            tile_type: buf[99],
            min_zoom: buf[100],
            max_zoom: buf[101],
            bounds: GeoBounds {
                min_lon: le_coord(buf, 102),
                min_lat: le_coord(buf, 106),
                max_lon: le_coord(buf, 110),
                max_lat: le_coord(buf, 114),
            },
            center_zoom: buf[118],
            center_lon: le_coord(buf, 119),
            center_lat: le_coord(buf, 123),
        })
    }
}

#[inline]
fn le_u64(buf: &[u8], off: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[off..off + 8]);
    u64::from_le_bytes(bytes)
}

/// Degrees from an i32 scaled by 1e7.
#[inline]
fn le_coord(buf: &[u8], off: usize) -> f64 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[off..off + 4]);
    f64::from(i32::from_le_bytes(bytes)) / 1e7
}
