//! Error types for TileVault
//!
//! Provides a unified error type for all operations.
//!
//! "Tile not found" style outcomes are deliberately NOT errors: lookups that
//! can legitimately come up empty (zoom outside the archive range, unmatched
//! tile ID, exhausted directory walk) return `Ok(None)` so callers treat them
//! as "nothing to draw here".

use thiserror::Error;

/// Result type alias using TileError
pub type Result<T> = std::result::Result<T, TileError>;

/// Unified error type for TileVault operations
#[derive(Debug, Error)]
pub enum TileError {
    // -------------------------------------------------------------------------
    // I/O / Resource Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Range read out of bounds: offset {offset} + length {length} > size {size}")]
    RangeOutOfBounds { offset: u64, length: u64, size: u64 },

    // -------------------------------------------------------------------------
    // Format Errors (always fatal to the operation in progress)
    // -------------------------------------------------------------------------
    #[error("Archive format error: {0}")]
    Format(String),

    #[error("Gzip format error: {0}")]
    Gzip(String),

    #[error("Deflate stream error: {0}")]
    Deflate(String),

    #[error("Tile decode error: {0}")]
    TileDecode(String),

    // -------------------------------------------------------------------------
    // Unsupported Features
    // -------------------------------------------------------------------------
    #[error("Unsupported: {0}")]
    Unsupported(String),

    // -------------------------------------------------------------------------
    // Addressing Errors
    // -------------------------------------------------------------------------
    #[error("Tile coordinate out of range: z={z} x={x} y={y}")]
    CoordOutOfRange { z: u8, x: u32, y: u32 },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Metadata error: {0}")]
    Metadata(String),
}
