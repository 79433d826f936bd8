//! Single-file tile archive reader
//!
//! ## Container Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (127 bytes)                                      │
//! │   Magic "PMTiles" | version | region offsets/lengths    │
//! │   counts | flags | codecs | zoom range | geo bounds     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Root Directory (compressed)                             │
//! ├─────────────────────────────────────────────────────────┤
//! │ Metadata (compressed JSON)                              │
//! ├─────────────────────────────────────────────────────────┤
//! │ Leaf Directories (compressed, addressed by root)        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Tile Data (per-tile codec from header)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Directories map Hilbert tile IDs to byte ranges; entries with
//! `run_length == 0` point at child leaf directories instead of tiles.

mod directory;
mod header;
mod reader;
mod tile_id;

pub use directory::{Directory, DirEntry};
pub use header::Header;
pub use reader::ArchiveReader;
pub use tile_id::{tile_id_to_zxy, zxy_to_tile_id};

/// Magic bytes at offset 0 of every archive.
pub(crate) const MAGIC: &[u8; 7] = b"PMTiles";

/// Fixed header size in bytes.
pub(crate) const HEADER_SIZE: usize = 127;

/// Highest spec version this reader understands.
pub(crate) const MAX_SPEC_VERSION: u8 = 3;

/// Deepest root→leaf directory chain the walk will follow.
pub(crate) const MAX_DIRECTORY_DEPTH: u32 = 3;

/// Hardest zoom limit of the addressing scheme (IDs stay within u64).
pub(crate) const MAX_ZOOM: u8 = 26;
