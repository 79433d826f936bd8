//! Archive reader: header, directory walk, tile byte lookup
//!
//! `get_zxy` returns the tile's raw bytes exactly as stored — still
//! compressed per the header's tile codec. Decompression and decoding are
//! the tile cache's job, so a renderer that only needs to forward bytes
//! never pays for them.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::directory::Directory;
use super::header::Header;
use super::tile_id::zxy_to_tile_id;
use super::{HEADER_SIZE, MAX_DIRECTORY_DEPTH};
use crate::compress::decompress;
use crate::config::Config;
use crate::error::{Result, TileError};
use crate::source::RangeReader;

/// Reads tiles out of a single-file archive via a [`RangeReader`].
pub struct ArchiveReader {
    source: Box<dyn RangeReader>,
    header: Header,
    directories: Mutex<DirectoryCache>,
}

impl ArchiveReader {
    /// Parse the header and set up the directory cache.
    pub fn open(source: Box<dyn RangeReader>, config: &Config) -> Result<Self> {
        let head = source.read_range(0, HEADER_SIZE as u64)?;
        let header = Header::parse(&head)?;

        if header.max_zoom > config.max_display_zoom {
            warn!(
                archive_max = header.max_zoom,
                display_max = config.max_display_zoom,
                "archive max zoom exceeds the display ceiling; deep tiles will over-zoom"
            );
        }

        Ok(Self {
            source,
            header,
            directories: Mutex::new(DirectoryCache::new(config.directory_cache_capacity)),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Read and decompress the archive's JSON metadata block.
    pub fn metadata(&self) -> Result<serde_json::Value> {
        if self.header.metadata_length == 0 {
            return Ok(serde_json::Value::Null);
        }
        let raw = self
            .source
            .read_range(self.header.metadata_offset, self.header.metadata_length)?;
        let plain = decompress(self.header.internal_compression, raw)?;
        serde_json::from_slice(&plain).map_err(|e| TileError::Metadata(e.to_string()))
    }

    /// Fetch the raw (possibly compressed) bytes for one tile.
    ///
    /// `Ok(None)` covers every legitimate "no tile here" outcome: zoom outside
    /// the archive's range, no directory entry, a zero-length entry, or a
    /// directory chain deeper than the walk bound.
    pub fn get_zxy(&self, z: u8, x: u32, y: u32) -> Result<Option<Bytes>> {
        if z < self.header.min_zoom || z > self.header.max_zoom {
            return Ok(None);
        }
        let tile_id = zxy_to_tile_id(z, x, y)?;

        let mut offset = self.header.root_offset;
        let mut length = self.header.root_length;
        for _ in 0..MAX_DIRECTORY_DEPTH {
            let directory = self.directory(offset, length)?;
            let entry = match directory.find_tile(tile_id) {
                Some(e) => *e,
                None => return Ok(None),
            };
            if entry.length == 0 {
                return Ok(None);
            }
            if entry.run_length > 0 {
                let bytes = self
                    .source
                    .read_range(self.header.tile_data_offset + entry.offset, entry.length)?;
                return Ok(Some(bytes));
            }
            // Leaf pointer: descend
            offset = self.header.leaf_offset + entry.offset;
            length = entry.length;
        }

        warn!(tile_id, "directory walk exceeded depth {MAX_DIRECTORY_DEPTH}");
        Ok(None)
    }

    /// Fetch a directory through the cache.
    ///
    /// The whole check-read-parse-insert sequence runs under one lock so a
    /// multi-threaded host cannot race duplicate inserts into the hit
    /// counters.
    fn directory(&self, offset: u64, length: u64) -> Result<Arc<Directory>> {
        let mut cache = self.directories.lock();
        if let Some(dir) = cache.get(offset, length) {
            return Ok(dir);
        }

        let raw = self.source.read_range(offset, length)?;
        let plain = decompress(self.header.internal_compression, raw)?;
        let directory = Arc::new(Directory::deserialize(&plain)?);
        debug!(offset, length, entries = directory.len(), "parsed directory");

        cache.insert(offset, length, Arc::clone(&directory));
        Ok(directory)
    }
}

// =============================================================================
// Directory Cache
// =============================================================================

struct CachedDirectory {
    directory: Arc<Directory>,
    /// Incremented on every lookup, including the one that created the entry
    hits: u64,
}

/// Bounded cache keyed by the directory blob's `(offset, length)`.
///
/// Eviction removes the entry with the globally lowest hit count (ties broken
/// arbitrarily) — an explicit compare-and-evict, never reliant on map
/// iteration order. A just-inserted entry that holds the minimum simply isn't
/// cached this round.
struct DirectoryCache {
    entries: HashMap<(u64, u64), CachedDirectory>,
    capacity: usize,
}

impl DirectoryCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&mut self, offset: u64, length: u64) -> Option<Arc<Directory>> {
        let cached = self.entries.get_mut(&(offset, length))?;
        cached.hits += 1;
        Some(Arc::clone(&cached.directory))
    }

    fn insert(&mut self, offset: u64, length: u64, directory: Arc<Directory>) {
        self.entries
            .insert((offset, length), CachedDirectory { directory, hits: 1 });

        if self.entries.len() > self.capacity {
            let coldest = self
                .entries
                .iter()
                .min_by_key(|(_, cached)| cached.hits)
                .map(|(&key, _)| key);
            if let Some(key) = coldest {
                debug!(?key, "evicting coldest directory");
                self.entries.remove(&key);
            }
        }
    }
}
