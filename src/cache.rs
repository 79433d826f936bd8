//! Decoded-tile cache
//!
//! Memoizes the full fetch→decompress→decode pipeline per (zoom, x, y).
//! "Tile legitimately absent" is cached too, as a tagged `Miss` slot — a
//! nullable value mixed into the map would make absent indistinguishable
//! from never-asked.
//!
//! Eviction is FIFO by insertion order. An LRU would be a strict,
//! non-breaking improvement under skewed access patterns.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::archive::ArchiveReader;
use crate::compress::decompress;
use crate::error::Result;
use crate::tile::{parse_tile, DecodedTile};

/// Cache key: (zoom, x, y).
pub type TileKey = (u8, u32, u32);

/// What a cache slot remembers about a coordinate.
#[derive(Clone)]
pub enum TileSlot {
    /// Decoded tile, shared read-only with consumers
    Hit(Arc<DecodedTile>),
    /// The archive has no tile at this coordinate
    Miss,
}

/// Produces decoded tiles on cache misses.
///
/// The seam exists so tests can count fetches; production wires in
/// [`ArchiveFetcher`].
pub trait TileFetcher {
    /// `Ok(None)` means the tile legitimately does not exist.
    fn fetch(&self, z: u8, x: u32, y: u32) -> Result<Option<DecodedTile>>;
}

/// Bounded FIFO cache over a fetcher.
pub struct TileCache<F: TileFetcher> {
    fetcher: F,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    slots: HashMap<TileKey, TileSlot>,
    /// Insertion order; front is oldest
    order: VecDeque<TileKey>,
    capacity: usize,
}

impl<F: TileFetcher> TileCache<F> {
    pub fn new(fetcher: F, capacity: usize) -> Self {
        Self {
            fetcher,
            inner: Mutex::new(CacheInner {
                slots: HashMap::new(),
                order: VecDeque::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Get the decoded tile at (z, x, y), fetching on a miss.
    ///
    /// A stored `Miss` returns `Ok(None)` without re-fetching. Fetch errors
    /// store nothing, so the next request retries from scratch.
    pub fn get_tile(&self, z: u8, x: u32, y: u32) -> Result<Option<Arc<DecodedTile>>> {
        let key = (z, x, y);

        // Check-then-insert stays under one lock so concurrent callers can't
        // double-insert or double-evict
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.slots.get(&key) {
            return Ok(match slot {
                TileSlot::Hit(tile) => Some(Arc::clone(tile)),
                TileSlot::Miss => None,
            });
        }

        let slot = match self.fetcher.fetch(z, x, y)? {
            Some(tile) => TileSlot::Hit(Arc::new(tile)),
            None => TileSlot::Miss,
        };

        inner.slots.insert(key, slot.clone());
        inner.order.push_back(key);
        while inner.slots.len() > inner.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                debug!(?oldest, "evicting oldest tile");
                inner.slots.remove(&oldest);
            }
        }

        Ok(match slot {
            TileSlot::Hit(tile) => Some(tile),
            TileSlot::Miss => None,
        })
    }

    /// Access the underlying fetcher (tests observe fetch counts here).
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Number of cached slots (hits and misses).
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached slot.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.slots.clear();
        inner.order.clear();
    }
}

// =============================================================================
// Production Fetcher
// =============================================================================

/// Fetcher backed by an archive: read raw bytes, decompress per the header's
/// tile codec, parse the compact tile schema.
pub struct ArchiveFetcher {
    archive: Arc<ArchiveReader>,
}

impl ArchiveFetcher {
    pub fn new(archive: Arc<ArchiveReader>) -> Self {
        Self { archive }
    }
}

impl TileFetcher for ArchiveFetcher {
    fn fetch(&self, z: u8, x: u32, y: u32) -> Result<Option<DecodedTile>> {
        let raw = match self.archive.get_zxy(z, x, y)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let plain = decompress(self.archive.header().tile_compression, raw)?;
        Ok(Some(parse_tile(&plain)?))
    }
}
