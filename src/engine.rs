//! Engine Module
//!
//! The owning context that wires source → archive → cache → planner. No
//! process-wide state: a host constructs one `Engine` per archive and passes
//! it to its renderer.
//!
//! ## Render Pass Contract
//! 1. `plan_viewport` enumerates tile queries and stamps them with a fresh
//!    epoch.
//! 2. The renderer consumes the queue front-to-back, calling `tile` per
//!    query and `visible_sectors` to cull features.
//! 3. Before committing paint, the renderer checks `is_current(plan.epoch)`;
//!    a pan/zoom in the meantime supersedes the plan and its results are
//!    discarded rather than drawn onto a now-wrong canvas.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::archive::{ArchiveReader, Header};
use crate::cache::{ArchiveFetcher, TileCache};
use crate::config::Config;
use crate::error::Result;
use crate::source::{FileSource, RangeReader};
use crate::tile::DecodedTile;
use crate::viewport::{tiles_for, visible_sectors, BoundingBox, ViewportTileQuery};

/// A planned render pass: the tile queue plus its generation token.
#[derive(Debug)]
pub struct ViewportPlan {
    /// Monotonic generation token; stale plans fail `Engine::is_current`
    pub epoch: u64,
    /// Tiles to fetch, consumed front-to-back
    pub queries: Vec<ViewportTileQuery>,
}

/// The tile-data engine.
pub struct Engine {
    config: Config,
    archive: Arc<ArchiveReader>,
    tiles: TileCache<ArchiveFetcher>,
    epoch: AtomicU64,
}

impl Engine {
    /// Open an archive file. `Ok(None)` when the file does not exist — the
    /// host treats that as "no map installed", not a failure.
    pub fn open(path: &Path, config: Config) -> Result<Option<Self>> {
        match FileSource::open(path)? {
            Some(source) => Self::with_source(Box::new(source), config).map(Some),
            None => Ok(None),
        }
    }

    /// Build an engine over any byte-range source (in-memory archives in
    /// tests, bundled assets on device).
    pub fn with_source(source: Box<dyn RangeReader>, config: Config) -> Result<Self> {
        let archive = Arc::new(ArchiveReader::open(source, &config)?);
        let tiles = TileCache::new(
            ArchiveFetcher::new(Arc::clone(&archive)),
            config.tile_cache_capacity,
        );
        Ok(Self {
            config,
            archive,
            tiles,
            epoch: AtomicU64::new(0),
        })
    }

    pub fn header(&self) -> &Header {
        self.archive.header()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The archive's JSON metadata block.
    pub fn metadata(&self) -> Result<serde_json::Value> {
        self.archive.metadata()
    }

    /// Decoded tile at (z, x, y), through the cache.
    pub fn tile(&self, z: u8, x: u32, y: u32) -> Result<Option<Arc<DecodedTile>>> {
        self.tiles.get_tile(z, x, y)
    }

    /// Plan a render pass for the viewport, superseding any earlier plan.
    pub fn plan_viewport(&self, view_bb: BoundingBox, fractional_zoom: f64) -> ViewportPlan {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let queries = tiles_for(
            view_bb,
            fractional_zoom,
            self.archive.header().max_zoom,
            self.config.base_tile_size,
        );
        ViewportPlan { epoch, queries }
    }

    /// Whether a plan is still the newest one. Checked at render-commit time
    /// so tiles fetched for a superseded viewport are dropped, not painted.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// Sector visibility mask for one planned tile, using the configured
    /// grid size.
    pub fn visible_sectors(&self, query: &ViewportTileQuery) -> u64 {
        visible_sectors(query.tile_bb, query.view_bb, self.config.sector_grid_size)
    }
}
