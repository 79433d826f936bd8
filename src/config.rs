//! Configuration for TileVault
//!
//! Centralized configuration with sensible defaults for a small-screen,
//! memory-constrained host.

/// Main configuration for a TileVault engine instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cache Configuration
    // -------------------------------------------------------------------------
    /// Max parsed leaf/root directories kept in memory.
    /// Evicted by lowest hit count when exceeded.
    pub directory_cache_capacity: usize,

    /// Max decoded tiles kept in memory.
    /// Evicted FIFO by insertion order when exceeded.
    pub tile_cache_capacity: usize,

    // -------------------------------------------------------------------------
    // Rendering Configuration
    // -------------------------------------------------------------------------
    /// Side length of the per-tile visibility-sector grid.
    /// The sector bitmask holds `sector_grid_size²` bits, so 8 is the ceiling
    /// for a u64 mask.
    pub sector_grid_size: u32,

    /// Unscaled tile edge length in world pixels at integer zoom.
    pub base_tile_size: f64,

    /// Display ceiling for zoom levels; archives advertising more are usable
    /// but provoke a warning at open time.
    pub max_display_zoom: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory_cache_capacity: 8,
            tile_cache_capacity: 32,
            sector_grid_size: 4,
            base_tile_size: 256.0,
            max_display_zoom: 16,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the directory cache capacity (parsed directory count)
    pub fn directory_cache_capacity(mut self, cap: usize) -> Self {
        self.config.directory_cache_capacity = cap;
        self
    }

    /// Set the tile cache capacity (decoded tile count)
    pub fn tile_cache_capacity(mut self, cap: usize) -> Self {
        self.config.tile_cache_capacity = cap;
        self
    }

    /// Set the visibility-sector grid side length (max 8)
    pub fn sector_grid_size(mut self, size: u32) -> Self {
        self.config.sector_grid_size = size.min(8);
        self
    }

    /// Set the base tile edge length in world pixels
    pub fn base_tile_size(mut self, size: f64) -> Self {
        self.config.base_tile_size = size;
        self
    }

    /// Set the display zoom ceiling
    pub fn max_display_zoom(mut self, zoom: u8) -> Self {
        self.config.max_display_zoom = zoom;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
