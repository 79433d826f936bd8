//! Viewport planning and sector visibility
//!
//! Enumerates the tiles a view bounding box touches at a fractional display
//! zoom, and computes per-tile sector bitmasks so the renderer can cull
//! features without per-coordinate bounds checks.

use crate::archive::{zxy_to_tile_id, MAX_ZOOM};

/// Axis-aligned box in world-pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }
}

/// One tile worth fetching for the current render pass.
///
/// Ephemeral: recomputed every pass, never persisted.
#[derive(Debug, Clone)]
pub struct ViewportTileQuery {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
    /// This tile's box in world-pixel space at the scaled tile size
    pub tile_bb: BoundingBox,
    /// The viewport that produced the query
    pub view_bb: BoundingBox,
}

/// Enumerate the tiles covering `view_bb` at `fractional_zoom`.
///
/// The effective integer zoom is `floor(fractional_zoom)` clamped to the
/// archive's max and the addressing limit — over-zooming past the archive
/// reuses the max-zoom grid. The tile edge is scaled by
/// `2^(fractional_zoom − effective)` so the discrete grid tracks the
/// continuous display zoom.
pub fn tiles_for(
    view_bb: BoundingBox,
    fractional_zoom: f64,
    archive_max_zoom: u8,
    base_tile_size: f64,
) -> Vec<ViewportTileQuery> {
    let floor_zoom = fractional_zoom.floor().max(0.0) as u8;
    // archive_max_zoom comes from an untrusted header byte; never let it
    // drive a shift width past the addressing limit
    let effective_zoom = floor_zoom.min(archive_max_zoom).min(MAX_ZOOM);
    let tile_size = base_tile_size * 2f64.powf(fractional_zoom - f64::from(effective_zoom));

    let grid_max = (1u64 << effective_zoom) - 1;
    let clamp_idx = |v: f64| -> u32 { (v.floor().max(0.0) as u64).min(grid_max) as u32 };

    let x0 = clamp_idx(view_bb.min_x / tile_size);
    let x1 = clamp_idx(view_bb.max_x / tile_size);
    let y0 = clamp_idx(view_bb.min_y / tile_size);
    let y1 = clamp_idx(view_bb.max_y / tile_size);

    let mut queries = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
    for y in y0..=y1 {
        for x in x0..=x1 {
            // Skip coordinates the addressing scheme can't represent
            if zxy_to_tile_id(effective_zoom, x, y).is_err() {
                continue;
            }
            let tile_bb = BoundingBox::new(
                f64::from(x) * tile_size,
                f64::from(y) * tile_size,
                f64::from(x + 1) * tile_size,
                f64::from(y + 1) * tile_size,
            );
            queries.push(ViewportTileQuery {
                zoom: effective_zoom,
                x,
                y,
                tile_bb,
                view_bb,
            });
        }
    }
    queries
}

/// Bitmask of the tile's `grid_size × grid_size` sectors the viewport
/// overlaps, row-major from the top-left sector at bit 0.
///
/// `grid_size` is capped at 8 so the mask fits a u64. Disjoint boxes yield 0;
/// a viewport covering the whole tile sets every bit.
pub fn visible_sectors(tile_bb: BoundingBox, view_bb: BoundingBox, grid_size: u32) -> u64 {
    let grid = grid_size.clamp(1, 8);
    if tile_bb.width() <= 0.0 || tile_bb.height() <= 0.0 {
        return 0;
    }

    let gf = f64::from(grid);
    let scale_col = |x: f64| ((x - tile_bb.min_x) / tile_bb.width()) * gf;
    let scale_row = |y: f64| ((y - tile_bb.min_y) / tile_bb.height()) * gf;

    let col_start = scale_col(view_bb.min_x).floor().clamp(0.0, gf) as u32;
    let col_end = scale_col(view_bb.max_x).ceil().clamp(0.0, gf) as u32;
    let row_start = scale_row(view_bb.min_y).floor().clamp(0.0, gf) as u32;
    let row_end = scale_row(view_bb.max_y).ceil().clamp(0.0, gf) as u32;

    if col_start >= col_end || row_start >= row_end {
        return 0;
    }

    let mut row_bits: u64 = 0;
    for col in col_start..col_end {
        row_bits |= 1 << col;
    }

    let mut mask: u64 = 0;
    for row in row_start..row_end {
        mask |= row_bits << (row * grid);
    }
    mask
}

/// Whether a feature's precomputed coverage overlaps the visible sectors.
///
/// False means the feature is provably outside the view and its geometry
/// never needs decoding this pass.
#[inline]
pub fn feature_possibly_visible(visible_mask: u64, coverage_mask: u64) -> bool {
    visible_mask & coverage_mask != 0
}
