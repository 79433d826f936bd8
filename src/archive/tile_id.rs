//! Tile addressing via a Hilbert space-filling curve
//!
//! A tile ID is a per-zoom cumulative base (Σ 4^k for k < z, so every zoom
//! occupies a contiguous ID range) plus the Hilbert index of (x, y) inside
//! the 2^z × 2^z grid. Hilbert ordering keeps spatially adjacent tiles
//! adjacent in ID space, which is what makes run-length directory entries
//! effective for uniform regions like open ocean.

use super::MAX_ZOOM;
use crate::error::{Result, TileError};

/// Map (zoom, x, y) to its archive tile ID.
pub fn zxy_to_tile_id(z: u8, x: u32, y: u32) -> Result<u64> {
    if z > MAX_ZOOM {
        return Err(TileError::CoordOutOfRange { z, x, y });
    }
    if z > 0 && (x >= 1 << z || y >= 1 << z) {
        return Err(TileError::CoordOutOfRange { z, x, y });
    }
    if z == 0 {
        if x != 0 || y != 0 {
            return Err(TileError::CoordOutOfRange { z, x, y });
        }
        return Ok(0);
    }

    Ok(zoom_base(z) + hilbert_index(z, x, y))
}

/// Map a tile ID back to (zoom, x, y). Inverse of [`zxy_to_tile_id`].
pub fn tile_id_to_zxy(id: u64) -> Result<(u8, u32, u32)> {
    let mut z: u8 = 0;
    let mut remaining = id;
    loop {
        let tiles_at_zoom = 1u64 << (2 * u32::from(z));
        if remaining < tiles_at_zoom {
            break;
        }
        remaining -= tiles_at_zoom;
        z += 1;
        if z > MAX_ZOOM {
            return Err(TileError::Format(format!("tile id {id} beyond zoom 26")));
        }
    }

    // Invert the Hilbert walk
    let n = 1u64 << z;
    let mut t = remaining;
    let (mut x, mut y) = (0u64, 0u64);
    let mut s = 1u64;
    while s < n {
        let rx = (t / 2) & 1;
        let ry = (t ^ rx) & 1;
        rotate(s, &mut x, &mut y, rx, ry);
        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }
    Ok((z, x as u32, y as u32))
}

/// First tile ID at zoom `z`: Σ 4^k for k in [0, z).
fn zoom_base(z: u8) -> u64 {
    ((1u64 << (2 * u32::from(z))) - 1) / 3
}

/// Hilbert d-index of (x, y) within the zoom-z grid.
///
/// Descends bit-planes from the grid half-size: each level contributes
/// `s² · (3·rx XOR ry)` and reflects/transposes the remaining low bits so
/// the curve stays continuous.
fn hilbert_index(z: u8, x: u32, y: u32) -> u64 {
    let mut d: u64 = 0;
    let (mut tx, mut ty) = (u64::from(x), u64::from(y));
    let mut s = (1u64 << z) >> 1;
    while s > 0 {
        let rx = u64::from(tx & s > 0);
        let ry = u64::from(ty & s > 0);
        d += s * s * ((3 * rx) ^ ry);
        rotate(s, &mut tx, &mut ty, rx, ry);
        s >>= 1;
    }
    d
}

/// Quadrant rotation: reflect then transpose when descending into the
/// bottom half of the curve.
fn rotate(s: u64, x: &mut u64, y: &mut u64, rx: u64, ry: u64) {
    if ry == 0 {
        if rx == 1 {
            // Wrapping keeps the low bits (the only ones later levels read)
            // identical to the signed reference formulation
            *x = s.wrapping_sub(1).wrapping_sub(*x);
            *y = s.wrapping_sub(1).wrapping_sub(*y);
        }
        std::mem::swap(x, y);
    }
}
