//! Decoded vector tiles and the compact tile schema
//!
//! ## Tile Schema
//! A decompressed tile body is varint-framed:
//! ```text
//! Tile    := layer_count, Layer…
//! Layer   := name_len + bytes, extent (0 ⇒ 4096), schema_flag (u8),
//!            [flag 0] key_count + strings, value_count + strings,
//!            feature_count, Feature…
//! Feature := id, geom_code (u8),
//!            [flag 0] tag_count × (key_idx, value_idx)
//!            [flag 1] name_count × (locale + label strings),
//!                     kind string, min_zoom, coverage_mask,
//!            command_count, command_count × command ints
//! ```
//! Schema flag 0 is the classic tag-index layout; flag 1 is the compact
//! on-device variant with attributes inlined per feature, including the
//! precomputed sector coverage bitmask the viewport planner culls against.
//!
//! Features with malformed geometry are dropped individually with a debug
//! log; a bad feature never takes the whole tile down.

pub mod geometry;

pub use geometry::{decode_geometry, Coord, GeomType, Geometry};

use tracing::debug;

use crate::error::{Result, TileError};
use crate::varint::read_varint;

/// Tile-local coordinate span when a layer doesn't carry one.
pub const DEFAULT_EXTENT: u32 = 4096;

/// A fully decoded tile: what the cache stores and the renderer consumes.
#[derive(Debug, Clone)]
pub struct DecodedTile {
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    /// Coordinate extent of this layer's tile-local space
    pub extent: u32,
    /// Key string table (tag-index layout only)
    pub keys: Vec<String>,
    /// Value string table (tag-index layout only)
    pub values: Vec<String>,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone)]
pub struct Feature {
    pub id: u64,
    pub geom_type: GeomType,
    /// Raw command/coordinate stream; decoded lazily at render time
    pub commands: Vec<u32>,
    pub attrs: FeatureAttrs,
}

/// Per-feature attributes in one of the two schema layouts.
#[derive(Debug, Clone)]
pub enum FeatureAttrs {
    /// Index pairs into the layer's key/value tables
    Tags(Vec<(u32, u32)>),
    /// Compact variant: scalars inlined on the feature
    Inline {
        /// Localized display names as (locale, label) pairs
        names: Vec<(String, String)>,
        /// Feature classification (e.g. "river", "peak")
        kind: String,
        /// Lowest display zoom at which the feature should draw
        min_zoom: u8,
        /// Sector coverage bitmask for viewport culling
        coverage_mask: u64,
    },
}

impl Feature {
    /// Decode the command stream into geometry.
    pub fn geometry(&self) -> Result<Geometry> {
        decode_geometry(&self.commands, self.geom_type)
    }

    /// Sector coverage for culling. Tag-layout features carry no precomputed
    /// mask and are treated as covering the whole tile.
    pub fn coverage_mask(&self) -> u64 {
        match &self.attrs {
            FeatureAttrs::Inline { coverage_mask, .. } => *coverage_mask,
            FeatureAttrs::Tags(_) => u64::MAX,
        }
    }

    /// Lowest display zoom for the feature (0 when unspecified).
    pub fn min_zoom(&self) -> u8 {
        match &self.attrs {
            FeatureAttrs::Inline { min_zoom, .. } => *min_zoom,
            FeatureAttrs::Tags(_) => 0,
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Cap a claimed element count by the bytes left in the buffer so a hostile
/// count cannot drive the preallocation; the per-element reads still fail
/// with a truncation error when the data runs out.
fn cap_alloc(count: usize, data: &[u8], pos: usize) -> usize {
    count.min(data.len().saturating_sub(pos))
}

/// Parse a decompressed tile body.
pub fn parse_tile(data: &[u8]) -> Result<DecodedTile> {
    let mut pos = 0;
    let layer_count = read_varint(data, &mut pos)? as usize;
    let mut layers = Vec::with_capacity(cap_alloc(layer_count, data, pos));
    for _ in 0..layer_count {
        layers.push(parse_layer(data, &mut pos)?);
    }
    Ok(DecodedTile { layers })
}

fn parse_layer(data: &[u8], pos: &mut usize) -> Result<Layer> {
    let name = read_string(data, pos)?;
    let stored_extent = read_varint(data, pos)? as u32;
    let extent = if stored_extent == 0 {
        DEFAULT_EXTENT
    } else {
        stored_extent
    };
    let schema_flag = read_byte(data, pos)?;

    let (keys, values) = if schema_flag == 0 {
        (read_string_table(data, pos)?, read_string_table(data, pos)?)
    } else {
        (Vec::new(), Vec::new())
    };

    let feature_count = read_varint(data, pos)? as usize;
    let mut features = Vec::with_capacity(cap_alloc(feature_count, data, *pos));
    for _ in 0..feature_count {
        let feature = parse_feature(data, pos, schema_flag)?;
        // Lenient per-feature validation: malformed geometry drops the
        // feature, not the tile
        match validate_commands(&feature.commands) {
            Ok(()) => features.push(feature),
            Err(e) => {
                debug!(layer = %name, feature = feature.id, "skipping feature: {e}");
            }
        }
    }

    Ok(Layer {
        name,
        extent,
        keys,
        values,
        features,
    })
}

fn parse_feature(data: &[u8], pos: &mut usize, schema_flag: u8) -> Result<Feature> {
    let id = read_varint(data, pos)?;
    let geom_type = GeomType::from_code(read_byte(data, pos)?);

    let attrs = if schema_flag == 0 {
        let tag_count = read_varint(data, pos)? as usize;
        let mut tags = Vec::with_capacity(cap_alloc(tag_count, data, *pos));
        for _ in 0..tag_count {
            let key = read_varint(data, pos)? as u32;
            let value = read_varint(data, pos)? as u32;
            tags.push((key, value));
        }
        FeatureAttrs::Tags(tags)
    } else {
        let name_count = read_varint(data, pos)? as usize;
        let mut names = Vec::with_capacity(cap_alloc(name_count, data, *pos));
        for _ in 0..name_count {
            let locale = read_string(data, pos)?;
            let label = read_string(data, pos)?;
            names.push((locale, label));
        }
        let kind = read_string(data, pos)?;
        let min_zoom = read_varint(data, pos)? as u8;
        let coverage_mask = read_varint(data, pos)?;
        FeatureAttrs::Inline {
            names,
            kind,
            min_zoom,
            coverage_mask,
        }
    };

    let command_count = read_varint(data, pos)? as usize;
    let mut commands = Vec::with_capacity(cap_alloc(command_count, data, *pos));
    for _ in 0..command_count {
        commands.push(read_varint(data, pos)? as u32);
    }

    Ok(Feature {
        id,
        geom_type,
        commands,
        attrs,
    })
}

/// Structural check of a command stream: known opcodes, coordinate pairs
/// present for every repeat.
fn validate_commands(commands: &[u32]) -> Result<()> {
    let mut pos = 0;
    while pos < commands.len() {
        let command = commands[pos];
        pos += 1;
        let opcode = command & 0x7;
        let count = (command >> 3) as usize;
        match opcode {
            1 | 2 => {
                pos += count * 2;
                if pos > commands.len() {
                    return Err(TileError::TileDecode(
                        "geometry stream truncated".to_string(),
                    ));
                }
            }
            7 => {}
            other => {
                return Err(TileError::TileDecode(format!(
                    "unrecognized geometry opcode {other}"
                )));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Read Helpers
// =============================================================================

fn read_byte(data: &[u8], pos: &mut usize) -> Result<u8> {
    let byte = *data
        .get(*pos)
        .ok_or_else(|| TileError::TileDecode("tile body truncated".to_string()))?;
    *pos += 1;
    Ok(byte)
}

fn read_string(data: &[u8], pos: &mut usize) -> Result<String> {
    let len = read_varint(data, pos)? as usize;
    let end = pos
        .checked_add(len)
        .filter(|&e| e <= data.len())
        .ok_or_else(|| TileError::TileDecode("string overruns tile body".to_string()))?;
    let bytes = &data[*pos..end];
    *pos = end;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| TileError::TileDecode("invalid UTF-8 in tile string".to_string()))
}

fn read_string_table(data: &[u8], pos: &mut usize) -> Result<Vec<String>> {
    let count = read_varint(data, pos)? as usize;
    let mut table = Vec::with_capacity(cap_alloc(count, data, *pos));
    for _ in 0..count {
        table.push(read_string(data, pos)?);
    }
    Ok(table)
}
