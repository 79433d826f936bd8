//! Feature geometry decoding
//!
//! A feature's geometry is a flat integer command stream: each command packs
//! a 3-bit opcode with a repeat count in the high bits, followed by
//! zigzag-delta coordinate pairs. The cursor is absolute across the whole
//! feature — it does NOT reset between rings.

use crate::error::{Result, TileError};
use crate::varint::zigzag_decode;

const OP_MOVE_TO: u32 = 1;
const OP_LINE_TO: u32 = 2;
const OP_CLOSE_PATH: u32 = 7;

/// Geometry type as stored per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomType {
    Unknown,
    Point,
    LineString,
    Polygon,
}

impl GeomType {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => GeomType::Point,
            2 => GeomType::LineString,
            3 => GeomType::Polygon,
            _ => GeomType::Unknown,
        }
    }
}

/// Tile-local coordinate pair.
pub type Coord = (i64, i64);

/// Materialized geometry.
///
/// Polygon carries a flat ring list: no exterior/interior classification and
/// no multipolygon grouping. Winding order is ignored — a known deviation
/// from strict vector-tile semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    Polygon(Vec<Vec<Coord>>),
}

/// Decode a command stream into rings, then classify by `geom_type`.
pub fn decode_geometry(commands: &[u32], geom_type: GeomType) -> Result<Geometry> {
    let rings = decode_rings(commands)?;
    materialize(rings, geom_type)
}

/// Run the command grammar, producing raw rings.
fn decode_rings(commands: &[u32]) -> Result<Vec<Vec<Coord>>> {
    let mut rings: Vec<Vec<Coord>> = Vec::new();
    let mut ring: Vec<Coord> = Vec::new();
    let (mut cx, mut cy): (i64, i64) = (0, 0);

    let mut pos = 0;
    while pos < commands.len() {
        let command = commands[pos];
        pos += 1;
        let opcode = command & 0x7;
        let count = command >> 3;

        match opcode {
            OP_MOVE_TO => {
                if !ring.is_empty() {
                    rings.push(std::mem::take(&mut ring));
                }
                pos = consume_points(commands, pos, count, &mut cx, &mut cy, &mut ring)?;
            }
            OP_LINE_TO => {
                pos = consume_points(commands, pos, count, &mut cx, &mut cy, &mut ring)?;
            }
            OP_CLOSE_PATH => {
                if let Some(&first) = ring.first() {
                    ring.push(first);
                    rings.push(std::mem::take(&mut ring));
                }
            }
            other => {
                return Err(TileError::TileDecode(format!(
                    "unrecognized geometry opcode {other}"
                )));
            }
        }
    }

    // Unclosed trailing ring still counts
    if !ring.is_empty() {
        rings.push(ring);
    }

    Ok(rings)
}

/// Read `count` zigzag-delta coordinate pairs, appending to `ring`.
fn consume_points(
    commands: &[u32],
    mut pos: usize,
    count: u32,
    cx: &mut i64,
    cy: &mut i64,
    ring: &mut Vec<Coord>,
) -> Result<usize> {
    for _ in 0..count {
        let dx = *commands
            .get(pos)
            .ok_or_else(|| TileError::TileDecode("geometry stream truncated".to_string()))?;
        let dy = *commands
            .get(pos + 1)
            .ok_or_else(|| TileError::TileDecode("geometry stream truncated".to_string()))?;
        pos += 2;
        *cx += zigzag_decode(u64::from(dx));
        *cy += zigzag_decode(u64::from(dy));
        ring.push((*cx, *cy));
    }
    Ok(pos)
}

fn materialize(mut rings: Vec<Vec<Coord>>, geom_type: GeomType) -> Result<Geometry> {
    match geom_type {
        GeomType::Point | GeomType::Unknown => {
            let points = rings.pop().unwrap_or_default();
            match points.len() {
                0 => Err(TileError::TileDecode("point feature with no points".to_string())),
                1 => Ok(Geometry::Point(points[0])),
                _ => Ok(Geometry::MultiPoint(points)),
            }
        }
        GeomType::LineString => match rings.pop() {
            None => Err(TileError::TileDecode("line feature with no path".to_string())),
            Some(last) if rings.is_empty() => Ok(Geometry::LineString(last)),
            Some(last) => {
                rings.push(last);
                Ok(Geometry::MultiLineString(rings))
            }
        },
        GeomType::Polygon => {
            if rings.is_empty() {
                return Err(TileError::TileDecode("polygon feature with no rings".to_string()));
            }
            Ok(Geometry::Polygon(rings))
        }
    }
}
