//! Shared fixture builders: varint/directory/tile encoders and a minimal
//! in-memory archive writer. Encoders mirror the on-disk formats the crate
//! decodes so tests can assemble arbitrary archives byte by byte.

#![allow(dead_code)]

// =============================================================================
// Varint / Zigzag
// =============================================================================

pub fn encode_varint(mut v: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if v == 0 {
            break;
        }
    }
}

pub fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

// =============================================================================
// Gzip (stored DEFLATE block, real CRC trailer)
// =============================================================================

/// Wrap `payload` in a gzip stream using a single stored DEFLATE block.
pub fn gzip_stored(payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= 0xffff, "single stored block only");
    let mut out = vec![0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0x00, 0xff];
    out.push(0x01); // BFINAL=1, BTYPE=00
    let len = payload.len() as u16;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out
}

// =============================================================================
// Directory Encoding
// =============================================================================

#[derive(Clone, Copy)]
pub struct RawEntry {
    pub tile_id: u64,
    pub offset: u64,
    pub length: u64,
    pub run_length: u64,
}

/// Serialize entries in the four-column directory layout.
pub fn encode_directory(entries: &[RawEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(entries.len() as u64, &mut out);
    let mut last = 0;
    for e in entries {
        encode_varint(e.tile_id - last, &mut out);
        last = e.tile_id;
    }
    for e in entries {
        encode_varint(e.run_length, &mut out);
    }
    for e in entries {
        encode_varint(e.length, &mut out);
    }
    for (i, e) in entries.iter().enumerate() {
        let contiguous = i > 0 && e.offset == entries[i - 1].offset + entries[i - 1].length;
        encode_varint(if contiguous { 0 } else { e.offset + 1 }, &mut out);
    }
    out
}

// =============================================================================
// Compact Tile Encoding
// =============================================================================

pub struct FeatureSpec {
    pub id: u64,
    pub geom_code: u8,
    pub kind: &'static str,
    pub min_zoom: u8,
    pub coverage_mask: u64,
    pub commands: Vec<u32>,
}

/// Encode a single-layer tile in the compact (inline-attribute) schema.
pub fn encode_inline_tile(layer_name: &str, extent: u32, features: &[FeatureSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(1, &mut out); // layer count
    encode_string(layer_name, &mut out);
    encode_varint(u64::from(extent), &mut out);
    out.push(1); // schema flag: inline
    encode_varint(features.len() as u64, &mut out);
    for f in features {
        encode_varint(f.id, &mut out);
        out.push(f.geom_code);
        encode_varint(1, &mut out); // one localized name
        encode_string("en", &mut out);
        encode_string(&format!("feature-{}", f.id), &mut out);
        encode_string(f.kind, &mut out);
        encode_varint(u64::from(f.min_zoom), &mut out);
        encode_varint(f.coverage_mask, &mut out);
        encode_varint(f.commands.len() as u64, &mut out);
        for &c in &f.commands {
            encode_varint(u64::from(c), &mut out);
        }
    }
    out
}

/// Encode a single-layer tile in the tag-index schema.
pub fn encode_tagged_tile(
    layer_name: &str,
    keys: &[&str],
    values: &[&str],
    features: &[(u64, u8, Vec<(u32, u32)>, Vec<u32>)],
) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(1, &mut out);
    encode_string(layer_name, &mut out);
    encode_varint(0, &mut out); // extent 0 → default
    out.push(0); // schema flag: tags
    encode_varint(keys.len() as u64, &mut out);
    for k in keys {
        encode_string(k, &mut out);
    }
    encode_varint(values.len() as u64, &mut out);
    for v in values {
        encode_string(v, &mut out);
    }
    encode_varint(features.len() as u64, &mut out);
    for (id, geom_code, tags, commands) in features {
        encode_varint(*id, &mut out);
        out.push(*geom_code);
        encode_varint(tags.len() as u64, &mut out);
        for (k, v) in tags {
            encode_varint(u64::from(*k), &mut out);
            encode_varint(u64::from(*v), &mut out);
        }
        encode_varint(commands.len() as u64, &mut out);
        for &c in commands {
            encode_varint(u64::from(c), &mut out);
        }
    }
    out
}

pub fn encode_string(s: &str, out: &mut Vec<u8>) {
    encode_varint(s.len() as u64, out);
    out.extend_from_slice(s.as_bytes());
}

// =============================================================================
// Archive Builder
// =============================================================================

pub const CODEC_NONE: u8 = 0x01;
pub const CODEC_GZIP: u8 = 0x02;

/// Assembles a complete archive image in memory.
pub struct ArchiveBuilder {
    /// (tile_id, run_length, already-encoded tile body)
    tiles: Vec<(u64, u64, Vec<u8>)>,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub tile_codec: u8,
    /// Route all entries through one leaf directory to exercise the walk
    pub use_leaf: bool,
    /// Give every entry its own leaf directory (cache-churn fixtures)
    pub leaf_per_tile: bool,
}

impl ArchiveBuilder {
    pub fn new(min_zoom: u8, max_zoom: u8) -> Self {
        Self {
            tiles: Vec::new(),
            min_zoom,
            max_zoom,
            tile_codec: CODEC_GZIP,
            use_leaf: false,
            leaf_per_tile: false,
        }
    }

    /// Add a tile body; gzips it when the builder's tile codec is gzip.
    /// Entries must be added in ascending tile-ID order.
    pub fn add_tile(&mut self, tile_id: u64, run_length: u64, body: &[u8]) -> &mut Self {
        let stored = if self.tile_codec == CODEC_GZIP {
            gzip_stored(body)
        } else {
            body.to_vec()
        };
        self.tiles.push((tile_id, run_length, stored));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        // Tile data region and its directory entries
        let mut tile_data = Vec::new();
        let mut entries = Vec::new();
        for (tile_id, run_length, body) in &self.tiles {
            entries.push(RawEntry {
                tile_id: *tile_id,
                offset: tile_data.len() as u64,
                length: body.len() as u64,
                run_length: *run_length,
            });
            tile_data.extend_from_slice(body);
        }

        let (root_plain, leaf_region) = if self.leaf_per_tile {
            let mut leaves = Vec::new();
            let mut root_entries = Vec::new();
            for entry in &entries {
                let leaf = gzip_stored(&encode_directory(std::slice::from_ref(entry)));
                root_entries.push(RawEntry {
                    tile_id: entry.tile_id,
                    offset: leaves.len() as u64,
                    length: leaf.len() as u64,
                    run_length: 0,
                });
                leaves.extend_from_slice(&leaf);
            }
            (encode_directory(&root_entries), leaves)
        } else if self.use_leaf {
            let leaf = gzip_stored(&encode_directory(&entries));
            let root = encode_directory(&[RawEntry {
                tile_id: entries.first().map(|e| e.tile_id).unwrap_or(0),
                offset: 0,
                length: leaf.len() as u64,
                run_length: 0,
            }]);
            (root, leaf)
        } else {
            (encode_directory(&entries), Vec::new())
        };
        let root = gzip_stored(&root_plain);
        let metadata = gzip_stored(br#"{"name":"fixture","format":"compact"}"#);

        // Layout: header | root | metadata | leaves | tile data
        let root_offset = 127u64;
        let metadata_offset = root_offset + root.len() as u64;
        let leaf_offset = metadata_offset + metadata.len() as u64;
        let tile_data_offset = leaf_offset + leaf_region.len() as u64;

        let mut out = vec![0u8; 127];
        out[0..7].copy_from_slice(b"PMTiles");
        out[7] = 3;
        out[8..16].copy_from_slice(&root_offset.to_le_bytes());
        out[16..24].copy_from_slice(&(root.len() as u64).to_le_bytes());
        out[24..32].copy_from_slice(&metadata_offset.to_le_bytes());
        out[32..40].copy_from_slice(&(metadata.len() as u64).to_le_bytes());
        out[40..48].copy_from_slice(&leaf_offset.to_le_bytes());
        out[48..56].copy_from_slice(&(leaf_region.len() as u64).to_le_bytes());
        out[56..64].copy_from_slice(&tile_data_offset.to_le_bytes());
        out[64..72].copy_from_slice(&(tile_data.len() as u64).to_le_bytes());
        let addressed: u64 = self
            .tiles
            .iter()
            .map(|(_, run, _)| (*run).max(1))
            .sum();
        out[72..80].copy_from_slice(&addressed.to_le_bytes());
        out[80..88].copy_from_slice(&(self.tiles.len() as u64).to_le_bytes());
        out[88..96].copy_from_slice(&(self.tiles.len() as u64).to_le_bytes());
        out[96] = 1; // clustered
        out[97] = CODEC_GZIP; // internal compression
        out[98] = self.tile_codec;
        out[99] = 1; // vector tile type
        out[100] = self.min_zoom;
        out[101] = self.max_zoom;
        // bounds/center left at zero: not exercised by these tests

        out.extend_from_slice(&root);
        out.extend_from_slice(&metadata);
        out.extend_from_slice(&leaf_region);
        out.extend_from_slice(&tile_data);
        out
    }
}

/// Assemble an archive image from pre-encoded regions: an uncompressed root
/// directory, a leaf region of already-gzipped directory blobs, and raw tile
/// data. For fixtures the builder's entry bookkeeping can't express, like
/// chained leaf pointers.
pub fn archive_image(
    root_plain: &[u8],
    leaf_region: &[u8],
    tile_data: &[u8],
    min_zoom: u8,
    max_zoom: u8,
) -> Vec<u8> {
    let root = gzip_stored(root_plain);
    let metadata = gzip_stored(br#"{"name":"fixture","format":"compact"}"#);

    let root_offset = 127u64;
    let metadata_offset = root_offset + root.len() as u64;
    let leaf_offset = metadata_offset + metadata.len() as u64;
    let tile_data_offset = leaf_offset + leaf_region.len() as u64;

    let mut out = vec![0u8; 127];
    out[0..7].copy_from_slice(b"PMTiles");
    out[7] = 3;
    out[8..16].copy_from_slice(&root_offset.to_le_bytes());
    out[16..24].copy_from_slice(&(root.len() as u64).to_le_bytes());
    out[24..32].copy_from_slice(&metadata_offset.to_le_bytes());
    out[32..40].copy_from_slice(&(metadata.len() as u64).to_le_bytes());
    out[40..48].copy_from_slice(&leaf_offset.to_le_bytes());
    out[48..56].copy_from_slice(&(leaf_region.len() as u64).to_le_bytes());
    out[56..64].copy_from_slice(&tile_data_offset.to_le_bytes());
    out[64..72].copy_from_slice(&(tile_data.len() as u64).to_le_bytes());
    out[96] = 1; // clustered
    out[97] = CODEC_GZIP;
    out[98] = CODEC_GZIP;
    out[99] = 1; // vector tile type
    out[100] = min_zoom;
    out[101] = max_zoom;

    out.extend_from_slice(&root);
    out.extend_from_slice(&metadata);
    out.extend_from_slice(leaf_region);
    out.extend_from_slice(tile_data);
    out
}

/// A one-feature tile body most tests can share.
pub fn simple_tile_body() -> Vec<u8> {
    encode_inline_tile(
        "land",
        4096,
        &[FeatureSpec {
            id: 1,
            geom_code: 3,
            kind: "land",
            min_zoom: 0,
            coverage_mask: u64::MAX,
            commands: vec![9, 0, 0, 18, 8, 0, 0, 8, 7],
        }],
    )
}
