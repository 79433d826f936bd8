//! Directory deserialization and tile lookup
//!
//! ## Serialization
//! ```text
//! varint entry count
//! [count × varint] tile IDs, delta-encoded (running sum)
//! [count × varint] run lengths (0 = pointer to a leaf directory)
//! [count × varint] byte lengths
//! [count × varint] byte offsets: 0 ⇒ follows the previous entry,
//!                  otherwise stored value − 1 is the absolute offset
//! ```
//! Tile IDs are strictly ascending, so lookup is a binary search with a
//! run-length check on the predecessor.

use crate::error::{Result, TileError};
use crate::varint::read_varint;

/// One directory row.
///
/// `run_length == 0` marks a pointer to a child leaf directory: the byte
/// range addresses that directory's compressed bytes, not a tile.
/// `run_length > 0` covers that many consecutive tile IDs, all aliasing the
/// same tile bytes (an ocean tile repeated across a region, for example).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub tile_id: u64,
    pub offset: u64,
    pub length: u64,
    pub run_length: u64,
}

/// A parsed directory: entries in strictly ascending tile-ID order.
#[derive(Debug)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

impl Directory {
    /// Deserialize a decompressed directory blob.
    ///
    /// An empty directory is a format error: every directory in a valid
    /// archive addresses at least one tile or leaf.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let count = read_varint(data, &mut pos)? as usize;
        if count == 0 {
            return Err(TileError::Format("empty directory".to_string()));
        }
        // Every entry occupies at least one byte in each of the four varint
        // columns, so a count past that bound cannot be backed by the buffer
        if count > data.len().saturating_sub(pos) / 4 {
            return Err(TileError::Format(format!(
                "directory entry count {count} exceeds buffer"
            )));
        }

        let mut entries = vec![
            DirEntry {
                tile_id: 0,
                offset: 0,
                length: 0,
                run_length: 0
            };
            count
        ];

        let mut last_id: u64 = 0;
        for (i, entry) in entries.iter_mut().enumerate() {
            let delta = read_varint(data, &mut pos)?;
            if i > 0 && delta == 0 {
                return Err(TileError::Format(
                    "directory tile IDs not strictly ascending".to_string(),
                ));
            }
            last_id += delta;
            entry.tile_id = last_id;
        }
        for entry in entries.iter_mut() {
            entry.run_length = read_varint(data, &mut pos)?;
        }
        for entry in entries.iter_mut() {
            entry.length = read_varint(data, &mut pos)?;
        }
        for i in 0..count {
            let stored = read_varint(data, &mut pos)?;
            entries[i].offset = if stored == 0 {
                if i == 0 {
                    return Err(TileError::Format(
                        "first directory entry has contiguous offset".to_string(),
                    ));
                }
                entries[i - 1].offset + entries[i - 1].length
            } else {
                stored - 1
            };
        }

        Ok(Self { entries })
    }

    /// Locate the entry covering `tile_id`, if any.
    ///
    /// On an exact-match miss the predecessor still answers when it is a
    /// leaf-directory pointer or when its run covers the queried ID.
    pub fn find_tile(&self, tile_id: u64) -> Option<&DirEntry> {
        match self
            .entries
            .binary_search_by(|entry| entry.tile_id.cmp(&tile_id))
        {
            Ok(idx) => Some(&self.entries[idx]),
            Err(0) => None,
            Err(idx) => {
                let prev = &self.entries[idx - 1];
                if prev.run_length == 0 || tile_id < prev.tile_id + prev.run_length {
                    Some(prev)
                } else {
                    None
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }
}
