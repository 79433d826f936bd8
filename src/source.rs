//! Byte-range read collaborator
//!
//! The engine never touches the filesystem directly; everything flows through
//! the narrow synchronous `RangeReader` contract. `FileSource` is the
//! on-device implementation, `MemorySource` backs tests and benches.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{Result, TileError};

/// Synchronous byte-range access to a backing resource.
pub trait RangeReader: Send + Sync {
    /// Read exactly `length` bytes starting at `offset`.
    fn read_range(&self, offset: u64, length: u64) -> Result<Bytes>;

    /// Total size of the backing resource in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// File-backed source
// =============================================================================

/// A file on local storage.
///
/// The file handle sits behind a mutex so `read_range` can seek from `&self`.
/// Reads are short; contention is not a concern.
pub struct FileSource {
    file: Mutex<File>,
    size: u64,
}

impl FileSource {
    /// Open a file, returning `Ok(None)` if it does not exist.
    ///
    /// A missing backing file is a normal outcome (the archive was never
    /// transferred to the device), not an error.
    pub fn open(path: &Path) -> Result<Option<Self>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata()?.len();
        Ok(Some(Self {
            file: Mutex::new(file),
            size,
        }))
    }
}

impl RangeReader for FileSource {
    fn read_range(&self, offset: u64, length: u64) -> Result<Bytes> {
        if offset.checked_add(length).filter(|&e| e <= self.size).is_none() {
            return Err(TileError::RangeOutOfBounds {
                offset,
                length,
                size: self.size,
            });
        }
        let mut buf = vec![0u8; length as usize];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    fn len(&self) -> u64 {
        self.size
    }
}

// =============================================================================
// In-memory source
// =============================================================================

/// A fully in-memory archive, used by tests and benches.
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl RangeReader for MemorySource {
    fn read_range(&self, offset: u64, length: u64) -> Result<Bytes> {
        let end = offset
            .checked_add(length)
            .filter(|&e| e <= self.data.len() as u64)
            .ok_or(TileError::RangeOutOfBounds {
                offset,
                length,
                size: self.data.len() as u64,
            })?;
        Ok(self.data.slice(offset as usize..end as usize))
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }
}
