//! # TileVault
//!
//! An embedded map-tile engine for resource-constrained devices:
//! - Single-file tile archive reader (PMTiles-style header + hierarchical directory)
//! - From-scratch DEFLATE/gzip decompression (no codec library)
//! - Compact vector-tile geometry decoding (MoveTo/LineTo/ClosePath command streams)
//! - Bounded tile/directory caches and viewport visibility planning
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ViewportPlanner                           │
//! │         (view bbox + fractional zoom → tile queries)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      TileCache                               │
//! │              (FIFO, tagged Hit/Miss slots)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ miss
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Archive   │          │  Compress   │
//!   │   Reader    │─────────▶│ (gunzip /   │
//!   │ (directory  │          │  inflate)   │
//!   │   walk)     │          └──────┬──────┘
//!   └──────┬──────┘                 │
//!          │                        ▼
//!          ▼                 ┌─────────────┐
//!   ┌─────────────┐          │    Tile     │
//!   │ RangeReader │          │  (decode)   │
//!   │ (byte I/O)  │          └─────────────┘
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod varint;
pub mod compress;
pub mod source;
pub mod archive;
pub mod tile;
pub mod cache;
pub mod viewport;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TileError};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of TileVault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
