//! Chunked sparse spatial index for blueprint voxel data.
#![forbid(unsafe_code)]

pub mod addr;
pub mod index;
pub mod region;
pub mod segment;

pub use addr::{
    BLOCKS_PER_SEGMENT, CORE_POSITION, Position, REGION_EDGE, REGION_EDGE_SEGMENTS, SEGMENT_EDGE,
    cell_index, local_index, position_from, region_of, segment_cell, segment_origin,
};
pub use index::SpatialIndex;
pub use region::{REGION_VERSION, REGION_VERSION_LEGACY, Region, SEGMENT_SLOT_BYTES};
pub use segment::{SEGMENT_HEADER_BYTES, Segment};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    /// `get`/`remove` on an absent position: a contract violation at the
    /// call site, not a recoverable condition.
    #[error("no block at position {0:?}")]
    PositionNotFound(Position),
    #[error("malformed blueprint data: {0}")]
    Malformed(String),
    #[error("unsupported region format version {0}")]
    UnsupportedRegionVersion(u32),
    #[error(transparent)]
    Word(#[from] smedit_blocks::WordError),
    #[error(transparent)]
    Orientation(#[from] smedit_blocks::OrientationError),
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}
