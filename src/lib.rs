//! StarMade blueprint voxel core: block word codec, orientation model,
//! chunked spatial index, and whole-structure transforms.
#![forbid(unsafe_code)]

pub use smedit_bits as bits;
pub use smedit_blocks as blocks;
pub use smedit_grid as grid;
pub use smedit_io as io;
pub use smedit_transform as transform;

pub use smedit_blocks::{BlockCatalog, BlockInfo, BlockStyle, BlockWord, EntityType};
pub use smedit_grid::{CORE_POSITION, Position, SpatialIndex};
