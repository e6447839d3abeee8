//! Block word codec, orientation model, catalog, and interning pool.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod lookup;
pub mod orient;
pub mod pool;
pub mod types;
pub mod word;

pub use catalog::{BlockCatalog, BlockDef, CatalogError};
pub use lookup::{BlockInfo, HullDetails};
pub use orient::{Orientation, OrientationError};
pub use pool::BlockPool;
pub use types::{Axis, BlockStyle, EntityType, Face};
pub use word::{AIR_ID, BlockWord, CORE_ID, MAX_BLOCK_ID, VERSION_LATEST, WordError};
