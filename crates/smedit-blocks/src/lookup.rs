//! Block metadata lookup boundary.
//!
//! Everything the codec needs to know about a block id beyond its packed
//! bits comes through this trait, so game-version tables stay swappable
//! and no component reaches into a process-wide catalog.

use crate::types::{BlockStyle, EntityType};

/// Hull family coordinates of an armor block: armor tier, color, and
/// geometric shape slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HullDetails {
    pub tier: u8,
    pub color: u8,
    pub shape: u8,
}

pub trait BlockInfo {
    /// Geometric style of the block, `None` for ids the catalog does not
    /// know.
    fn style_of(&self, id: u16) -> Option<BlockStyle>;

    /// Hit points a freshly placed block of this id starts with.
    fn default_hit_points(&self, id: u16) -> u16;

    /// Whether the block has an on/off state at all.
    fn can_activate(&self, id: u16) -> bool;

    /// Whether the block may exist on the given entity classification.
    fn is_valid_for(&self, id: u16, entity: EntityType) -> bool;

    /// Whether the id is one of the pre-rail docking modules.
    fn is_legacy_docking(&self, id: u16) -> bool;

    /// Rail-based replacement for a legacy docking id, if one exists.
    fn docking_replacement(&self, id: u16) -> Option<u16>;

    fn is_hull(&self, id: u16) -> bool;

    /// Hull family coordinates for hull/armor ids.
    fn details_of(&self, id: u16) -> Option<HullDetails>;

    /// Reverse hull lookup: the id carrying the given family coordinates.
    fn hull_by_details(&self, details: HullDetails) -> Option<u16>;
}
