//! The packed 24-bit block word and its version-dependent bit layouts.
//!
//! Layouts, low bit to high (id is always bits [0,11)):
//!
//! - v0/v1: hit points [11,20), active bit 19 (aliases the top hit-point
//!   bit in these versions), rotation [20,22), axis rotation [22,24)
//! - v2:    hit points [11,19), active bit 19, rotation [20,22),
//!   axis rotation [22,24)
//! - v3:    hit points [11,18), active bit 18, rotation [19,21),
//!   axis rotation [21,24); bit 23 flags side-encoded (facing) orientation

use std::fmt;

use smedit_bits as bits;
use thiserror::Error;

use crate::lookup::BlockInfo;

/// Id 0 encodes "no block here".
pub const AIR_ID: u16 = 0;
/// The ship core block id.
pub const CORE_ID: u16 = 1;
/// Largest id representable in the 11-bit id field.
pub const MAX_BLOCK_ID: u16 = 0x7FF;
/// Current on-disk block format version.
pub const VERSION_LATEST: u8 = 3;

const ID_WIDTH: u32 = 11;
const HP_START: u32 = 11;
const ROT_WIDTH: u32 = 2;
const PACKED_MAX: u32 = 0xFF_FFFF;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WordError {
    #[error("unsupported block format version {0}")]
    UnsupportedVersion(u8),
    #[error("block id {0} outside 1..=2047")]
    IdOutOfRange(u16),
    #[error("packed block word {0:#08x} exceeds 24 bits")]
    Overflow(u32),
}

#[derive(Clone, Copy)]
struct Layout {
    hp_width: u32,
    active_bit: u32,
    rot_start: u32,
    axis_start: u32,
    axis_width: u32,
    /// Bit marking side-encoded orientation; present from v3 on.
    side_flag: Option<u32>,
}

#[inline]
const fn layout(version: u8) -> Layout {
    match version {
        0 | 1 => Layout {
            hp_width: 9,
            active_bit: 19,
            rot_start: 20,
            axis_start: 22,
            axis_width: 2,
            side_flag: None,
        },
        2 => Layout {
            hp_width: 8,
            active_bit: 19,
            rot_start: 20,
            axis_start: 22,
            axis_width: 2,
            side_flag: None,
        },
        _ => Layout {
            hp_width: 7,
            active_bit: 18,
            rot_start: 19,
            axis_start: 21,
            axis_width: 3,
            side_flag: Some(23),
        },
    }
}

#[inline]
fn check_version(version: u8) -> Result<(), WordError> {
    if version <= VERSION_LATEST {
        Ok(())
    } else {
        Err(WordError::UnsupportedVersion(version))
    }
}

/// Largest hit-point value a word of `version` can carry.
#[inline]
pub fn max_hit_points(version: u8) -> u16 {
    bits::mask(layout(version).hp_width) as u16
}

/// One non-empty voxel: an immutable 24-bit packed value plus the format
/// version that fixes its field boundaries. Two words with equal packed
/// value and version are interchangeable.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockWord {
    packed: u32,
    version: u8,
}

impl BlockWord {
    /// Decodes a big-endian byte triplet. `Ok(None)` is the empty marker
    /// (id 0); no other field of an empty word is looked at.
    pub fn decode(bytes: [u8; 3], version: u8) -> Result<Option<BlockWord>, WordError> {
        let packed =
            (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2]);
        BlockWord::from_packed(packed, version)
    }

    pub fn from_packed(packed: u32, version: u8) -> Result<Option<BlockWord>, WordError> {
        check_version(version)?;
        if packed > PACKED_MAX {
            return Err(WordError::Overflow(packed));
        }
        if bits::extract(packed, 0, ID_WIDTH) == 0 {
            return Ok(None);
        }
        Ok(Some(BlockWord { packed, version }))
    }

    /// Builds a word from field values. Hit points are clamped to the
    /// version's field width; rotation and axis rotation are masked to
    /// their fields.
    pub fn from_fields(
        id: u16,
        hit_points: u16,
        active: bool,
        axis_rotation: u8,
        rotation: u8,
        version: u8,
    ) -> Result<BlockWord, WordError> {
        check_version(version)?;
        if id == AIR_ID || id > MAX_BLOCK_ID {
            return Err(WordError::IdOutOfRange(id));
        }
        let l = layout(version);
        let hp = u32::from(hit_points).min(bits::mask(l.hp_width));
        let mut packed = bits::combine(u32::from(id), 0, 0);
        packed = bits::replace(packed, hp, HP_START, l.hp_width);
        packed = bits::replace(packed, u32::from(rotation), l.rot_start, ROT_WIDTH);
        packed = bits::replace(packed, u32::from(axis_rotation), l.axis_start, l.axis_width);
        if active {
            packed = bits::set_bit(packed, l.active_bit, true);
        }
        Ok(BlockWord { packed, version })
    }

    /// Builds a side-oriented word (basic/rod styles): packs `side` (0..6)
    /// into the rotation field plus the low axis bit, and raises the v3
    /// side flag where the layout has one.
    pub fn facing(
        id: u16,
        hit_points: u16,
        active: bool,
        side: u8,
        version: u8,
    ) -> Result<BlockWord, WordError> {
        check_version(version)?;
        let mut axis = (side >> 2) & 1;
        if layout(version).side_flag.is_some() {
            axis |= 0b100;
        }
        BlockWord::from_fields(id, hit_points, active, axis, side & 3, version)
    }

    /// Big-endian on-disk triplet.
    #[inline]
    pub fn encode(&self) -> [u8; 3] {
        [
            (self.packed >> 16) as u8,
            (self.packed >> 8) as u8,
            self.packed as u8,
        ]
    }

    #[inline]
    pub fn packed(&self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn version(&self) -> u8 {
        self.version
    }

    #[inline]
    pub fn id(&self) -> u16 {
        bits::extract(self.packed, 0, ID_WIDTH) as u16
    }

    #[inline]
    pub fn hit_points(&self) -> u16 {
        let l = layout(self.version);
        bits::extract(self.packed, HP_START, l.hp_width) as u16
    }

    /// The raw active bit, without consulting the block's style.
    #[inline]
    pub fn active_bit(&self) -> bool {
        bits::bit(self.packed, layout(self.version).active_bit)
    }

    /// Active state gated by the catalog: always false for blocks whose
    /// style does not support activation.
    #[inline]
    pub fn is_active(&self, info: &dyn BlockInfo) -> bool {
        self.active_bit() && info.can_activate(self.id())
    }

    /// Raw axis-rotation field (2 bits before v3, 3 bits from v3 on,
    /// including the side flag bit where present).
    #[inline]
    pub fn axis_rotation(&self) -> u8 {
        let l = layout(self.version);
        bits::extract(self.packed, l.axis_start, l.axis_width) as u8
    }

    /// Raw rotation-count field (0..4).
    #[inline]
    pub fn rotation(&self) -> u8 {
        bits::extract(self.packed, layout(self.version).rot_start, ROT_WIDTH) as u8
    }

    /// Side id for side-oriented styles: low axis bit and rotation field.
    #[inline]
    pub fn side(&self) -> u8 {
        ((self.axis_rotation() & 1) << 2) | self.rotation()
    }

    /// Every orientation bit above the active bit, as one raw value.
    #[inline]
    pub fn orientation_raw(&self) -> u8 {
        let l = layout(self.version);
        let start = l.rot_start;
        bits::extract(self.packed, start, 24 - start) as u8
    }

    /// New word with the axis-rotation and rotation fields replaced
    /// (clears any side flag; used for axis/rotation styles).
    #[inline]
    pub fn with_orientation(&self, axis_rotation: u8, rotation: u8) -> BlockWord {
        let l = layout(self.version);
        let mut packed =
            bits::replace(self.packed, u32::from(rotation), l.rot_start, ROT_WIDTH);
        packed = bits::replace(packed, u32::from(axis_rotation), l.axis_start, l.axis_width);
        BlockWord {
            packed,
            version: self.version,
        }
    }

    /// New word with the side id replaced (keeps the v3 side flag raised).
    #[inline]
    pub fn with_side(&self, side: u8) -> BlockWord {
        let mut axis = (side >> 2) & 1;
        if layout(self.version).side_flag.is_some() {
            axis |= 0b100;
        }
        self.with_orientation(axis, side & 3)
    }

    /// Field-wise modification producing a new word; `Ok(None)` when the
    /// new id is 0 (the empty marker wins over every other argument).
    /// Hit points not explicitly given default to the catalog value when
    /// the id changes, and are preserved otherwise.
    pub fn modify(
        &self,
        info: &dyn BlockInfo,
        new_id: Option<u16>,
        new_hit_points: Option<u16>,
        new_active: Option<bool>,
    ) -> Result<Option<BlockWord>, WordError> {
        if new_id == Some(AIR_ID) {
            return Ok(None);
        }
        let id = new_id.unwrap_or_else(|| self.id());
        let hit_points = match new_hit_points {
            Some(hp) => hp,
            None if id != self.id() => info.default_hit_points(id),
            None => self.hit_points(),
        };
        let active = new_active.unwrap_or_else(|| self.active_bit());
        let word = BlockWord::from_fields(
            id,
            hit_points,
            active,
            self.axis_rotation(),
            self.rotation(),
            self.version,
        )?;
        Ok(Some(word))
    }

    /// Re-derives the bit layout under `target` version, preserving the
    /// semantic fields. Hit points clamp to the narrower field; axis
    /// rotations above 3 cannot survive a move to the 2-bit pre-v3 field
    /// and are masked.
    pub fn convert(&self, target: u8, info: &dyn BlockInfo) -> Result<BlockWord, WordError> {
        check_version(target)?;
        if target == self.version {
            return Ok(*self);
        }
        let hit_points = self.hit_points().min(max_hit_points(target));
        let side_oriented = info
            .style_of(self.id())
            .is_some_and(|s| s.is_side_oriented());
        if side_oriented {
            BlockWord::facing(
                self.id(),
                hit_points,
                self.active_bit(),
                self.side(),
                target,
            )
        } else {
            let axis = self.axis_rotation() & bits::mask(layout(target).axis_width) as u8;
            BlockWord::from_fields(
                self.id(),
                hit_points,
                self.active_bit(),
                axis,
                self.rotation(),
                target,
            )
        }
    }

    /// Catalog-free version change: like `convert`, but side orientation
    /// is keyed off the word's own side flag (carried from v3 on) instead
    /// of a style lookup. Storage uses this to normalize mixed-version
    /// words at write time, where no catalog is in reach. A pre-v3 word
    /// carries no flag, so an upward move keeps its raw axis/rotation
    /// bits; the side id those bits encode is unchanged either way.
    pub fn to_version(&self, target: u8) -> Result<BlockWord, WordError> {
        check_version(target)?;
        if target == self.version {
            return Ok(*self);
        }
        let hit_points = self.hit_points().min(max_hit_points(target));
        let side_flagged = layout(self.version)
            .side_flag
            .is_some_and(|flag| bits::bit(self.packed, flag));
        if side_flagged {
            BlockWord::facing(
                self.id(),
                hit_points,
                self.active_bit(),
                self.side(),
                target,
            )
        } else {
            let axis = self.axis_rotation() & bits::mask(layout(target).axis_width) as u8;
            BlockWord::from_fields(
                self.id(),
                hit_points,
                self.active_bit(),
                axis,
                self.rotation(),
                target,
            )
        }
    }
}

impl fmt::Debug for BlockWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockWord")
            .field("id", &self.id())
            .field("hp", &self.hit_points())
            .field("active", &self.active_bit())
            .field("axis", &self.axis_rotation())
            .field("rot", &self.rotation())
            .field("version", &self.version)
            .finish()
    }
}
