//! The whole-blueprint spatial index: Position -> BlockWord through the
//! region/segment hierarchy, plus the catalog-driven `update` pass.

use std::collections::HashMap;
use std::io::{Read, Write};

use log::debug;

use smedit_blocks::{BlockInfo, BlockPool, BlockWord, EntityType, orient};

use crate::GridError;
use crate::addr::{Position, local_index, position_from, region_of, segment_cell, segment_origin};
use crate::region::Region;
use crate::segment::Segment;

/// Sparse voxel structure addressed by absolute position. At most one
/// block word occupies a position; setting an occupied position replaces.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    regions: HashMap<(i32, i32, i32), Region>,
    pool: BlockPool,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has_block_at(&self, pos: Position) -> bool {
        self.segment_of(pos)
            .is_some_and(|s| s.get(local_index(pos)).is_some())
    }

    fn segment_of(&self, pos: Position) -> Option<&Segment> {
        self.regions
            .get(&region_of(pos))?
            .get(segment_cell(pos))
    }

    /// Block at `pos`. Asking for an absent position is a caller bug and
    /// fails rather than inventing a default.
    pub fn get(&self, pos: Position) -> Result<&BlockWord, GridError> {
        self.segment_of(pos)
            .and_then(|s| s.get(local_index(pos)))
            .map(|w| w.as_ref())
            .ok_or(GridError::PositionNotFound(pos))
    }

    /// Inserts or replaces the block at `pos`. Segments and regions are
    /// created lazily on first touch.
    pub fn set(&mut self, pos: Position, word: BlockWord) {
        let shared = self.pool.canonicalize(word);
        let region = self.regions.entry(region_of(pos)).or_default();
        let segment = region.get_or_create(segment_cell(pos), segment_origin(pos));
        segment.set(local_index(pos), shared);
    }

    /// Removes and returns the block at `pos`; the emptied segment (and
    /// region) is dropped immediately.
    pub fn remove(&mut self, pos: Position) -> Result<BlockWord, GridError> {
        let region_coord = region_of(pos);
        let region = self
            .regions
            .get_mut(&region_coord)
            .ok_or(GridError::PositionNotFound(pos))?;
        let cell = segment_cell(pos);
        let segment = region
            .get_mut(cell)
            .ok_or(GridError::PositionNotFound(pos))?;
        let removed = segment
            .remove(local_index(pos))
            .ok_or(GridError::PositionNotFound(pos))?;
        if !segment.has_data() {
            region.remove(cell);
        }
        if region.is_empty() {
            self.regions.remove(&region_coord);
        }
        Ok(*removed)
    }

    /// Total stored blocks.
    pub fn len(&self) -> usize {
        self.regions
            .values()
            .flat_map(|r| r.iter())
            .map(|(_, s)| s.block_count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn segment_count(&self) -> usize {
        self.regions.values().map(|r| r.segment_count()).sum()
    }

    /// Lazy walk over every stored block. No cross-position ordering is
    /// guaranteed; re-iterating after mutation reflects current state.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &BlockWord)> {
        self.regions.iter().flat_map(|(region_coord, region)| {
            let region_coord = *region_coord;
            region.iter().flat_map(move |(cell, segment)| {
                segment
                    .iter()
                    .map(move |(local, word)| (position_from(region_coord, cell, local), word.as_ref()))
            })
        })
    }

    /// Coordinates of every live region.
    pub fn region_coords(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        self.regions.keys().copied()
    }

    /// Bounding min/max of all stored positions, `None` when empty.
    pub fn bounds(&self) -> Option<(Position, Position)> {
        let mut blocks = self.iter().map(|(pos, _)| pos);
        let first = blocks.next()?;
        let (mut min, mut max) = (first, first);
        for pos in blocks {
            min = Position::new(min.x.min(pos.x), min.y.min(pos.y), min.z.min(pos.z));
            max = Position::new(max.x.max(pos.x), max.y.max(pos.y), max.z.max(pos.z));
        }
        Some((min, max))
    }

    /// Removes blocks invalid for `entity` and rewrites legacy docking
    /// modules onto their rail replacements (dropping modules with none).
    /// Emptied segments and regions are pruned as blocks go, so the pass
    /// is idempotent. A docking module whose side bits map to no rail
    /// orientation fails the whole pass before anything is mutated.
    pub fn update(&mut self, entity: EntityType, info: &dyn BlockInfo) -> Result<(), GridError> {
        let mut removals: Vec<Position> = Vec::new();
        let mut substitutions: Vec<(Position, BlockWord)> = Vec::new();
        for (pos, word) in self.iter() {
            let id = word.id();
            if info.is_legacy_docking(id) {
                match info.docking_replacement(id) {
                    Some(rail_id) => {
                        substitutions.push((pos, orient::to_style6(word, rail_id, info)?));
                    }
                    None => removals.push(pos),
                }
            } else if !info.is_valid_for(id, entity) {
                removals.push(pos);
            }
        }
        let dropped = removals.len();
        for pos in removals {
            self.remove(pos)?;
        }
        let substituted = substitutions.len();
        for (pos, rail) in substitutions {
            self.set(pos, rail);
        }
        self.pool.purge();
        debug!(
            "update({:?}): dropped {} blocks, substituted {} docking modules",
            entity, dropped, substituted
        );
        Ok(())
    }

    /// Reads one region file's segments into the index. Placement comes
    /// from each segment's own origin header, so the stream does not need
    /// to match the caller's idea of the region coordinate.
    pub fn load_region<R: Read>(&mut self, input: &mut R) -> Result<usize, GridError> {
        let region = Region::read_from(input, &mut self.pool)?;
        let mut merged = 0usize;
        for (_, segment) in region.iter() {
            merged += segment.block_count();
            let target = self.regions.entry(region_of(segment.origin)).or_default();
            target.insert(segment.clone());
        }
        Ok(merged)
    }

    /// Serializes the region at `coord`, if it exists and holds blocks.
    pub fn write_region<W: Write>(
        &self,
        coord: (i32, i32, i32),
        out: &mut W,
    ) -> Result<bool, GridError> {
        match self.regions.get(&coord) {
            Some(region) if !region.is_empty() => {
                region.write_to(out)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Distinct interned block values currently alive.
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }
}
