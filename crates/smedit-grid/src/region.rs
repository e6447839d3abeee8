//! Region container: a 16-cube of segment slots backing one on-disk file.
//!
//! Current layout: a version word, then 4096 fixed 4-byte index slots
//! (identifier, record size) in segment-grid linear order, then the segment
//! records in ascending identifier order. Identifier 0 marks an empty slot.
//! The legacy layout instead stores one fixed 49152-byte record per slot.

use std::collections::HashMap;
use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use smedit_blocks::BlockPool;

use crate::GridError;
use crate::addr::{REGION_EDGE_SEGMENTS, cell_index, segment_cell};
use crate::segment::{SEGMENT_HEADER_BYTES, Segment};

/// Version word of the identifier-indexed layout.
pub const REGION_VERSION: u32 = 2;
/// Version word of the fixed-slot layout.
pub const REGION_VERSION_LEGACY: u32 = 1;
/// Record size of one segment slot in the legacy layout.
pub const SEGMENT_SLOT_BYTES: usize = 49152;

const SEGMENT_SLOTS: usize =
    (REGION_EDGE_SEGMENTS * REGION_EDGE_SEGMENTS * REGION_EDGE_SEGMENTS) as usize;

/// Sparse mapping from segment grid cell to segment.
#[derive(Debug, Default)]
pub struct Region {
    segments: HashMap<(u8, u8, u8), Segment>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, cell: (u8, u8, u8)) -> Option<&Segment> {
        self.segments.get(&cell)
    }

    pub fn get_mut(&mut self, cell: (u8, u8, u8)) -> Option<&mut Segment> {
        self.segments.get_mut(&cell)
    }

    /// Segment at `cell`, created empty on first touch.
    pub fn get_or_create(&mut self, cell: (u8, u8, u8), origin: crate::Position) -> &mut Segment {
        self.segments
            .entry(cell)
            .or_insert_with(|| Segment::new(origin))
    }

    pub fn insert(&mut self, segment: Segment) {
        self.segments.insert(segment_cell(segment.origin), segment);
    }

    pub fn remove(&mut self, cell: (u8, u8, u8)) -> Option<Segment> {
        self.segments.remove(&cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = ((u8, u8, u8), &Segment)> {
        self.segments.iter().map(|(cell, segment)| (*cell, segment))
    }

    /// Writes the identifier-indexed layout. Identifiers are assigned
    /// sequentially from 1 in z,y,x cell order so output is deterministic.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), GridError> {
        let mut cells: Vec<(u8, u8, u8)> = self
            .segments
            .iter()
            .filter(|(_, segment)| segment.has_data())
            .map(|(cell, _)| *cell)
            .collect();
        cells.sort_by_key(|c| (c.2, c.1, c.0));

        let mut index = vec![(0u16, 0u16); SEGMENT_SLOTS];
        let mut records: Vec<Vec<u8>> = Vec::with_capacity(cells.len());
        for (ordinal, cell) in cells.iter().enumerate() {
            // Cells come from the map's own keys.
            let segment = self
                .segments
                .get(cell)
                .ok_or_else(|| GridError::Malformed("segment cell vanished".into()))?;
            let mut record = Vec::with_capacity(SEGMENT_HEADER_BYTES);
            segment.write_to(&mut record)?;
            let size = u16::try_from(record.len()).map_err(|_| {
                GridError::Malformed(format!(
                    "segment record of {} bytes overflows its index slot",
                    record.len()
                ))
            })?;
            index[cell_index(*cell)] = (ordinal as u16 + 1, size);
            records.push(record);
        }

        out.write_u32::<BigEndian>(REGION_VERSION)?;
        for (identifier, size) in &index {
            out.write_u16::<BigEndian>(*identifier)?;
            out.write_u16::<BigEndian>(*size)?;
        }
        for record in &records {
            out.write_all(record)?;
        }
        Ok(())
    }

    /// Reads either region layout. Segments are placed by the absolute
    /// origin in their own headers, not by index slot, so identifier order
    /// and slot order need not correspond. Segments that decode empty are
    /// discarded.
    pub fn read_from<R: Read>(input: &mut R, pool: &mut BlockPool) -> Result<Region, GridError> {
        let version = input.read_u32::<BigEndian>()?;
        match version {
            REGION_VERSION => Self::read_indexed(input, pool),
            REGION_VERSION_LEGACY => Self::read_legacy(input, pool),
            other => Err(GridError::UnsupportedRegionVersion(other)),
        }
    }

    fn read_indexed<R: Read>(input: &mut R, pool: &mut BlockPool) -> Result<Region, GridError> {
        let mut populated = 0usize;
        for _ in 0..SEGMENT_SLOTS {
            let identifier = input.read_u16::<BigEndian>()?;
            let _size = input.read_u16::<BigEndian>()?;
            if identifier != 0 {
                populated += 1;
            }
        }
        let mut region = Region::new();
        for _ in 0..populated {
            let segment = Segment::read_from(input, pool)?;
            if segment.has_data() {
                region.insert(segment);
            }
        }
        Ok(region)
    }

    fn read_legacy<R: Read>(input: &mut R, pool: &mut BlockPool) -> Result<Region, GridError> {
        let mut region = Region::new();
        let mut slot = vec![0u8; SEGMENT_SLOT_BYTES];
        for _ in 0..SEGMENT_SLOTS {
            match input.read_exact(&mut slot) {
                Ok(()) => {}
                // Trailing empty slots may be truncated away entirely.
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            // An all-zero header means the slot never held a segment.
            if slot[..SEGMENT_HEADER_BYTES].iter().all(|b| *b == 0) {
                continue;
            }
            let segment = Segment::read_from(&mut slot.as_slice(), pool)?;
            if segment.has_data() {
                region.insert(segment);
            }
        }
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::{Position, local_index, segment_origin};
    use smedit_blocks::BlockWord;

    fn seed_region(pool: &mut BlockPool) -> Region {
        let mut region = Region::new();
        for (pos, id) in [
            (Position::new(0, 0, 0), 5u16),
            (Position::new(31, 31, 31), 599),
            (Position::new(64, 0, 0), 665),
            (Position::new(0, 96, 0), 55),
        ] {
            let origin = segment_origin(pos);
            let cell = segment_cell(origin);
            let word = BlockWord::from_fields(id, 100, false, 0, 0, 3).unwrap();
            region
                .get_or_create(cell, origin)
                .set(local_index(pos), pool.canonicalize(word));
        }
        region
    }

    #[test]
    fn indexed_roundtrip_preserves_block_set() {
        let mut pool = BlockPool::new();
        let region = seed_region(&mut pool);
        let mut bytes = Vec::new();
        region.write_to(&mut bytes).unwrap();

        let back = Region::read_from(&mut bytes.as_slice(), &mut pool).unwrap();
        assert_eq!(back.segment_count(), region.segment_count());
        for (cell, segment) in region.iter() {
            let other = back.get(cell).unwrap();
            assert_eq!(other.origin, segment.origin);
            assert_eq!(other.block_count(), segment.block_count());
            for (local, word) in segment.iter() {
                assert_eq!(other.get(local).map(|w| **w), Some(**word));
            }
        }
    }

    #[test]
    fn index_slots_follow_zyx_identifier_order() {
        let mut pool = BlockPool::new();
        let region = seed_region(&mut pool);
        let mut bytes = Vec::new();
        region.write_to(&mut bytes).unwrap();
        assert_eq!(u32::from_be_bytes(bytes[0..4].try_into().unwrap()), REGION_VERSION);

        // Non-zero identifiers, read in slot (x,y,z linear) order, must be a
        // permutation of 1..=N; z,y,x cell sorting makes the mapping stable.
        let mut identifiers = Vec::new();
        for slot in 0..SEGMENT_SLOTS {
            let at = 4 + slot * 4;
            let id = u16::from_be_bytes(bytes[at..at + 2].try_into().unwrap());
            if id != 0 {
                identifiers.push(id);
            }
        }
        let mut sorted = identifiers.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_segments_are_not_written() {
        let mut pool = BlockPool::new();
        let mut region = seed_region(&mut pool);
        // Empty out one segment without pruning it.
        let cell = segment_cell(Position::new(64, 0, 0));
        region.get_mut(cell).unwrap().remove(local_index(Position::new(64, 0, 0)));
        let mut bytes = Vec::new();
        region.write_to(&mut bytes).unwrap();
        let back = Region::read_from(&mut bytes.as_slice(), &mut pool).unwrap();
        assert_eq!(back.segment_count(), 3);
        assert!(back.get(cell).is_none());
    }

    #[test]
    fn oversized_segment_record_is_rejected() {
        let mut pool = BlockPool::new();
        let mut region = Region::new();
        let origin = Position::new(0, 0, 0);
        let segment = region.get_or_create(segment_cell(origin), origin);
        // A full segment of pseudo-random words deflates to more than the
        // 16-bit index slot can describe
        let mut state = 0x9E37_79B9u32;
        for local in 0..crate::addr::BLOCKS_PER_SEGMENT as u32 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let mut packed = state & 0xFF_FFFF;
            if packed & 0x7FF == 0 {
                packed |= 1;
            }
            let word = BlockWord::from_packed(packed, 3).unwrap().unwrap();
            segment.set(local as u16, pool.canonicalize(word));
        }
        let mut bytes = Vec::new();
        assert!(matches!(
            region.write_to(&mut bytes),
            Err(GridError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_region_version_is_fatal() {
        let mut pool = BlockPool::new();
        let bytes = 7u32.to_be_bytes();
        let err = Region::read_from(&mut bytes.as_slice(), &mut pool);
        assert!(matches!(err, Err(GridError::UnsupportedRegionVersion(7))));
    }
}
