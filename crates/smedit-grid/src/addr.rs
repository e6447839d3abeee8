//! Absolute position to (region, segment cell, local index) arithmetic.
//!
//! A segment is a 32-cube of positions; a region is a 16-cube of segments
//! (512 blocks per axis). Region coordinates carry a half-region shift so
//! the canonical core position lands near the center of region (0,0,0).

/// Segment edge length in blocks.
pub const SEGMENT_EDGE: i32 = 32;
/// Region edge length in segments.
pub const REGION_EDGE_SEGMENTS: i32 = 16;
/// Region edge length in blocks.
pub const REGION_EDGE: i32 = SEGMENT_EDGE * REGION_EDGE_SEGMENTS;
const REGION_HALF: i32 = REGION_EDGE / 2;
/// Local block slots per segment.
pub const BLOCKS_PER_SEGMENT: usize =
    (SEGMENT_EDGE * SEGMENT_EDGE * SEGMENT_EDGE) as usize;

/// Absolute block position. The game world is bounded, so signed 16-bit
/// components cover every reachable coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// The ship core sits here, permanently.
pub const CORE_POSITION: Position = Position::new(16, 16, 16);

impl Position {
    #[inline]
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Sort key for the canonical z,y,x serialization order.
    #[inline]
    pub fn zyx_key(self) -> (i16, i16, i16) {
        (self.z, self.y, self.x)
    }

    #[inline]
    pub fn component(self, axis_index: usize) -> i16 {
        match axis_index {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

/// Region coordinate containing `pos`, half-region shifted.
#[inline]
pub fn region_of(pos: Position) -> (i32, i32, i32) {
    (
        (i32::from(pos.x) + REGION_HALF).div_euclid(REGION_EDGE),
        (i32::from(pos.y) + REGION_HALF).div_euclid(REGION_EDGE),
        (i32::from(pos.z) + REGION_HALF).div_euclid(REGION_EDGE),
    )
}

/// Absolute origin of the segment containing `pos` (each component floored
/// to a multiple of the segment edge).
#[inline]
pub fn segment_origin(pos: Position) -> Position {
    Position::new(
        (i32::from(pos.x).div_euclid(SEGMENT_EDGE) * SEGMENT_EDGE) as i16,
        (i32::from(pos.y).div_euclid(SEGMENT_EDGE) * SEGMENT_EDGE) as i16,
        (i32::from(pos.z).div_euclid(SEGMENT_EDGE) * SEGMENT_EDGE) as i16,
    )
}

#[inline]
fn cell_component(value: i16) -> u8 {
    ((i32::from(value) + REGION_HALF).rem_euclid(REGION_EDGE) / SEGMENT_EDGE) as u8
}

/// Segment grid cell (0..16 per axis) of `pos` within its region.
#[inline]
pub fn segment_cell(pos: Position) -> (u8, u8, u8) {
    (
        cell_component(pos.x),
        cell_component(pos.y),
        cell_component(pos.z),
    )
}

/// Linear slot of a segment cell in a region's index: x + y*16 + z*256.
#[inline]
pub fn cell_index(cell: (u8, u8, u8)) -> usize {
    usize::from(cell.0)
        + usize::from(cell.1) * REGION_EDGE_SEGMENTS as usize
        + usize::from(cell.2) * (REGION_EDGE_SEGMENTS * REGION_EDGE_SEGMENTS) as usize
}

/// Local block slot of `pos` within its segment: x + y*32 + z*1024.
#[inline]
pub fn local_index(pos: Position) -> u16 {
    let lx = i32::from(pos.x).rem_euclid(SEGMENT_EDGE);
    let ly = i32::from(pos.y).rem_euclid(SEGMENT_EDGE);
    let lz = i32::from(pos.z).rem_euclid(SEGMENT_EDGE);
    (lx + ly * SEGMENT_EDGE + lz * SEGMENT_EDGE * SEGMENT_EDGE) as u16
}

/// Inverse of the three projections above: recovers the absolute position
/// from its region coordinate, segment cell, and local index.
#[inline]
pub fn position_from(region: (i32, i32, i32), cell: (u8, u8, u8), local: u16) -> Position {
    let local = i32::from(local);
    let lx = local % SEGMENT_EDGE;
    let ly = (local / SEGMENT_EDGE) % SEGMENT_EDGE;
    let lz = local / (SEGMENT_EDGE * SEGMENT_EDGE);
    Position::new(
        (region.0 * REGION_EDGE - REGION_HALF + i32::from(cell.0) * SEGMENT_EDGE + lx) as i16,
        (region.1 * REGION_EDGE - REGION_HALF + i32::from(cell.1) * SEGMENT_EDGE + ly) as i16,
        (region.2 * REGION_EDGE - REGION_HALF + i32::from(cell.2) * SEGMENT_EDGE + lz) as i16,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_maps_near_region_center() {
        assert_eq!(region_of(CORE_POSITION), (0, 0, 0));
        assert_eq!(segment_cell(CORE_POSITION), (8, 8, 8));
        assert_eq!(segment_origin(CORE_POSITION), Position::new(0, 0, 0));
    }

    #[test]
    fn negative_positions_floor() {
        let p = Position::new(-1, -33, -257);
        assert_eq!(segment_origin(p), Position::new(-32, -64, -288));
        assert_eq!(region_of(p), (0, 0, -1));
        assert_eq!(local_index(Position::new(-1, 0, 0)), 31);
    }

    #[test]
    fn roundtrip_spot_checks() {
        for p in [
            CORE_POSITION,
            Position::new(0, 0, 0),
            Position::new(-256, -256, -256),
            Position::new(255, 255, 255),
            Position::new(-257, 300, -1),
            Position::new(i16::MIN + 300, i16::MAX - 300, 0),
        ] {
            let back = position_from(region_of(p), segment_cell(p), local_index(p));
            assert_eq!(back, p);
        }
    }
}
