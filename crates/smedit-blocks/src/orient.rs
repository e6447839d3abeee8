//! Per-style orientation tables and mirror transforms.
//!
//! The game's orientation encoding is an arbitrary table, not a closed-form
//! rotation group, so every style is a fixed bijection between its bit tuple
//! and a face-label tuple. Mirroring substitutes opposite faces in the
//! descriptor and reverse-looks-up the new bits; a tuple the mirror does not
//! touch keeps its bits unchanged.

use thiserror::Error;

use crate::lookup::BlockInfo;
use crate::types::{Axis, BlockStyle, Face};
use crate::word::{BlockWord, WordError};

use Face::{Back, Bottom, Front, Left, Right, Top};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrientationError {
    #[error("block id {0} has no style entry")]
    UnknownStyle(u16),
    #[error("style {style:?} has no orientation for axis {axis} rotation {rot}")]
    UnknownOrientation {
        style: BlockStyle,
        axis: u8,
        rot: u8,
    },
    #[error(transparent)]
    Word(#[from] WordError),
}

/// Human-readable facing of an oriented block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Single block side (basic and rod styles).
    Side(Face),
    /// Two touched faces (wedges, rails).
    Edge([Face; 2]),
    /// Three faces meeting in the block's shaped corner.
    Corner([Face; 3]),
}

impl Orientation {
    pub fn faces(&self) -> &[Face] {
        match self {
            Orientation::Side(f) => std::slice::from_ref(f),
            Orientation::Edge(fs) => fs,
            Orientation::Corner(fs) => fs,
        }
    }

    /// Descriptor label, e.g. `"Bottom, Front"`.
    pub fn label(&self) -> String {
        self.faces()
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Side-id enumeration for basic blocks.
const BASIC_SIDES: [Face; 6] = [Front, Back, Top, Bottom, Right, Left];
/// Rod blocks enumerate the same six sides rotated by two places.
const ROD_SIDES: [Face; 6] = [Top, Bottom, Right, Left, Front, Back];

/// Wedge descriptors indexed by [axis rotation][rotation count].
/// Axis 0/1 slope up from a horizontal face; axis 2 spans two side faces.
const WEDGE: [[[Face; 2]; 4]; 3] = [
    [
        [Bottom, Front],
        [Bottom, Right],
        [Bottom, Back],
        [Bottom, Left],
    ],
    [[Top, Front], [Top, Right], [Top, Back], [Top, Left]],
    [[Right, Front], [Right, Back], [Left, Back], [Left, Front]],
];

/// Corner descriptors indexed by [axis rotation][rotation count]: the three
/// faces meeting at the cut corner, leading with the base face. Word order
/// carries the twist, so all eight face combinations of each slot pattern
/// appear and the table stays closed under face substitution.
const CORNER: [[[Face; 3]; 4]; 6] = [
    [
        [Bottom, Front, Right],
        [Bottom, Back, Right],
        [Bottom, Back, Left],
        [Bottom, Front, Left],
    ],
    [
        [Top, Front, Right],
        [Top, Back, Right],
        [Top, Back, Left],
        [Top, Front, Left],
    ],
    [
        [Front, Right, Bottom],
        [Front, Right, Top],
        [Front, Left, Top],
        [Front, Left, Bottom],
    ],
    [
        [Back, Right, Bottom],
        [Back, Right, Top],
        [Back, Left, Top],
        [Back, Left, Bottom],
    ],
    [
        [Right, Bottom, Front],
        [Right, Top, Front],
        [Right, Top, Back],
        [Right, Bottom, Back],
    ],
    [
        [Left, Bottom, Front],
        [Left, Top, Front],
        [Left, Top, Back],
        [Left, Bottom, Back],
    ],
];

/// Tetra/hepta descriptors indexed by [axis bit][rotation count].
const TETRA: [[[Face; 3]; 4]; 2] = [
    [
        [Bottom, Front, Right],
        [Bottom, Back, Right],
        [Bottom, Back, Left],
        [Bottom, Front, Left],
    ],
    [
        [Top, Front, Right],
        [Top, Back, Right],
        [Top, Back, Left],
        [Top, Front, Left],
    ],
];

/// Rail (style 6) descriptors indexed by [axis rotation][rotation count]:
/// mount face pairs over all six axis slots.
const RAIL: [[[Face; 2]; 4]; 6] = [
    [[Bottom, Front], [Bottom, Back], [Top, Front], [Top, Back]],
    [[Bottom, Right], [Bottom, Left], [Top, Right], [Top, Left]],
    [[Front, Right], [Front, Left], [Back, Right], [Back, Left]],
    [[Front, Bottom], [Front, Top], [Back, Bottom], [Back, Top]],
    [[Right, Bottom], [Right, Top], [Left, Bottom], [Left, Top]],
    [[Right, Front], [Right, Back], [Left, Front], [Left, Back]],
];

/// Side id to style-6 (axis rotation, rotation count), used when a legacy
/// docking block is rewritten as a rail block facing the same way.
const SIDE_TO_STYLE6: [(u8, u8); 6] = [(0, 2), (0, 3), (3, 1), (3, 0), (4, 1), (4, 3)];

#[inline]
fn unknown(style: BlockStyle, word: &BlockWord) -> OrientationError {
    OrientationError::UnknownOrientation {
        style,
        axis: word.axis_rotation(),
        rot: word.rotation(),
    }
}

fn table_lookup<const N: usize>(
    table: &[[[Face; N]; 4]],
    style: BlockStyle,
    word: &BlockWord,
    axis: u8,
) -> Result<[Face; N], OrientationError> {
    table
        .get(axis as usize)
        .map(|row| row[(word.rotation() & 3) as usize])
        .ok_or_else(|| unknown(style, word))
}

fn reverse_lookup<const N: usize>(table: &[[[Face; N]; 4]], faces: [Face; N]) -> Option<(u8, u8)> {
    for (axis, row) in table.iter().enumerate() {
        for (rot, entry) in row.iter().enumerate() {
            if *entry == faces {
                return Some((axis as u8, rot as u8));
            }
        }
    }
    None
}

#[inline]
fn side_order(style: BlockStyle) -> &'static [Face; 6] {
    match style {
        BlockStyle::Rod => &ROD_SIDES,
        _ => &BASIC_SIDES,
    }
}

/// Interprets the orientation bits of `word` under `style`. Bit tuples
/// outside the style's table are an error, never a guessed default.
pub fn orientation(word: &BlockWord, style: BlockStyle) -> Result<Orientation, OrientationError> {
    match style {
        BlockStyle::Basic | BlockStyle::Rod => {
            let side = word.side() as usize;
            side_order(style)
                .get(side)
                .copied()
                .map(Orientation::Side)
                .ok_or_else(|| unknown(style, word))
        }
        BlockStyle::Wedge => {
            table_lookup(&WEDGE, style, word, word.axis_rotation()).map(Orientation::Edge)
        }
        BlockStyle::AxisRotation => {
            table_lookup(&RAIL, style, word, word.axis_rotation()).map(Orientation::Edge)
        }
        BlockStyle::Corner => {
            table_lookup(&CORNER, style, word, word.axis_rotation()).map(Orientation::Corner)
        }
        BlockStyle::Tetra | BlockStyle::Hepta => {
            table_lookup(&TETRA, style, word, word.axis_rotation() & 1).map(Orientation::Corner)
        }
    }
}

fn mirror_table<const N: usize>(
    table: &[[[Face; N]; 4]],
    style: BlockStyle,
    word: &BlockWord,
    lookup_axis: u8,
    mirror_axis: Axis,
) -> Result<BlockWord, OrientationError> {
    let faces = table_lookup(table, style, word, lookup_axis)?;
    let mirrored = faces.map(|f| f.mirrored(mirror_axis));
    if mirrored == faces {
        return Ok(*word);
    }
    let (axis, rot) = reverse_lookup(table, mirrored).ok_or_else(|| unknown(style, word))?;
    Ok(word.with_orientation(axis, rot))
}

/// Reflects the orientation of `word` across the plane normal to
/// `mirror_axis`, producing a new word with the same id, hit points, and
/// active bit. A no-op when the descriptor names no face on that axis.
pub fn mirror(
    word: &BlockWord,
    style: BlockStyle,
    mirror_axis: Axis,
) -> Result<BlockWord, OrientationError> {
    match style {
        BlockStyle::Basic | BlockStyle::Rod => {
            let order = side_order(style);
            let side = word.side() as usize;
            let face = order.get(side).copied().ok_or_else(|| unknown(style, word))?;
            let mirrored = face.mirrored(mirror_axis);
            if mirrored == face {
                return Ok(*word);
            }
            // The six-entry order holds every face, so this position exists.
            let new_side = order
                .iter()
                .position(|f| *f == mirrored)
                .ok_or_else(|| unknown(style, word))?;
            Ok(word.with_side(new_side as u8))
        }
        BlockStyle::Wedge => mirror_table(&WEDGE, style, word, word.axis_rotation(), mirror_axis),
        BlockStyle::AxisRotation => {
            mirror_table(&RAIL, style, word, word.axis_rotation(), mirror_axis)
        }
        BlockStyle::Corner => {
            mirror_table(&CORNER, style, word, word.axis_rotation(), mirror_axis)
        }
        BlockStyle::Tetra | BlockStyle::Hepta => {
            mirror_table(&TETRA, style, word, word.axis_rotation() & 1, mirror_axis)
        }
    }
}

/// Rewrites a side-oriented legacy docking word as a style-6 rail block
/// with id `new_id`, mapping the docking side onto the rail orientation
/// that names the same direction. Hit points reset to the new id's default.
pub fn to_style6(
    word: &BlockWord,
    new_id: u16,
    info: &dyn BlockInfo,
) -> Result<BlockWord, OrientationError> {
    let side = word.side() as usize;
    let (axis, rot) = *SIDE_TO_STYLE6
        .get(side)
        .ok_or_else(|| unknown(BlockStyle::AxisRotation, word))?;
    let hit_points = info.default_hit_points(new_id);
    Ok(BlockWord::from_fields(
        new_id,
        hit_points,
        word.active_bit(),
        axis,
        rot,
        word.version(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BlockCatalog;

    fn wedge(axis: u8, rot: u8) -> BlockWord {
        BlockWord::from_fields(599, 75, false, axis, rot, 3).unwrap()
    }

    #[test]
    fn wedge_labels_match_table() {
        assert_eq!(
            orientation(&wedge(0, 0), BlockStyle::Wedge).unwrap().label(),
            "Bottom, Front"
        );
        assert_eq!(
            orientation(&wedge(2, 0), BlockStyle::Wedge).unwrap().label(),
            "Right, Front"
        );
    }

    #[test]
    fn wedge_mirror_x_scenarios() {
        // "Bottom, Front" names no left/right face: unchanged bits
        let flat = mirror(&wedge(0, 0), BlockStyle::Wedge, Axis::X).unwrap();
        assert_eq!(flat, wedge(0, 0));
        // "Right, Front" becomes "Left, Front"
        let side = mirror(&wedge(2, 0), BlockStyle::Wedge, Axis::X).unwrap();
        assert_eq!(
            orientation(&side, BlockStyle::Wedge).unwrap().label(),
            "Left, Front"
        );
    }

    #[test]
    fn invalid_tuples_fail_fast() {
        // Wedge axis 3 has no table entry
        let bad = BlockWord::from_fields(599, 75, false, 3, 0, 3).unwrap();
        assert!(matches!(
            orientation(&bad, BlockStyle::Wedge),
            Err(OrientationError::UnknownOrientation { .. })
        ));
        // Side id 6/7 is not a cube face
        let bad_side = BlockWord::from_fields(55, 50, false, 1, 2, 3).unwrap();
        assert_eq!(bad_side.side(), 6);
        assert!(orientation(&bad_side, BlockStyle::Basic).is_err());
    }

    #[test]
    fn docking_side_zero_maps_to_rail() {
        let info = BlockCatalog::minimal();
        let docking = BlockWord::facing(7, 100, false, 0, 3).unwrap();
        let rail = to_style6(&docking, 665, &info).unwrap();
        assert_eq!(rail.id(), 665);
        assert_eq!(rail.axis_rotation(), 0);
        assert_eq!(rail.rotation(), 2);
    }

    #[test]
    fn every_style_mirror_is_involution() {
        let cases: Vec<(BlockStyle, u16, Vec<(u8, u8)>)> = vec![
            (
                BlockStyle::Wedge,
                599,
                (0..3).flat_map(|a| (0..4).map(move |r| (a, r))).collect(),
            ),
            (
                BlockStyle::Corner,
                302,
                (0..6).flat_map(|a| (0..4).map(move |r| (a, r))).collect(),
            ),
            (
                BlockStyle::AxisRotation,
                665,
                (0..6).flat_map(|a| (0..4).map(move |r| (a, r))).collect(),
            ),
            (
                BlockStyle::Tetra,
                310,
                (0..2).flat_map(|a| (0..4).map(move |r| (a, r))).collect(),
            ),
            (
                BlockStyle::Hepta,
                311,
                (0..2).flat_map(|a| (0..4).map(move |r| (a, r))).collect(),
            ),
        ];
        for (style, id, tuples) in cases {
            for (a, r) in tuples {
                let word = BlockWord::from_fields(id, 100, false, a, r, 3).unwrap();
                for axis in [Axis::X, Axis::Y, Axis::Z] {
                    let once = mirror(&word, style, axis).unwrap();
                    let twice = mirror(&once, style, axis).unwrap();
                    assert_eq!(twice, word, "{style:?} ({a},{r}) axis {axis:?}");
                }
            }
        }
        // Side-oriented styles over all six sides
        for style in [BlockStyle::Basic, BlockStyle::Rod] {
            for side in 0..6u8 {
                let word = BlockWord::facing(55, 50, false, side, 3).unwrap();
                for axis in [Axis::X, Axis::Y, Axis::Z] {
                    let once = mirror(&word, style, axis).unwrap();
                    let twice = mirror(&once, style, axis).unwrap();
                    assert_eq!(twice.side(), word.side());
                }
            }
        }
    }

    #[test]
    fn forward_tables_have_reverse_entries() {
        // Every descriptor produced by orientation() reverse-maps to its own
        // bit tuple, and mirrored descriptors stay inside the table.
        for a in 0..6u8 {
            for r in 0..4u8 {
                assert_eq!(reverse_lookup(&CORNER, CORNER[a as usize][r as usize]), Some((a, r)));
                assert_eq!(reverse_lookup(&RAIL, RAIL[a as usize][r as usize]), Some((a, r)));
                for axis in [Axis::X, Axis::Y, Axis::Z] {
                    let m = CORNER[a as usize][r as usize].map(|f| f.mirrored(axis));
                    assert!(reverse_lookup(&CORNER, m).is_some());
                    let m = RAIL[a as usize][r as usize].map(|f| f.mirrored(axis));
                    assert!(reverse_lookup(&RAIL, m).is_some());
                }
            }
        }
        for a in 0..3u8 {
            for r in 0..4u8 {
                assert_eq!(reverse_lookup(&WEDGE, WEDGE[a as usize][r as usize]), Some((a, r)));
                for axis in [Axis::X, Axis::Y, Axis::Z] {
                    let m = WEDGE[a as usize][r as usize].map(|f| f.mirrored(axis));
                    assert!(reverse_lookup(&WEDGE, m).is_some());
                }
            }
        }
    }
}
