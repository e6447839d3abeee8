//! Whole-structure geometric transforms over a spatial index: translate,
//! mirror-and-keep-both-halves, 90-degree turns, and bulk hull recoloring.
//!
//! Each transform rebuilds into a fresh index and swaps it in only once the
//! whole pass has succeeded, so a failed transform leaves the input intact.
#![forbid(unsafe_code)]

use log::info;
use thiserror::Error;

use smedit_blocks::{
    Axis, BlockInfo, BlockWord, CORE_ID, HullDetails, OrientationError, WordError, orient,
};
use smedit_grid::{CORE_POSITION, GridError, Position, SpatialIndex};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("position ({0}, {1}, {2}) leaves the representable grid")]
    OutOfRange(i32, i32, i32),
    #[error(transparent)]
    Orientation(#[from] OrientationError),
    #[error(transparent)]
    Word(#[from] WordError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// One of the six 90-degree reorientations about an axis through the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    TiltUp,
    TiltDown,
    TurnLeft,
    TurnRight,
    TiltLeft,
    TiltRight,
}

impl Turn {
    pub fn from_code(code: u8) -> Option<Turn> {
        match code {
            0 => Some(Turn::TiltUp),
            1 => Some(Turn::TiltDown),
            2 => Some(Turn::TurnLeft),
            3 => Some(Turn::TurnRight),
            4 => Some(Turn::TiltLeft),
            5 => Some(Turn::TiltRight),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Turn::TiltUp => 0,
            Turn::TiltDown => 1,
            Turn::TurnLeft => 2,
            Turn::TurnRight => 3,
            Turn::TiltLeft => 4,
            Turn::TiltRight => 5,
        }
    }

    /// Per output axis: which relative input axis feeds it, and with what
    /// sign.
    fn matrix(self) -> [(usize, i32); 3] {
        match self {
            Turn::TiltUp => [(0, 1), (2, 1), (1, -1)],
            Turn::TiltDown => [(0, 1), (2, -1), (1, 1)],
            Turn::TurnLeft => [(2, -1), (1, 1), (0, 1)],
            Turn::TurnRight => [(2, 1), (1, 1), (0, -1)],
            Turn::TiltLeft => [(1, -1), (0, 1), (2, 1)],
            Turn::TiltRight => [(1, 1), (0, -1), (2, 1)],
        }
    }
}

#[inline]
fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

fn checked_position(x: i32, y: i32, z: i32) -> Result<Position, TransformError> {
    match (i16::try_from(x), i16::try_from(y), i16::try_from(z)) {
        (Ok(x), Ok(y), Ok(z)) => Ok(Position::new(x, y, z)),
        _ => Err(TransformError::OutOfRange(x, y, z)),
    }
}

#[inline]
fn core_present(index: &SpatialIndex) -> bool {
    matches!(index.get(CORE_POSITION), Ok(w) if w.id() == CORE_ID)
}

/// Shifts every block by `-delta`. The core never moves, and any other
/// block that would land on the core position is dropped rather than
/// overwriting it. Returns the new bounding box, `None` if the structure
/// ended up empty.
pub fn translate(
    index: &mut SpatialIndex,
    delta: Position,
) -> Result<Option<(Position, Position)>, TransformError> {
    let anchored = core_present(index);
    let mut moved = SpatialIndex::new();
    let mut dropped = 0usize;
    for (pos, word) in index.iter() {
        if anchored && pos == CORE_POSITION && word.id() == CORE_ID {
            moved.set(pos, *word);
            continue;
        }
        let target = checked_position(
            i32::from(pos.x) - i32::from(delta.x),
            i32::from(pos.y) - i32::from(delta.y),
            i32::from(pos.z) - i32::from(delta.z),
        )?;
        if anchored && target == CORE_POSITION {
            dropped += 1;
            continue;
        }
        moved.set(target, *word);
    }
    let bounds = moved.bounds();
    *index = moved;
    if dropped > 0 {
        info!("translate dropped {} blocks landing on the core", dropped);
    }
    Ok(bounds)
}

/// Keeps one half of the structure relative to the mirror plane through
/// the core and rebuilds the other half as its reflection, block
/// orientations included. `reverse` selects the negative side as the kept
/// half. Blocks on the plane itself stay put and are not duplicated.
pub fn mirror(
    index: &mut SpatialIndex,
    axis: Axis,
    reverse: bool,
    info: &dyn BlockInfo,
) -> Result<(), TransformError> {
    let ai = axis_index(axis);
    let plane = i32::from(CORE_POSITION.component(ai));
    let mut symmetric = SpatialIndex::new();
    for (pos, word) in index.iter() {
        let c = i32::from(pos.component(ai));
        let kept = if reverse { c <= plane } else { c >= plane };
        if !kept {
            continue;
        }
        symmetric.set(pos, *word);
        if c == plane {
            continue;
        }
        let style = info
            .style_of(word.id())
            .ok_or(OrientationError::UnknownStyle(word.id()))?;
        let reflected_word = orient::mirror(word, style, axis)?;
        let r = 2 * plane - c;
        let reflected = match ai {
            0 => checked_position(r, i32::from(pos.y), i32::from(pos.z))?,
            1 => checked_position(i32::from(pos.x), r, i32::from(pos.z))?,
            _ => checked_position(i32::from(pos.x), i32::from(pos.y), r)?,
        };
        symmetric.set(reflected, reflected_word);
    }
    *index = symmetric;
    Ok(())
}

/// Rotates every position 90 degrees about the core per `step`. Orientation
/// bits are left untouched, so facing and docking alignment do not follow
/// the rotation. Known limitation carried over from the on-disk format's
/// editor lineage.
pub fn turn(index: &mut SpatialIndex, step: Turn) -> Result<(), TransformError> {
    let m = step.matrix();
    let core = [
        i32::from(CORE_POSITION.x),
        i32::from(CORE_POSITION.y),
        i32::from(CORE_POSITION.z),
    ];
    let mut rotated = SpatialIndex::new();
    for (pos, word) in index.iter() {
        let rel = [
            i32::from(pos.x) - core[0],
            i32::from(pos.y) - core[1],
            i32::from(pos.z) - core[2],
        ];
        let target = checked_position(
            core[0] + m[0].1 * rel[m[0].0],
            core[1] + m[1].1 * rel[m[1].0],
            core[2] + m[2].1 * rel[m[2].0],
        )?;
        rotated.set(target, *word);
    }
    *index = rotated;
    Ok(())
}

/// Rewrites every hull/armor block onto the same shape in the given tier
/// and color, keeping position and orientation. Blocks whose target
/// (tier, color, shape) has no catalog id are left alone. Returns how many
/// blocks changed.
pub fn replace_hull(
    index: &mut SpatialIndex,
    tier: u8,
    color: u8,
    info: &dyn BlockInfo,
) -> Result<usize, TransformError> {
    let mut changes: Vec<(Position, BlockWord)> = Vec::new();
    for (pos, word) in index.iter() {
        let Some(details) = info.details_of(word.id()) else {
            continue;
        };
        if details.tier == tier && details.color == color {
            continue;
        }
        let target = HullDetails {
            tier,
            color,
            shape: details.shape,
        };
        let Some(new_id) = info.hull_by_details(target) else {
            continue;
        };
        if let Some(new_word) = word.modify(info, Some(new_id), None, None)? {
            changes.push((pos, new_word));
        }
    }
    let count = changes.len();
    for (pos, word) in changes {
        index.set(pos, word);
    }
    Ok(count)
}
