//! Shared enumerations: block styles, world axes, entity types, cube faces.

/// Geometric family of a block. Decides how the orientation bits of a packed
/// word are interpreted and how mirroring rewrites them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockStyle {
    /// Full cube oriented by a single side id (lights, thrusters, cores).
    Basic,
    Wedge,
    Corner,
    /// Rod-like block oriented by a side id over a rotated side enumeration.
    Rod,
    Tetra,
    Hepta,
    /// Corner-style axis/rotation pair with a two-face descriptor (rails).
    AxisRotation,
}

impl BlockStyle {
    pub fn from_code(code: u8) -> Option<BlockStyle> {
        match code {
            0 => Some(BlockStyle::Basic),
            1 => Some(BlockStyle::Wedge),
            2 => Some(BlockStyle::Corner),
            3 => Some(BlockStyle::Rod),
            4 => Some(BlockStyle::Tetra),
            5 => Some(BlockStyle::Hepta),
            6 => Some(BlockStyle::AxisRotation),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        match self {
            BlockStyle::Basic => 0,
            BlockStyle::Wedge => 1,
            BlockStyle::Corner => 2,
            BlockStyle::Rod => 3,
            BlockStyle::Tetra => 4,
            BlockStyle::Hepta => 5,
            BlockStyle::AxisRotation => 6,
        }
    }

    /// Styles whose orientation is a single side id rather than an
    /// (axis rotation, rotation count) pair.
    #[inline]
    pub fn is_side_oriented(self) -> bool {
        matches!(self, BlockStyle::Basic | BlockStyle::Rod)
    }
}

/// World axis for mirror planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Entity classification a blueprint belongs to. Passed into validity checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityType {
    Ship,
    Shop,
    Station,
    Asteroid,
    Planet,
}

impl EntityType {
    pub fn from_code(code: u8) -> Option<EntityType> {
        match code {
            0 => Some(EntityType::Ship),
            1 => Some(EntityType::Shop),
            2 => Some(EntityType::Station),
            3 => Some(EntityType::Asteroid),
            4 => Some(EntityType::Planet),
            _ => None,
        }
    }

    pub fn from_key(key: &str) -> Option<EntityType> {
        match key {
            "ship" => Some(EntityType::Ship),
            "shop" => Some(EntityType::Shop),
            "station" => Some(EntityType::Station),
            "asteroid" => Some(EntityType::Asteroid),
            "planet" => Some(EntityType::Planet),
            _ => None,
        }
    }

    #[inline]
    pub fn key(self) -> &'static str {
        match self {
            EntityType::Ship => "ship",
            EntityType::Shop => "shop",
            EntityType::Station => "station",
            EntityType::Asteroid => "asteroid",
            EntityType::Planet => "planet",
        }
    }
}

/// One of the six cube faces used by orientation descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
    Top,
    Bottom,
    Right,
    Left,
}

impl Face {
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Face::Front => "Front",
            Face::Back => "Back",
            Face::Top => "Top",
            Face::Bottom => "Bottom",
            Face::Right => "Right",
            Face::Left => "Left",
        }
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
            Face::Top => Face::Bottom,
            Face::Bottom => Face::Top,
            Face::Right => Face::Left,
            Face::Left => Face::Right,
        }
    }

    /// Reflects the face across the plane normal to `axis`. Faces not on
    /// that axis are unchanged.
    #[inline]
    pub fn mirrored(self, axis: Axis) -> Face {
        match (axis, self) {
            (Axis::X, Face::Right) => Face::Left,
            (Axis::X, Face::Left) => Face::Right,
            (Axis::Y, Face::Top) => Face::Bottom,
            (Axis::Y, Face::Bottom) => Face::Top,
            (Axis::Z, Face::Front) => Face::Back,
            (Axis::Z, Face::Back) => Face::Front,
            (_, f) => f,
        }
    }
}
