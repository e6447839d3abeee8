//! TOML-loadable block catalog implementing the lookup boundary.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::lookup::{BlockInfo, HullDetails};
use crate::types::{BlockStyle, EntityType};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog parse failed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("duplicate block id {0}")]
    DuplicateId(u16),
    #[error("block id {id}: unknown style code {style}")]
    UnknownStyle { id: u16, style: u8 },
    #[error("block id {id}: unknown entity key {key:?}")]
    UnknownEntity { id: u16, key: String },
}

fn default_hit_points() -> u16 {
    100
}

/// One catalog row as written in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDef {
    pub id: u16,
    pub name: String,
    #[serde(default)]
    pub style: u8,
    #[serde(default = "default_hit_points")]
    pub hit_points: u16,
    #[serde(default)]
    pub can_activate: bool,
    /// Entity kinds the block may exist on; empty means all.
    #[serde(default)]
    pub valid_on: Vec<String>,
    #[serde(default)]
    pub legacy_docking: bool,
    #[serde(default)]
    pub docking_replacement: Option<u16>,
    #[serde(default)]
    pub hull: Option<HullDef>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HullDef {
    pub tier: u8,
    pub color: u8,
    pub shape: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogConfig {
    #[serde(default, rename = "block")]
    blocks: Vec<BlockDef>,
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    style: BlockStyle,
    hit_points: u16,
    can_activate: bool,
    /// `None` means valid on every entity kind.
    valid_on: Option<HashSet<EntityType>>,
    legacy_docking: bool,
    docking_replacement: Option<u16>,
    hull: Option<HullDetails>,
}

/// Block metadata table keyed by id, with a reverse index over hull
/// family coordinates.
#[derive(Default, Debug, Clone)]
pub struct BlockCatalog {
    by_id: HashMap<u16, CatalogEntry>,
    hull_index: HashMap<(u8, u8, u8), u16>,
}

impl BlockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, def: BlockDef) -> Result<(), CatalogError> {
        if self.by_id.contains_key(&def.id) {
            return Err(CatalogError::DuplicateId(def.id));
        }
        let style = BlockStyle::from_code(def.style).ok_or(CatalogError::UnknownStyle {
            id: def.id,
            style: def.style,
        })?;
        let valid_on = if def.valid_on.is_empty() {
            None
        } else {
            let mut set = HashSet::new();
            for key in &def.valid_on {
                let entity =
                    EntityType::from_key(key).ok_or_else(|| CatalogError::UnknownEntity {
                        id: def.id,
                        key: key.clone(),
                    })?;
                set.insert(entity);
            }
            Some(set)
        };
        let hull = def.hull.map(|h| HullDetails {
            tier: h.tier,
            color: h.color,
            shape: h.shape,
        });
        if let Some(h) = hull {
            self.hull_index.insert((h.tier, h.color, h.shape), def.id);
        }
        self.by_id.insert(
            def.id,
            CatalogEntry {
                name: def.name,
                style,
                hit_points: def.hit_points,
                can_activate: def.can_activate,
                valid_on,
                legacy_docking: def.legacy_docking,
                docking_replacement: def.docking_replacement,
                hull,
            },
        );
        Ok(())
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, CatalogError> {
        let cfg: CatalogConfig = toml::from_str(toml_str)?;
        let mut catalog = BlockCatalog::new();
        for def in cfg.blocks {
            catalog.insert(def)?;
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn name_of(&self, id: u16) -> Option<&str> {
        self.by_id.get(&id).map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Compiled-in table covering the handful of block families the test
    /// suite and small tools need; real game tables load from TOML.
    pub fn minimal() -> Self {
        let mut catalog = BlockCatalog::new();
        let defs = [
            (1, "Ship Core", 0, 250, false, vec!["ship"]),
            (5, "Grey Hull", 0, 100, false, vec![]),
            (8, "Thruster", 0, 50, false, vec!["ship"]),
            (55, "White Light", 0, 50, true, vec![]),
            (282, "White Light Bar", 3, 50, true, vec![]),
            (293, "Grey Hull Wedge", 1, 100, false, vec![]),
            (302, "Grey Hull Corner", 2, 100, false, vec![]),
            (310, "Grey Hull Tetra", 4, 100, false, vec![]),
            (311, "Grey Hull Hepta", 5, 100, false, vec![]),
            (331, "Grey Standard Armor", 0, 200, false, vec![]),
            (332, "Grey Standard Armor Wedge", 1, 200, false, vec![]),
            (599, "Blue Standard Armor Wedge", 1, 75, false, vec![]),
            (662, "Rail Basic", 6, 100, false, vec![]),
            (665, "Rail Turret Axis", 6, 100, false, vec![]),
        ];
        for (id, name, style, hit_points, can_activate, valid_on) in defs {
            let def = BlockDef {
                id,
                name: name.to_string(),
                style,
                hit_points,
                can_activate,
                valid_on: valid_on.into_iter().map(str::to_string).collect(),
                legacy_docking: false,
                docking_replacement: None,
                hull: None,
            };
            // Ids above are distinct by construction.
            let _ = catalog.insert(def);
        }
        // Legacy docking modules: the turret docker gained a rail
        // replacement, the enhancer did not.
        let _ = catalog.insert(BlockDef {
            id: 7,
            name: "Turret Docking Unit".to_string(),
            style: 0,
            hit_points: 100,
            can_activate: false,
            valid_on: Vec::new(),
            legacy_docking: true,
            docking_replacement: Some(665),
            hull: None,
        });
        let _ = catalog.insert(BlockDef {
            id: 88,
            name: "Turret Docking Enhancer".to_string(),
            style: 0,
            hit_points: 100,
            can_activate: false,
            valid_on: Vec::new(),
            legacy_docking: true,
            docking_replacement: None,
            hull: None,
        });
        // Hull family coordinates for the armor tiers above.
        for (id, tier, color, shape) in [
            (5u16, 0u8, 0u8, 0u8),
            (293, 0, 0, 1),
            (302, 0, 0, 2),
            (310, 0, 0, 3),
            (311, 0, 0, 4),
            (331, 1, 0, 0),
            (332, 1, 0, 1),
            (599, 1, 5, 1),
        ] {
            if let Some(entry) = catalog.by_id.get_mut(&id) {
                let details = HullDetails { tier, color, shape };
                entry.hull = Some(details);
                catalog.hull_index.insert((tier, color, shape), id);
            }
        }
        catalog
    }
}

impl BlockInfo for BlockCatalog {
    fn style_of(&self, id: u16) -> Option<BlockStyle> {
        self.by_id.get(&id).map(|e| e.style)
    }

    fn default_hit_points(&self, id: u16) -> u16 {
        self.by_id.get(&id).map(|e| e.hit_points).unwrap_or(1)
    }

    fn can_activate(&self, id: u16) -> bool {
        self.by_id.get(&id).is_some_and(|e| e.can_activate)
    }

    fn is_valid_for(&self, id: u16, entity: EntityType) -> bool {
        match self.by_id.get(&id) {
            None => false,
            Some(entry) => match &entry.valid_on {
                None => true,
                Some(set) => set.contains(&entity),
            },
        }
    }

    fn is_legacy_docking(&self, id: u16) -> bool {
        self.by_id.get(&id).is_some_and(|e| e.legacy_docking)
    }

    fn docking_replacement(&self, id: u16) -> Option<u16> {
        self.by_id.get(&id).and_then(|e| e.docking_replacement)
    }

    fn is_hull(&self, id: u16) -> bool {
        self.by_id.get(&id).is_some_and(|e| e.hull.is_some())
    }

    fn details_of(&self, id: u16) -> Option<HullDetails> {
        self.by_id.get(&id).and_then(|e| e.hull)
    }

    fn hull_by_details(&self, details: HullDetails) -> Option<u16> {
        self.hull_index
            .get(&(details.tier, details.color, details.shape))
            .copied()
    }
}
