//! End-to-end blueprint flow: build a structure in memory, save it as a
//! directory of region files, load it back, transform it, and verify the
//! invariants the editor relies on.

use smedit::blocks::{BlockCatalog, BlockWord, CORE_ID, orient};
use smedit::grid::{GridError, Position, SpatialIndex};
use smedit::io::{load_blueprint, save_blueprint};
use smedit::transform;
use smedit::{BlockInfo, CORE_POSITION, EntityType};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn word(id: u16, hp: u16) -> BlockWord {
    BlockWord::from_fields(id, hp, false, 0, 0, 3).unwrap()
}

/// A small ship: core, a hull shell around it, and a far-flung thruster
/// nacelle spanning several regions.
fn build_ship(info: &BlockCatalog) -> SpatialIndex {
    let mut index = SpatialIndex::new();
    index.set(
        CORE_POSITION,
        BlockWord::from_fields(CORE_ID, info.default_hit_points(CORE_ID), false, 0, 0, 3).unwrap(),
    );
    for dx in -2i16..=2 {
        for dz in -2i16..=2 {
            if (dx, dz) == (0, 0) {
                continue;
            }
            index.set(
                Position::new(CORE_POSITION.x + dx, CORE_POSITION.y - 1, CORE_POSITION.z + dz),
                word(5, 100),
            );
        }
    }
    // Nacelle two regions out on +x
    for i in 0..10i16 {
        index.set(Position::new(700 + i, 16, 16), word(8, 50));
    }
    // A legacy turret docker on top
    index.set(
        Position::new(16, 20, 16),
        BlockWord::facing(7, 100, false, 0, 3).unwrap(),
    );
    index
}

#[test]
fn save_load_roundtrip_preserves_every_block() {
    init_logging();
    let info = BlockCatalog::minimal();
    let index = build_ship(&info);
    let dir = tempfile::tempdir().unwrap();

    save_blueprint(dir.path(), "Integration", &index).unwrap();
    let back = load_blueprint(dir.path()).unwrap();

    assert_eq!(back.len(), index.len());
    for (pos, stored) in index.iter() {
        assert_eq!(back.get(pos).unwrap().packed(), stored.packed());
        assert_eq!(back.get(pos).unwrap().version(), stored.version());
    }

    // Writing the loaded copy again produces byte-identical region files.
    let second = tempfile::tempdir().unwrap();
    save_blueprint(second.path(), "Integration", &back).unwrap();
    for coord in back.region_coords() {
        let name = smedit::io::region_file_name("Integration", coord);
        let a = std::fs::read(dir.path().join(&name)).unwrap();
        let b = std::fs::read(second.path().join(&name)).unwrap();
        // Loading preserves segment timestamps, so the rewrite is exact.
        assert_eq!(a, b);
    }
}

#[test]
fn update_converts_legacy_docking_and_prunes() {
    init_logging();
    let info = BlockCatalog::minimal();
    let mut index = build_ship(&info);
    let blocks_before = index.len();

    index.update(EntityType::Ship, &info).unwrap();

    // The docker became a rail turret axis with the documented orientation
    let rail = index.get(Position::new(16, 20, 16)).unwrap();
    assert_eq!(rail.id(), 665);
    assert_eq!(rail.axis_rotation(), 0);
    assert_eq!(rail.rotation(), 2);
    assert_eq!(index.len(), blocks_before);

    // On a station the core and thrusters are invalid and disappear,
    // along with their now-empty segments and regions.
    index.update(EntityType::Station, &info).unwrap();
    assert!(matches!(
        index.get(CORE_POSITION),
        Err(GridError::PositionNotFound(_))
    ));
    assert!(!index.has_block_at(Position::new(700, 16, 16)));
    for coord in index.region_coords().collect::<Vec<_>>() {
        let mut bytes = Vec::new();
        assert!(index.write_region(coord, &mut bytes).unwrap());
    }
}

#[test]
fn bulk_update_across_segments_and_regions() {
    init_logging();
    let info = BlockCatalog::minimal();
    let mut index = SpatialIndex::new();
    // 40,000 blocks spanning multiple segments and regions, alternating
    // between hull (valid anywhere) and thrusters (ships only).
    let mut placed_invalid = 0usize;
    for i in 0..40_000i32 {
        let pos = Position::new(
            (i % 200) as i16,
            ((i / 200) % 40) as i16,
            (250 + i / 2000) as i16,
        );
        let id = if i % 2 == 0 { 5 } else { 8 };
        if id == 8 {
            placed_invalid += 1;
        }
        index.set(pos, word(id, 50));
    }
    assert!(index.region_count() >= 2);
    assert!(index.segment_count() >= 4);
    let before = index.len();

    index.update(EntityType::Station, &info).unwrap();

    assert_eq!(index.len(), before - placed_invalid);
    for (_, block) in index.iter() {
        assert!(info.is_valid_for(block.id(), EntityType::Station));
    }
    // Interned pool holds exactly the surviving distinct words
    assert_eq!(index.pool_len(), 1);
}

#[test]
fn mirror_then_translate_keeps_core_and_symmetry() {
    init_logging();
    let info = BlockCatalog::minimal();
    let mut index = SpatialIndex::new();
    index.set(
        CORE_POSITION,
        BlockWord::from_fields(CORE_ID, 250, false, 0, 0, 3).unwrap(),
    );
    // A wedge prow on the +x side
    let wedge = BlockWord::from_fields(599, 75, false, 2, 0, 3).unwrap();
    index.set(Position::new(24, 16, 16), wedge);

    transform::mirror(&mut index, smedit::blocks::Axis::X, false, &info).unwrap();
    assert_eq!(index.len(), 3);
    let mirrored = index.get(Position::new(8, 16, 16)).unwrap();
    assert_eq!(
        orient::orientation(mirrored, smedit::BlockStyle::Wedge)
            .unwrap()
            .label(),
        "Left, Front"
    );

    let bounds = transform::translate(&mut index, Position::new(0, -4, 0))
        .unwrap()
        .unwrap();
    assert_eq!(index.get(CORE_POSITION).unwrap().id(), CORE_ID);
    assert!(index.has_block_at(Position::new(24, 20, 16)));
    assert!(index.has_block_at(Position::new(8, 20, 16)));
    assert_eq!(bounds.0, Position::new(8, 16, 16));
    assert_eq!(bounds.1, Position::new(24, 20, 16));
}
