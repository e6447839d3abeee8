//! Blueprint-level file I/O: one `.smd3` region file per populated region
//! coordinate, named `<base>.<x>.<y>.<z>.smd3` inside the blueprint
//! directory.
#![forbid(unsafe_code)]

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use smedit_grid::{GridError, SpatialIndex};

pub const REGION_EXTENSION: &str = "smd3";

#[derive(Debug, Error)]
pub enum IoError {
    #[error("region data: {0}")]
    Grid(#[from] GridError),
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a blueprint directory: {0}")]
    NotADirectory(PathBuf),
}

/// File name of the region at `coord` for the blueprint named `base`.
pub fn region_file_name(base: &str, coord: (i32, i32, i32)) -> String {
    format!(
        "{}.{}.{}.{}.{}",
        base, coord.0, coord.1, coord.2, REGION_EXTENSION
    )
}

/// Splits `<base>.<x>.<y>.<z>.smd3` back into base name and region
/// coordinate. `None` for file names that do not follow the pattern.
pub fn parse_region_file_name(name: &str) -> Option<(&str, (i32, i32, i32))> {
    let stem = name.strip_suffix(&format!(".{REGION_EXTENSION}"))?;
    let (rest, z) = stem.rsplit_once('.')?;
    let (rest, y) = rest.rsplit_once('.')?;
    let (base, x) = rest.rsplit_once('.')?;
    if base.is_empty() {
        return None;
    }
    Some((base, (x.parse().ok()?, y.parse().ok()?, z.parse().ok()?)))
}

/// Reads every region file in `dir` into one spatial index. The file
/// name's coordinate is informational only; blocks are placed by the
/// origins stored in the segment headers. Any malformed region aborts the
/// whole load.
pub fn load_blueprint(dir: &Path) -> Result<SpatialIndex, IoError> {
    if !dir.is_dir() {
        return Err(IoError::NotADirectory(dir.to_path_buf()));
    }
    let mut region_files: Vec<(PathBuf, (i32, i32, i32))> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match parse_region_file_name(name) {
            Some((_, coord)) => region_files.push((path, coord)),
            None => {
                if path.is_file() {
                    debug!("skipping non-region file {}", name);
                }
            }
        }
    }
    // Deterministic load order keeps log output stable across runs.
    region_files.sort_by_key(|(_, coord)| (coord.2, coord.1, coord.0));

    let mut index = SpatialIndex::new();
    for (path, coord) in &region_files {
        let mut reader = BufReader::new(File::open(path)?);
        let merged = index.load_region(&mut reader)?;
        debug!(
            "region {:?}: {} blocks from {}",
            coord,
            merged,
            path.display()
        );
        if merged == 0 {
            warn!("region file {} held no blocks", path.display());
        }
    }
    info!(
        "loaded {} blocks from {} region files in {}",
        index.len(),
        region_files.len(),
        dir.display()
    );
    Ok(index)
}

/// Writes `index` as one region file per populated region under `dir`,
/// creating the directory if needed. Stale region files for coordinates
/// the index no longer populates are removed so a reload sees exactly
/// this index. Returns how many region files were written.
pub fn save_blueprint(dir: &Path, base: &str, index: &SpatialIndex) -> Result<usize, IoError> {
    fs::create_dir_all(dir)?;
    let mut coords: Vec<(i32, i32, i32)> = index.region_coords().collect();
    coords.sort_by_key(|c| (c.2, c.1, c.0));

    let mut written = 0usize;
    for coord in &coords {
        let path = dir.join(region_file_name(base, *coord));
        let mut writer = BufWriter::new(File::create(&path)?);
        if index.write_region(*coord, &mut writer)? {
            writer.flush()?;
            written += 1;
        } else {
            // Region existed but held no blocks; drop the empty file.
            drop(writer);
            fs::remove_file(&path)?;
        }
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some((found_base, coord)) = parse_region_file_name(name) {
            if found_base == base && !coords.contains(&coord) {
                debug!("removing stale region file {}", name);
                fs::remove_file(&path)?;
            }
        }
    }
    info!(
        "saved {} blocks across {} region files in {}",
        index.len(),
        written,
        dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smedit_blocks::BlockWord;
    use smedit_grid::Position;

    fn word(id: u16) -> BlockWord {
        BlockWord::from_fields(id, 100, false, 0, 0, 3).unwrap()
    }

    #[test]
    fn file_names_roundtrip() {
        let name = region_file_name("Lancer", (0, -1, 12));
        assert_eq!(name, "Lancer.0.-1.12.smd3");
        assert_eq!(
            parse_region_file_name(&name),
            Some(("Lancer", (0, -1, 12)))
        );
        // Dots in the base name bind leftward
        assert_eq!(
            parse_region_file_name("Mk.II.1.2.3.smd3"),
            Some(("Mk.II", (1, 2, 3)))
        );
        assert_eq!(parse_region_file_name("readme.txt"), None);
        assert_eq!(parse_region_file_name("Lancer.0.one.2.smd3"), None);
        assert_eq!(parse_region_file_name(".1.2.3.smd3"), None);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = SpatialIndex::new();
        let positions = [
            Position::new(16, 16, 16),
            Position::new(-300, 42, 7),
            Position::new(600, -600, 0),
        ];
        for (i, pos) in positions.iter().enumerate() {
            index.set(*pos, word([1u16, 599, 665][i]));
        }
        let written = save_blueprint(dir.path(), "Lancer", &index).unwrap();
        assert_eq!(written, index.region_coords().count());

        let back = load_blueprint(dir.path()).unwrap();
        assert_eq!(back.len(), 3);
        for pos in positions {
            assert_eq!(
                back.get(pos).unwrap().packed(),
                index.get(pos).unwrap().packed()
            );
        }
    }

    #[test]
    fn stale_region_files_are_removed_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = SpatialIndex::new();
        index.set(Position::new(600, 0, 0), word(5));
        save_blueprint(dir.path(), "Lancer", &index).unwrap();

        // The structure shrinks to a different region
        let mut smaller = SpatialIndex::new();
        smaller.set(Position::new(0, 0, 0), word(5));
        save_blueprint(dir.path(), "Lancer", &smaller).unwrap();

        let back = load_blueprint(dir.path()).unwrap();
        assert_eq!(back.len(), 1);
        assert!(back.has_block_at(Position::new(0, 0, 0)));
        assert!(!back.has_block_at(Position::new(600, 0, 0)));
    }

    #[test]
    fn load_rejects_missing_directory() {
        let err = load_blueprint(Path::new("/nonexistent/blueprint"));
        assert!(matches!(err, Err(IoError::NotADirectory(_))));
    }

    #[test]
    fn unrelated_files_are_ignored_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = SpatialIndex::new();
        index.set(Position::new(1, 2, 3), word(5));
        save_blueprint(dir.path(), "Lancer", &index).unwrap();
        fs::write(dir.path().join("header.smbph"), b"not a region").unwrap();

        let back = load_blueprint(dir.path()).unwrap();
        assert_eq!(back.len(), 1);
    }
}
