//! File-backed map storage

use std::fs;
use std::path::{Path, PathBuf};

use super::catalog::{MapCatalog, MapCatalogEntry};
use super::map_file::{LoadedMap, MapMetadata, SavedMap};
use super::{unix_now, StorageError};
use crate::core::config::EngineConfig;
use crate::spatial::grid::MapGrid;

pub const CATALOG_FILE: &str = "catalog.json";

/// Maps under `<root>/<side>/slot_<n>.json` plus the catalog at `<root>/catalog.json`
///
/// Paths handed in and out are relative to the root, e.g. `"400/slot_2.json"`.
#[derive(Debug, Clone)]
pub struct MapStore {
    root: PathBuf,
    sides: Vec<u32>,
}

impl MapStore {
    pub fn new(root: impl Into<PathBuf>, config: &EngineConfig) -> Self {
        Self {
            root: root.into(),
            sides: config.valid_map_sides.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    pub fn relative_path(side: u32, slot: u32) -> String {
        format!("{side}/slot_{slot}.json")
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn check_size(&self, rows: u32, cols: u32) -> Result<u32, StorageError> {
        if rows != cols || !self.sides.contains(&rows) {
            return Err(StorageError::InvalidMapSize { rows, cols });
        }
        Ok(rows)
    }

    /// Write a map into `slot` and record it in the catalog
    pub fn save(
        &self,
        grid: &MapGrid,
        metadata: &MapMetadata,
        slot: u32,
        tags: &[String],
    ) -> Result<MapCatalogEntry, StorageError> {
        let name = metadata.name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyName);
        }
        let side = self.check_size(grid.rows(), grid.cols())?;

        let dir = self.root.join(side.to_string());
        fs::create_dir_all(&dir).map_err(|source| StorageError::StorageUnavailable {
            path: dir.clone(),
            source,
        })?;

        let relative = Self::relative_path(side, slot);
        let path = self.resolve(&relative);
        let mut saved = SavedMap::from_grid(grid, metadata);
        saved.map_name = name.to_string();
        self.write_map(&path, &saved)?;

        let entry =
            MapCatalogEntry::new(&relative, grid.rows(), grid.cols(), slot, name, tags.to_vec());
        let mut catalog = self.catalog();
        catalog.upsert(entry.clone());
        self.write_catalog(&mut catalog)?;

        tracing::info!(path = %relative, name, placements = grid.placements().len(), "map saved");
        Ok(entry)
    }

    /// Write a map back over an existing file, keeping its slot and catalog tags
    pub fn save_over(
        &self,
        path: &str,
        grid: &MapGrid,
        metadata: &MapMetadata,
    ) -> Result<MapCatalogEntry, StorageError> {
        let file = self.resolve(path);
        if !file.is_file() {
            return Err(StorageError::NotFound(file));
        }
        let slot = path
            .rsplit('/')
            .next()
            .and_then(parse_slot)
            .ok_or(StorageError::NotFound(file))?;
        let tags = self
            .catalog()
            .find(path)
            .map(|e| e.tags.clone())
            .unwrap_or_default();
        self.save(grid, metadata, slot, &tags)
    }

    pub fn load(&self, path: &str) -> Result<LoadedMap, StorageError> {
        let loaded = self.read_map(path)?.into_grid()?;
        tracing::info!(path, name = %loaded.metadata.name, "map loaded");
        Ok(loaded)
    }

    /// Change a saved map's display name in both the file and the catalog
    pub fn rename(&self, path: &str, new_name: &str) -> Result<(), StorageError> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyName);
        }
        let mut saved = self.read_map(path)?;
        saved.map_name = name.to_string();
        self.write_map(&self.resolve(path), &saved)?;

        let mut catalog = self.catalog();
        match catalog.find_mut(path) {
            Some(entry) => entry.display_name = name.to_string(),
            None => catalog.upsert(entry_for(path, &saved, Vec::new())),
        }
        self.write_catalog(&mut catalog)?;
        tracing::info!(path, name, "map renamed");
        Ok(())
    }

    pub fn delete(&self, path: &str) -> Result<(), StorageError> {
        let file = self.resolve(path);
        if !file.is_file() {
            return Err(StorageError::NotFound(file));
        }
        fs::remove_file(&file).map_err(|source| StorageError::WriteFailed {
            path: file.clone(),
            source,
        })?;

        let mut catalog = self.catalog();
        catalog.remove(path);
        self.write_catalog(&mut catalog)?;
        tracing::info!(path, "map deleted");
        Ok(())
    }

    /// Current catalog; empty when missing or unreadable
    pub fn catalog(&self) -> MapCatalog {
        MapCatalog::load(&self.catalog_path())
    }

    /// Rescan every size directory and rewrite the catalog
    ///
    /// Tags from the previous catalog are kept for maps that still exist.
    /// Files that fail to decode are skipped with a warning.
    pub fn rebuild_catalog(&self) -> Result<MapCatalog, StorageError> {
        let previous = self.catalog();
        let mut catalog = MapCatalog::new();

        for &side in &self.sides {
            let dir = self.root.join(side.to_string());
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(StorageError::StorageUnavailable { path: dir, source }),
            };

            for dir_entry in entries.flatten() {
                let file_name = dir_entry.file_name();
                let Some(slot) = file_name.to_str().and_then(parse_slot) else {
                    continue;
                };
                let relative = Self::relative_path(side, slot);
                match self.read_map(&relative) {
                    Ok(saved) => {
                        let tags = previous
                            .find(&relative)
                            .map(|e| e.tags.clone())
                            .unwrap_or_default();
                        catalog.upsert(entry_for(&relative, &saved, tags));
                    }
                    Err(err) => {
                        tracing::warn!(path = %relative, error = %err, "skipping unreadable map");
                    }
                }
            }
        }

        self.write_catalog(&mut catalog)?;
        tracing::info!(maps = catalog.len(), "catalog rebuilt");
        Ok(catalog)
    }

    /// Lowest slot number with no file for `side`
    pub fn next_free_slot(&self, side: u32) -> u32 {
        (1..)
            .find(|&slot| !self.resolve(&Self::relative_path(side, slot)).exists())
            .unwrap_or(1)
    }

    fn read_map(&self, path: &str) -> Result<SavedMap, StorageError> {
        let file = self.resolve(path);
        if !file.is_file() {
            return Err(StorageError::NotFound(file));
        }
        let bytes = fs::read(&file).map_err(|source| StorageError::StorageUnavailable {
            path: file.clone(),
            source,
        })?;
        let saved = SavedMap::from_json(&bytes)
            .map_err(|err| StorageError::DecodeFailed(format!("{}: {err}", file.display())))?;

        // Size is checked before any cell table is allocated
        let side = self.check_size(saved.rows, saved.cols)?;
        let dir_side = path.split('/').next().and_then(|dir| dir.parse::<u32>().ok());
        if dir_side.is_some_and(|dir_side| dir_side != side) {
            return Err(StorageError::InvalidMapSize {
                rows: saved.rows,
                cols: saved.cols,
            });
        }
        Ok(saved)
    }

    fn write_map(&self, path: &Path, saved: &SavedMap) -> Result<(), StorageError> {
        let bytes = saved.to_json()?;
        fs::write(path, bytes).map_err(|source| StorageError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_catalog(&self, catalog: &mut MapCatalog) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|source| StorageError::StorageUnavailable {
            path: self.root.clone(),
            source,
        })?;
        catalog.updated_at = unix_now();
        catalog.save(&self.catalog_path())
    }
}

fn entry_for(path: &str, saved: &SavedMap, tags: Vec<String>) -> MapCatalogEntry {
    let slot = path
        .rsplit('/')
        .next()
        .and_then(parse_slot)
        .unwrap_or(0);
    MapCatalogEntry::new(path, saved.rows, saved.cols, slot, saved.map_name.clone(), tags)
}

/// Slot number from a `slot_<n>.json` file name
fn parse_slot(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("slot_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> MapStore {
        let config = EngineConfig {
            valid_map_sides: vec![4, 8],
            ..EngineConfig::default()
        };
        MapStore::new(dir.path(), &config)
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!(parse_slot("slot_12.json"), Some(12));
        assert_eq!(parse_slot("slot_x.json"), None);
        assert_eq!(parse_slot("catalog.json"), None);
    }

    #[test]
    fn test_save_rejects_bad_size_and_name() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store.save(&MapGrid::new(4, 8), &MapMetadata::new("A"), 1, &[]);
        assert!(matches!(err, Err(StorageError::InvalidMapSize { rows: 4, cols: 8 })));

        let err = store.save(&MapGrid::new(5, 5), &MapMetadata::new("A"), 1, &[]);
        assert!(matches!(err, Err(StorageError::InvalidMapSize { .. })));

        let err = store.save(&MapGrid::new(4, 4), &MapMetadata::new("   "), 1, &[]);
        assert!(matches!(err, Err(StorageError::EmptyName)));
        assert!(store.catalog().is_empty());
    }

    #[test]
    fn test_save_writes_file_and_catalog() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let entry = store
            .save(&MapGrid::new(4, 4), &MapMetadata::new("Hills"), 2, &["test".into()])
            .unwrap();
        assert_eq!(entry.path, "4/slot_2.json");
        assert!(dir.path().join("4").join("slot_2.json").is_file());
        assert_eq!(store.catalog().find("4/slot_2.json"), Some(&entry));
        assert_eq!(store.next_free_slot(4), 1);
    }

    #[test]
    fn test_save_over_keeps_tags() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .save(&MapGrid::new(8, 8), &MapMetadata::new("Vale"), 3, &["coast".into()])
            .unwrap();

        let mut grid = MapGrid::new(8, 8);
        grid.set_height(crate::spatial::coord::GridCoordinate::new(2, 2), 1.0);
        let entry = store
            .save_over("8/slot_3.json", &grid, &MapMetadata::new("Vale"))
            .unwrap();
        assert_eq!(entry.slot, 3);
        assert_eq!(entry.tags, vec!["coast".to_string()]);
        assert!(store.save_over("8/slot_4.json", &grid, &MapMetadata::new("Vale")).is_err());
    }

    #[test]
    fn test_load_checks_size_against_config_and_directory() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&MapGrid::new(4, 4), &MapMetadata::new("Small"), 1, &[]).unwrap();

        // A valid 4x4 file moved into the 8 directory
        fs::create_dir_all(dir.path().join("8")).unwrap();
        fs::copy(dir.path().join("4/slot_1.json"), dir.path().join("8/slot_1.json")).unwrap();
        assert!(matches!(
            store.load("8/slot_1.json"),
            Err(StorageError::InvalidMapSize { rows: 4, cols: 4 })
        ));

        let forged = serde_json::json!({ "mapName": "x", "rows": 100_000, "cols": 100_000 });
        fs::write(dir.path().join("4/slot_2.json"), forged.to_string()).unwrap();
        assert!(matches!(
            store.load("4/slot_2.json"),
            Err(StorageError::InvalidMapSize { rows: 100_000, .. })
        ));
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(store(&dir).load("4/slot_9.json"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_catalog_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CATALOG_FILE), "][").unwrap();
        assert!(store(&dir).catalog().is_empty());
    }
}
