//! Catalog index of saved maps

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::StorageError;

/// Size bucket derived from a map's side length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeCategory {
    pub fn from_side(side: u32) -> Self {
        match side {
            0..=200 => SizeCategory::Tiny,
            201..=400 => SizeCategory::Small,
            401..=600 => SizeCategory::Medium,
            601..=800 => SizeCategory::Large,
            _ => SizeCategory::Huge,
        }
    }

    pub fn suggested_players(&self) -> u32 {
        match self {
            SizeCategory::Tiny => 2,
            SizeCategory::Small | SizeCategory::Medium => 4,
            SizeCategory::Large => 6,
            SizeCategory::Huge => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeCategory::Tiny => "tiny",
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium",
            SizeCategory::Large => "large",
            SizeCategory::Huge => "huge",
        }
    }
}

impl std::str::FromStr for SizeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(SizeCategory::Tiny),
            "small" => Ok(SizeCategory::Small),
            "medium" => Ok(SizeCategory::Medium),
            "large" => Ok(SizeCategory::Large),
            "huge" => Ok(SizeCategory::Huge),
            other => Err(format!("unknown size category: {other}")),
        }
    }
}

impl std::fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCatalogEntry {
    /// Path of the map file relative to the storage root
    pub path: String,
    pub rows: u32,
    pub cols: u32,
    pub slot: u32,
    pub display_name: String,
    pub size_category: SizeCategory,
    pub suggested_players: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MapCatalogEntry {
    pub fn new(
        path: impl Into<String>,
        rows: u32,
        cols: u32,
        slot: u32,
        display_name: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        let size_category = SizeCategory::from_side(rows.max(cols));
        Self {
            path: path.into(),
            rows,
            cols,
            slot,
            display_name: display_name.into(),
            size_category,
            suggested_players: size_category.suggested_players(),
            tags,
        }
    }
}

/// Catalog filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapQuery {
    pub size: Option<SizeCategory>,
    pub min_players: Option<u32>,
    pub tag: Option<String>,
}

impl MapQuery {
    pub fn size(mut self, category: SizeCategory) -> Self {
        self.size = Some(category);
        self
    }

    pub fn players(mut self, players: u32) -> Self {
        self.min_players = Some(players);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matches(&self, entry: &MapCatalogEntry) -> bool {
        self.size.map_or(true, |s| entry.size_category == s)
            && self.min_players.map_or(true, |p| entry.suggested_players >= p)
            && self
                .tag
                .as_deref()
                .map_or(true, |t| entry.tags.iter().any(|tag| tag == t))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCatalog {
    #[serde(default)]
    pub maps: Vec<MapCatalogEntry>,
    #[serde(default)]
    pub updated_at: u64,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry with the same path. Entries stay sorted by path.
    pub fn upsert(&mut self, entry: MapCatalogEntry) {
        match self.maps.binary_search_by(|e| e.path.cmp(&entry.path)) {
            Ok(i) => self.maps[i] = entry,
            Err(i) => self.maps.insert(i, entry),
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<MapCatalogEntry> {
        let index = self.maps.iter().position(|e| e.path == path)?;
        Some(self.maps.remove(index))
    }

    pub fn find(&self, path: &str) -> Option<&MapCatalogEntry> {
        self.maps.iter().find(|e| e.path == path)
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut MapCatalogEntry> {
        self.maps.iter_mut().find(|e| e.path == path)
    }

    /// Entries matching every filter set on `query`
    pub fn query(&self, query: &MapQuery) -> Vec<&MapCatalogEntry> {
        self.maps.iter().filter(|e| query.matches(e)).collect()
    }

    pub fn by_size(&self, category: SizeCategory) -> Vec<&MapCatalogEntry> {
        self.query(&MapQuery::default().size(category))
    }

    /// Maps suggested for at least `players` players
    pub fn by_players(&self, players: u32) -> Vec<&MapCatalogEntry> {
        self.query(&MapQuery::default().players(players))
    }

    pub fn with_tag(&self, tag: &str) -> Vec<&MapCatalogEntry> {
        self.query(&MapQuery::default().tag(tag))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Read a catalog file. Missing or corrupt files give an empty catalog.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "catalog unreadable, starting empty"
                );
                return Self::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "catalog corrupt, starting empty"
                );
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes).map_err(|source| StorageError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, side: u32, tags: &[&str]) -> MapCatalogEntry {
        MapCatalogEntry::new(
            path,
            side,
            side,
            1,
            path,
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn test_size_category_from_side() {
        assert_eq!(SizeCategory::from_side(200), SizeCategory::Tiny);
        assert_eq!(SizeCategory::from_side(600), SizeCategory::Medium);
        assert_eq!(SizeCategory::from_side(1000), SizeCategory::Huge);
        assert_eq!(SizeCategory::from_side(800).suggested_players(), 6);
        assert_eq!("Large".parse::<SizeCategory>(), Ok(SizeCategory::Large));
    }

    #[test]
    fn test_upsert_replaces_by_path() {
        let mut catalog = MapCatalog::new();
        catalog.upsert(entry("400/slot_1.json", 400, &[]));
        catalog.upsert(entry("200/slot_1.json", 200, &[]));
        catalog.upsert(entry("400/slot_1.json", 400, &["islands"]));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.maps[0].path, "200/slot_1.json");
        assert_eq!(catalog.find("400/slot_1.json").unwrap().tags, vec!["islands"]);
    }

    #[test]
    fn test_filters() {
        let mut catalog = MapCatalog::new();
        catalog.upsert(entry("200/slot_1.json", 200, &["river"]));
        catalog.upsert(entry("800/slot_1.json", 800, &[]));
        catalog.upsert(entry("1000/slot_2.json", 1000, &["river"]));

        assert_eq!(catalog.by_size(SizeCategory::Tiny).len(), 1);
        assert_eq!(catalog.by_players(6).len(), 2);
        assert_eq!(catalog.with_tag("river").len(), 2);
        assert!(catalog.remove("800/slot_1.json").is_some());
        assert!(catalog.remove("800/slot_1.json").is_none());
    }

    #[test]
    fn test_query_combines_filters() {
        let mut catalog = MapCatalog::new();
        catalog.upsert(entry("200/slot_1.json", 200, &["river"]));
        catalog.upsert(entry("800/slot_1.json", 800, &["river"]));
        catalog.upsert(entry("1000/slot_2.json", 1000, &[]));

        let rivers = catalog.query(&MapQuery::default().players(6).tag("river"));
        assert_eq!(rivers.len(), 1);
        assert_eq!(rivers[0].path, "800/slot_1.json");
        assert!(catalog
            .query(&MapQuery::default().size(SizeCategory::Huge).tag("river"))
            .is_empty());
        assert_eq!(catalog.query(&MapQuery::default()).len(), 3);
    }

    #[test]
    fn test_json_field_names() {
        let mut catalog = MapCatalog::new();
        catalog.upsert(entry("600/slot_3.json", 600, &[]));
        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["maps"][0]["sizeCategory"], "medium");
        assert_eq!(json["maps"][0]["suggestedPlayers"], 4);
        assert_eq!(json["maps"][0]["displayName"], "600/slot_3.json");
    }
}
