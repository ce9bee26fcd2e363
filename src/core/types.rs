//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for placements
///
/// Opaque string, stable for the placement's lifetime. Freshly created
/// placements get UUID v4 text; loaded maps keep whatever id they stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(pub String);

impl PlacementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlacementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlacementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlacementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Placeable object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Wall,
    TallWall,
    Gate,
    Tower,
    House,
    Farm,
    Granary,
    Workshop,
    Keep,
    Tree,
    Rock,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 11] = [
        ObjectKind::Wall,
        ObjectKind::TallWall,
        ObjectKind::Gate,
        ObjectKind::Tower,
        ObjectKind::House,
        ObjectKind::Farm,
        ObjectKind::Granary,
        ObjectKind::Workshop,
        ObjectKind::Keep,
        ObjectKind::Tree,
        ObjectKind::Rock,
    ];

    /// Default footprint (width, height in cells)
    pub fn default_size(&self) -> (u32, u32) {
        match self {
            ObjectKind::Wall | ObjectKind::TallWall | ObjectKind::Gate => (1, 1),
            ObjectKind::Tower => (2, 2),
            ObjectKind::House => (2, 2),
            ObjectKind::Farm => (4, 4),
            ObjectKind::Granary => (3, 3),
            ObjectKind::Workshop => (3, 2),
            ObjectKind::Keep => (5, 5),
            ObjectKind::Tree | ObjectKind::Rock => (1, 1),
        }
    }

    /// Visual wall height for wall kinds, `None` for everything else
    pub fn wall_height(&self) -> Option<f32> {
        match self {
            ObjectKind::Wall => Some(2.0),
            ObjectKind::Gate => Some(2.5),
            ObjectKind::TallWall => Some(4.0),
            _ => None,
        }
    }

    /// Wall kinds are bridged at diagonal joints
    pub fn is_wall(&self) -> bool {
        self.wall_height().is_some()
    }

    /// Stable identifier used in map files and config
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Wall => "wall",
            ObjectKind::TallWall => "tall_wall",
            ObjectKind::Gate => "gate",
            ObjectKind::Tower => "tower",
            ObjectKind::House => "house",
            ObjectKind::Farm => "farm",
            ObjectKind::Granary => "granary",
            ObjectKind::Workshop => "workshop",
            ObjectKind::Keep => "keep",
            ObjectKind::Tree => "tree",
            ObjectKind::Rock => "rock",
        }
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        ObjectKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| format!("unknown object kind: {}", s))
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ground type of a single cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    #[default]
    Grass,
    Dirt,
    Sand,
    Stone,
    Forest,
    Snow,
    Water,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 7] = [
        TerrainKind::Grass,
        TerrainKind::Dirt,
        TerrainKind::Sand,
        TerrainKind::Stone,
        TerrainKind::Forest,
        TerrainKind::Snow,
        TerrainKind::Water,
    ];

    /// Whether construction is allowed on this terrain
    pub fn is_buildable(&self) -> bool {
        !matches!(self, TerrainKind::Water)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerrainKind::Grass => "grass",
            TerrainKind::Dirt => "dirt",
            TerrainKind::Sand => "sand",
            TerrainKind::Stone => "stone",
            TerrainKind::Forest => "forest",
            TerrainKind::Snow => "snow",
            TerrainKind::Water => "water",
        }
    }
}

impl std::str::FromStr for TerrainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        TerrainKind::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("unknown terrain: {}", s))
    }
}

impl std::fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Whether the engine is driven by a player or by the map editor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorMode {
    #[default]
    Play,
    MapEditor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_ids_are_unique() {
        let a = PlacementId::new();
        let b = PlacementId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_placement_id_serializes_as_plain_string() {
        let id = PlacementId::from("wall_001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"wall_001\"");
    }

    #[test]
    fn test_object_kind_round_trips_through_str() {
        for kind in ObjectKind::ALL {
            assert_eq!(kind.as_str().parse::<ObjectKind>().unwrap(), kind);
        }
        assert!("drawbridge".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn test_object_kind_serde_matches_as_str() {
        let json = serde_json::to_string(&ObjectKind::TallWall).unwrap();
        assert_eq!(json, "\"tall_wall\"");
    }

    #[test]
    fn test_wall_kinds() {
        assert!(ObjectKind::Wall.is_wall());
        assert!(ObjectKind::Gate.is_wall());
        assert!(!ObjectKind::House.is_wall());
        assert!(ObjectKind::TallWall.wall_height() > ObjectKind::Wall.wall_height());
    }

    #[test]
    fn test_water_is_not_buildable() {
        assert!(!TerrainKind::Water.is_buildable());
        assert!(TerrainKind::Grass.is_buildable());
    }

    #[test]
    fn test_terrain_parse_and_pad() {
        assert_eq!("Forest".parse::<TerrainKind>(), Ok(TerrainKind::Forest));
        assert!("lava".parse::<TerrainKind>().is_err());
        assert_eq!(format!("{:<6}|", TerrainKind::Sand), "sand  |");
    }
}
