use crate::core::types::PlacementId;
use crate::spatial::coord::GridCoordinate;
use thiserror::Error;

/// Which validator predicate rejected a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    Resource,
    Occupancy,
    HostileZone,
    Terrain,
}

impl std::fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PredicateKind::Resource => "insufficient resources",
            PredicateKind::Occupancy => "cell already occupied",
            PredicateKind::HostileZone => "contested territory",
            PredicateKind::Terrain => "terrain does not permit construction",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Coordinate out of bounds: {0}")]
    OutOfBounds(GridCoordinate),

    #[error("Cell {coord} already covered by placement {existing}")]
    Overlap {
        coord: GridCoordinate,
        existing: PlacementId,
    },

    #[error("Placement rejected: {0}")]
    PredicateFailed(PredicateKind),

    #[error("Map name must not be empty")]
    EmptyName,

    #[error("Invalid map size {rows}x{cols}")]
    InvalidMapSize { rows: u32, cols: u32 },

    #[error("No wall line is being drawn")]
    NoActiveDraft,
}

pub type Result<T> = std::result::Result<T, MapError>;
