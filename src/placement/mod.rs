//! Placement layer - footprints, costs, stockpiles and validation

pub mod registry;
pub mod stockpile;
pub mod validation;

pub use registry::{ObjectFootprint, PlacementRules, ResourceType, RulesLoadError};
pub use stockpile::Stockpile;
pub use validation::{
    CellRect, ContestedZonePredicate, OccupancyPredicate, OpenTerritory, PlacementContext,
    PlacementPredicate, PlacementValidator, ResourcePredicate, TerrainPredicate,
};
