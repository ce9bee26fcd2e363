//! Placement validation - four pluggable predicates
//!
//! Restricted kinds must pass, in order: resource, occupancy, hostile zone,
//! terrain. Unrestricted kinds only get the grid's own bounds and overlap
//! check. Every predicate slot can be swapped independently.

use crate::core::error::{MapError, PredicateKind, Result};
use crate::core::types::{EditorMode, ObjectKind};
use crate::placement::registry::PlacementRules;
use crate::placement::stockpile::Stockpile;
use crate::spatial::coord::GridCoordinate;
use crate::spatial::grid::MapGrid;

/// Everything a predicate may look at
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    pub grid: &'a MapGrid,
    pub rules: &'a PlacementRules,
    pub stockpile: &'a Stockpile,
    pub mode: EditorMode,
    /// Number of placements the candidate batch will create
    pub placement_count: u32,
}

impl<'a> PlacementContext<'a> {
    pub fn new(
        grid: &'a MapGrid,
        rules: &'a PlacementRules,
        stockpile: &'a Stockpile,
        mode: EditorMode,
    ) -> Self {
        Self {
            grid,
            rules,
            stockpile,
            mode,
            placement_count: 1,
        }
    }

    pub fn with_placement_count(mut self, count: u32) -> Self {
        self.placement_count = count;
        self
    }
}

/// A single placement check over a batch of candidate cells
pub trait PlacementPredicate: std::fmt::Debug + Send + Sync {
    fn check(&self, ctx: &PlacementContext<'_>, kind: ObjectKind, cells: &[GridCoordinate]) -> bool;
}

/// Player can pay for every placement in the batch. Always passes in the map editor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourcePredicate;

impl PlacementPredicate for ResourcePredicate {
    fn check(
        &self,
        ctx: &PlacementContext<'_>,
        kind: ObjectKind,
        _cells: &[GridCoordinate],
    ) -> bool {
        if ctx.mode == EditorMode::MapEditor {
            return true;
        }
        ctx.stockpile
            .can_afford(ctx.rules.cost(kind), ctx.placement_count)
    }
}

/// No candidate cell is already covered by a placement
#[derive(Debug, Clone, Copy, Default)]
pub struct OccupancyPredicate;

impl PlacementPredicate for OccupancyPredicate {
    fn check(
        &self,
        ctx: &PlacementContext<'_>,
        _kind: ObjectKind,
        cells: &[GridCoordinate],
    ) -> bool {
        let occupied = ctx.grid.occupied_cells();
        !cells.iter().any(|c| occupied.contains(c))
    }
}

/// Hostile-zone slot that never objects
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenTerritory;

impl PlacementPredicate for OpenTerritory {
    fn check(
        &self,
        _ctx: &PlacementContext<'_>,
        _kind: ObjectKind,
        _cells: &[GridCoordinate],
    ) -> bool {
        true
    }
}

/// Inclusive rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub min: GridCoordinate,
    pub max: GridCoordinate,
}

impl CellRect {
    pub fn new(a: GridCoordinate, b: GridCoordinate) -> Self {
        Self {
            min: GridCoordinate::new(a.row.min(b.row), a.col.min(b.col)),
            max: GridCoordinate::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn contains(&self, coord: GridCoordinate) -> bool {
        coord.row >= self.min.row
            && coord.row <= self.max.row
            && coord.col >= self.min.col
            && coord.col <= self.max.col
    }
}

/// Rejects batches touching any contested rectangle
#[derive(Debug, Clone, Default)]
pub struct ContestedZonePredicate {
    zones: Vec<CellRect>,
}

impl ContestedZonePredicate {
    pub fn new(zones: Vec<CellRect>) -> Self {
        Self { zones }
    }
}

impl PlacementPredicate for ContestedZonePredicate {
    fn check(
        &self,
        _ctx: &PlacementContext<'_>,
        _kind: ObjectKind,
        cells: &[GridCoordinate],
    ) -> bool {
        !cells
            .iter()
            .any(|c| self.zones.iter().any(|zone| zone.contains(*c)))
    }
}

/// Every candidate cell has buildable terrain
#[derive(Debug, Clone, Copy, Default)]
pub struct TerrainPredicate;

impl PlacementPredicate for TerrainPredicate {
    fn check(
        &self,
        ctx: &PlacementContext<'_>,
        _kind: ObjectKind,
        cells: &[GridCoordinate],
    ) -> bool {
        cells.iter().all(|c| {
            ctx.grid
                .terrain(*c)
                .map(|t| t.is_buildable())
                .unwrap_or(false)
        })
    }
}

/// Composite validator holding one predicate per slot
#[derive(Debug)]
pub struct PlacementValidator {
    resource: Box<dyn PlacementPredicate>,
    occupancy: Box<dyn PlacementPredicate>,
    hostile_zone: Box<dyn PlacementPredicate>,
    terrain: Box<dyn PlacementPredicate>,
}

impl PlacementValidator {
    pub fn new() -> Self {
        Self {
            resource: Box::new(ResourcePredicate),
            occupancy: Box::new(OccupancyPredicate),
            hostile_zone: Box::new(OpenTerritory),
            terrain: Box::new(TerrainPredicate),
        }
    }

    pub fn with_resource(mut self, predicate: impl PlacementPredicate + 'static) -> Self {
        self.resource = Box::new(predicate);
        self
    }

    pub fn with_occupancy(mut self, predicate: impl PlacementPredicate + 'static) -> Self {
        self.occupancy = Box::new(predicate);
        self
    }

    pub fn with_hostile_zone(mut self, predicate: impl PlacementPredicate + 'static) -> Self {
        self.hostile_zone = Box::new(predicate);
        self
    }

    pub fn with_terrain(mut self, predicate: impl PlacementPredicate + 'static) -> Self {
        self.terrain = Box::new(predicate);
        self
    }

    /// Validate a batch of candidate cells for `kind`
    ///
    /// Bounds are checked first for every kind. Restricted kinds then run the
    /// four predicates in order and report the first one that fails; other
    /// kinds fall through to the plain overlap check.
    pub fn validate(
        &self,
        ctx: &PlacementContext<'_>,
        kind: ObjectKind,
        cells: &[GridCoordinate],
    ) -> Result<()> {
        if let Some(outside) = cells.iter().find(|c| !ctx.grid.is_valid(**c)) {
            return Err(MapError::OutOfBounds(*outside));
        }

        if ctx.rules.is_restricted(kind) {
            let slots: [(PredicateKind, &dyn PlacementPredicate); 4] = [
                (PredicateKind::Resource, self.resource.as_ref()),
                (PredicateKind::Occupancy, self.occupancy.as_ref()),
                (PredicateKind::HostileZone, self.hostile_zone.as_ref()),
                (PredicateKind::Terrain, self.terrain.as_ref()),
            ];
            for (predicate_kind, predicate) in slots {
                if !predicate.check(ctx, kind, cells) {
                    tracing::debug!(%kind, reason = %predicate_kind, "placement rejected");
                    return Err(MapError::PredicateFailed(predicate_kind));
                }
            }
            return Ok(());
        }

        for coord in cells {
            if let Some(existing) = ctx.grid.placement_at(*coord) {
                return Err(MapError::Overlap {
                    coord: *coord,
                    existing: existing.id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for PlacementValidator {
    fn default() -> Self {
        Self::new()
    }
}
