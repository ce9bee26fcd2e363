//! The map grid: cells, placements and occupancy

use ahash::{AHashMap, AHashSet};

use super::coord::GridCoordinate;
use crate::core::error::{MapError, Result};
use crate::core::types::{ObjectKind, PlacementId, TerrainKind};
use crate::placement::registry::ObjectFootprint;

/// One unit square of the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub coordinate: GridCoordinate,
    pub terrain: TerrainKind,
    pub height: f32,
}

impl Cell {
    pub fn new(coordinate: GridCoordinate) -> Self {
        Self {
            coordinate,
            terrain: TerrainKind::default(),
            height: 0.0,
        }
    }
}

/// An object occupying a rectangular block of cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: PlacementId,
    pub kind: ObjectKind,
    pub origin_row: i32,
    pub origin_col: i32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Top-left cell
    pub fn origin(&self) -> GridCoordinate {
        GridCoordinate::new(self.origin_row, self.origin_col)
    }

    pub fn contains(&self, coord: GridCoordinate) -> bool {
        let (row, col) = (i64::from(coord.row), i64::from(coord.col));
        let (top, left) = (i64::from(self.origin_row), i64::from(self.origin_col));
        row >= top
            && col >= left
            && row < top + i64::from(self.height)
            && col < left + i64::from(self.width)
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Every cell covered by this placement, row by row
    pub fn covered_cells(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        footprint_cells(self.origin(), self.width, self.height)
    }
}

/// Cells covered by a `width` x `height` block anchored at `origin`
///
/// Sides beyond `i32::MAX` are truncated; callers bound them first.
pub fn footprint_cells(
    origin: GridCoordinate,
    width: u32,
    height: u32,
) -> impl Iterator<Item = GridCoordinate> {
    let width = i32::try_from(width).unwrap_or(i32::MAX);
    let height = i32::try_from(height).unwrap_or(i32::MAX);
    (0..height).flat_map(move |dr| (0..width).map(move |dc| origin.offset(dr, dc)))
}

/// Last row or column index of a span of `len` cells starting at `start`
fn far_edge(start: i32, len: u32) -> i32 {
    start.saturating_add(i32::try_from(len - 1).unwrap_or(i32::MAX))
}

/// Change notification emitted by every grid mutation
#[derive(Debug, Clone, PartialEq)]
pub enum GridChange {
    PlacementAdded {
        id: PlacementId,
        kind: ObjectKind,
        origin: GridCoordinate,
        width: u32,
        height: u32,
    },
    PlacementRemoved {
        id: PlacementId,
    },
    HeightChanged {
        coord: GridCoordinate,
    },
    TerrainChanged {
        coord: GridCoordinate,
    },
}

/// Heights on cell corners, `(rows + 1) x (cols + 1)` values
///
/// Used by the renderer for smooth terrain edges; independent from the
/// per-cell heights once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexHeights {
    rows: u32,
    cols: u32,
    values: Vec<f32>,
}

impl VertexHeights {
    /// Flat vertex grid for a map of `rows` x `cols` cells
    pub fn flat(rows: u32, cols: u32) -> Self {
        let count = (rows as usize + 1) * (cols as usize + 1);
        Self {
            rows,
            cols,
            values: vec![0.0; count],
        }
    }

    fn index(&self, vr: i32, vc: i32) -> Option<usize> {
        if vr < 0 || vc < 0 || vr as u32 > self.rows || vc as u32 > self.cols {
            return None;
        }
        Some(vr as usize * (self.cols as usize + 1) + vc as usize)
    }

    pub fn get(&self, vr: i32, vc: i32) -> Option<f32> {
        self.index(vr, vc).map(|i| self.values[i])
    }

    pub fn set(&mut self, vr: i32, vc: i32, value: f32) -> bool {
        match self.index(vr, vc) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// Iterate `(vertex_row, vertex_col, height)`
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, f32)> + '_ {
        let stride = self.cols as usize + 1;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &h)| ((i / stride) as i32, (i % stride) as i32, h))
    }
}

/// Fixed-size grid of cells plus the placements on it
///
/// Occupancy is always computed from `placements`; cells never cache it.
#[derive(Debug, Clone)]
pub struct MapGrid {
    rows: u32,
    cols: u32,
    cells: Vec<Cell>,
    placements: Vec<Placement>,
    vertex_heights: Option<VertexHeights>,
    version: u64,
    changes: Vec<GridChange>,
}

impl MapGrid {
    /// Flat grass grid with no placements
    pub fn new(rows: u32, cols: u32) -> Self {
        let cells = (0..rows as i32)
            .flat_map(|row| {
                (0..cols as i32).map(move |col| Cell::new(GridCoordinate::new(row, col)))
            })
            .collect();
        Self::assemble(rows, cols, cells)
    }

    /// Build a grid from a complete row-major cell table
    pub fn from_cells(rows: u32, cols: u32, cells: Vec<Cell>) -> Result<Self> {
        if cells.len() != rows as usize * cols as usize {
            return Err(MapError::InvalidMapSize { rows, cols });
        }
        let ordered = cells.iter().enumerate().all(|(i, cell)| {
            cell.coordinate.row as usize == i / cols as usize
                && cell.coordinate.col as usize == i % cols as usize
        });
        if !ordered {
            return Err(MapError::InvalidMapSize { rows, cols });
        }
        Ok(Self::assemble(rows, cols, cells))
    }

    fn assemble(rows: u32, cols: u32, cells: Vec<Cell>) -> Self {
        Self {
            rows,
            cols,
            cells,
            placements: Vec::new(),
            vertex_heights: None,
            version: 0,
            changes: Vec::new(),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    fn index(&self, coord: GridCoordinate) -> Option<usize> {
        if coord.in_bounds(self.rows, self.cols) {
            Some(coord.row as usize * self.cols as usize + coord.col as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_valid(&self, coord: GridCoordinate) -> bool {
        coord.in_bounds(self.rows, self.cols)
    }

    #[inline]
    pub fn cell_at(&self, coord: GridCoordinate) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Height of a cell, 0.0 outside the grid
    pub fn height(&self, coord: GridCoordinate) -> f32 {
        self.cell_at(coord).map(|c| c.height).unwrap_or(0.0)
    }

    /// Set a cell's height. No-op outside the grid.
    pub fn set_height(&mut self, coord: GridCoordinate, value: f32) {
        let Some(i) = self.index(coord) else {
            return;
        };
        if self.cells[i].height != value {
            self.cells[i].height = value;
            self.record(GridChange::HeightChanged { coord });
        }
    }

    /// Terrain of a cell, `None` outside the grid
    pub fn terrain(&self, coord: GridCoordinate) -> Option<TerrainKind> {
        self.cell_at(coord).map(|c| c.terrain)
    }

    /// Set a cell's terrain. No-op outside the grid.
    pub fn set_terrain(&mut self, coord: GridCoordinate, terrain: TerrainKind) {
        let Some(i) = self.index(coord) else {
            return;
        };
        if self.cells[i].terrain != terrain {
            self.cells[i].terrain = terrain;
            self.record(GridChange::TerrainChanged { coord });
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn get_placement(&self, id: &PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.id == id)
    }

    /// First placement covering `coord`
    pub fn placement_at(&self, coord: GridCoordinate) -> Option<&Placement> {
        self.placements.iter().find(|p| p.contains(coord))
    }

    pub fn is_occupied(&self, coord: GridCoordinate) -> bool {
        self.placement_at(coord).is_some()
    }

    /// Check bounds, then overlap, for a footprint anchored at `origin`
    pub fn check_footprint(
        &self,
        footprint: &ObjectFootprint,
        origin: GridCoordinate,
    ) -> Result<()> {
        let width = footprint.width.max(1);
        let height = footprint.height.max(1);
        if !self.is_valid(origin) {
            return Err(MapError::OutOfBounds(origin));
        }
        // Anything wider than the grid is out of bounds wherever it sits
        if width > self.cols || height > self.rows {
            return Err(MapError::OutOfBounds(GridCoordinate::new(
                far_edge(origin.row, height),
                far_edge(origin.col, width),
            )));
        }
        if let Some(outside) = footprint_cells(origin, width, height).find(|c| !self.is_valid(*c)) {
            return Err(MapError::OutOfBounds(outside));
        }
        for coord in footprint_cells(origin, width, height) {
            if let Some(existing) = self.placement_at(coord) {
                return Err(MapError::Overlap {
                    coord,
                    existing: existing.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn can_place(&self, footprint: &ObjectFootprint, origin: GridCoordinate) -> bool {
        self.check_footprint(footprint, origin).is_ok()
    }

    /// Place an object. Either appends a new placement or fails without mutating.
    pub fn place(
        &mut self,
        kind: ObjectKind,
        footprint: &ObjectFootprint,
        origin: GridCoordinate,
    ) -> Result<&Placement> {
        self.place_with_id(PlacementId::new(), kind, footprint, origin)
    }

    /// Place an object under a caller-chosen id (used when restoring saved maps)
    pub fn place_with_id(
        &mut self,
        id: PlacementId,
        kind: ObjectKind,
        footprint: &ObjectFootprint,
        origin: GridCoordinate,
    ) -> Result<&Placement> {
        self.check_footprint(footprint, origin)?;
        let placement = Placement {
            id,
            kind,
            origin_row: origin.row,
            origin_col: origin.col,
            width: footprint.width.max(1),
            height: footprint.height.max(1),
        };
        self.record(GridChange::PlacementAdded {
            id: placement.id.clone(),
            kind,
            origin,
            width: placement.width,
            height: placement.height,
        });
        self.placements.push(placement);
        let last = self.placements.len() - 1;
        Ok(&self.placements[last])
    }

    /// Remove a placement by id. Absent ids are a no-op.
    pub fn remove_placement(&mut self, id: &PlacementId) -> Option<Placement> {
        let index = self.placements.iter().position(|p| &p.id == id)?;
        let removed = self.placements.remove(index);
        self.record(GridChange::PlacementRemoved { id: removed.id.clone() });
        Some(removed)
    }

    /// Every covered cell mapped to the wall height of the wall covering it
    pub fn wall_cells(&self) -> AHashMap<GridCoordinate, f32> {
        let mut walls = AHashMap::new();
        for placement in &self.placements {
            if let Some(height) = placement.kind.wall_height() {
                for coord in placement.covered_cells() {
                    walls.insert(coord, height);
                }
            }
        }
        walls
    }

    pub fn occupied_cells(&self) -> AHashSet<GridCoordinate> {
        self.placements.iter().flat_map(|p| p.covered_cells()).collect()
    }

    /// Number of cells covered by any placement
    pub fn occupied_count(&self) -> usize {
        self.placements.iter().map(|p| p.cell_count()).sum()
    }

    pub fn vertex_heights(&self) -> Option<&VertexHeights> {
        self.vertex_heights.as_ref()
    }

    pub fn set_vertex_heights(&mut self, heights: Option<VertexHeights>) {
        self.vertex_heights = heights;
        self.version += 1;
    }

    /// Derive corner heights by averaging the cells touching each corner
    pub fn rebuild_vertex_heights(&mut self) {
        let mut vertices = VertexHeights::flat(self.rows, self.cols);
        for vr in 0..=self.rows as i32 {
            for vc in 0..=self.cols as i32 {
                let touching = [(vr - 1, vc - 1), (vr - 1, vc), (vr, vc - 1), (vr, vc)];
                let (sum, count) = touching
                    .iter()
                    .filter_map(|&(r, c)| self.cell_at(GridCoordinate::new(r, c)))
                    .fold((0.0_f32, 0_u32), |(s, n), cell| (s + cell.height, n + 1));
                if count > 0 {
                    vertices.set(vr, vc, sum / count as f32);
                }
            }
        }
        self.set_vertex_heights(Some(vertices));
    }

    /// Monotonic counter bumped by every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Take all change events recorded since the last drain
    pub fn drain_changes(&mut self) -> Vec<GridChange> {
        std::mem::take(&mut self.changes)
    }

    fn record(&mut self, change: GridChange) {
        self.version += 1;
        self.changes.push(change);
    }
}
