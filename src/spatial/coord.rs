//! Grid coordinates and world-space conversion

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate. Row 0 is the northern edge, col 0 the western edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub row: i32,
    pub col: i32,
}

impl GridCoordinate {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Shifted coordinate, saturating at the `i32` range
    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row.saturating_add(d_row), self.col.saturating_add(d_col))
    }

    pub fn north(&self) -> Self {
        self.offset(-1, 0)
    }

    pub fn east(&self) -> Self {
        self.offset(0, 1)
    }

    pub fn south(&self) -> Self {
        self.offset(1, 0)
    }

    pub fn west(&self) -> Self {
        self.offset(0, -1)
    }

    /// Axis neighbors in N, E, S, W order. May be out of bounds.
    pub fn neighbors4(&self) -> [GridCoordinate; 4] {
        [self.north(), self.east(), self.south(), self.west()]
    }

    /// Diagonal neighbors in NW, NE, SE, SW order. May be out of bounds.
    pub fn diagonals(&self) -> [GridCoordinate; 4] {
        [
            self.offset(-1, -1),
            self.offset(-1, 1),
            self.offset(1, 1),
            self.offset(1, -1),
        ]
    }

    /// Whether the coordinate lies inside a `rows` x `cols` grid
    pub fn in_bounds(&self, rows: u32, cols: u32) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as u32) < rows && (self.col as u32) < cols
    }

    /// Nearest cell inside a `rows` x `cols` grid
    pub fn clamp_to(&self, rows: u32, cols: u32) -> Self {
        let last = |n: u32| i32::try_from(n.saturating_sub(1)).unwrap_or(i32::MAX);
        Self::new(self.row.clamp(0, last(rows)), self.col.clamp(0, last(cols)))
    }

    /// String key used by map files: `"<row>_<col>"`
    pub fn cell_key(&self) -> String {
        format!("{}_{}", self.row, self.col)
    }

    /// Parse a `"<row>_<col>"` key
    pub fn parse_key(key: &str) -> Option<Self> {
        let (row, col) = key.split_once('_')?;
        Some(Self::new(row.parse().ok()?, col.parse().ok()?))
    }
}

impl std::fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for GridCoordinate {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

/// Mapping between grid cells and continuous world space
///
/// The grid is centered on the world origin, then shifted by `origin_offset`.
/// World `x` runs along columns, world `z` (stored in `Vec2::y`) along rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFrame {
    pub cell_size: f32,
    pub origin_offset: Vec2,
}

impl WorldFrame {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            origin_offset: Vec2::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.origin_offset = offset;
        self
    }

    fn half_extent(&self, rows: u32, cols: u32) -> Vec2 {
        Vec2::new(
            cols as f32 * self.cell_size / 2.0,
            rows as f32 * self.cell_size / 2.0,
        )
    }

    /// Cell center in world coordinates `(x, z)`
    pub fn to_world(&self, coord: GridCoordinate, rows: u32, cols: u32) -> Vec2 {
        let half = self.half_extent(rows, cols);
        Vec2::new(
            (coord.col as f32 + 0.5) * self.cell_size - half.x,
            (coord.row as f32 + 0.5) * self.cell_size - half.y,
        ) + self.origin_offset
    }

    /// Cell containing a world position, `None` when outside the grid
    pub fn from_world(&self, pos: Vec2, rows: u32, cols: u32) -> Option<GridCoordinate> {
        let local = pos - self.origin_offset + self.half_extent(rows, cols);
        let col = (local.x / self.cell_size).floor();
        let row = (local.y / self.cell_size).floor();
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let coord = GridCoordinate::new(row as i32, col as i32);
        coord.in_bounds(rows, cols).then_some(coord)
    }
}

impl Default for WorldFrame {
    fn default() -> Self {
        Self::new(1.0)
    }
}
