//! Square terrain brushes and edit regions

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::spatial::coord::GridCoordinate;
use crate::spatial::grid::MapGrid;

/// Supported brush sizes (side = 2 * radius + 1)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushSize {
    /// 1x1
    #[default]
    Single,
    /// 3x3
    Small,
    /// 7x7
    Medium,
    /// 13x13
    Large,
}

impl BrushSize {
    pub const ALL: [BrushSize; 4] = [
        BrushSize::Single,
        BrushSize::Small,
        BrushSize::Medium,
        BrushSize::Large,
    ];

    pub fn radius(&self) -> i32 {
        match self {
            BrushSize::Single => 0,
            BrushSize::Small => 1,
            BrushSize::Medium => 3,
            BrushSize::Large => 6,
        }
    }

    pub fn side(&self) -> i32 {
        2 * self.radius() + 1
    }

    pub fn from_radius(radius: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.radius() == radius)
    }
}

/// In-bounds cells of the square of `radius` around `center`, row-major
pub fn cells_in_brush(
    grid: &MapGrid,
    center: GridCoordinate,
    radius: i32,
) -> Vec<GridCoordinate> {
    let radius = i64::from(radius.max(0));
    // Clip the square to the grid before walking it
    let span = |mid: i32, len: u32| {
        let lo = (i64::from(mid) - radius).max(0);
        let hi = (i64::from(mid) + radius).min(i64::from(len) - 1);
        lo as i32..=hi as i32
    };
    let rows = span(center.row, grid.rows());
    let cols = span(center.col, grid.cols());
    rows.flat_map(|row| cols.clone().map(move |col| GridCoordinate::new(row, col)))
        .collect()
}

/// Cells a terrain edit applies to
#[derive(Debug, Clone, PartialEq)]
pub enum EditRegion {
    Brush {
        center: GridCoordinate,
        size: BrushSize,
    },
    Selection(Vec<GridCoordinate>),
}

impl EditRegion {
    pub fn brush(center: GridCoordinate, size: BrushSize) -> Self {
        EditRegion::Brush { center, size }
    }

    /// Distinct in-bounds cells, in first-seen order
    pub fn resolve(&self, grid: &MapGrid) -> Vec<GridCoordinate> {
        match self {
            EditRegion::Brush { center, size } => cells_in_brush(grid, *center, size.radius()),
            EditRegion::Selection(cells) => {
                let mut seen = AHashSet::new();
                cells
                    .iter()
                    .copied()
                    .filter(|c| grid.is_valid(*c) && seen.insert(*c))
                    .collect()
            }
        }
    }
}
