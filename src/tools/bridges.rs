//! Corner connectors between diagonally touching wall cells
//!
//! Two walls meeting only corner to corner, e.g. `(r, c)` and `(r+1, c+1)`,
//! leave a gap at the two cells completing their 2x2 block. Each of those
//! bridge cells gets a right-triangle connector when exactly two adjacent
//! sides of it are walls. The connector list is derived data: recompute it
//! whenever the wall set changes and never store it.

use ahash::AHashMap;

use crate::core::types::ObjectKind;
use crate::spatial::coord::GridCoordinate;
use crate::spatial::grid::MapGrid;

/// Wall cells mapped to their wall height
pub type WallCells = AHashMap<GridCoordinate, f32>;

/// Outward corner a connector's hypotenuse faces
///
/// A bridge cell whose south and west neighbors are walls gets `NE`: the
/// triangle fills the south-west half and its hypotenuse faces north-east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeCorner {
    NE,
    NW,
    SE,
    SW,
}

impl BridgeCorner {
    /// Corner for a cell given which axis neighbors are walls
    ///
    /// Only two adjacent occupied sides qualify. Every other pattern (0, 1,
    /// 3 or 4 sides, or two opposite sides) has no connector.
    pub fn from_occupied_sides(north: bool, east: bool, south: bool, west: bool) -> Option<Self> {
        match (north, east, south, west) {
            (false, false, true, true) => Some(BridgeCorner::NE),
            (false, true, true, false) => Some(BridgeCorner::NW),
            (true, false, false, true) => Some(BridgeCorner::SE),
            (true, true, false, false) => Some(BridgeCorner::SW),
            _ => None,
        }
    }

    /// Corner holding the triangle's right angle, between the two wall sides
    pub fn right_angle(&self) -> BridgeCorner {
        match self {
            BridgeCorner::NE => BridgeCorner::SW,
            BridgeCorner::NW => BridgeCorner::SE,
            BridgeCorner::SE => BridgeCorner::NW,
            BridgeCorner::SW => BridgeCorner::NE,
        }
    }
}

/// One connector the renderer should draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConnector {
    pub cell: GridCoordinate,
    pub corner: BridgeCorner,
    /// Tallest wall among the diagonal cells this connector bridges
    pub height: f32,
}

/// Wall cells of a grid, optionally merged with a live draft
pub fn wall_cells(grid: &MapGrid, draft: Option<(&[GridCoordinate], ObjectKind)>) -> WallCells {
    let mut walls = grid.wall_cells();
    if let Some((cells, kind)) = draft {
        if let Some(height) = kind.wall_height() {
            for cell in cells {
                let entry = walls.entry(*cell).or_insert(height);
                *entry = entry.max(height);
            }
        }
    }
    walls
}

/// Connectors for the whole wall set
pub fn synthesize_bridges(walls: &WallCells) -> Vec<BridgeConnector> {
    let mut candidates = AHashMap::new();
    for (&cell, &height) in walls {
        for d_col in [1, -1] {
            let other = cell.offset(1, d_col);
            if let Some(&other_height) = walls.get(&other) {
                add_pair(&mut candidates, cell, other, height.max(other_height));
            }
        }
    }
    resolve(walls, candidates)
}

/// Connectors for diagonal pairs touching `focus` only
///
/// Used for the live drag preview, where only the dragged cells can have
/// created or removed a diagonal pair.
pub fn synthesize_bridges_near(
    walls: &WallCells,
    focus: &[GridCoordinate],
) -> Vec<BridgeConnector> {
    let mut candidates = AHashMap::new();
    for cell in focus {
        let Some(&height) = walls.get(cell) else {
            continue;
        };
        for other in cell.diagonals() {
            if let Some(&other_height) = walls.get(&other) {
                add_pair(&mut candidates, *cell, other, height.max(other_height));
            }
        }
    }
    resolve(walls, candidates)
}

/// Record both bridge cells of the diagonal pair `a`-`b`
fn add_pair(
    candidates: &mut AHashMap<GridCoordinate, f32>,
    a: GridCoordinate,
    b: GridCoordinate,
    height: f32,
) {
    for bridge in [
        GridCoordinate::new(a.row, b.col),
        GridCoordinate::new(b.row, a.col),
    ] {
        let entry = candidates.entry(bridge).or_insert(height);
        *entry = entry.max(height);
    }
}

fn resolve(walls: &WallCells, candidates: AHashMap<GridCoordinate, f32>) -> Vec<BridgeConnector> {
    let mut connectors: Vec<_> = candidates
        .into_iter()
        .filter(|(cell, _)| !walls.contains_key(cell))
        .filter_map(|(cell, height)| {
            let corner = BridgeCorner::from_occupied_sides(
                walls.contains_key(&cell.north()),
                walls.contains_key(&cell.east()),
                walls.contains_key(&cell.south()),
                walls.contains_key(&cell.west()),
            )?;
            Some(BridgeConnector { cell, corner, height })
        })
        .collect();
    connectors.sort_by_key(|c| c.cell);
    connectors
}
