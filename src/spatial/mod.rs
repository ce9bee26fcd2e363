//! Grid coordinates, cells and placement occupancy

pub mod coord;
pub mod grid;

pub use coord::{GridCoordinate, WorldFrame};
pub use grid::{footprint_cells, Cell, GridChange, MapGrid, Placement, VertexHeights};
