//! Terrain editing - brushes, height/paint edits and undo history

pub mod brush;
pub mod editor;
pub mod history;

pub use brush::{cells_in_brush, BrushSize, EditRegion};
pub use editor::TerrainEditor;
pub use history::{EditHistory, HeightChange, TerrainAction, TerrainChange};
