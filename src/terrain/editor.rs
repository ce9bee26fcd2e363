//! Terrain edit engine
//!
//! Every edit resolves its region, records only the cells whose value
//! actually changes, applies them and pushes a single `TerrainAction`.
//! Edits that change nothing leave the history alone.

use crate::core::config::EngineConfig;
use crate::core::types::TerrainKind;
use crate::spatial::grid::MapGrid;

use super::brush::EditRegion;
use super::history::{EditHistory, HeightChange, TerrainAction, TerrainChange};

#[derive(Debug, Clone)]
pub struct TerrainEditor {
    history: EditHistory,
    min_height: f32,
    max_height: f32,
}

impl TerrainEditor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            history: EditHistory::new(config.undo_capacity),
            min_height: config.min_height,
            max_height: config.max_height,
        }
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn height_range(&self) -> (f32, f32) {
        (self.min_height, self.max_height)
    }

    /// Add `amount` to every cell in the region. Returns the number of cells changed.
    pub fn raise_by(&mut self, grid: &mut MapGrid, region: &EditRegion, amount: f32) -> usize {
        self.edit_heights(grid, region, |h| h + amount)
    }

    pub fn lower_by(&mut self, grid: &mut MapGrid, region: &EditRegion, amount: f32) -> usize {
        self.edit_heights(grid, region, |h| h - amount)
    }

    /// Set every cell in the region to `target`
    pub fn flatten_to(&mut self, grid: &mut MapGrid, region: &EditRegion, target: f32) -> usize {
        self.edit_heights(grid, region, |_| target)
    }

    /// Paint the region with one terrain kind
    pub fn paint(
        &mut self,
        grid: &mut MapGrid,
        region: &EditRegion,
        terrain: TerrainKind,
    ) -> usize {
        let changes: Vec<_> = region
            .resolve(grid)
            .into_iter()
            .filter_map(|coord| {
                let before = grid.terrain(coord)?;
                (before != terrain).then_some(TerrainChange {
                    coord,
                    before,
                    after: terrain,
                })
            })
            .collect();
        self.commit(grid, TerrainAction::Paint { changes })
    }

    /// Revert the most recent action. No-op on an empty stack.
    pub fn undo(&mut self, grid: &mut MapGrid) -> bool {
        let Some(action) = self.history.pop_undo() else {
            return false;
        };
        action.revert(grid);
        tracing::debug!(cells = action.len(), "terrain undo");
        self.history.push_redo(action);
        true
    }

    /// Re-apply the most recently undone action. No-op on an empty stack.
    pub fn redo(&mut self, grid: &mut MapGrid) -> bool {
        let Some(action) = self.history.pop_redo() else {
            return false;
        };
        action.apply(grid);
        tracing::debug!(cells = action.len(), "terrain redo");
        self.history.push_undo_no_clear(action);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn edit_heights(
        &mut self,
        grid: &mut MapGrid,
        region: &EditRegion,
        edit: impl Fn(f32) -> f32,
    ) -> usize {
        let (min, max) = (self.min_height, self.max_height);
        let changes: Vec<_> = region
            .resolve(grid)
            .into_iter()
            .filter_map(|coord| {
                let before = grid.height(coord);
                let after = edit(before).clamp(min, max);
                (after != before).then_some(HeightChange { coord, before, after })
            })
            .collect();
        self.commit(grid, TerrainAction::Elevation { changes })
    }

    fn commit(&mut self, grid: &mut MapGrid, action: TerrainAction) -> usize {
        let changed = action.len();
        if changed == 0 {
            return 0;
        }
        action.apply(grid);
        self.history.push(action);
        changed
    }
}

impl Default for TerrainEditor {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
