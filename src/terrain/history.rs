//! Undo/redo history for terrain edits

use std::collections::VecDeque;

use crate::core::types::TerrainKind;
use crate::spatial::coord::GridCoordinate;
use crate::spatial::grid::MapGrid;

/// Default number of actions kept in the undo stack.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightChange {
    pub coord: GridCoordinate,
    pub before: f32,
    pub after: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainChange {
    pub coord: GridCoordinate,
    pub before: TerrainKind,
    pub after: TerrainKind,
}

/// A single undoable terrain edit. Each variant stores exactly the cells it changed.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainAction {
    Elevation { changes: Vec<HeightChange> },
    Paint { changes: Vec<TerrainChange> },
}

impl TerrainAction {
    pub fn affected_cells(&self) -> Vec<GridCoordinate> {
        match self {
            TerrainAction::Elevation { changes } => changes.iter().map(|c| c.coord).collect(),
            TerrainAction::Paint { changes } => changes.iter().map(|c| c.coord).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TerrainAction::Elevation { changes } => changes.len(),
            TerrainAction::Paint { changes } => changes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Restore the state before the action
    pub fn revert(&self, grid: &mut MapGrid) {
        match self {
            TerrainAction::Elevation { changes } => {
                for change in changes {
                    grid.set_height(change.coord, change.before);
                }
            }
            TerrainAction::Paint { changes } => {
                for change in changes {
                    grid.set_terrain(change.coord, change.before);
                }
            }
        }
    }

    /// Re-apply the action
    pub fn apply(&self, grid: &mut MapGrid) {
        match self {
            TerrainAction::Elevation { changes } => {
                for change in changes {
                    grid.set_height(change.coord, change.after);
                }
            }
            TerrainAction::Paint { changes } => {
                for change in changes {
                    grid.set_terrain(change.coord, change.after);
                }
            }
        }
    }
}

/// Stores undo and redo stacks for terrain actions.
#[derive(Debug, Clone)]
pub struct EditHistory {
    undo_stack: VecDeque<TerrainAction>,
    redo_stack: Vec<TerrainAction>,
    capacity: usize,
}

impl EditHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Push a new action onto the undo stack, clearing the redo stack.
    /// If the stack exceeds its capacity, the oldest action is dropped.
    pub fn push(&mut self, action: TerrainAction) {
        self.redo_stack.clear();
        self.push_undo_no_clear(action);
    }

    /// Pop the most recent action from the undo stack for undoing.
    pub fn pop_undo(&mut self) -> Option<TerrainAction> {
        self.undo_stack.pop_back()
    }

    /// Pop the most recent action from the redo stack for redoing.
    pub fn pop_redo(&mut self) -> Option<TerrainAction> {
        self.redo_stack.pop()
    }

    /// Push an action onto the redo stack (after undo).
    pub fn push_redo(&mut self, action: TerrainAction) {
        self.redo_stack.push(action);
    }

    /// Push an action onto the undo stack (after redo), without clearing redo.
    pub fn push_undo_no_clear(&mut self, action: TerrainAction) {
        self.undo_stack.push_back(action);
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elevation(row: i32, after: f32) -> TerrainAction {
        TerrainAction::Elevation {
            changes: vec![HeightChange {
                coord: GridCoordinate::new(row, 0),
                before: 0.0,
                after,
            }],
        }
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = EditHistory::new(8);
        history.push(elevation(0, 1.0));
        let action = history.pop_undo().unwrap();
        history.push_redo(action);
        assert!(history.can_redo());

        history.push(elevation(1, 1.0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = EditHistory::new(3);
        for row in 0..5 {
            history.push(elevation(row, 1.0));
        }
        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.pop_undo(), Some(elevation(4, 1.0)));
        history.pop_undo();
        assert_eq!(history.pop_undo(), Some(elevation(2, 1.0)));
        assert_eq!(history.pop_undo(), None);
    }

    #[test]
    fn test_revert_and_apply() {
        let mut grid = MapGrid::new(2, 2);
        let action = elevation(1, 3.0);
        action.apply(&mut grid);
        assert_eq!(grid.height(GridCoordinate::new(1, 0)), 3.0);
        action.revert(&mut grid);
        assert_eq!(grid.height(GridCoordinate::new(1, 0)), 0.0);
    }

    #[test]
    fn test_paint_action_cells() {
        let action = TerrainAction::Paint {
            changes: vec![TerrainChange {
                coord: GridCoordinate::new(0, 1),
                before: TerrainKind::Grass,
                after: TerrainKind::Sand,
            }],
        };
        assert_eq!(action.affected_cells(), vec![GridCoordinate::new(0, 1)]);
        assert!(!action.is_empty());
    }
}
