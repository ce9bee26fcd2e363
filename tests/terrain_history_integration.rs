//! Terrain editing and undo/redo integration tests

use bastion_map::core::{EngineConfig, TerrainKind};
use bastion_map::spatial::{GridCoordinate, MapGrid};
use bastion_map::terrain::{BrushSize, EditRegion, TerrainEditor};

fn heights(grid: &MapGrid) -> Vec<f32> {
    grid.cells().map(|c| c.height).collect()
}

fn terrains(grid: &MapGrid) -> Vec<TerrainKind> {
    grid.cells().map(|c| c.terrain).collect()
}

fn brush(row: i32, col: i32, size: BrushSize) -> EditRegion {
    EditRegion::brush(GridCoordinate::new(row, col), size)
}

#[test]
fn test_undo_everything_restores_initial_state() {
    let mut grid = MapGrid::new(40, 40);
    let mut editor = TerrainEditor::new(&EngineConfig::default());
    let initial_heights = heights(&grid);
    let initial_terrain = terrains(&grid);

    editor.raise_by(&mut grid, &brush(10, 10, BrushSize::Large), 3.0);
    editor.lower_by(&mut grid, &brush(12, 14, BrushSize::Medium), 1.25);
    editor.paint(&mut grid, &brush(0, 0, BrushSize::Medium), TerrainKind::Sand);
    editor.flatten_to(&mut grid, &brush(39, 39, BrushSize::Small), 7.0);
    let edited_heights = heights(&grid);
    let edited_terrain = terrains(&grid);

    let mut undone = 0;
    while editor.undo(&mut grid) {
        undone += 1;
    }
    assert_eq!(undone, 4);
    assert_eq!(heights(&grid), initial_heights);
    assert_eq!(terrains(&grid), initial_terrain);

    while editor.redo(&mut grid) {}
    assert_eq!(heights(&grid), edited_heights);
    assert_eq!(terrains(&grid), edited_terrain);
}

#[test]
fn test_new_edit_after_undo_drops_redo() {
    let mut grid = MapGrid::new(20, 20);
    let mut editor = TerrainEditor::default();
    let region = EditRegion::brush(GridCoordinate::new(5, 5), BrushSize::Small);

    editor.raise_by(&mut grid, &region, 1.0);
    editor.raise_by(&mut grid, &region, 1.0);
    editor.undo(&mut grid);
    assert!(editor.can_redo());

    editor.lower_by(&mut grid, &region, 0.5);
    assert!(!editor.can_redo());
    assert!(!editor.redo(&mut grid));
    assert_eq!(grid.height(GridCoordinate::new(5, 5)), 0.5);
}

#[test]
fn test_history_capacity_drops_oldest_action() {
    let config = EngineConfig {
        undo_capacity: 3,
        ..EngineConfig::default()
    };
    let mut grid = MapGrid::new(10, 10);
    let mut editor = TerrainEditor::new(&config);
    let region = EditRegion::brush(GridCoordinate::new(4, 4), BrushSize::Single);

    for _ in 0..5 {
        editor.raise_by(&mut grid, &region, 1.0);
    }
    while editor.undo(&mut grid) {}
    // The two oldest raises can no longer be undone
    assert_eq!(grid.height(GridCoordinate::new(4, 4)), 2.0);
}

#[test]
fn test_brush_at_edge_only_touches_grid_cells() {
    let mut grid = MapGrid::new(8, 8);
    let mut editor = TerrainEditor::default();
    let changed = editor.raise_by(&mut grid, &brush(0, 7, BrushSize::Medium), 1.0);

    // 4 rows (0..=3) by 4 cols (4..=7)
    assert_eq!(changed, 16);
    assert_eq!(grid.drain_changes().len(), 16);
}

#[test]
fn test_undo_on_empty_history_is_silent() {
    let mut grid = MapGrid::new(4, 4);
    let mut editor = TerrainEditor::default();
    assert!(!editor.undo(&mut grid));
    assert!(!editor.redo(&mut grid));
    assert_eq!(grid.version(), 0);
}
