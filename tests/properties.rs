//! Property-based tests for line rasterization, occupancy and terrain history

use proptest::prelude::*;

use bastion_map::core::{EngineConfig, ObjectKind};
use bastion_map::placement::PlacementRules;
use bastion_map::spatial::{GridCoordinate, MapGrid};
use bastion_map::terrain::{BrushSize, EditRegion, TerrainEditor};
use bastion_map::tools::rasterize_line;

fn coord() -> impl Strategy<Value = GridCoordinate> {
    (-50i32..50, -50i32..50).prop_map(|(row, col)| GridCoordinate::new(row, col))
}

fn brush() -> impl Strategy<Value = BrushSize> {
    prop::sample::select(BrushSize::ALL.to_vec())
}

fn kind() -> impl Strategy<Value = ObjectKind> {
    prop::sample::select(ObjectKind::ALL.to_vec())
}

#[derive(Debug, Clone)]
enum Edit {
    Raise(GridCoordinate, BrushSize, f32),
    Lower(GridCoordinate, BrushSize, f32),
    Flatten(GridCoordinate, BrushSize, f32),
}

fn edit() -> impl Strategy<Value = Edit> {
    let center = (0i32..24, 0i32..24).prop_map(|(r, c)| GridCoordinate::new(r, c));
    prop_oneof![
        (center.clone(), brush(), 0.1f32..5.0).prop_map(|(c, b, a)| Edit::Raise(c, b, a)),
        (center.clone(), brush(), 0.1f32..5.0).prop_map(|(c, b, a)| Edit::Lower(c, b, a)),
        (center, brush(), -8.0f32..8.0).prop_map(|(c, b, h)| Edit::Flatten(c, b, h)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Lines start and end at the drag endpoints and have Chebyshev length + 1 cells.
    #[test]
    fn prop_line_endpoints_and_length(start in coord(), end in coord()) {
        let path = rasterize_line(start, end);
        let expected = (end.row - start.row).abs().max((end.col - start.col).abs()) as usize + 1;

        prop_assert_eq!(path.len(), expected);
        prop_assert_eq!(path[0], start);
        prop_assert_eq!(*path.last().unwrap(), end);
    }

    /// Every step moves at most one cell along each axis, never backwards.
    #[test]
    fn prop_line_is_monotone_and_connected(start in coord(), end in coord()) {
        let path = rasterize_line(start, end);
        let row_dir = (end.row - start.row).signum();
        let col_dir = (end.col - start.col).signum();

        for pair in path.windows(2) {
            let d_row = pair[1].row - pair[0].row;
            let d_col = pair[1].col - pair[0].col;
            prop_assert!(d_row.abs() <= 1 && d_col.abs() <= 1);
            prop_assert!(d_row == 0 || d_row == row_dir);
            prop_assert!(d_col == 0 || d_col == col_dir);
            prop_assert!(d_row != 0 || d_col != 0);
        }
    }

    /// Pushing the end one more cell along the dominant axis adds exactly one cell.
    #[test]
    fn prop_line_grows_by_one_per_dominant_step(start in coord(), end in coord()) {
        let d_row = end.row - start.row;
        let d_col = end.col - start.col;
        let extended = if d_col.abs() >= d_row.abs() {
            let step = if d_col == 0 { 1 } else { d_col.signum() };
            GridCoordinate::new(end.row, end.col + step)
        } else {
            GridCoordinate::new(end.row + d_row.signum(), end.col)
        };

        let path = rasterize_line(start, end);
        let longer = rasterize_line(start, extended);
        prop_assert_eq!(longer.len(), path.len() + 1);
        prop_assert_eq!(longer[0], start);
        prop_assert_eq!(*longer.last().unwrap(), extended);
    }

    /// Whatever is attempted, accepted placements never share a cell or leave the grid.
    #[test]
    fn prop_placements_never_overlap(
        attempts in prop::collection::vec((kind(), -3i32..23, -3i32..23), 1..40)
    ) {
        let rules = PlacementRules::with_defaults();
        let mut grid = MapGrid::new(20, 20);

        for (kind, row, col) in attempts {
            let origin = GridCoordinate::new(row, col);
            let footprint = rules.footprint(kind);
            let allowed = grid.can_place(&footprint, origin);
            let before = grid.placements().len();
            let placed = grid.place(kind, &footprint, origin).is_ok();

            prop_assert_eq!(allowed, placed);
            prop_assert_eq!(grid.placements().len(), before + usize::from(placed));
        }

        let covered: usize = grid.placements().iter().map(|p| p.cell_count()).sum();
        prop_assert_eq!(grid.occupied_cells().len(), covered);
        prop_assert!(grid
            .placements()
            .iter()
            .all(|p| p.covered_cells().all(|cell| grid.is_valid(cell))));
    }

    /// Undoing every edit restores the original heights; redoing them restores the result.
    #[test]
    fn prop_undo_redo_round_trip(edits in prop::collection::vec(edit(), 1..12)) {
        let mut grid = MapGrid::new(24, 24);
        let mut editor = TerrainEditor::new(&EngineConfig::default());
        let original: Vec<f32> = grid.cells().map(|c| c.height).collect();

        for edit in &edits {
            match *edit {
                Edit::Raise(c, b, a) => editor.raise_by(&mut grid, &EditRegion::brush(c, b), a),
                Edit::Lower(c, b, a) => editor.lower_by(&mut grid, &EditRegion::brush(c, b), a),
                Edit::Flatten(c, b, h) => editor.flatten_to(&mut grid, &EditRegion::brush(c, b), h),
            };
        }
        let edited: Vec<f32> = grid.cells().map(|c| c.height).collect();

        while editor.undo(&mut grid) {}
        let undone: Vec<f32> = grid.cells().map(|c| c.height).collect();
        prop_assert_eq!(undone, original);

        while editor.redo(&mut grid) {}
        let redone: Vec<f32> = grid.cells().map(|c| c.height).collect();
        prop_assert_eq!(redone, edited);
    }
}
