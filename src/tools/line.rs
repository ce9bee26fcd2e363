//! Wall-line drawing: drag rasterization and batch commit

use ahash::AHashSet;

use crate::core::error::Result;
use crate::core::types::{EditorMode, ObjectKind, PlacementId};
use crate::placement::registry::PlacementRules;
use crate::placement::stockpile::Stockpile;
use crate::placement::validation::{PlacementContext, PlacementValidator};
use crate::spatial::coord::GridCoordinate;
use crate::spatial::grid::{footprint_cells, MapGrid};
use crate::tools::bridges::{synthesize_bridges_near, wall_cells, BridgeConnector};

/// Ordered cells approximating the segment from `start` to `end`
///
/// Straight rows and columns are walked cell by cell. Otherwise the axis
/// with the larger delta (the column axis on ties) advances one cell per
/// step and the other axis follows `round(t * |minor|)`. The result always
/// has `max(|d_row|, |d_col|) + 1` cells, starts at `start` and ends at `end`.
pub fn rasterize_line(start: GridCoordinate, end: GridCoordinate) -> Vec<GridCoordinate> {
    let d_row = i64::from(end.row) - i64::from(start.row);
    let d_col = i64::from(end.col) - i64::from(start.col);
    // Every cell lies between start and end, so it fits back into i32
    let at = |dr: i64, dc: i64| {
        GridCoordinate::new(
            (i64::from(start.row) + dr) as i32,
            (i64::from(start.col) + dc) as i32,
        )
    };

    if d_row == 0 {
        let step = d_col.signum();
        return (0..=d_col.abs()).map(|i| at(0, i * step)).collect();
    }
    if d_col == 0 {
        let step = d_row.signum();
        return (0..=d_row.abs()).map(|i| at(i * step, 0)).collect();
    }

    let col_dominant = d_col.abs() >= d_row.abs();
    let (major, minor) = if col_dominant {
        (d_col.abs(), d_row.abs())
    } else {
        (d_row.abs(), d_col.abs())
    };

    (0..=major)
        .map(|i| {
            let t = i as f64 / major as f64;
            let offset = (t * minor as f64).round() as i64;
            if col_dominant {
                at(offset * d_row.signum(), i * d_col.signum())
            } else {
                at(i * d_row.signum(), offset * d_col.signum())
            }
        })
        .collect()
}

/// In-progress wall line, alive only while the drag lasts
#[derive(Debug, Clone, PartialEq)]
pub struct WallLineDraft {
    start: GridCoordinate,
    end: GridCoordinate,
    kind: ObjectKind,
    cells: Vec<GridCoordinate>,
    /// Grid `(rows, cols)` the live end is clamped into
    bounds: Option<(u32, u32)>,
}

impl WallLineDraft {
    pub fn begin(start: GridCoordinate, kind: ObjectKind) -> Self {
        Self {
            start,
            end: start,
            kind,
            cells: vec![start],
            bounds: None,
        }
    }

    /// Keep the live end inside a `rows` x `cols` grid while dragging
    pub fn bounded(mut self, rows: u32, cols: u32) -> Self {
        self.bounds = Some((rows, cols));
        self
    }

    /// Move the live end of the drag. Returns false when the end cell is unchanged.
    ///
    /// A bounded draft clamps `end` to the nearest grid cell first.
    pub fn update(&mut self, end: GridCoordinate) -> bool {
        let end = match self.bounds {
            Some((rows, cols)) => end.clamp_to(rows, cols),
            None => end,
        };
        if end == self.end {
            return false;
        }
        self.end = end;
        self.cells = rasterize_line(self.start, end);
        true
    }

    pub fn start(&self) -> GridCoordinate {
        self.start
    }

    pub fn end(&self) -> GridCoordinate {
        self.end
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn cells(&self) -> &[GridCoordinate] {
        &self.cells
    }
}

/// What a commit would create
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePlan {
    /// Origins that each receive one placement
    pub origins: Vec<GridCoordinate>,
    /// Every cell the planned placements cover
    pub covered: Vec<GridCoordinate>,
    /// Path cells dropped because this commit already claims them
    pub skipped: usize,
}

/// Work out the placements a draft produces with the kind's footprint
pub fn plan_line(rules: &PlacementRules, draft: &WallLineDraft) -> LinePlan {
    let footprint = rules.footprint(draft.kind());
    let mut claimed = AHashSet::new();
    let mut plan = LinePlan::default();

    for &origin in draft.cells() {
        let cells: Vec<_> = footprint_cells(origin, footprint.width, footprint.height).collect();
        if cells.iter().any(|c| claimed.contains(c)) {
            plan.skipped += 1;
            continue;
        }
        claimed.extend(cells.iter().copied());
        plan.covered.extend(cells);
        plan.origins.push(origin);
    }

    plan
}

/// Validate a planned line as one batch
pub fn validate_line(
    validator: &PlacementValidator,
    ctx: &PlacementContext<'_>,
    kind: ObjectKind,
    plan: &LinePlan,
) -> Result<()> {
    let ctx = ctx.with_placement_count(plan.origins.len() as u32);
    validator.validate(&ctx, kind, &plan.covered)
}

/// Place every planned origin, all or nothing
///
/// The plan must already have passed `validate_line`. If the grid still
/// rejects one placement, the ones created by this call are removed again.
pub fn apply_line(
    grid: &mut MapGrid,
    rules: &PlacementRules,
    kind: ObjectKind,
    plan: &LinePlan,
) -> Result<Vec<PlacementId>> {
    let footprint = rules.footprint(kind);
    let mut placed = Vec::with_capacity(plan.origins.len());

    for &origin in &plan.origins {
        match grid.place(kind, &footprint, origin) {
            Ok(placement) => placed.push(placement.id.clone()),
            Err(err) => {
                for id in &placed {
                    grid.remove_placement(id);
                }
                return Err(err);
            }
        }
    }

    if plan.skipped > 0 {
        tracing::debug!(skipped = plan.skipped, "line cells already claimed by this commit");
    }
    Ok(placed)
}

/// What the renderer shows while a drag is live
#[derive(Debug, Clone, PartialEq)]
pub struct LinePreview {
    pub cells: Vec<GridCoordinate>,
    /// Outcome a commit would have right now; the ghost is drawn red on `Err`
    pub verdict: Result<()>,
    /// Connectors around the draft, as if it were already built
    pub bridges: Vec<BridgeConnector>,
}

impl LinePreview {
    pub fn is_valid(&self) -> bool {
        self.verdict.is_ok()
    }
}

pub fn preview_line(
    validator: &PlacementValidator,
    ctx: &PlacementContext<'_>,
    draft: &WallLineDraft,
) -> LinePreview {
    let plan = plan_line(ctx.rules, draft);
    let verdict = validate_line(validator, ctx, draft.kind(), &plan);
    let walls = wall_cells(ctx.grid, Some((&plan.covered[..], draft.kind())));
    let bridges = synthesize_bridges_near(&walls, &plan.covered);
    LinePreview {
        cells: plan.covered,
        verdict,
        bridges,
    }
}

/// Plan, validate and place a finished draft. Pays nothing; see `MapSession`
/// for the variant that charges the stockpile.
pub fn commit_line(
    grid: &mut MapGrid,
    validator: &PlacementValidator,
    rules: &PlacementRules,
    mode: EditorMode,
    stockpile: &Stockpile,
    draft: &WallLineDraft,
) -> Result<Vec<PlacementId>> {
    let plan = plan_line(rules, draft);
    {
        let ctx = PlacementContext::new(grid, rules, stockpile, mode);
        validate_line(validator, &ctx, draft.kind(), &plan)?;
    }
    apply_line(grid, rules, draft.kind(), &plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::registry::ObjectFootprint;

    fn c(row: i32, col: i32) -> GridCoordinate {
        GridCoordinate::new(row, col)
    }

    #[test]
    fn test_single_cell_line() {
        assert_eq!(rasterize_line(c(3, 3), c(3, 3)), vec![c(3, 3)]);
    }

    #[test]
    fn test_horizontal_line_walks_backwards() {
        assert_eq!(
            rasterize_line(c(2, 5), c(2, 2)),
            vec![c(2, 5), c(2, 4), c(2, 3), c(2, 2)]
        );
    }

    #[test]
    fn test_vertical_line() {
        assert_eq!(rasterize_line(c(0, 1), c(3, 1)).len(), 4);
        assert_eq!(rasterize_line(c(0, 1), c(3, 1))[2], c(2, 1));
    }

    #[test]
    fn test_pure_diagonal() {
        assert_eq!(
            rasterize_line(c(10, 10), c(13, 13)),
            vec![c(10, 10), c(11, 11), c(12, 12), c(13, 13)]
        );
    }

    #[test]
    fn test_shallow_line_staircase() {
        // Column dominant: 4 steps over 1 row
        let path = rasterize_line(c(0, 0), c(1, 4));
        assert_eq!(path, vec![c(0, 0), c(0, 1), c(1, 2), c(1, 3), c(1, 4)]);
    }

    #[test]
    fn test_steep_line_negative_direction() {
        let path = rasterize_line(c(5, 5), c(1, 4));
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], c(5, 5));
        assert_eq!(path[4], c(1, 4));
        // Rows move one per step
        for (i, cell) in path.iter().enumerate() {
            assert_eq!(cell.row, 5 - i as i32);
        }
    }

    #[test]
    fn test_draft_update_reports_change() {
        let mut draft = WallLineDraft::begin(c(0, 0), ObjectKind::Wall);
        assert_eq!(draft.cells(), &[c(0, 0)]);
        assert!(draft.update(c(0, 3)));
        assert!(!draft.update(c(0, 3)));
        assert_eq!(draft.cells().len(), 4);
    }

    #[test]
    fn test_bounded_draft_clamps_end_into_grid() {
        let mut draft = WallLineDraft::begin(c(5, 5), ObjectKind::Wall).bounded(10, 10);
        assert!(draft.update(c(5, i32::MIN)));
        assert_eq!(draft.end(), c(5, 0));
        assert_eq!(draft.cells().len(), 6);

        assert!(draft.update(c(1_000_000_000, 1_000_000_000)));
        assert_eq!(draft.end(), c(9, 9));
        assert_eq!(draft.cells().len(), 5);
        assert!(!draft.update(c(40, 12)));
    }

    #[test]
    fn test_line_deltas_do_not_overflow() {
        let path = rasterize_line(c(i32::MAX - 1, i32::MIN), c(i32::MAX, i32::MIN + 2));
        assert_eq!(
            path,
            vec![
                c(i32::MAX - 1, i32::MIN),
                c(i32::MAX, i32::MIN + 1),
                c(i32::MAX, i32::MIN + 2),
            ]
        );
    }

    #[test]
    fn test_plan_skips_cells_claimed_by_wide_footprint() {
        let mut rules = PlacementRules::new();
        rules.set_footprint(ObjectFootprint::new(ObjectKind::Tower, 2, 1));
        let mut draft = WallLineDraft::begin(c(0, 0), ObjectKind::Tower);
        draft.update(c(0, 3));

        let plan = plan_line(&rules, &draft);
        assert_eq!(plan.origins, vec![c(0, 0), c(0, 2)]);
        assert_eq!(plan.skipped, 2);
        assert_eq!(plan.covered.len(), 4);
    }

    #[test]
    fn test_commit_line_places_each_cell() {
        let mut grid = MapGrid::new(20, 20);
        let rules = PlacementRules::with_defaults();
        let validator = PlacementValidator::new();
        let stockpile = Stockpile::new();
        let mut draft = WallLineDraft::begin(c(1, 1), ObjectKind::Wall);
        draft.update(c(1, 6));

        let ids = commit_line(
            &mut grid,
            &validator,
            &rules,
            EditorMode::MapEditor,
            &stockpile,
            &draft,
        )
        .unwrap();
        assert_eq!(ids.len(), 6);
        assert_eq!(grid.placements().len(), 6);
    }

    #[test]
    fn test_commit_line_rejected_leaves_grid_untouched() {
        let mut grid = MapGrid::new(20, 20);
        let rules = PlacementRules::with_defaults();
        let validator = PlacementValidator::new();
        let stockpile = Stockpile::new();
        grid.place(ObjectKind::Wall, &rules.footprint(ObjectKind::Wall), c(1, 4)).unwrap();

        let mut draft = WallLineDraft::begin(c(1, 1), ObjectKind::Wall);
        draft.update(c(1, 6));
        let result = commit_line(
            &mut grid,
            &validator,
            &rules,
            EditorMode::MapEditor,
            &stockpile,
            &draft,
        );
        assert!(result.is_err());
        assert_eq!(grid.placements().len(), 1);
    }

    #[test]
    fn test_preview_reports_verdict_and_bridges() {
        let mut grid = MapGrid::new(20, 20);
        grid.set_terrain(c(3, 3), crate::core::types::TerrainKind::Water);
        let rules = PlacementRules::with_defaults();
        let validator = PlacementValidator::new();
        let stockpile = Stockpile::new();
        let ctx = PlacementContext::new(&grid, &rules, &stockpile, EditorMode::MapEditor);

        let mut draft = WallLineDraft::begin(c(0, 0), ObjectKind::Wall);
        draft.update(c(2, 2));
        let preview = preview_line(&validator, &ctx, &draft);
        assert!(preview.is_valid());
        assert_eq!(preview.cells.len(), 3);
        assert_eq!(preview.bridges.len(), 4);

        draft.update(c(3, 3));
        assert!(!preview_line(&validator, &ctx, &draft).is_valid());
    }

    #[test]
    fn test_apply_line_rolls_back_on_conflict() {
        let mut grid = MapGrid::new(5, 5);
        let rules = PlacementRules::with_defaults();
        grid.place(ObjectKind::Rock, &rules.footprint(ObjectKind::Rock), c(0, 2)).unwrap();
        let plan = LinePlan {
            origins: vec![c(0, 0), c(0, 1), c(0, 2)],
            covered: vec![c(0, 0), c(0, 1), c(0, 2)],
            skipped: 0,
        };

        assert!(apply_line(&mut grid, &rules, ObjectKind::Wall, &plan).is_err());
        assert_eq!(grid.placements().len(), 1);
    }
}
