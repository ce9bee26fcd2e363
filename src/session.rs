//! Editing session: one owner for a map being built or edited
//!
//! `MapSession` ties the grid to the rules, validator, stockpile, live wall
//! draft and terrain history. It is single-threaded; the renderer reads the
//! grid and bridge list between calls and drains the change feed.

use glam::Vec2;

use crate::core::config::EngineConfig;
use crate::core::error::{MapError, Result};
use crate::core::types::{EditorMode, ObjectKind, PlacementId, TerrainKind};
use crate::placement::registry::PlacementRules;
use crate::placement::stockpile::Stockpile;
use crate::placement::validation::{PlacementContext, PlacementValidator};
use crate::spatial::coord::{GridCoordinate, WorldFrame};
use crate::spatial::grid::{footprint_cells, GridChange, MapGrid, Placement};
use crate::terrain::brush::EditRegion;
use crate::terrain::editor::TerrainEditor;
use crate::tools::bridges::{synthesize_bridges, wall_cells, BridgeConnector};
use crate::tools::line::{
    apply_line, plan_line, preview_line, validate_line, LinePreview, WallLineDraft,
};

#[derive(Debug)]
pub struct MapSession {
    grid: MapGrid,
    rules: PlacementRules,
    validator: PlacementValidator,
    stockpile: Stockpile,
    mode: EditorMode,
    frame: WorldFrame,
    terrain: TerrainEditor,
    draft: Option<WallLineDraft>,
    selected: ObjectKind,
}

impl MapSession {
    pub fn new(grid: MapGrid, rules: PlacementRules, config: &EngineConfig) -> Self {
        Self {
            grid,
            rules,
            validator: PlacementValidator::new(),
            stockpile: Stockpile::new(),
            mode: EditorMode::default(),
            frame: WorldFrame::new(config.cell_world_size),
            terrain: TerrainEditor::new(config),
            draft: None,
            selected: ObjectKind::Wall,
        }
    }

    pub fn with_validator(mut self, validator: PlacementValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_mode(mut self, mode: EditorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_stockpile(mut self, stockpile: Stockpile) -> Self {
        self.stockpile = stockpile;
        self
    }

    pub fn with_origin_offset(mut self, offset: Vec2) -> Self {
        self.frame = self.frame.with_offset(offset);
        self
    }

    pub fn grid(&self) -> &MapGrid {
        &self.grid
    }

    pub fn into_grid(self) -> MapGrid {
        self.grid
    }

    pub fn rules(&self) -> &PlacementRules {
        &self.rules
    }

    pub fn stockpile(&self) -> &Stockpile {
        &self.stockpile
    }

    pub fn stockpile_mut(&mut self) -> &mut Stockpile {
        &mut self.stockpile
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
    }

    pub fn frame(&self) -> &WorldFrame {
        &self.frame
    }

    pub fn selected_kind(&self) -> ObjectKind {
        self.selected
    }

    pub fn select_kind(&mut self, kind: ObjectKind) {
        self.selected = kind;
    }

    pub fn terrain_editor(&self) -> &TerrainEditor {
        &self.terrain
    }

    fn context(&self) -> PlacementContext<'_> {
        PlacementContext::new(&self.grid, &self.rules, &self.stockpile, self.mode)
    }

    // --- single placements ---

    /// Check a single placement of `kind` anchored at `origin`
    pub fn validate_at(&self, kind: ObjectKind, origin: GridCoordinate) -> Result<()> {
        let footprint = self.rules.footprint(kind);
        let cells: Vec<_> = footprint_cells(origin, footprint.width, footprint.height).collect();
        self.validator.validate(&self.context(), kind, &cells)
    }

    /// Validate, place and pay for one object
    pub fn place_at(&mut self, kind: ObjectKind, origin: GridCoordinate) -> Result<PlacementId> {
        self.validate_at(kind, origin)?;
        let footprint = self.rules.footprint(kind);
        let id = self.grid.place(kind, &footprint, origin)?.id.clone();
        self.pay(kind, 1);
        tracing::info!(%kind, %origin, id = %id, "placed");
        Ok(id)
    }

    pub fn remove(&mut self, id: &PlacementId) -> Option<Placement> {
        self.grid.remove_placement(id)
    }

    /// Grid cell under a world-space point
    pub fn cell_at_world(&self, pos: Vec2) -> Option<GridCoordinate> {
        self.frame.from_world(pos, self.grid.rows(), self.grid.cols())
    }

    pub fn world_position(&self, coord: GridCoordinate) -> Vec2 {
        self.frame.to_world(coord, self.grid.rows(), self.grid.cols())
    }

    fn pay(&mut self, kind: ObjectKind, count: u32) {
        if self.mode != EditorMode::Play || !self.rules.is_restricted(kind) {
            return;
        }
        if !self.stockpile.spend(self.rules.cost(kind), count) {
            tracing::warn!(%kind, count, "stockpile could not cover a validated placement");
        }
    }

    // --- wall lines ---

    /// Start a drag at `start` with the selected kind, replacing any live draft
    pub fn begin_wall_line(&mut self, start: GridCoordinate) -> Result<()> {
        if !self.grid.is_valid(start) {
            return Err(MapError::OutOfBounds(start));
        }
        let draft = WallLineDraft::begin(start, self.selected)
            .bounded(self.grid.rows(), self.grid.cols());
        self.draft = Some(draft);
        Ok(())
    }

    /// Move the drag end, clamped into the grid, and preview the result
    pub fn update_wall_line(&mut self, end: GridCoordinate) -> Result<LinePreview> {
        let draft = self.draft.as_mut().ok_or(MapError::NoActiveDraft)?;
        draft.update(end);
        self.preview_wall_line().ok_or(MapError::NoActiveDraft)
    }

    /// Preview for the live draft, if any
    pub fn preview_wall_line(&self) -> Option<LinePreview> {
        let draft = self.draft.as_ref()?;
        Some(preview_line(&self.validator, &self.context(), draft))
    }

    pub fn wall_draft(&self) -> Option<&WallLineDraft> {
        self.draft.as_ref()
    }

    /// Drop the live draft without touching the grid
    pub fn cancel_wall_line(&mut self) -> bool {
        self.draft.take().is_some()
    }

    /// Validate the whole draft as one batch, then place and pay for it
    ///
    /// The draft ends either way. A rejected line leaves the grid and the
    /// stockpile untouched.
    pub fn commit_wall_line(&mut self) -> Result<Vec<PlacementId>> {
        let draft = self.draft.take().ok_or(MapError::NoActiveDraft)?;
        let kind = draft.kind();
        let plan = plan_line(&self.rules, &draft);
        validate_line(&self.validator, &self.context(), kind, &plan)?;

        let ids = apply_line(&mut self.grid, &self.rules, kind, &plan)?;
        self.pay(kind, ids.len() as u32);
        tracing::info!(
            %kind,
            start = %draft.start(),
            end = %draft.end(),
            placed = ids.len(),
            "wall line committed"
        );
        Ok(ids)
    }

    /// Corner connectors for the committed walls
    pub fn bridges(&self) -> Vec<BridgeConnector> {
        synthesize_bridges(&wall_cells(&self.grid, None))
    }

    // --- terrain ---

    pub fn raise_terrain(&mut self, region: &EditRegion, amount: f32) -> usize {
        self.terrain.raise_by(&mut self.grid, region, amount)
    }

    pub fn lower_terrain(&mut self, region: &EditRegion, amount: f32) -> usize {
        self.terrain.lower_by(&mut self.grid, region, amount)
    }

    pub fn flatten_terrain(&mut self, region: &EditRegion, height: f32) -> usize {
        self.terrain.flatten_to(&mut self.grid, region, height)
    }

    pub fn paint_terrain(&mut self, region: &EditRegion, terrain: TerrainKind) -> usize {
        self.terrain.paint(&mut self.grid, region, terrain)
    }

    pub fn undo(&mut self) -> bool {
        self.terrain.undo(&mut self.grid)
    }

    pub fn redo(&mut self) -> bool {
        self.terrain.redo(&mut self.grid)
    }

    // --- change feed ---

    pub fn version(&self) -> u64 {
        self.grid.version()
    }

    pub fn drain_changes(&mut self) -> Vec<GridChange> {
        self.grid.drain_changes()
    }
}
