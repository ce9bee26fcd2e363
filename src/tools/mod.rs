//! Drawing tools - wall lines and their derived corner connectors

pub mod bridges;
pub mod line;

pub use bridges::{
    synthesize_bridges, synthesize_bridges_near, wall_cells, BridgeConnector, BridgeCorner,
    WallCells,
};
pub use line::{
    apply_line, commit_line, plan_line, preview_line, rasterize_line, validate_line, LinePlan,
    LinePreview, WallLineDraft,
};
