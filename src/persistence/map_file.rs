//! The saved map record and its conversion to and from a live grid

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{unix_now, StorageError};
use crate::core::types::{ObjectKind, PlacementId, TerrainKind};
use crate::placement::registry::ObjectFootprint;
use crate::spatial::coord::GridCoordinate;
use crate::spatial::grid::{Cell, MapGrid, VertexHeights};

/// One placement as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlacement {
    pub id: PlacementId,
    pub object_id: ObjectKind,
    pub row: i32,
    pub col: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedCell {
    #[serde(default)]
    pub terrain: TerrainKind,
    #[serde(default)]
    pub height: f32,
}

/// Persisted map file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMap {
    pub map_name: String,
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub placements: Vec<SavedPlacement>,
    /// Keyed by `"<row>_<col>"`
    #[serde(default)]
    pub cells: BTreeMap<String, SavedCell>,
    #[serde(default)]
    pub created_date: u64,
    #[serde(default)]
    pub origin_offset_x: f32,
    #[serde(default)]
    pub origin_offset_z: f32,
    /// Keyed by `"<vertex_row>_<vertex_col>"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_heights: Option<BTreeMap<String, f32>>,
}

/// Map-level data that doesn't live in the grid
#[derive(Debug, Clone, PartialEq)]
pub struct MapMetadata {
    pub name: String,
    pub created_date: u64,
    pub origin_offset: Vec2,
}

impl MapMetadata {
    /// Metadata stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_date: unix_now(),
            origin_offset: Vec2::ZERO,
        }
    }
}

/// A decoded map file
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub grid: MapGrid,
    pub metadata: MapMetadata,
}

impl SavedMap {
    pub fn from_grid(grid: &MapGrid, metadata: &MapMetadata) -> Self {
        let placements = grid
            .placements()
            .iter()
            .map(|p| SavedPlacement {
                id: p.id.clone(),
                object_id: p.kind,
                row: p.origin_row,
                col: p.origin_col,
                width: p.width,
                height: p.height,
            })
            .collect();

        let cells = grid
            .cells()
            .map(|cell| {
                (
                    cell.coordinate.cell_key(),
                    SavedCell {
                        terrain: cell.terrain,
                        height: cell.height,
                    },
                )
            })
            .collect();

        let vertex_heights = grid.vertex_heights().map(|vertices| {
            vertices
                .iter()
                .map(|(vr, vc, h)| (GridCoordinate::new(vr, vc).cell_key(), h))
                .collect()
        });

        Self {
            map_name: metadata.name.clone(),
            rows: grid.rows(),
            cols: grid.cols(),
            placements,
            cells,
            created_date: metadata.created_date,
            origin_offset_x: metadata.origin_offset.x,
            origin_offset_z: metadata.origin_offset.y,
            vertex_heights,
        }
    }

    /// Rebuild the live grid. Cells missing from the file stay flat grass.
    pub fn into_grid(self) -> Result<LoadedMap, StorageError> {
        let (rows, cols) = (self.rows, self.cols);
        let mut cells: Vec<Cell> = (0..rows as i32)
            .flat_map(|row| {
                (0..cols as i32).map(move |col| Cell::new(GridCoordinate::new(row, col)))
            })
            .collect();

        for (key, saved) in &self.cells {
            let coord = GridCoordinate::parse_key(key)
                .filter(|c| c.in_bounds(rows, cols))
                .ok_or_else(|| StorageError::DecodeFailed(format!("bad cell key {key:?}")))?;
            let cell = &mut cells[coord.row as usize * cols as usize + coord.col as usize];
            cell.terrain = saved.terrain;
            cell.height = saved.height;
        }

        let mut grid = MapGrid::from_cells(rows, cols, cells)
            .map_err(|e| StorageError::DecodeFailed(e.to_string()))?;

        for saved in self.placements {
            let footprint = ObjectFootprint::new(saved.object_id, saved.width, saved.height);
            grid.place_with_id(
                saved.id,
                saved.object_id,
                &footprint,
                GridCoordinate::new(saved.row, saved.col),
            )
            .map_err(|e| StorageError::DecodeFailed(format!("placement: {e}")))?;
        }

        if let Some(saved_vertices) = self.vertex_heights {
            let mut vertices = VertexHeights::flat(rows, cols);
            for (key, height) in saved_vertices {
                let ok = GridCoordinate::parse_key(&key)
                    .map(|c| vertices.set(c.row, c.col, height))
                    .unwrap_or(false);
                if !ok {
                    return Err(StorageError::DecodeFailed(format!("bad vertex key {key:?}")));
                }
            }
            grid.set_vertex_heights(Some(vertices));
        }

        // A freshly loaded grid has nothing to report
        grid.drain_changes();

        Ok(LoadedMap {
            grid,
            metadata: MapMetadata {
                name: self.map_name,
                created_date: self.created_date,
                origin_offset: Vec2::new(self.origin_offset_x, self.origin_offset_z),
            },
        })
    }

    /// Encode into a complete JSON buffer
    pub fn to_json(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, StorageError> {
        serde_json::from_slice(bytes).map_err(|e| StorageError::DecodeFailed(e.to_string()))
    }
}
