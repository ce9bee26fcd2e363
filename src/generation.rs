//! Seeded terrain generation for fresh maps
//!
//! Heights come from two octaves of lattice value noise drawn from a
//! `ChaCha8Rng`, so the same seed always yields the same map. Rows are
//! filled in parallel on a grid nobody else can see yet; the finished grid
//! is handed over whole.

use std::thread::JoinHandle;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use thiserror::Error;

use crate::core::config::EngineConfig;
use crate::core::types::{ObjectKind, TerrainKind};
use crate::placement::registry::ObjectFootprint;
use crate::spatial::coord::GridCoordinate;
use crate::spatial::grid::{Cell, MapGrid};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation worker panicked")]
    WorkerPanicked,
    #[error("invalid generation parameters: {0}")]
    InvalidParams(String),
}

/// Inputs for one generated map
#[derive(Debug, Clone, PartialEq)]
pub struct MapGenParams {
    pub rows: u32,
    pub cols: u32,
    pub seed: u64,
    /// Peak height of the base octave
    pub amplitude: f32,
    /// Cells between lattice points of the base octave
    pub feature_size: u32,
    pub water_level: f32,
    pub highland_level: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Scatter trees in forests and rocks on stone
    pub scenery: bool,
}

impl MapGenParams {
    pub fn new(side: u32, seed: u64, config: &EngineConfig) -> Self {
        Self {
            rows: side,
            cols: side,
            seed,
            amplitude: 8.0,
            feature_size: 32,
            water_level: config.water_level,
            highland_level: config.highland_level,
            min_height: config.min_height,
            max_height: config.max_height,
            scenery: true,
        }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GenerationError::InvalidParams("map must have at least one cell".into()));
        }
        if self.feature_size == 0 {
            return Err(GenerationError::InvalidParams("feature_size must be positive".into()));
        }
        if self.min_height >= self.max_height {
            return Err(GenerationError::InvalidParams(
                "min_height must be below max_height".into(),
            ));
        }
        Ok(())
    }
}

/// Random values on a coarse lattice, bilinearly blended between points
struct ValueLattice {
    spacing: f32,
    cols: usize,
    values: Vec<f32>,
}

impl ValueLattice {
    fn new(rows: u32, cols: u32, spacing: u32, rng: &mut ChaCha8Rng) -> Self {
        let spacing = spacing.max(1);
        let lattice_rows = (rows / spacing) as usize + 2;
        let lattice_cols = (cols / spacing) as usize + 2;
        let values = (0..lattice_rows * lattice_cols)
            .map(|_| rng.gen_range(-1.0..=1.0))
            .collect();
        Self {
            spacing: spacing as f32,
            cols: lattice_cols,
            values,
        }
    }

    fn at(&self, lr: usize, lc: usize) -> f32 {
        self.values[lr * self.cols + lc]
    }

    fn sample(&self, row: u32, col: u32) -> f32 {
        let fr = row as f32 / self.spacing;
        let fc = col as f32 / self.spacing;
        let (lr, lc) = (fr.floor() as usize, fc.floor() as usize);
        let (tr, tc) = (smoothstep(fr.fract()), smoothstep(fc.fract()));

        let top = lerp(self.at(lr, lc), self.at(lr, lc + 1), tc);
        let bottom = lerp(self.at(lr + 1, lc), self.at(lr + 1, lc + 1), tc);
        lerp(top, bottom, tr)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn classify(height: f32, moisture: f32, params: &MapGenParams) -> TerrainKind {
    if height < params.water_level {
        TerrainKind::Water
    } else if height < params.water_level + 0.5 {
        TerrainKind::Sand
    } else if height > params.highland_level * 2.0 {
        TerrainKind::Snow
    } else if height > params.highland_level {
        TerrainKind::Stone
    } else if moisture > 0.35 {
        TerrainKind::Forest
    } else if moisture < -0.6 {
        TerrainKind::Dirt
    } else {
        TerrainKind::Grass
    }
}

/// Build a complete grid from `params`
pub fn generate_map(params: &MapGenParams) -> Result<MapGrid, GenerationError> {
    params.validate()?;
    let started = Instant::now();

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let base = ValueLattice::new(params.rows, params.cols, params.feature_size, &mut rng);
    let detail_size = (params.feature_size / 4).max(1);
    let detail = ValueLattice::new(params.rows, params.cols, detail_size, &mut rng);
    let moisture = ValueLattice::new(params.rows, params.cols, params.feature_size, &mut rng);

    let cells: Vec<Cell> = (0..params.rows)
        .into_par_iter()
        .map(|row| {
            (0..params.cols)
                .map(|col| {
                    let raw = base.sample(row, col) + 0.25 * detail.sample(row, col);
                    let height =
                        (raw * params.amplitude).clamp(params.min_height, params.max_height);
                    let terrain = classify(height, moisture.sample(row, col), params);
                    Cell {
                        coordinate: GridCoordinate::new(row as i32, col as i32),
                        terrain,
                        height,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    let mut grid = MapGrid::from_cells(params.rows, params.cols, cells)
        .map_err(|e| GenerationError::InvalidParams(e.to_string()))?;

    let scattered = if params.scenery {
        scatter_scenery(&mut grid, &mut rng)
    } else {
        0
    };
    grid.rebuild_vertex_heights();
    grid.drain_changes();

    tracing::debug!(
        rows = params.rows,
        cols = params.cols,
        seed = params.seed,
        scattered,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "map generated"
    );
    Ok(grid)
}

/// Sparse trees on forest and rocks on stone. Returns the number placed.
fn scatter_scenery(grid: &mut MapGrid, rng: &mut ChaCha8Rng) -> usize {
    let candidates: Vec<(GridCoordinate, ObjectKind, f64)> = grid
        .cells()
        .filter_map(|cell| match cell.terrain {
            TerrainKind::Forest => Some((cell.coordinate, ObjectKind::Tree, 0.08)),
            TerrainKind::Stone => Some((cell.coordinate, ObjectKind::Rock, 0.03)),
            _ => None,
        })
        .collect();

    let mut placed = 0;
    for (coord, kind, chance) in candidates {
        if rng.gen_bool(chance) && grid.place(kind, &ObjectFootprint::unit(kind), coord).is_ok() {
            placed += 1;
        }
    }
    placed
}

/// Generation running on a background thread
#[derive(Debug)]
pub struct GenerationHandle {
    handle: JoinHandle<Result<MapGrid, GenerationError>>,
}

impl GenerationHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the finished grid
    pub fn join(self) -> Result<MapGrid, GenerationError> {
        self.handle
            .join()
            .map_err(|_| GenerationError::WorkerPanicked)?
    }
}

/// Start `generate_map` on a worker thread
pub fn spawn_generation(params: MapGenParams) -> GenerationHandle {
    let handle = std::thread::spawn(move || generate_map(&params));
    GenerationHandle { handle }
}
