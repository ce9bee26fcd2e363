//! Bastion map tool - generate, inspect and edit saved maps from the shell

use std::path::PathBuf;
use std::process::ExitCode;

use bastion_map::core::{ConfigError, EditorMode, EngineConfig, MapError, ObjectKind, TerrainKind};
use bastion_map::generation::{spawn_generation, GenerationError, MapGenParams};
use bastion_map::persistence::{MapMetadata, MapQuery, MapStore, SizeCategory, StorageError};
use bastion_map::placement::{PlacementRules, RulesLoadError};
use bastion_map::session::MapSession;
use bastion_map::spatial::GridCoordinate;
use bastion_map::terrain::{BrushSize, EditRegion};
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

/// Bastion map tool
#[derive(Parser, Debug)]
#[command(name = "bastion-map")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Storage root holding the size directories and catalog.json
    #[arg(long, global = true, default_value = "maps")]
    root: PathBuf,

    /// Engine config (TOML); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Footprint and cost overrides (TOML)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new map and save it
    Generate {
        /// Display name
        name: String,

        /// Square side length
        #[arg(long, default_value_t = 200)]
        side: u32,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Slot number (default: first free slot)
        #[arg(long)]
        slot: Option<u32>,

        /// Catalog tags
        #[arg(short, long)]
        tag: Vec<String>,

        /// Skip the tree and rock scatter
        #[arg(long)]
        no_scenery: bool,
    },

    /// List catalog entries
    List {
        /// Only this size category (tiny, small, medium, large, huge)
        #[arg(long)]
        size: Option<SizeCategory>,

        /// Only maps suggested for at least this many players
        #[arg(long)]
        players: Option<u32>,

        #[arg(long)]
        tag: Option<String>,

        /// Rescan the size directories first
        #[arg(long)]
        rebuild: bool,
    },

    /// Print a summary of one saved map
    Inspect {
        /// Map path relative to the root, e.g. 200/slot_1.json
        path: String,
    },

    /// Draw a wall line in map-editor mode and save the result
    Wall {
        path: String,

        /// Start cell as row,col
        #[arg(long, value_parser = parse_coord)]
        from: GridCoordinate,

        /// End cell as row,col
        #[arg(long, value_parser = parse_coord)]
        to: GridCoordinate,

        #[arg(long, default_value = "wall")]
        kind: ObjectKind,
    },

    /// Apply one terrain brush stroke and save the result
    Terrain {
        path: String,

        #[arg(value_enum)]
        op: TerrainOp,

        /// Brush center as row,col
        #[arg(long, value_parser = parse_coord)]
        at: GridCoordinate,

        /// Brush radius: 0, 1, 3 or 6
        #[arg(long, default_value_t = 1)]
        radius: i32,

        /// Height delta for raise/lower, target height for flatten
        #[arg(long, default_value_t = 1.0)]
        amount: f32,

        /// Terrain kind for paint
        #[arg(long, default_value = "grass")]
        terrain: TerrainKind,
    },

    /// Change a map's display name
    Rename { path: String, name: String },

    /// Delete a map and its catalog entry
    Delete { path: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TerrainOp {
    Raise,
    Lower,
    Flatten,
    Paint,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rules(#[from] RulesLoadError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("{0}")]
    Usage(String),
}

fn parse_coord(s: &str) -> Result<GridCoordinate, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected row,col but got {s:?}"))?;
    let row = row.trim().parse().map_err(|_| format!("bad row in {s:?}"))?;
    let col = col.trim().parse().map_err(|_| format!("bad column in {s:?}"))?;
    Ok(GridCoordinate::new(row, col))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bastion_map=info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    let rules = match &args.rules {
        Some(path) => PlacementRules::load_from_toml(path)?,
        None => PlacementRules::with_defaults(),
    };
    let store = MapStore::new(&args.root, &config);

    match args.command {
        Commands::Generate {
            name,
            side,
            seed,
            slot,
            tag,
            no_scenery,
        } => {
            if !config.is_valid_side(side) {
                return Err(CliError::Usage(format!(
                    "side {side} is not one of {:?}",
                    config.valid_map_sides
                )));
            }
            let seed = seed.unwrap_or_else(rand::random);
            let mut params = MapGenParams::new(side, seed, &config);
            params.scenery = !no_scenery;

            let grid = spawn_generation(params).join()?;
            let slot = slot.unwrap_or_else(|| store.next_free_slot(side));
            let entry = store.save(&grid, &MapMetadata::new(name), slot, &tag)?;
            println!("saved {} (seed {seed}, {} placements)", entry.path, grid.placements().len());
        }

        Commands::List {
            size,
            players,
            tag,
            rebuild,
        } => {
            let catalog = if rebuild {
                store.rebuild_catalog()?
            } else {
                store.catalog()
            };
            let query = MapQuery {
                size,
                min_players: players,
                tag,
            };
            for entry in catalog.query(&query) {
                println!(
                    "{:<22} {:<24} {:>4}x{:<4} {:<6} {}p  {}",
                    entry.path,
                    entry.display_name,
                    entry.rows,
                    entry.cols,
                    entry.size_category,
                    entry.suggested_players,
                    entry.tags.join(",")
                );
            }
        }

        Commands::Inspect { path } => {
            let loaded = store.load(&path)?;
            let session = MapSession::new(loaded.grid, rules, &config);
            let grid = session.grid();
            let (min, max) = grid
                .cells()
                .fold((f32::MAX, f32::MIN), |(lo, hi), c| (lo.min(c.height), hi.max(c.height)));

            println!("name:       {}", loaded.metadata.name);
            println!("size:       {}x{}", grid.rows(), grid.cols());
            println!("created:    {}", loaded.metadata.created_date);
            println!("heights:    {min:.2} .. {max:.2}");
            println!("placements: {} ({} cells)", grid.placements().len(), grid.occupied_count());
            for kind in ObjectKind::ALL {
                let count = grid.placements().iter().filter(|p| p.kind == kind).count();
                if count > 0 {
                    println!("  {kind:<10} {count}");
                }
            }
            println!("bridges:    {}", session.bridges().len());
        }

        Commands::Wall {
            path,
            from,
            to,
            kind,
        } => {
            let loaded = store.load(&path)?;
            let mut session =
                MapSession::new(loaded.grid, rules, &config).with_mode(EditorMode::MapEditor);
            session.select_kind(kind);
            session.begin_wall_line(from)?;
            let preview = session.update_wall_line(to)?;
            println!("line covers {} cells", preview.cells.len());

            let ids = session.commit_wall_line()?;
            let bridges = session.bridges();
            store.save_over(&path, session.grid(), &loaded.metadata)?;
            println!("placed {} {kind} pieces, {} connectors on map", ids.len(), bridges.len());
        }

        Commands::Terrain {
            path,
            op,
            at,
            radius,
            amount,
            terrain,
        } => {
            let size = BrushSize::from_radius(radius)
                .ok_or_else(|| CliError::Usage(format!("unsupported brush radius {radius}")))?;
            let loaded = store.load(&path)?;
            let mut session = MapSession::new(loaded.grid, rules, &config);
            let region = EditRegion::brush(at, size);

            let changed = match op {
                TerrainOp::Raise => session.raise_terrain(&region, amount),
                TerrainOp::Lower => session.lower_terrain(&region, amount),
                TerrainOp::Flatten => session.flatten_terrain(&region, amount),
                TerrainOp::Paint => session.paint_terrain(&region, terrain),
            };
            if changed == 0 {
                println!("nothing changed");
                return Ok(());
            }

            let mut grid = session.into_grid();
            if grid.vertex_heights().is_some() {
                grid.rebuild_vertex_heights();
            }
            store.save_over(&path, &grid, &loaded.metadata)?;
            println!("changed {changed} cells");
        }

        Commands::Rename { path, name } => {
            store.rename(&path, &name)?;
            println!("renamed {path} to {name:?}");
        }

        Commands::Delete { path } => {
            store.delete(&path)?;
            println!("deleted {path}");
        }
    }

    Ok(())
}
