pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, EngineConfig};
pub use error::{MapError, PredicateKind, Result};
pub use types::{EditorMode, ObjectKind, PlacementId, TerrainKind};
