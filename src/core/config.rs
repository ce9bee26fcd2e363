//! Engine configuration with documented constants
//!
//! All tunable numbers are collected here. There is no global instance:
//! callers construct an `EngineConfig` (defaults or TOML) and pass it to the
//! pieces that need it.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Side lengths a saved map may have (maps are always square)
pub const DEFAULT_MAP_SIDES: [u32; 5] = [200, 400, 600, 800, 1000];

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the map engine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === COORDINATES ===
    /// Edge length of one cell in world units
    ///
    /// The renderer places cell centers `cell_world_size` apart, with the
    /// grid centered on the world origin.
    pub cell_world_size: f32,

    // === TERRAIN EDITING ===
    /// Maximum number of terrain actions kept for undo
    ///
    /// When full, the oldest action is dropped silently.
    pub undo_capacity: usize,

    /// Lowest height a terrain edit can produce
    pub min_height: f32,

    /// Highest height a terrain edit can produce
    pub max_height: f32,

    // === GENERATION ===
    /// Height below which generated cells become water
    pub water_level: f32,

    /// Height above which generated cells become stone, then snow at 2x
    pub highland_level: f32,

    // === STORAGE ===
    /// Square side lengths accepted by map storage
    pub valid_map_sides: Vec<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_world_size: 1.0,

            undo_capacity: 64,
            min_height: -10.0,
            max_height: 50.0,

            water_level: -0.5,
            highland_level: 6.0,

            valid_map_sides: DEFAULT_MAP_SIDES.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, falling back to defaults for missing keys
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Whether `side` is an accepted map side length
    pub fn is_valid_side(&self, side: u32) -> bool {
        self.valid_map_sides.contains(&side)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_world_size <= 0.0 {
            return Err(format!(
                "cell_world_size ({}) must be positive",
                self.cell_world_size
            ));
        }

        if self.undo_capacity == 0 {
            return Err("undo_capacity must be at least 1".into());
        }

        if self.min_height >= self.max_height {
            return Err(format!(
                "min_height ({}) should be < max_height ({})",
                self.min_height, self.max_height
            ));
        }

        if self.valid_map_sides.is_empty() {
            return Err("valid_map_sides must list at least one size".into());
        }

        Ok(())
    }
}
