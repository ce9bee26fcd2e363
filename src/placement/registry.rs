//! Placement rules - footprints and build costs per object kind
//!
//! `PlacementRules` is an immutable configuration object handed to the
//! validator and the editing session. Defaults are built in; TOML files can
//! override individual entries. Only wall kinds cost anything by default.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::types::ObjectKind;

/// Build resources paid from a player's stockpile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Wood,
    Stone,
    Iron,
    Gold,
}

/// Largest width or height a rules file may give a footprint
pub const MAX_FOOTPRINT_SIDE: u32 = 32;

/// Width x height in cells claimed by one placement of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectFootprint {
    pub kind: ObjectKind,
    pub width: u32,
    pub height: u32,
}

impl ObjectFootprint {
    pub fn new(kind: ObjectKind, width: u32, height: u32) -> Self {
        Self { kind, width, height }
    }

    /// 1x1 footprint, used for kinds with no registered entry
    pub fn unit(kind: ObjectKind) -> Self {
        Self::new(kind, 1, 1)
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Both sides within `1..=MAX_FOOTPRINT_SIDE`
    pub fn is_valid(&self) -> bool {
        (1..=MAX_FOOTPRINT_SIDE).contains(&self.width)
            && (1..=MAX_FOOTPRINT_SIDE).contains(&self.height)
    }
}

/// Error type for rules loading
#[derive(Debug, Error)]
pub enum RulesLoadError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid footprint for {kind}: {width}x{height}")]
    InvalidFootprint {
        kind: ObjectKind,
        width: u32,
        height: u32,
    },
}

/// Footprint catalog and build-cost table
#[derive(Debug, Clone, Default)]
pub struct PlacementRules {
    footprints: AHashMap<ObjectKind, ObjectFootprint>,
    costs: AHashMap<ObjectKind, Vec<(ResourceType, u32)>>,
}

impl PlacementRules {
    /// Empty rules: every kind is 1x1 and free
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in footprints and costs
    pub fn with_defaults() -> Self {
        let mut rules = Self::new();
        for kind in ObjectKind::ALL {
            let (width, height) = kind.default_size();
            rules.set_footprint(ObjectFootprint::new(kind, width, height));
        }

        rules.set_cost(ObjectKind::Wall, vec![(ResourceType::Stone, 5)]);
        rules.set_cost(ObjectKind::TallWall, vec![(ResourceType::Stone, 10)]);
        rules.set_cost(
            ObjectKind::Gate,
            vec![(ResourceType::Wood, 8), (ResourceType::Iron, 2)],
        );
        rules
    }

    pub fn set_footprint(&mut self, footprint: ObjectFootprint) {
        self.footprints.insert(footprint.kind, footprint);
    }

    pub fn set_cost(&mut self, kind: ObjectKind, cost: Vec<(ResourceType, u32)>) {
        if cost.is_empty() {
            self.costs.remove(&kind);
        } else {
            self.costs.insert(kind, cost);
        }
    }

    /// Footprint for a kind; 1x1 when nothing is registered
    pub fn footprint(&self, kind: ObjectKind) -> ObjectFootprint {
        self.footprints
            .get(&kind)
            .copied()
            .unwrap_or_else(|| ObjectFootprint::unit(kind))
    }

    /// Cost of one placement; empty for non-gated kinds
    pub fn cost(&self, kind: ObjectKind) -> &[(ResourceType, u32)] {
        self.costs.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_gated(&self, kind: ObjectKind) -> bool {
        !self.cost(kind).is_empty()
    }

    /// Restricted kinds pass through the full four-predicate validator.
    /// Wall kinds always are; any other kind becomes restricted once it has a cost.
    pub fn is_restricted(&self, kind: ObjectKind) -> bool {
        kind.is_wall() || self.is_gated(kind)
    }

    /// Load defaults overridden by a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self, RulesLoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse TOML overrides on top of the built-in defaults
    pub fn parse_toml(content: &str) -> Result<Self, RulesLoadError> {
        let data: TomlRules = toml::from_str(content)?;
        let mut rules = Self::with_defaults();

        for entry in data.footprints {
            let footprint = ObjectFootprint::new(entry.kind, entry.width, entry.height);
            if !footprint.is_valid() {
                return Err(RulesLoadError::InvalidFootprint {
                    kind: entry.kind,
                    width: entry.width,
                    height: entry.height,
                });
            }
            rules.set_footprint(footprint);
        }

        for entry in data.costs {
            let cost = entry
                .resources
                .into_iter()
                .map(|r| (r.resource, r.amount))
                .collect();
            rules.set_cost(entry.kind, cost);
        }

        Ok(rules)
    }
}

/// TOML representation of a rules file
#[derive(Debug, Deserialize)]
struct TomlRules {
    #[serde(default)]
    footprints: Vec<TomlFootprint>,
    #[serde(default)]
    costs: Vec<TomlCost>,
}

#[derive(Debug, Deserialize)]
struct TomlFootprint {
    kind: ObjectKind,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct TomlCost {
    kind: ObjectKind,
    #[serde(default)]
    resources: Vec<TomlResourceAmount>,
}

#[derive(Debug, Deserialize)]
struct TomlResourceAmount {
    resource: ResourceType,
    amount: u32,
}
