//! Map files on disk and the catalog that indexes them
//!
//! Maps are stored one JSON file per slot under a directory per square side
//! length (`<root>/<side>/slot_<n>.json`). `<root>/catalog.json` lists every
//! saved map so menus don't have to open each file.

pub mod catalog;
pub mod map_file;
pub mod store;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub use catalog::{MapCatalog, MapCatalogEntry, MapQuery, SizeCategory};
pub use map_file::{LoadedMap, MapMetadata, SavedCell, SavedMap, SavedPlacement};
pub use store::MapStore;

/// Errors raised by map storage
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage root or map directory cannot be read or created
    #[error("storage unavailable at {}: {}", .path.display(), .source)]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {}", .path.display(), .source)]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// File content is not a valid map
    #[error("failed to decode map: {0}")]
    DecodeFailed(String),
    #[error("failed to encode map: {0}")]
    EncodeFailed(#[from] serde_json::Error),
    #[error("map name must not be empty")]
    EmptyName,
    #[error("invalid map size {rows}x{cols}")]
    InvalidMapSize { rows: u32, cols: u32 },
    #[error("map not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Seconds since the Unix epoch, 0 if the clock is before it
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
