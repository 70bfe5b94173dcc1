//! Storage module for persisting the crawl snapshot
//!
//! The whole page store and watchlist are written to one JSON document after
//! every crawl pass and read back wholesale at startup.

mod snapshot;

pub use snapshot::{decode_snapshot, read_snapshot, write_snapshot};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Snapshot {} is corrupt: {}", .path.display(), .source)]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
