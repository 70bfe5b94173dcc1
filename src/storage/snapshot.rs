//! JSON snapshot file handling

use crate::state::ScraperData;
use crate::storage::{StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::Path;

/// Decodes a snapshot document
pub fn decode_snapshot(path: &Path, bytes: &[u8]) -> StorageResult<ScraperData> {
    serde_json::from_slice(bytes).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the snapshot at `path`
///
/// # Returns
///
/// * `Ok(Some(ScraperData))` - Snapshot decoded
/// * `Ok(None)` - No file at `path` yet
/// * `Err(StorageError)` - The file is unreadable or not a valid snapshot
pub async fn read_snapshot(path: &Path) -> StorageResult<Option<ScraperData>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    decode_snapshot(path, &bytes).map(Some)
}

/// Writes an encoded snapshot to `path`, replacing any previous file
///
/// The bytes go to a sibling temporary file first and are renamed into place,
/// so a crash mid-write never leaves a truncated snapshot behind.
pub async fn write_snapshot(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let io_error = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, bytes).await.map_err(io_error)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_error)?;
    Ok(())
}
