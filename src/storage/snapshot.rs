//! Snapshot files
//!
//! Whole-file JSON reads and crash-safe whole-file JSON writes.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use serde_json::Value;

use crate::error::{NestError, Result};

/// Read a snapshot file
///
/// Returns `Ok(None)` if the file does not exist. An empty (or
/// whitespace-only) file also reads as `None`.
pub fn read_snapshot(path: &Path) -> Result<Option<Value>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(&bytes).map(Some).map_err(|e| {
        NestError::Storage(format!("corrupt snapshot {}: {}", path.display(), e))
    })
}

/// Atomically replace `path` with `value`
///
/// Steps:
/// 1. Write pretty JSON to a hidden temp file next to `path`
/// 2. fsync the temp file
/// 3. Rename it over `path`
/// 4. fsync the directory so the rename itself is durable
pub fn write_snapshot(path: &Path, value: &Value) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        NestError::Storage(format!("snapshot path {} has no parent", path.display()))
    })?;

    let mut temp = tempfile::Builder::new()
        .prefix(".snapshot-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| NestError::Io(e.error))?;
    sync_dir(dir);

    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    // Best effort: the data is already durable in the renamed file
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!("Directory fsync failed for {}: {}", dir.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
