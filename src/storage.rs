use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::StorageError;
use crate::models::Snapshot;

/// Returns the path to the state file (`taskflow.json`).
///
/// The path is determined in the following order:
/// 1. `TASKFLOW_DB` environment variable.
/// 2. `~/.local/share/taskflow/taskflow.json` (on Linux).
/// 3. `./taskflow.json` (fallback).
pub fn db_path() -> PathBuf {
    std::env::var("TASKFLOW_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = data_dir();
        p.push("taskflow.json");
        p
    })
}

/// Directory holding the state file and the log.
pub fn data_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("taskflow");
    if !p.exists() {
        let _ = fs::create_dir_all(&p);
    }
    p
}

/// Parses a snapshot document.
///
/// The document must be a JSON object; anything else is rejected whole.
pub fn parse_snapshot(s: &str) -> Result<Snapshot, StorageError> {
    let value: serde_json::Value = serde_json::from_str(s)?;
    if !value.is_object() {
        return Err(StorageError::Json(serde::de::Error::custom(
            "snapshot must be a JSON object",
        )));
    }
    Ok(serde_json::from_value(value)?)
}

fn read_file(path: &Path) -> Result<String, StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut f = OpenOptions::new().read(true).open(path).map_err(io_err)?;
    let mut s = String::new();
    f.read_to_string(&mut s).map_err(io_err)?;
    Ok(s)
}

/// Writes `contents` next to `path` and renames it into place.
fn write_atomic(path: &Path, contents: &str) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)
        .map_err(io_err)?;
    f.write_all(contents.as_bytes()).map_err(io_err)?;
    f.sync_all().map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

/// Loads the saved state.
///
/// Returns `None` on first run, and also when the file cannot be read or
/// parsed; callers fall back to defaults. An unparseable file is kept as
/// [`bad_path`].
pub fn load() -> Option<Snapshot> {
    let path = db_path();
    if !path.exists() {
        return None;
    }
    let s = match read_file(&path) {
        Ok(s) => s,
        Err(e) => {
            warn!("ignoring unreadable state: {}", e);
            return None;
        }
    };
    match parse_snapshot(&s) {
        Ok(snapshot) => {
            debug!("loaded {} tasks from {}", snapshot.tasks.len(), path.display());
            Some(snapshot)
        }
        Err(e) => {
            warn!("ignoring unparseable state in {}: {}", path.display(), e);
            set_aside(&path);
            None
        }
    }
}

/// Path an unparseable state file is moved to (`taskflow.json.bad`).
pub fn bad_path(path: &Path) -> PathBuf {
    let mut bad = path.as_os_str().to_owned();
    bad.push(".bad");
    PathBuf::from(bad)
}

/// Moves an unparseable state file out of the way so the next save does not
/// overwrite it.
fn set_aside(path: &Path) {
    let bad = bad_path(path);
    match fs::rename(path, &bad) {
        Ok(()) => warn!("moved unparseable state to {}", bad.display()),
        Err(e) => warn!("could not move {} aside: {}", path.display(), e),
    }
}

/// Saves the whole state, replacing the previous file.
pub fn save(snapshot: &Snapshot) -> Result<(), StorageError> {
    let path = db_path();
    let s = serde_json::to_string_pretty(snapshot)?;
    write_atomic(&path, &s)?;
    debug!("saved {} tasks to {}", snapshot.tasks.len(), path.display());
    Ok(())
}

/// Writes a backup document to `path`.
pub fn export_to(path: &Path, snapshot: &Snapshot) -> Result<(), StorageError> {
    let s = serde_json::to_string_pretty(snapshot)?;
    write_atomic(path, &s)
}

/// Reads and validates a backup document.
///
/// Nothing is applied here; callers adopt the result only on success.
pub fn import_from(path: &Path) -> Result<Snapshot, StorageError> {
    let s = read_file(path)?;
    parse_snapshot(&s)
}

/// Deletes the state file.
pub fn delete_database() -> std::io::Result<()> {
    let path = db_path();
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
