//! Small JSON files kept next to the store: the unknown content-type log,
//! the language-code map and the exported article document.
//!
//! Files are rewritten whole through a temp file in the same directory and
//! renamed over the target, so a crash mid-write leaves the old file intact.
//! Unparsable files are discarded and recreated.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SideTableError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not replace {path}: {source}")]
    Persist {
        path: String,
        source: tempfile::PersistError,
    },
}

/// Read `path` as JSON. A missing file is created with `T::default()`;
/// a corrupt one is logged, replaced with the default, and the default returned.
pub fn load_or_recreate<T>(path: &Path) -> Result<T, SideTableError>
where
    T: DeserializeOwned + Serialize + Default,
{
    if !path.exists() {
        let value = T::default();
        write_atomic(path, &value)?;
        return Ok(value);
    }

    let raw = fs::read_to_string(path)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "discarding corrupt side file");
            let value = T::default();
            write_atomic(path, &value)?;
            Ok(value)
        }
    }
}

/// Like [`load_or_recreate`] but never writes; used when the caller is about
/// to rewrite the file anyway.
pub fn load_or_default<T>(path: &Path) -> Result<T, SideTableError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "discarding corrupt side file");
        T::default()
    }))
}

/// Serialize `value` with 4-space indentation and atomically replace `path`.
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), SideTableError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        value.serialize(&mut ser)?;
        out.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|source| SideTableError::Persist {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}
