use crate::error::{ElicitError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting an existing document.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Serialize `records` as a pretty-printed JSON array and write it atomically.
pub fn save_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let data = serde_json::to_vec_pretty(records)?;
    atomic_write(path, &data)
}

/// Read a JSON-array document of records from `path`.
///
/// A missing file and a top-level value that is not an array are both
/// structural errors naming the path; the caller must not assume a partial
/// load succeeded.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(ElicitError::FileNotFound(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&data)?;
    if !value.is_array() {
        return Err(ElicitError::InvalidDocument {
            path: path.display().to_string(),
        });
    }
    let records: Vec<T> = serde_json::from_value(value)?;
    Ok(records)
}
