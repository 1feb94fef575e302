use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::task::TaskRecord;

/// Error type for reading and writing board files
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse tasks in {path}: {source}")]
    TaskParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not parse config: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Read a JSON array of task records.
pub fn load_tasks(path: &Path) -> Result<Vec<TaskRecord>, IoError> {
    let text = fs::read_to_string(path).map_err(|e| IoError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| IoError::TaskParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write tasks as pretty JSON, replacing the file atomically.
pub fn save_tasks(path: &Path, tasks: &[TaskRecord]) -> Result<(), IoError> {
    let mut content = serde_json::to_string_pretty(tasks)?;
    content.push('\n');
    atomic_write(path, content.as_bytes()).map_err(|e| IoError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
