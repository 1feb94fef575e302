use std::fs;
use std::path::Path;

use crate::io::task_io::IoError;
use crate::model::config::BoardConfig;

/// Read and parse a board.toml
pub fn read_config(path: &Path) -> Result<BoardConfig, IoError> {
    let text = fs::read_to_string(path).map_err(|e| IoError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Config from `path` if given, otherwise defaults
pub fn load_config(path: Option<&Path>) -> Result<BoardConfig, IoError> {
    match path {
        Some(path) => read_config(path),
        None => Ok(BoardConfig::default()),
    }
}
