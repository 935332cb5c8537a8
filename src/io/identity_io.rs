use std::fs;
use std::path::{Path, PathBuf};

use crate::model::permission::Identity;

/// Error type for reading a decoded identity from disk
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse identity in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load an identity claim set (`{"id", "email", "roleId", "permissions"}`)
pub fn read_identity(path: &Path) -> Result<Identity, IdentityError> {
    let text = fs::read_to_string(path).map_err(|e| IdentityError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| IdentityError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
