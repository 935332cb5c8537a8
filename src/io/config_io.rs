use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::{MAX_TIMEOUT_MINUTES, Settings, SettingsError};

pub const CONFIG_FILE: &str = "taskboard.toml";

const CONFIG_TEMPLATE: &str = r##"# taskboard client settings

[session]
# Minutes of inactivity before the client signs out
timeout_minutes = 30
# Minimum spacing between activity-driven timer resets
activity_throttle_ms = 1000
# Warn this many minutes before the inactivity logout
warning_lead_minutes = 1

[toasts]
default_duration_ms = 5000
error_duration_ms = 7000
fallback_error_message = "An unexpected error occurred"

[auth]
unauthenticated_message = "Authentication required"
forbidden_message = "Permission denied"
"##;

/// Error type for settings file operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not edit {path}: {source}")]
    EditError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("invalid settings: {0}")]
    Invalid(#[from] SettingsError),
    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Load and validate settings. A missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let settings: Settings = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Read the settings file as a toml_edit document for format-preserving
/// edits. A missing file yields an empty document.
pub fn read_config_doc(path: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    if !path.exists() {
        return Ok(toml_edit::DocumentMut::new());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    text.parse().map_err(|e| ConfigError::EditError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write the document back to disk, preserving formatting
pub fn write_config(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    fs::write(path, doc.to_string())?;
    Ok(())
}

/// Set `session.timeout_minutes` in the document
pub fn set_timeout(doc: &mut toml_edit::DocumentMut, minutes: u64) -> Result<(), ConfigError> {
    if minutes == 0 {
        return Err(SettingsError::ZeroTimeout.into());
    }
    if minutes > MAX_TIMEOUT_MINUTES {
        return Err(SettingsError::TimeoutTooLong.into());
    }
    let minutes = i64::try_from(minutes).map_err(|_| SettingsError::TimeoutTooLong)?;
    if !doc.contains_key("session") {
        doc["session"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["session"]["timeout_minutes"] = toml_edit::value(minutes);
    Ok(())
}

/// Write the commented settings template to `path`
pub fn init_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, CONFIG_TEMPLATE)?;
    Ok(())
}
