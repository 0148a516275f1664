pub mod config;
pub mod database;

pub use config::{Config, ReviewConfig};
pub use database::TimetableDb;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/revise[-dev]/` based on REVISE_ENV.
///
/// Set REVISE_ENV=dev to use development data directory.
/// REVISE_DATA_DIR, when set, replaces the whole path.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os("REVISE_DATA_DIR").filter(|d| !d.is_empty()) {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REVISE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("revise-dev")
    } else {
        base_dir.join("revise")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
