//! Unified path management for waypoint files.
//!
//! All paths are resolved via AppPaths from the version-migrate crate so the
//! layout follows platform conventions (XDG on Linux/macOS, appropriate on
//! Windows).
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/waypoint/          # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/waypoint/     # Data directory
//! └── store/                   # Key/value medium (one file per key)
//! ```

use std::path::PathBuf;
use version_migrate::AppPaths;
use waypoint_core::error::WaypointError;

const APP_NAME: &str = "waypoint";

pub struct WaypointPaths;

impl WaypointPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new(APP_NAME)
    }

    /// Returns the waypoint configuration directory.
    pub fn config_dir() -> Result<PathBuf, WaypointError> {
        Self::app_paths()
            .config_dir()
            .map_err(|e| WaypointError::config(format!("Cannot resolve config directory: {}", e)))
    }

    /// Returns the waypoint data directory.
    pub fn data_dir() -> Result<PathBuf, WaypointError> {
        Self::app_paths()
            .data_dir()
            .map_err(|e| WaypointError::config(format!("Cannot resolve data directory: {}", e)))
    }

    pub fn config_file() -> Result<PathBuf, WaypointError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default root of the directory-backed key/value medium.
    pub fn store_dir() -> Result<PathBuf, WaypointError> {
        Ok(Self::data_dir()?.join("store"))
    }
}
