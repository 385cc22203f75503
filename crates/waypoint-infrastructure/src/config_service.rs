//! Configuration service implementation.
//!
//! Loads [`WaypointConfig`] from `config.toml` in the platform config
//! directory and applies environment overrides on top.

use crate::paths::WaypointPaths;
use crate::storage::AtomicTomlFile;
use std::path::PathBuf;
use waypoint_core::config::WaypointConfig;
use waypoint_core::error::{Result, WaypointError};

/// Overrides `api_base_url`.
pub const ENV_API_URL: &str = "WAYPOINT_API_URL";
/// Overrides `storage_dir`.
pub const ENV_STORAGE_DIR: &str = "WAYPOINT_STORAGE_DIR";

/// Loads the configuration file, creating it with defaults when missing.
pub struct ConfigService {
    file: AtomicTomlFile<WaypointConfig>,
}

impl ConfigService {
    /// Uses `config.toml` in the platform config directory.
    pub fn new() -> Result<Self> {
        Ok(Self::at(WaypointPaths::config_file()?))
    }

    /// Uses the file at `path`.
    pub fn at(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Reads the file and applies process environment overrides.
    pub fn load(&self) -> Result<WaypointConfig> {
        let config = self.load_file()?;
        Ok(apply_env_overrides(config, |name| std::env::var(name).ok()))
    }

    /// Reads the file only. A missing file is written with defaults.
    pub fn load_file(&self) -> Result<WaypointConfig> {
        let loaded = self.file.load().map_err(|e| {
            WaypointError::config(format!(
                "Failed to read {}: {}",
                self.file.path().display(),
                e
            ))
        })?;

        match loaded {
            Some(config) => Ok(config),
            None => {
                let config = WaypointConfig::default();
                if let Err(e) = self.file.save(&config) {
                    tracing::warn!(
                        "[ConfigService] Could not write default config to {}: {}",
                        self.file.path().display(),
                        e
                    );
                } else {
                    tracing::info!(
                        "[ConfigService] Created default config at {}",
                        self.file.path().display()
                    );
                }
                Ok(config)
            }
        }
    }

    pub fn save(&self, config: &WaypointConfig) -> Result<()> {
        self.file.save(config)?;
        Ok(())
    }
}

/// Applies `WAYPOINT_*` overrides read through `lookup`.
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: WaypointConfig, lookup: F) -> WaypointConfig
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(url) = var(ENV_API_URL) {
        tracing::debug!("[ConfigService] {} overrides api_base_url", ENV_API_URL);
        config.api_base_url = url;
    }
    if let Some(dir) = var(ENV_STORAGE_DIR) {
        tracing::debug!("[ConfigService] {} overrides storage_dir", ENV_STORAGE_DIR);
        config.storage_dir = Some(PathBuf::from(dir));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;
    use waypoint_core::config::DEFAULT_API_BASE_URL;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::at(path.clone());

        let config = service.load_file().unwrap();

        assert_eq!(config, WaypointConfig::default());
        assert!(path.exists());
        assert_eq!(service.load_file().unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "key_namespace = \"custom\"\nquota_bytes = 4096\n").unwrap();

        let config = ConfigService::at(path).load_file().unwrap();

        assert_eq!(config.key_namespace, "custom");
        assert_eq!(config.quota_bytes, Some(4096));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "request_timeout_secs = \"soon\"").unwrap();

        let err = ConfigService::at(path).load_file().unwrap_err();
        assert!(matches!(err, WaypointError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            (ENV_API_URL, "https://flows.example.com".to_string()),
            (ENV_STORAGE_DIR, "/tmp/waypoint-store".to_string()),
        ]);

        let config = apply_env_overrides(WaypointConfig::default(), |name| env.get(name).cloned());

        assert_eq!(config.api_base_url, "https://flows.example.com");
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/waypoint-store")));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = apply_env_overrides(WaypointConfig::default(), |_| Some("  ".to_string()));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.storage_dir.is_none());
    }
}
