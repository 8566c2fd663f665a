//! Configuration service implementation.
//!
//! Loads [`FunnelConfig`] from `config.toml` (by default
//! `~/.config/funnel/config.toml`) and caches it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use funnel_core::{FunnelConfig, Result};

use crate::paths::FunnelPaths;
use crate::toml_file::TomlFile;

/// Configuration service that loads and caches the funnel configuration.
///
/// A missing or blank file yields the defaults. A malformed file is an
/// error; it is never silently replaced.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<FunnelConfig>>>,
}

impl ConfigService {
    /// Creates a service reading `path`. Nothing is read until first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses `path` when given, otherwise the platform default location.
    pub fn resolve(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Ok(Self::new(path)),
            None => Ok(Self::new(FunnelPaths::config_file()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative paths inside the configuration are resolved against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|dir| !dir.as_os_str().is_empty())
    }

    /// Gets the configuration, loading it from file if not cached.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error for malformed TOML and a `Config`
    /// error when the values fail validation.
    pub fn get_config(&self) -> Result<FunnelConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Validates and writes `config`, replacing the cached copy.
    pub fn save(&self, config: &FunnelConfig) -> Result<()> {
        config.validate()?;
        TomlFile::new(&self.path).save(config)?;

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(config.clone());
        tracing::info!(target: "funnel::config", path = %self.path.display(), "Configuration saved");
        Ok(())
    }

    fn load_config(&self) -> Result<FunnelConfig> {
        let config = match TomlFile::<FunnelConfig>::new(&self.path).load()? {
            Some(config) => {
                tracing::debug!(target: "funnel::config", path = %self.path.display(), "Loaded configuration");
                config
            }
            None => {
                tracing::debug!(
                    target: "funnel::config",
                    path = %self.path.display(),
                    "No configuration file, using defaults"
                );
                FunnelConfig::default()
            }
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::new(dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), FunnelConfig::default());
        assert!(!service.path().exists());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[animator]\ntick_interval_ms = 40\n").unwrap();

        let config = ConfigService::new(&path).get_config().unwrap();
        assert_eq!(config.animator.tick_interval_ms, 40);
        assert_eq!(config.animator.increment_max, 7);
        assert_eq!(config.address.param, "quizStep");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[animator\n").unwrap();
        assert!(ConfigService::new(&path).get_config().unwrap_err().is_serialization());
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[animator]\nincrement_min = 9\nincrement_max = 2\n").unwrap();
        assert!(ConfigService::new(&path).get_config().unwrap_err().is_config());
    }

    #[test]
    fn test_config_is_cached_after_first_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let service = ConfigService::new(&path);
        assert_eq!(service.get_config().unwrap().animator.settle_delay_ms, 800);

        fs::write(&path, "[animator]\nsettle_delay_ms = 10\n").unwrap();
        assert_eq!(service.get_config().unwrap().animator.settle_delay_ms, 800);
        assert_eq!(ConfigService::new(&path).get_config().unwrap().animator.settle_delay_ms, 10);
    }

    #[test]
    fn test_save_then_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let service = ConfigService::new(&path);

        let mut config = FunnelConfig::default();
        config.exit.redirect_url = Some("https://example.com/checkout".into());
        service.save(&config).unwrap();

        let fresh = ConfigService::new(&path);
        assert_eq!(fresh.get_config().unwrap(), config);
    }
}
