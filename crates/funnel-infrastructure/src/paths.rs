//! Path management for funnel configuration files.
//!
//! Paths are resolved through the `dirs` crate so every platform gets its
//! conventional location.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform has no configuration directory.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for funnel_core::FunnelError {
    fn from(err: PathError) -> Self {
        funnel_core::FunnelError::io(err.to_string())
    }
}

/// Where funnel keeps its files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/funnel/            # Config directory
/// ├── config.toml              # Application configuration
/// └── steps.toml               # Optional step registry
/// ```
pub struct FunnelPaths;

impl FunnelPaths {
    const APP_DIR: &'static str = "funnel";

    /// Returns the funnel configuration directory (e.g. `~/.config/funnel/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default location of a step registry file.
    ///
    /// The file is only read when the configuration points at it or when it
    /// exists.
    pub fn registry_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("steps.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_in_the_config_dir() {
        // Headless CI may have no config dir at all.
        let Ok(dir) = FunnelPaths::config_dir() else {
            return;
        };
        assert!(dir.ends_with("funnel"));
        assert_eq!(FunnelPaths::config_file().unwrap(), dir.join("config.toml"));
        assert_eq!(FunnelPaths::registry_file().unwrap(), dir.join("steps.toml"));
    }

    #[test]
    fn test_path_error_converts_to_io_error() {
        let err: funnel_core::FunnelError = PathError::ConfigDirNotFound.into();
        assert!(err.is_io());
    }
}
