//! Step registries stored as TOML.

use std::path::{Path, PathBuf};

use funnel_core::step::StepRegistry;
use funnel_core::{FunnelConfig, FunnelError, Result};

use crate::dto::RegistryFileV1;
use crate::toml_file::TomlFile;

/// Reads and writes `[[step]]` registry files.
pub struct TomlRegistryLoader;

impl TomlRegistryLoader {
    /// Loads and validates the registry at `path`.
    ///
    /// # Errors
    ///
    /// * `NotFound` if the file does not exist
    /// * `Config` if it is blank, uses an unknown version or fails validation
    /// * `Serialization` if it is not valid TOML for the registry format
    pub fn load(path: &Path) -> Result<StepRegistry> {
        let file = TomlFile::<RegistryFileV1>::new(path)
            .load()?
            .ok_or_else(|| match path.exists() {
                true => FunnelError::config(format!("registry file {} is empty", path.display())),
                false => FunnelError::not_found("registry file", path.display().to_string()),
            })?;

        let registry = StepRegistry::new(file.into_steps()?)?;
        tracing::info!(
            target: "funnel::registry",
            path = %path.display(),
            steps = registry.len(),
            "Loaded step registry"
        );
        Ok(registry)
    }

    pub fn parse(content: &str) -> Result<StepRegistry> {
        let file: RegistryFileV1 = toml::from_str(content)?;
        StepRegistry::new(file.into_steps()?)
    }

    pub fn to_toml(registry: &StepRegistry) -> Result<String> {
        Ok(toml::to_string_pretty(&RegistryFileV1::from_steps(registry.steps()))?)
    }

    pub fn save(path: &Path, registry: &StepRegistry) -> Result<()> {
        TomlFile::new(path).save(&RegistryFileV1::from_steps(registry.steps()))
    }

    /// The registry named by `config`, or the built-in table.
    ///
    /// A relative `registry` path is taken relative to `base_dir`.
    pub fn resolve(config: &FunnelConfig, base_dir: Option<&Path>) -> Result<StepRegistry> {
        match &config.registry {
            Some(path) => Self::load(&Self::absolutize(path, base_dir)),
            None => Ok(StepRegistry::builtin()),
        }
    }

    fn absolutize(path: &Path, base_dir: Option<&Path>) -> PathBuf {
        match base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
