pub mod config;
pub mod replay;
pub mod steps;
pub mod walk;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use funnel_application::SessionFactory;
use funnel_core::FunnelConfig;
use funnel_core::step::StepRegistry;
use funnel_infrastructure::{ConfigService, TomlRegistryLoader};

/// Configuration and step table shared by every command.
pub struct AppContext {
    pub config_path: PathBuf,
    pub config: FunnelConfig,
    pub registry: Arc<StepRegistry>,
}

impl AppContext {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let service = ConfigService::resolve(config_path)?;
        let config = service
            .get_config()
            .with_context(|| format!("failed to load {}", service.path().display()))?;
        let registry = TomlRegistryLoader::resolve(&config, service.base_dir()).context("failed to load step registry")?;

        tracing::debug!(
            target: "funnel::cli",
            config = %service.path().display(),
            steps = registry.len(),
            "Context loaded"
        );

        Ok(Self {
            config_path: service.path().to_path_buf(),
            config,
            registry: Arc::new(registry),
        })
    }

    pub fn session_factory(&self, config: FunnelConfig, seed: Option<u64>) -> SessionFactory {
        let factory = SessionFactory::new(config, Arc::clone(&self.registry));
        match seed {
            Some(seed) => factory.with_seed(seed),
            None => factory,
        }
    }
}
