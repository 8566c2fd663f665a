use std::sync::Arc;

use uuid::Uuid;

use funnel_core::flow::{FlowController, FlowOptions, FlowRenderer};
use funnel_core::step::StepRegistry;
use funnel_core::{FunnelConfig, Result};
use funnel_execution::ProgressAnimator;

use super::runner::FunnelSession;

/// Builds [`FunnelSession`]s that share one configuration and step table.
#[derive(Debug, Clone)]
pub struct SessionFactory {
    config: FunnelConfig,
    registry: Arc<StepRegistry>,
    seed: Option<u64>,
}

impl SessionFactory {
    /// Creates a new SessionFactory.
    ///
    /// # Arguments
    ///
    /// * `config` - Animator timing, address and exit settings
    /// * `registry` - The step table every session walks
    pub fn new(config: FunnelConfig, registry: Arc<StepRegistry>) -> Self {
        Self {
            config,
            registry,
            seed: None,
        }
    }

    /// Makes every session's analysis increments reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &FunnelConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<StepRegistry> {
        &self.registry
    }

    /// Starts a session with a fresh id.
    ///
    /// # Arguments
    ///
    /// * `renderer` - Presentation hooks for this session
    /// * `address` - Initial page address; its step parameter picks the first step
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the configuration fails validation (a zero
    /// tick interval, for one) or `address` is not a valid URL.
    pub fn create_session(&self, renderer: Arc<dyn FlowRenderer>, address: Option<&str>) -> Result<FunnelSession> {
        self.config.validate()?;
        let options = FlowOptions::from_config(&self.config, address)?;
        let controller = FlowController::new(Arc::clone(&self.registry), renderer, options);

        let animator = ProgressAnimator::new(self.config.animator.clone());
        let animator = match self.seed {
            Some(seed) => animator.with_seed(seed),
            None => animator,
        };

        Ok(FunnelSession::start(Uuid::new_v4().to_string(), controller, animator))
    }
}
