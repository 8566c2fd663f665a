//! Runtime configuration.
//!
//! Every section has defaults, so an empty or partial config file is valid.
//! Loading from disk lives in `funnel-infrastructure`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FunnelError, Result};
use crate::flow::PageAddress;
use crate::summary::SummaryFallbacks;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FunnelConfig {
    /// Step registry file; the built-in funnel is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<PathBuf>,
    pub animator: AnimatorConfig,
    pub address: AddressConfig,
    pub exit: ExitConfig,
    pub summary: SummaryFallbacks,
}

impl FunnelConfig {
    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the collected `Config`/`Serialization` errors.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Err(e) = self.animator.validate() {
            errors.push(e);
        }
        if let Err(e) = self.address.page_address() {
            errors.push(e);
        }
        if self.address.param.trim().is_empty() {
            errors.push(FunnelError::config("address.param must not be empty"));
        }
        if let Some(url) = &self.exit.redirect_url {
            if let Err(e) = url::Url::parse(url) {
                errors.push(FunnelError::config(format!("exit.redirect_url: {}", e)));
            }
        }
        FunnelError::from_many(errors)
    }
}

/// Timing of the simulated analysis animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    pub tick_interval_ms: u64,
    pub increment_min: u8,
    pub increment_max: u8,
    /// Pause between the last counter finishing and the step advancing.
    pub settle_delay_ms: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 160,
            increment_min: 1,
            increment_max: 7,
            settle_delay_ms: 800,
        }
    }
}

impl AnimatorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(FunnelError::config("animator.tick_interval_ms must be positive"));
        }
        if self.increment_min == 0 || self.increment_min > self.increment_max {
            return Err(FunnelError::config(format!(
                "animator increments must satisfy 1 <= min <= max, got {}..={}",
                self.increment_min, self.increment_max
            )));
        }
        Ok(())
    }
}

/// Where the current step is reflected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressConfig {
    pub base_url: String,
    /// Query parameter carrying the step slug.
    pub param: String,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quiz.local/".to_string(),
            param: "quizStep".to_string(),
        }
    }
}

impl AddressConfig {
    pub fn page_address(&self) -> Result<PageAddress> {
        PageAddress::parse(&self.base_url, &self.param)
    }
}

/// Exit action on the last step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExitConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}
