use serde::{Deserialize, Serialize};

use crate::error::{FunnelError, Result};

/// Most counters an analysis screen shows.
pub const MAX_COUNTERS: usize = 3;

/// A question shown when a gated counter reaches its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    /// Key the answer is stored under in `SelectionState::prompt_answers`.
    pub key: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// One progress bar of an analysis screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSpec {
    /// Value at which the counter stops (1..=100).
    pub target: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptSpec>,
}

impl CounterSpec {
    pub fn new(target: u8) -> Self {
        Self {
            target,
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptSpec) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

/// The simulated analysis played on an analysis step.
///
/// Without prompts all counters run together. As soon as one counter carries
/// a prompt the stage is gated: counters run one after another and each
/// prompt must be answered before the next counter starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStage {
    pub counters: Vec<CounterSpec>,
}

impl AnalysisStage {
    /// A parallel stage from plain targets.
    pub fn with_targets(targets: &[u8]) -> Self {
        Self {
            counters: targets.iter().copied().map(CounterSpec::new).collect(),
        }
    }

    pub fn is_gated(&self) -> bool {
        self.counters.iter().any(|counter| counter.prompt.is_some())
    }

    pub fn targets(&self) -> Vec<u8> {
        self.counters.iter().map(|counter| counter.target).collect()
    }

    pub fn validate(&self, slug: &str) -> Result<()> {
        if self.counters.is_empty() || self.counters.len() > MAX_COUNTERS {
            return Err(FunnelError::config(format!(
                "step '{}': analysis needs 1 to {} counters, got {}",
                slug,
                MAX_COUNTERS,
                self.counters.len()
            )));
        }
        for counter in &self.counters {
            if counter.target == 0 || counter.target > 100 {
                return Err(FunnelError::config(format!(
                    "step '{}': counter target {} is outside 1..=100",
                    slug, counter.target
                )));
            }
            if let Some(prompt) = &counter.prompt {
                if prompt.key.trim().is_empty() {
                    return Err(FunnelError::config(format!(
                        "step '{}': prompt key must not be empty",
                        slug
                    )));
                }
            }
        }
        Ok(())
    }
}
