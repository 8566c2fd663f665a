//! Step registry DTOs.
//!
//! A registry file is a list of `[[step]]` tables:
//!
//! ```toml
//! version = "1"
//!
//! [[step]]
//! slug = "hair"
//! binds = "hair"
//! auto_advance = true
//!
//! [[step]]
//! slug = "analysis-1"
//! [[step.analysis.counter]]
//! target = 100
//! ```

use serde::{Deserialize, Serialize};

use funnel_core::analysis::{AnalysisStage, CounterSpec, PromptSpec};
use funnel_core::selection::FieldKey;
use funnel_core::step::{SelectionBinding, StepDefinition};
use funnel_core::{FunnelError, Result};

/// Format version written by this build.
pub const REGISTRY_FORMAT_VERSION: &str = "1";

// ============================================================================
// File root
// ============================================================================

/// Root of a step registry file (format version 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFileV1 {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub step: Vec<StepDto>,
}

fn default_version() -> String {
    REGISTRY_FORMAT_VERSION.to_string()
}

impl RegistryFileV1 {
    /// Converts every step, collecting all conversion failures.
    pub fn into_steps(self) -> Result<Vec<StepDefinition>> {
        if self.version != REGISTRY_FORMAT_VERSION {
            return Err(FunnelError::config(format!(
                "unsupported registry format version '{}' (expected '{}')",
                self.version, REGISTRY_FORMAT_VERSION
            )));
        }

        let mut steps = Vec::with_capacity(self.step.len());
        let mut errors = Vec::new();
        for dto in self.step {
            match StepDefinition::try_from(dto) {
                Ok(step) => steps.push(step),
                Err(e) => errors.push(e),
            }
        }
        FunnelError::from_many(errors)?;
        Ok(steps)
    }

    pub fn from_steps(steps: &[StepDefinition]) -> Self {
        Self {
            version: default_version(),
            step: steps.iter().map(StepDto::from).collect(),
        }
    }
}

// ============================================================================
// Step
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDto {
    pub slug: String,
    /// camelCase name of the bound field. Numeric fields cannot be bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binds: Option<FieldKey>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_advance: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub requires_selection: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub summary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisDto>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TryFrom<StepDto> for StepDefinition {
    type Error = FunnelError;

    fn try_from(dto: StepDto) -> Result<Self> {
        let binding = match dto.binds {
            None => None,
            Some(FieldKey::Scalar(field)) => Some(SelectionBinding::Scalar(field)),
            Some(FieldKey::List(field)) => Some(SelectionBinding::List(field)),
            Some(FieldKey::Answer(field)) => Some(SelectionBinding::Answer(field)),
            Some(key @ FieldKey::Numeric(_)) => {
                return Err(FunnelError::config(format!(
                    "step '{}': numeric field '{}' is set by sliders and cannot be bound",
                    dto.slug, key
                )));
            }
        };

        Ok(StepDefinition {
            index: 0,
            slug: dto.slug,
            binding,
            auto_advance: dto.auto_advance,
            requires_selection: dto.requires_selection,
            summary: dto.summary,
            analysis: dto.analysis.map(AnalysisStage::from),
        })
    }
}

impl From<&StepDefinition> for StepDto {
    fn from(step: &StepDefinition) -> Self {
        Self {
            slug: step.slug.clone(),
            binds: step.binding.map(|binding| binding.field()),
            auto_advance: step.auto_advance,
            requires_selection: step.requires_selection,
            summary: step.summary,
            analysis: step.analysis.as_ref().map(AnalysisDto::from),
        }
    }
}

// ============================================================================
// Analysis
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDto {
    #[serde(default)]
    pub counter: Vec<CounterDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterDto {
    pub target: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDto {
    pub key: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl From<AnalysisDto> for AnalysisStage {
    fn from(dto: AnalysisDto) -> Self {
        AnalysisStage {
            counters: dto
                .counter
                .into_iter()
                .map(|counter| CounterSpec {
                    target: counter.target,
                    prompt: counter.prompt.map(|p| PromptSpec {
                        key: p.key,
                        question: p.question,
                        options: p.options,
                    }),
                })
                .collect(),
        }
    }
}

impl From<&AnalysisStage> for AnalysisDto {
    fn from(stage: &AnalysisStage) -> Self {
        Self {
            counter: stage
                .counters
                .iter()
                .map(|counter| CounterDto {
                    target: counter.target,
                    prompt: counter.prompt.as_ref().map(|p| PromptDto {
                        key: p.key.clone(),
                        question: p.question.clone(),
                        options: p.options.clone(),
                    }),
                })
                .collect(),
        }
    }
}
