use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisStage;
use crate::selection::{AnswerField, FieldKey, ListField, ScalarField};

/// The field an option click on a step writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum SelectionBinding {
    /// Single select, overwrites a text field.
    Scalar(ScalarField),
    /// Multi select, toggles values in a list.
    List(ListField),
    /// Single select, Yes/No.
    Answer(AnswerField),
}

impl SelectionBinding {
    pub fn field(&self) -> FieldKey {
        match *self {
            Self::Scalar(field) => FieldKey::Scalar(field),
            Self::List(field) => FieldKey::List(field),
            Self::Answer(field) => FieldKey::Answer(field),
        }
    }

    pub fn is_multi_select(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

/// One screen of the funnel.
///
/// `index` is assigned by the registry from the step's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub index: usize,
    pub slug: String,
    pub binding: Option<SelectionBinding>,
    /// Move on immediately after a single selection.
    pub auto_advance: bool,
    /// Continue stays disabled until the bound field has a value.
    pub requires_selection: bool,
    /// Entering this step renders the summary.
    pub summary: bool,
    pub analysis: Option<AnalysisStage>,
}

impl StepDefinition {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            index: 0,
            slug: slug.into(),
            binding: None,
            auto_advance: false,
            requires_selection: false,
            summary: false,
            analysis: None,
        }
    }

    pub fn binds(mut self, binding: SelectionBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn auto_advance(mut self) -> Self {
        self.auto_advance = true;
        self
    }

    pub fn requires_selection(mut self) -> Self {
        self.requires_selection = true;
        self
    }

    pub fn summary(mut self) -> Self {
        self.summary = true;
        self
    }

    pub fn analysis(mut self, stage: AnalysisStage) -> Self {
        self.analysis = Some(stage);
        self
    }

    pub fn is_multi_select(&self) -> bool {
        self.binding.is_some_and(|binding| binding.is_multi_select())
    }

    pub fn is_analysis_stage(&self) -> bool {
        self.analysis.is_some()
    }
}
