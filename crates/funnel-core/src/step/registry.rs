use std::collections::{HashMap, HashSet};

use crate::analysis::AnalysisStage;
use crate::error::{FunnelError, Result};
use crate::selection::{AnswerField, FieldKey, ListField, ScalarField};

use super::definition::{SelectionBinding, StepDefinition};

/// Ordered, validated table of funnel steps.
///
/// Adding or removing a screen is a change to this table, never to the
/// controller.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRegistry {
    steps: Vec<StepDefinition>,
    by_slug: HashMap<String, usize>,
}

impl StepRegistry {
    /// Builds a registry, assigning indices from position and validating the table.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error (or `Multiple` config errors) when:
    /// - the table is empty
    /// - a slug is empty or used twice
    /// - a field is bound by more than one step
    /// - a step requires a selection but binds no field
    /// - an auto-advance step is multi-select
    /// - an analysis step binds a field or has an invalid stage
    /// - more than one step is flagged as summary
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self> {
        if steps.is_empty() {
            return Err(FunnelError::config("step registry must contain at least one step"));
        }

        let mut errors = Vec::new();
        let mut slugs = HashSet::new();
        let mut bound = HashSet::new();
        let mut summaries = 0;

        for step in &steps {
            if step.slug.trim().is_empty() {
                errors.push(FunnelError::config("step slug must not be empty"));
            } else if !slugs.insert(step.slug.as_str()) {
                errors.push(FunnelError::config(format!("duplicate step slug '{}'", step.slug)));
            }

            if let Some(binding) = step.binding {
                if !bound.insert(binding.field()) {
                    errors.push(FunnelError::config(format!(
                        "step '{}': field '{}' is already bound by another step",
                        step.slug,
                        binding.field()
                    )));
                }
            } else if step.requires_selection {
                errors.push(FunnelError::config(format!(
                    "step '{}': requires a selection but binds no field",
                    step.slug
                )));
            }

            if step.auto_advance && step.is_multi_select() {
                errors.push(FunnelError::config(format!(
                    "step '{}': multi-select steps cannot auto-advance",
                    step.slug
                )));
            }

            if let Some(stage) = &step.analysis {
                if step.binding.is_some() {
                    errors.push(FunnelError::config(format!(
                        "step '{}': analysis steps cannot bind a field",
                        step.slug
                    )));
                }
                if let Err(e) = stage.validate(&step.slug) {
                    errors.push(e);
                }
            }

            if step.summary {
                summaries += 1;
            }
        }

        if summaries > 1 {
            errors.push(FunnelError::config("at most one step can be the summary step"));
        }

        FunnelError::from_many(errors)?;
        Ok(Self::from_validated(steps))
    }

    fn from_validated(mut steps: Vec<StepDefinition>) -> Self {
        let mut by_slug = HashMap::with_capacity(steps.len());
        for (index, step) in steps.iter_mut().enumerate() {
            step.index = index;
            by_slug.insert(step.slug.clone(), index);
        }
        Self { steps, by_slug }
    }

    /// The production funnel: 20 screens from ethnicity to pricing.
    pub fn builtin() -> Self {
        Self::from_validated(builtin_steps())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    pub fn index_of(&self, slug: &str) -> Option<usize> {
        self.by_slug.get(slug).copied()
    }

    /// Resolves an external slug reference; unknown or missing slugs land on step 0.
    pub fn resolve_slug(&self, slug: Option<&str>) -> usize {
        slug.and_then(|s| self.index_of(s.trim())).unwrap_or(0)
    }

    /// The slug written to the page address for `index`.
    ///
    /// Indices outside the table get a positional `step-N` slug (1-based).
    pub fn slug_for(&self, index: usize) -> String {
        self.steps
            .get(index)
            .map(|step| step.slug.clone())
            .unwrap_or_else(|| format!("step-{}", index + 1))
    }

    pub fn summary_index(&self) -> Option<usize> {
        self.steps.iter().position(|step| step.summary)
    }

    /// The step that binds `field`, if any.
    pub fn source_of(&self, field: FieldKey) -> Option<&StepDefinition> {
        self.steps
            .iter()
            .find(|step| step.binding.is_some_and(|binding| binding.field() == field))
    }
}

fn builtin_steps() -> Vec<StepDefinition> {
    use SelectionBinding::{Answer, List, Scalar};

    vec![
        StepDefinition::new("ethnicity").binds(Scalar(ScalarField::Ethnicity)).auto_advance(),
        StepDefinition::new("age").binds(Scalar(ScalarField::Age)).auto_advance(),
        StepDefinition::new("figure").binds(Scalar(ScalarField::Figure)).auto_advance(),
        StepDefinition::new("breast-size").binds(Scalar(ScalarField::Breast)).auto_advance(),
        StepDefinition::new("butt-size").binds(Scalar(ScalarField::Butt)).auto_advance(),
        StepDefinition::new("hair").binds(Scalar(ScalarField::Hair)).auto_advance(),
        StepDefinition::new("preferences").binds(List(ListField::Preferences)).requires_selection(),
        StepDefinition::new("intro"),
        StepDefinition::new("looking-for").binds(Scalar(ScalarField::LookingFor)).requires_selection(),
        StepDefinition::new("traits"),
        StepDefinition::new("try").binds(List(ListField::Willing)).requires_selection(),
        StepDefinition::new("scenarios").binds(List(ListField::Scenarios)).requires_selection(),
        StepDefinition::new("analysis-1").analysis(AnalysisStage::with_targets(&[100, 65, 15])),
        StepDefinition::new("spicy-photos").binds(Answer(AnswerField::SpicyPhotos)).auto_advance(),
        StepDefinition::new("analysis-2").analysis(AnalysisStage::with_targets(&[100, 80, 15])),
        StepDefinition::new("voice-messages").binds(Answer(AnswerField::VoiceMessages)).auto_advance(),
        StepDefinition::new("analysis-3").analysis(AnalysisStage::with_targets(&[100, 100, 40])),
        StepDefinition::new("special-videos").binds(Answer(AnswerField::SpecialVideos)).auto_advance(),
        StepDefinition::new("summary").summary(),
        StepDefinition::new("pricing"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_passes_validation() {
        let validated = StepRegistry::new(builtin_steps()).unwrap();
        assert_eq!(validated, StepRegistry::builtin());
    }

    #[test]
    fn test_builtin_shape() {
        let registry = StepRegistry::builtin();
        assert_eq!(registry.len(), 20);
        assert_eq!(registry.last_index(), 19);
        assert_eq!(registry.summary_index(), Some(18));

        let auto: Vec<usize> = registry.iter().filter(|s| s.auto_advance).map(|s| s.index).collect();
        assert_eq!(auto, vec![0, 1, 2, 3, 4, 5, 13, 15, 17]);

        let multi: Vec<usize> = registry.iter().filter(|s| s.is_multi_select()).map(|s| s.index).collect();
        assert_eq!(multi, vec![6, 10, 11]);

        let gated: Vec<usize> = registry.iter().filter(|s| s.requires_selection).map(|s| s.index).collect();
        assert_eq!(gated, vec![6, 8, 10, 11]);

        let analysis: Vec<usize> = registry.iter().filter(|s| s.is_analysis_stage()).map(|s| s.index).collect();
        assert_eq!(analysis, vec![12, 14, 16]);
    }

    #[test]
    fn test_resolve_slug() {
        let registry = StepRegistry::builtin();
        assert_eq!(registry.resolve_slug(Some("age")), 1);
        assert_eq!(registry.resolve_slug(Some("pricing")), 19);
        assert_eq!(registry.resolve_slug(Some("bogus")), 0);
        assert_eq!(registry.resolve_slug(Some("")), 0);
        assert_eq!(registry.resolve_slug(None), 0);
    }

    #[test]
    fn test_slug_for_out_of_range_is_positional() {
        let registry = StepRegistry::builtin();
        assert_eq!(registry.slug_for(2), "figure");
        assert_eq!(registry.slug_for(24), "step-25");
    }

    #[test]
    fn test_source_of_field() {
        let registry = StepRegistry::builtin();
        let source = registry.source_of(FieldKey::Scalar(ScalarField::LookingFor)).unwrap();
        assert_eq!(source.slug, "looking-for");
        assert!(registry.source_of(FieldKey::Numeric(crate::selection::NumericField::Kink)).is_none());
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        let err = StepRegistry::new(Vec::new()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_invalid_tables_collect_every_problem() {
        let steps = vec![
            StepDefinition::new("a").binds(SelectionBinding::Scalar(ScalarField::Hair)),
            StepDefinition::new("a").binds(SelectionBinding::Scalar(ScalarField::Hair)),
            StepDefinition::new("b").requires_selection(),
            StepDefinition::new("c")
                .binds(SelectionBinding::List(ListField::Willing))
                .auto_advance(),
        ];
        match StepRegistry::new(steps).unwrap_err() {
            FunnelError::Multiple(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.iter().all(FunnelError::is_config));
            }
            other => panic!("expected multiple errors, got {:?}", other),
        }
    }

    #[test]
    fn test_analysis_stage_is_validated() {
        let steps = vec![StepDefinition::new("analysis").analysis(AnalysisStage::with_targets(&[100, 0]))];
        let err = StepRegistry::new(steps).unwrap_err();
        assert!(err.to_string().contains("outside 1..=100"));

        let steps = vec![StepDefinition::new("analysis").analysis(AnalysisStage::with_targets(&[]))];
        assert!(StepRegistry::new(steps).is_err());
    }
}
