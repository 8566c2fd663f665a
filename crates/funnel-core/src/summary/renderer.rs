use serde::{Deserialize, Serialize};

use crate::selection::{Answer, AnswerField, ListField, ScalarField, SelectionState};

use super::model::{DisplayModel, Meter};

/// Text shown for unanswered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryFallbacks {
    pub ethnicity: String,
    pub age: String,
    pub looking_for: String,
    pub figure: String,
    pub breast: String,
    pub butt: String,
    pub hair: String,
    pub preferences: String,
    pub willing: String,
    pub scenarios: String,
}

impl Default for SummaryFallbacks {
    fn default() -> Self {
        Self {
            ethnicity: "Caucasian".to_string(),
            age: "18-24".to_string(),
            looking_for: "Romantic roleplay".to_string(),
            figure: "Extra skinny".to_string(),
            breast: "Small".to_string(),
            butt: "Small".to_string(),
            hair: "Blonde".to_string(),
            preferences: "Tattoos".to_string(),
            willing: "Threesome".to_string(),
            scenarios: "Doctor & Patient".to_string(),
        }
    }
}

/// Extras tag per answer field, in display order.
const EXTRAS: [(AnswerField, &str); 3] = [
    (AnswerField::SpicyPhotos, "Spicy photos"),
    (AnswerField::VoiceMessages, "Voice messages"),
    (AnswerField::SpecialVideos, "Special videos"),
];

/// Pure projection of a [`SelectionState`] into a [`DisplayModel`].
#[derive(Debug, Clone, Default)]
pub struct SummaryRenderer {
    fallbacks: SummaryFallbacks,
}

impl SummaryRenderer {
    pub fn new(fallbacks: SummaryFallbacks) -> Self {
        Self { fallbacks }
    }

    pub fn render(&self, state: &SelectionState) -> DisplayModel {
        let fb = &self.fallbacks;
        DisplayModel {
            ethnicity: text(state, ScalarField::Ethnicity, &fb.ethnicity),
            age: text(state, ScalarField::Age, &fb.age),
            looking_for: text(state, ScalarField::LookingFor, &fb.looking_for),
            figure: text(state, ScalarField::Figure, &fb.figure),
            breast: text(state, ScalarField::Breast, &fb.breast),
            butt: text(state, ScalarField::Butt, &fb.butt),
            hair: text(state, ScalarField::Hair, &fb.hair),
            preferences: joined(state, ListField::Preferences, &fb.preferences),
            willing: joined(state, ListField::Willing, &fb.willing),
            scenarios: joined(state, ListField::Scenarios, &fb.scenarios),
            libido: Meter::new(state.libido),
            kink: Meter::new(state.kink),
            nudity: Meter::new(state.nudity),
            extras: extras(state),
        }
    }
}

fn text(state: &SelectionState, field: ScalarField, fallback: &str) -> String {
    match state.scalar(field).as_deref() {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}

fn joined(state: &SelectionState, field: ListField, fallback: &str) -> String {
    let list = state.list(field);
    if list.is_empty() {
        fallback.to_string()
    } else {
        list.join(", ")
    }
}

// No "Yes" answers shows every extra.
fn extras(state: &SelectionState) -> Vec<String> {
    let chosen: Vec<String> = EXTRAS
        .iter()
        .filter(|(field, _)| state.answer(*field) == Some(Answer::Yes))
        .map(|(_, tag)| tag.to_string())
        .collect();

    if chosen.is_empty() {
        EXTRAS.iter().map(|(_, tag)| tag.to_string()).collect()
    } else {
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_renders_fallbacks() {
        let model = SummaryRenderer::default().render(&SelectionState::new());
        assert_eq!(model.looking_for, "Romantic roleplay");
        assert_eq!(model.figure, "Extra skinny");
        assert_eq!(model.breast, "Small");
        assert_eq!(model.butt, "Small");
        assert_eq!(model.hair, "Blonde");
        assert_eq!(model.preferences, "Tattoos");
        assert_eq!(model.willing, "Threesome");
        assert_eq!(model.scenarios, "Doctor & Patient");
        assert_eq!(model.libido.label, "50%");
        assert_eq!(model.extras, vec!["Spicy photos", "Voice messages", "Special videos"]);
    }

    #[test]
    fn test_answers_replace_fallbacks() {
        let mut state = SelectionState::new();
        state.set_scalar(ScalarField::Hair, "Red");
        state.toggle_in_list(ListField::Scenarios, "Nurse");
        state.toggle_in_list(ListField::Scenarios, "Boss");
        state.set_answer(AnswerField::VoiceMessages, Answer::Yes);
        state.set_answer(AnswerField::SpicyPhotos, Answer::No);
        state.kink = 80;

        let model = SummaryRenderer::default().render(&state);
        assert_eq!(model.hair, "Red");
        assert_eq!(model.scenarios, "Nurse, Boss");
        assert_eq!(model.extras, vec!["Voice messages"]);
        assert_eq!(model.kink, Meter::new(80));
    }

    #[test]
    fn test_all_no_answers_still_show_every_extra() {
        let mut state = SelectionState::new();
        state.set_answer(AnswerField::SpicyPhotos, Answer::No);
        state.set_answer(AnswerField::VoiceMessages, Answer::No);
        state.set_answer(AnswerField::SpecialVideos, Answer::No);
        let model = SummaryRenderer::default().render(&state);
        assert_eq!(model.extras.len(), 3);
    }

    #[test]
    fn test_meter_clamps_width_not_label() {
        let meter = Meter::new(130);
        assert_eq!(meter.percent, 100);
        assert_eq!(meter.label, "130%");
        assert_eq!(Meter::new(-5).percent, 0);
    }

    #[test]
    fn test_render_does_not_mutate_state() {
        let state = SelectionState::new();
        let before = state.clone();
        let _ = SummaryRenderer::default().render(&state);
        assert_eq!(state, before);
    }
}
