//! The per-session answer record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::field::{Answer, AnswerField, FieldKey, FieldValue, ListField, NumericField, ScalarField};

/// Starting position of every slider.
pub const DEFAULT_SLIDER_VALUE: i32 = 50;

/// Everything the user has answered so far.
///
/// The store performs no validation of its own: text values are accepted as
/// given and numeric values are stored unclamped. Range checks belong to the
/// input boundary (see `FlowController::set_slider`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub ethnicity: Option<String>,
    pub age: Option<String>,
    pub figure: Option<String>,
    pub breast: Option<String>,
    pub butt: Option<String>,
    pub hair: Option<String>,
    pub looking_for: Option<String>,

    pub preferences: Vec<String>,
    pub willing: Vec<String>,
    pub scenarios: Vec<String>,

    pub libido: i32,
    pub kink: i32,
    pub nudity: i32,

    pub spicy_photos: Option<Answer>,
    pub voice_messages: Option<Answer>,
    pub special_videos: Option<Answer>,

    /// Answers given to interstitial prompts during analysis stages, keyed by
    /// the prompt's key.
    #[serde(default)]
    pub prompt_answers: BTreeMap<String, String>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            ethnicity: None,
            age: None,
            figure: None,
            breast: None,
            butt: None,
            hair: None,
            looking_for: None,
            preferences: Vec::new(),
            willing: Vec::new(),
            scenarios: Vec::new(),
            libido: DEFAULT_SLIDER_VALUE,
            kink: DEFAULT_SLIDER_VALUE,
            nudity: DEFAULT_SLIDER_VALUE,
            spicy_photos: None,
            voice_messages: None,
            special_videos: None,
            prompt_answers: BTreeMap::new(),
        }
    }
}

impl SelectionState {
    /// Creates an empty state (sliders at their default position).
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been answered yet.
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }

    // ============================================================================
    // Generic contract
    // ============================================================================

    /// Reads a snapshot of one field.
    pub fn get(&self, field: FieldKey) -> FieldValue {
        match field {
            FieldKey::Scalar(field) => FieldValue::Text(self.scalar(field).clone()),
            FieldKey::List(field) => FieldValue::List(self.list(field).to_vec()),
            FieldKey::Numeric(field) => FieldValue::Number(self.numeric(field)),
            FieldKey::Answer(field) => FieldValue::Answer(self.answer(field)),
        }
    }

    /// Writes a raw string value into any field.
    ///
    /// Scalars are overwritten, lists get the value appended if absent,
    /// numerics and answers are parsed. Returns `false` when the value could
    /// not be interpreted for the field's kind.
    pub fn set(&mut self, field: FieldKey, value: &str) -> bool {
        match field {
            FieldKey::Scalar(field) => {
                self.set_scalar(field, value);
                true
            }
            FieldKey::List(field) => {
                let list = self.list_mut(field);
                if !list.iter().any(|item| item == value) {
                    list.push(value.to_string());
                }
                true
            }
            FieldKey::Numeric(field) => match value.trim().parse::<i32>() {
                Ok(number) => {
                    self.set_numeric(field, number);
                    true
                }
                Err(_) => false,
            },
            FieldKey::Answer(field) => match Answer::from_str(value.trim()) {
                Ok(answer) => {
                    self.set_answer(field, answer);
                    true
                }
                Err(_) => false,
            },
        }
    }

    /// Adds `value` to the list if absent, removes it if present.
    ///
    /// Returns `true` when the value is in the list afterwards.
    pub fn toggle_in_list(&mut self, field: ListField, value: &str) -> bool {
        let list = self.list_mut(field);
        if let Some(position) = list.iter().position(|item| item == value) {
            list.remove(position);
            false
        } else {
            list.push(value.to_string());
            true
        }
    }

    /// Whether the field holds something a continue gate would accept.
    pub fn has_value(&self, field: FieldKey) -> bool {
        match field {
            FieldKey::Scalar(field) => self.scalar(field).as_deref().is_some_and(|v| !v.is_empty()),
            FieldKey::List(field) => !self.list(field).is_empty(),
            FieldKey::Numeric(_) => true,
            FieldKey::Answer(field) => self.answer(field).is_some(),
        }
    }

    // ============================================================================
    // Typed accessors
    // ============================================================================

    pub fn scalar(&self, field: ScalarField) -> &Option<String> {
        match field {
            ScalarField::Ethnicity => &self.ethnicity,
            ScalarField::Age => &self.age,
            ScalarField::Figure => &self.figure,
            ScalarField::Breast => &self.breast,
            ScalarField::Butt => &self.butt,
            ScalarField::Hair => &self.hair,
            ScalarField::LookingFor => &self.looking_for,
        }
    }

    fn scalar_mut(&mut self, field: ScalarField) -> &mut Option<String> {
        match field {
            ScalarField::Ethnicity => &mut self.ethnicity,
            ScalarField::Age => &mut self.age,
            ScalarField::Figure => &mut self.figure,
            ScalarField::Breast => &mut self.breast,
            ScalarField::Butt => &mut self.butt,
            ScalarField::Hair => &mut self.hair,
            ScalarField::LookingFor => &mut self.looking_for,
        }
    }

    pub fn set_scalar(&mut self, field: ScalarField, value: impl Into<String>) {
        *self.scalar_mut(field) = Some(value.into());
    }

    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Preferences => &self.preferences,
            ListField::Willing => &self.willing,
            ListField::Scenarios => &self.scenarios,
        }
    }

    fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Preferences => &mut self.preferences,
            ListField::Willing => &mut self.willing,
            ListField::Scenarios => &mut self.scenarios,
        }
    }

    pub fn numeric(&self, field: NumericField) -> i32 {
        match field {
            NumericField::Libido => self.libido,
            NumericField::Kink => self.kink,
            NumericField::Nudity => self.nudity,
        }
    }

    pub fn set_numeric(&mut self, field: NumericField, value: i32) {
        match field {
            NumericField::Libido => self.libido = value,
            NumericField::Kink => self.kink = value,
            NumericField::Nudity => self.nudity = value,
        }
    }

    pub fn answer(&self, field: AnswerField) -> Option<Answer> {
        match field {
            AnswerField::SpicyPhotos => self.spicy_photos,
            AnswerField::VoiceMessages => self.voice_messages,
            AnswerField::SpecialVideos => self.special_videos,
        }
    }

    pub fn set_answer(&mut self, field: AnswerField, answer: Answer) {
        match field {
            AnswerField::SpicyPhotos => self.spicy_photos = Some(answer),
            AnswerField::VoiceMessages => self.voice_messages = Some(answer),
            AnswerField::SpecialVideos => self.special_videos = Some(answer),
        }
    }

    /// Stores an interstitial prompt answer under its key.
    ///
    /// When the key names an answer field and the value is Yes/No, the answer
    /// field is written as well so the summary picks it up.
    pub fn record_prompt_answer(&mut self, key: &str, value: &str) {
        self.prompt_answers.insert(key.to_string(), value.to_string());
        if let (Ok(field), Ok(answer)) = (AnswerField::from_str(key), Answer::from_str(value)) {
            self.set_answer(field, answer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = SelectionState::new();
        assert!(state.ethnicity.is_none());
        assert!(state.preferences.is_empty());
        assert_eq!(state.libido, 50);
        assert_eq!(state.kink, 50);
        assert_eq!(state.nudity, 50);
        assert!(state.spicy_photos.is_none());
        assert!(state.is_pristine());
    }

    #[test]
    fn test_toggle_twice_restores_order() {
        let mut state = SelectionState::new();
        state.toggle_in_list(ListField::Preferences, "Tattoos");
        state.toggle_in_list(ListField::Preferences, "Piercings");
        state.toggle_in_list(ListField::Preferences, "Freckles");

        assert!(state.toggle_in_list(ListField::Preferences, "Latex"));
        assert!(!state.toggle_in_list(ListField::Preferences, "Latex"));
        assert_eq!(state.preferences, vec!["Tattoos", "Piercings", "Freckles"]);

        assert!(!state.toggle_in_list(ListField::Preferences, "Piercings"));
        assert_eq!(state.preferences, vec!["Tattoos", "Freckles"]);
    }

    #[test]
    fn test_generic_set_never_duplicates_list_items() {
        let mut state = SelectionState::new();
        assert!(state.set(FieldKey::List(ListField::Scenarios), "Nurse"));
        assert!(state.set(FieldKey::List(ListField::Scenarios), "Nurse"));
        assert_eq!(state.scenarios, vec!["Nurse"]);
    }

    #[test]
    fn test_generic_set_parses_numbers_and_answers() {
        let mut state = SelectionState::new();
        assert!(state.set(FieldKey::Numeric(NumericField::Kink), "140"));
        // The store itself does not clamp.
        assert_eq!(state.kink, 140);
        assert!(!state.set(FieldKey::Numeric(NumericField::Kink), "lots"));
        assert_eq!(state.kink, 140);

        assert!(state.set(FieldKey::Answer(AnswerField::VoiceMessages), "No"));
        assert_eq!(state.voice_messages, Some(Answer::No));
        assert!(!state.set(FieldKey::Answer(AnswerField::VoiceMessages), "perhaps"));
    }

    #[test]
    fn test_get_returns_snapshots() {
        let mut state = SelectionState::new();
        state.set_scalar(ScalarField::Hair, "Red");
        assert_eq!(
            state.get(FieldKey::Scalar(ScalarField::Hair)),
            FieldValue::Text(Some("Red".to_string()))
        );
        assert_eq!(
            state.get(FieldKey::Numeric(NumericField::Nudity)),
            FieldValue::Number(50)
        );
        assert_eq!(
            state.get(FieldKey::Answer(AnswerField::SpecialVideos)),
            FieldValue::Answer(None)
        );
    }

    #[test]
    fn test_has_value() {
        let mut state = SelectionState::new();
        let looking_for = FieldKey::Scalar(ScalarField::LookingFor);
        assert!(!state.has_value(looking_for));
        state.set_scalar(ScalarField::LookingFor, "");
        assert!(!state.has_value(looking_for));
        state.set_scalar(ScalarField::LookingFor, "A girlfriend");
        assert!(state.has_value(looking_for));
        assert!(state.has_value(FieldKey::Numeric(NumericField::Libido)));
    }

    #[test]
    fn test_prompt_answer_also_sets_matching_answer_field() {
        let mut state = SelectionState::new();
        state.record_prompt_answer("spicyPhotos", "Yes");
        state.record_prompt_answer("analysis-1.mood", "Playful");

        assert_eq!(state.spicy_photos, Some(Answer::Yes));
        assert_eq!(state.prompt_answers.get("analysis-1.mood").map(String::as_str), Some("Playful"));
        assert_eq!(state.prompt_answers.len(), 2);
    }
}
