//! Typed keys for every answer the funnel collects.
//!
//! Each key has a stable external name (camelCase) used by slider events,
//! event scripts and registry files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Single-valued text answers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ScalarField {
    Ethnicity,
    Age,
    Figure,
    Breast,
    Butt,
    Hair,
    LookingFor,
}

/// Ordered multi-select answers. Duplicates are never stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ListField {
    Preferences,
    Willing,
    Scenarios,
}

/// Slider-backed percentages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum NumericField {
    Libido,
    Kink,
    Nudity,
}

/// Yes/No extras offered near the end of the funnel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AnswerField {
    SpicyPhotos,
    VoiceMessages,
    SpecialVideos,
}

/// A tri-state answer is `None`, `Some(Yes)` or `Some(No)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Answer {
    Yes,
    No,
}

/// Any field of [`SelectionState`](super::SelectionState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldKey {
    Scalar(ScalarField),
    List(ListField),
    Numeric(NumericField),
    Answer(AnswerField),
}

impl FieldKey {
    /// The external camelCase name of the field.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(field) => field.as_ref(),
            Self::List(field) => field.as_ref(),
            Self::Numeric(field) => field.as_ref(),
            Self::Answer(field) => field.as_ref(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(field) = ScalarField::from_str(s) {
            return Ok(Self::Scalar(field));
        }
        if let Ok(field) = ListField::from_str(s) {
            return Ok(Self::List(field));
        }
        if let Ok(field) = NumericField::from_str(s) {
            return Ok(Self::Numeric(field));
        }
        if let Ok(field) = AnswerField::from_str(s) {
            return Ok(Self::Answer(field));
        }
        Err(format!("unknown field '{}'", s))
    }
}

impl TryFrom<String> for FieldKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldKey> for String {
    fn from(key: FieldKey) -> Self {
        key.name().to_string()
    }
}

impl From<ScalarField> for FieldKey {
    fn from(field: ScalarField) -> Self {
        Self::Scalar(field)
    }
}

impl From<ListField> for FieldKey {
    fn from(field: ListField) -> Self {
        Self::List(field)
    }
}

impl From<NumericField> for FieldKey {
    fn from(field: NumericField) -> Self {
        Self::Numeric(field)
    }
}

impl From<AnswerField> for FieldKey {
    fn from(field: AnswerField) -> Self {
        Self::Answer(field)
    }
}

/// Snapshot of one field's current value, as returned by `SelectionState::get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(Option<String>),
    List(Vec<String>),
    Number(i32),
    Answer(Option<Answer>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_field_names_are_camel_case() {
        assert_eq!(ScalarField::LookingFor.to_string(), "lookingFor");
        assert_eq!(AnswerField::SpicyPhotos.as_ref(), "spicyPhotos");
        assert_eq!(FieldKey::from(ListField::Willing).name(), "willing");
    }

    #[test]
    fn test_every_field_key_round_trips_through_its_name() {
        let keys = ScalarField::iter()
            .map(FieldKey::from)
            .chain(ListField::iter().map(FieldKey::from))
            .chain(NumericField::iter().map(FieldKey::from))
            .chain(AnswerField::iter().map(FieldKey::from));

        for key in keys {
            assert_eq!(key.name().parse::<FieldKey>(), Ok(key));
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!("shoeSize".parse::<FieldKey>().is_err());
    }

    #[test]
    fn test_answer_parsing_is_case_insensitive() {
        assert_eq!("yes".parse::<Answer>(), Ok(Answer::Yes));
        assert_eq!("No".parse::<Answer>(), Ok(Answer::No));
        assert!("maybe".parse::<Answer>().is_err());
    }

    #[test]
    fn test_field_key_serde_uses_external_name() {
        let json = serde_json::to_string(&FieldKey::Numeric(NumericField::Kink)).unwrap();
        assert_eq!(json, "\"kink\"");
        let key: FieldKey = serde_json::from_str("\"hair\"").unwrap();
        assert_eq!(key, FieldKey::Scalar(ScalarField::Hair));
    }
}
