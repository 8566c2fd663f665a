//! Selection domain module.
//!
//! Holds the user's answers for one funnel session.
//!
//! - `field`: typed field keys (`ScalarField`, `ListField`, `NumericField`, `AnswerField`)
//! - `model`: the mutable answer record (`SelectionState`)

mod field;
mod model;

pub use field::{Answer, AnswerField, FieldKey, FieldValue, ListField, NumericField, ScalarField};
pub use model::{DEFAULT_SLIDER_VALUE, SelectionState};
