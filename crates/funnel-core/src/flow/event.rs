use serde::{Deserialize, Serialize};

use crate::selection::NumericField;

use super::session::{AnimationTicket, StepEntry};

/// Discrete inputs a front end delivers to the controller.
///
/// Serialized one per line in event scripts:
///
/// ```json
/// {"type":"select_option","step":0,"value":"Caucasian"}
/// {"type":"slide","field":"libido","value":70}
/// {"type":"continue"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    /// An option clicked on a step.
    SelectOption { step: usize, value: String },
    /// A slider moved.
    Slide { field: NumericField, value: i32 },
    /// The continue button of the current step.
    Continue,
    /// The back button.
    Back,
    /// Navigate to the step named by an address slug.
    Jump {
        #[serde(default)]
        slug: Option<String>,
    },
    /// Answer to the prompt an analysis stage is waiting on.
    AnswerPrompt { value: String },
    /// Any button on the last step.
    Exit,
}

/// What a dispatched event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// A step was entered.
    Entered(StepEntry),
    /// A paused analysis may continue.
    Resumed(AnimationTicket),
    /// Navigation away to the given destination.
    Redirected(String),
    /// State changed without navigation.
    Applied,
    /// The event had no effect.
    Ignored,
}
