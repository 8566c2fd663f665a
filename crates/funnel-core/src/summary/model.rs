use serde::{Deserialize, Serialize};

/// A percentage meter for one slider answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meter {
    /// The stored value.
    pub value: i32,
    /// Fill width, clamped to 0..=100.
    pub percent: u8,
    /// Display text, e.g. `"50%"`.
    pub label: String,
}

impl Meter {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            percent: value.clamp(0, 100) as u8,
            label: format!("{}%", value),
        }
    }
}

/// Everything the summary screen shows. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayModel {
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
    pub libido: Meter,
    pub kink: Meter,
    pub nudity: Meter,
    /// Tags for the extras list.
    pub extras: Vec<String>,
}
