//! Step domain module.
//!
//! - `definition`: one screen of the funnel (`StepDefinition`, `SelectionBinding`)
//! - `registry`: the ordered, validated step table (`StepRegistry`)

mod definition;
mod registry;

pub use definition::{SelectionBinding, StepDefinition};
pub use registry::StepRegistry;
