//! Summary projection of the final answers.

mod model;
mod renderer;

pub use model::{DisplayModel, Meter};
pub use renderer::{SummaryFallbacks, SummaryRenderer};
