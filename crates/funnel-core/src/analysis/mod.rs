//! Analysis stage domain module.
//!
//! Describes the simulated "analysis" screens and the pure counter model
//! behind their progress bars. The timed, cancellable runner lives in
//! `funnel-execution`.

mod progress;
mod stage;

pub use progress::{ProgressCounters, TickOutcome};
pub use stage::{AnalysisStage, CounterSpec, MAX_COUNTERS, PromptSpec};
