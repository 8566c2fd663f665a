//! Core domain of the Funnel quiz engine.
//!
//! A funnel is a linear sequence of screens. This crate owns the parts with
//! behaviour: the answers collected so far ([`selection`]), the step table
//! ([`step`]), the step state machine ([`flow`]), the pure model behind the
//! simulated analysis screens ([`analysis`]) and the summary projection
//! ([`summary`]). Everything visual is reached through
//! [`flow::FlowRenderer`].

pub mod analysis;
pub mod config;
pub mod error;
pub mod flow;
pub mod selection;
pub mod step;
pub mod summary;

// Re-export common types
pub use config::FunnelConfig;
pub use error::{FunnelError, Result};
pub use flow::{FlowController, FlowEvent, FlowOptions, FlowRenderer};
pub use selection::SelectionState;
pub use step::{StepDefinition, StepRegistry};
pub use summary::{DisplayModel, SummaryRenderer};
