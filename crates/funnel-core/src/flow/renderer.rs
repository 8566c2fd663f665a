//! Presentation hooks the controller calls into.

use crate::analysis::PromptSpec;
use crate::selection::NumericField;
use crate::step::StepDefinition;
use crate::summary::DisplayModel;

use super::address::PageAddress;

/// Presentation layer for a funnel session.
///
/// Every hook defaults to a no-op so front ends implement only what they draw.
pub trait FlowRenderer: Send + Sync {
    /// Make `step` the only visible screen.
    fn show_step(&self, _step: &StepDefinition) {}

    fn set_continue_enabled(&self, _step_index: usize, _enabled: bool) {}

    /// Segments `0..=active` of `total` are lit.
    fn update_progress_track(&self, _active: usize, _total: usize) {}

    fn reflect_address(&self, _address: &PageAddress) {}

    /// The options currently marked selected on a step.
    fn mark_options(&self, _step_index: usize, _marked: &[String]) {}

    fn set_slider_label(&self, _field: NumericField, _label: &str) {}

    fn show_progress(&self, _step_index: usize, _values: &[u8]) {}

    fn show_prompt(&self, _step_index: usize, _prompt: &PromptSpec) {}

    fn render_summary(&self, _model: &DisplayModel) {}

    /// Full navigation away to the payment page.
    fn redirect(&self, _destination: &str) {}
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl FlowRenderer for NullRenderer {}
