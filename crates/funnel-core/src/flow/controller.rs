//! The step state machine.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::PromptSpec;
use crate::config::FunnelConfig;
use crate::error::Result;
use crate::selection::{Answer, NumericField, SelectionState};
use crate::step::{SelectionBinding, StepDefinition, StepRegistry};
use crate::summary::{DisplayModel, SummaryFallbacks, SummaryRenderer};

use super::address::PageAddress;
use super::event::{Dispatched, FlowEvent};
use super::renderer::FlowRenderer;
use super::session::{AnimationTicket, FlowSession, PendingPrompt, StepEntry};

const TARGET: &str = "funnel::flow";

/// Construction options for a [`FlowController`].
#[derive(Debug, Clone)]
pub struct FlowOptions {
    /// Initial page address; its step parameter selects the starting step.
    pub address: PageAddress,
    /// Payment page the last step redirects to.
    pub exit_destination: Option<String>,
    pub fallbacks: SummaryFallbacks,
}

impl FlowOptions {
    pub fn new(address: PageAddress) -> Self {
        Self {
            address,
            exit_destination: None,
            fallbacks: SummaryFallbacks::default(),
        }
    }

    /// Options from config, optionally starting from an explicit address.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error when the configured base URL or the
    /// given address cannot be parsed.
    pub fn from_config(config: &FunnelConfig, address: Option<&str>) -> Result<Self> {
        let address = match address {
            Some(address) => PageAddress::parse(address, &config.address.param)?,
            None => config.address.page_address()?,
        };
        Ok(Self {
            address,
            exit_destination: config.exit.redirect_url.clone(),
            fallbacks: config.summary.clone(),
        })
    }
}

/// Owns the current step of one session and every transition out of it.
///
/// All operations are total: unknown slugs, empty values, out-of-range
/// indices and stale animation tickets degrade to no-ops or to step 0.
pub struct FlowController {
    registry: Arc<StepRegistry>,
    renderer: Arc<dyn FlowRenderer>,
    session: FlowSession,
    address: PageAddress,
    exit_destination: Option<String>,
    summary: SummaryRenderer,
}

impl FlowController {
    pub fn new(registry: Arc<StepRegistry>, renderer: Arc<dyn FlowRenderer>, options: FlowOptions) -> Self {
        Self {
            registry,
            renderer,
            session: FlowSession::new(),
            address: options.address,
            exit_destination: options.exit_destination,
            summary: SummaryRenderer::new(options.fallbacks),
        }
    }

    /// Enters the starting step: the one named by the initial address, else step 0.
    ///
    /// Answers are never restored from the address. Resuming at a later step
    /// is flagged (see [`Self::resumed_without_state`]) because the summary
    /// and continue gates will then see an empty state.
    pub fn start(&mut self) -> StepEntry {
        let slug = self.address.step_slug();
        let entry = self.jump_from_external_reference(slug.as_deref());
        if entry.index > 0 && self.session.selection.is_pristine() {
            self.session.resumed_without_state = true;
            warn!(
                target: TARGET,
                slug = %entry.slug,
                "Resumed at a later step without prior answers; summary will show fallbacks"
            );
        }
        entry
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn registry(&self) -> &Arc<StepRegistry> {
        &self.registry
    }

    pub fn session(&self) -> &FlowSession {
        &self.session
    }

    pub fn current_index(&self) -> usize {
        self.session.current
    }

    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.registry.get(self.session.current)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.session.selection
    }

    pub fn address(&self) -> &PageAddress {
        &self.address
    }

    pub fn pending_prompt(&self) -> Option<&PendingPrompt> {
        self.session.pending_prompt.as_ref()
    }

    /// True when the session started past step 0 with no answers.
    pub fn resumed_without_state(&self) -> bool {
        self.session.resumed_without_state
    }

    pub fn is_terminal(&self) -> bool {
        self.session.current == self.registry.last_index()
    }

    pub fn summary(&self) -> DisplayModel {
        self.summary.render(&self.session.selection)
    }

    // ============================================================================
    // Navigation
    // ============================================================================

    /// Moves one step forward. No-op on the last step.
    pub fn advance(&mut self) -> Option<StepEntry> {
        let current = self.session.current;
        if current >= self.registry.last_index() {
            debug!(target: TARGET, current, "Advance ignored on the last step");
            return None;
        }
        Some(self.enter(current + 1))
    }

    /// Moves one step back. No-op on step 0.
    ///
    /// Re-entering an analysis step starts its animation from scratch.
    pub fn retreat(&mut self) -> Option<StepEntry> {
        let current = self.session.current;
        if current == 0 {
            return None;
        }
        Some(self.enter(current - 1))
    }

    /// Enters the step named by `slug`; unknown or missing slugs land on step 0.
    pub fn jump_from_external_reference(&mut self, slug: Option<&str>) -> StepEntry {
        let index = self.registry.resolve_slug(slug);
        if index == 0 && slug.is_some_and(|s| self.registry.index_of(s.trim()).is_none()) {
            debug!(target: TARGET, slug = ?slug, "Unknown step slug, falling back to the first step");
        }
        self.enter(index)
    }

    /// Whether the continue affordance of `step_index` is enabled.
    ///
    /// False only for a requires-selection step whose bound field is empty.
    pub fn continue_enabled(&self, step_index: usize) -> bool {
        match self.registry.get(step_index) {
            Some(step) if step.requires_selection => step
                .binding
                .is_some_and(|binding| self.session.selection.has_value(binding.field())),
            _ => true,
        }
    }

    /// Manual continue from `step_index`: advances only if it is the current
    /// step and its gate is open.
    pub fn continue_from(&mut self, step_index: usize) -> Option<StepEntry> {
        if step_index != self.session.current {
            debug!(target: TARGET, step_index, current = self.session.current, "Continue from a step that is not current");
            return None;
        }
        if !self.continue_enabled(step_index) {
            debug!(target: TARGET, step_index, "Continue blocked until a selection is made");
            return None;
        }
        self.advance()
    }

    pub fn continue_current(&mut self) -> Option<StepEntry> {
        self.continue_from(self.session.current)
    }

    // ============================================================================
    // Input
    // ============================================================================

    /// An option click on `step_index`.
    ///
    /// Returns the entered step when the click auto-advanced.
    pub fn select_option(&mut self, step_index: usize, value: &str) -> Option<StepEntry> {
        match self.select(step_index, value) {
            Dispatched::Entered(entry) => Some(entry),
            _ => None,
        }
    }

    fn select(&mut self, step_index: usize, value: &str) -> Dispatched {
        if value.is_empty() {
            return Dispatched::Ignored;
        }
        let registry = Arc::clone(&self.registry);
        let Some(step) = registry.get(step_index) else {
            debug!(target: TARGET, step_index, "Option click on an unknown step");
            return Dispatched::Ignored;
        };

        if let Some(SelectionBinding::List(field)) = step.binding {
            let now_selected = self.session.selection.toggle_in_list(field, value);
            let marks = self.session.marks.entry(step_index).or_default();
            if now_selected {
                if !marks.iter().any(|m| m == value) {
                    marks.push(value.to_string());
                }
            } else {
                marks.retain(|m| m != value);
            }
            debug!(target: TARGET, step = %step.slug, value, now_selected, "Toggled option");
            self.refresh_step_controls(step_index);
            return Dispatched::Applied;
        }

        self.session.marks.insert(step_index, vec![value.to_string()]);
        match step.binding {
            Some(SelectionBinding::Scalar(field)) => self.session.selection.set_scalar(field, value),
            Some(SelectionBinding::Answer(field)) => match value.parse::<Answer>() {
                Ok(answer) => self.session.selection.set_answer(field, answer),
                Err(_) => debug!(target: TARGET, step = %step.slug, value, "Option is not a Yes/No answer"),
            },
            _ => {}
        }
        debug!(target: TARGET, step = %step.slug, value, "Selected option");
        self.refresh_step_controls(step_index);

        if step.auto_advance && step_index == self.session.current {
            if let Some(entry) = self.advance() {
                return Dispatched::Entered(entry);
            }
        }
        Dispatched::Applied
    }

    /// A slider moved. The value is clamped to 0..=100; returns the display label.
    pub fn set_slider(&mut self, field: NumericField, value: i32) -> String {
        let value = value.clamp(0, 100);
        self.session.selection.set_numeric(field, value);
        let label = format!("{}%", value);
        self.renderer.set_slider_label(field, &label);
        label
    }

    /// Any button on the last step: redirects to the payment destination.
    pub fn exit(&mut self) -> Option<String> {
        if !self.is_terminal() {
            return None;
        }
        let destination = self.exit_destination.clone()?;
        self.session.exited = true;
        info!(target: TARGET, destination = %destination, "Leaving the funnel");
        self.renderer.redirect(&destination);
        Some(destination)
    }

    /// Applies one input event.
    pub fn dispatch(&mut self, event: FlowEvent) -> Dispatched {
        match event {
            FlowEvent::SelectOption { step, value } => self.select(step, &value),
            FlowEvent::Slide { field, value } => {
                self.set_slider(field, value);
                Dispatched::Applied
            }
            FlowEvent::Continue => self.continue_current().map_or(Dispatched::Ignored, Dispatched::Entered),
            FlowEvent::Back => self.retreat().map_or(Dispatched::Ignored, Dispatched::Entered),
            FlowEvent::Jump { slug } => Dispatched::Entered(self.jump_from_external_reference(slug.as_deref())),
            FlowEvent::AnswerPrompt { value } => self.answer_prompt(&value).map_or(Dispatched::Ignored, Dispatched::Resumed),
            FlowEvent::Exit => self.exit().map_or(Dispatched::Ignored, Dispatched::Redirected),
        }
    }

    // ============================================================================
    // Analysis callbacks (stale-guarded)
    // ============================================================================

    /// Whether `ticket` still belongs to the visible step.
    pub fn is_ticket_current(&self, ticket: &AnimationTicket) -> bool {
        self.session.is_current(ticket)
    }

    pub fn report_progress(&self, ticket: &AnimationTicket, values: &[u8]) -> bool {
        if !self.session.is_current(ticket) {
            return false;
        }
        self.renderer.show_progress(ticket.step_index, values);
        true
    }

    /// A gated counter reached its target and waits for `prompt`.
    pub fn raise_prompt(&mut self, ticket: &AnimationTicket, counter: usize, prompt: PromptSpec) -> bool {
        if !self.session.is_current(ticket) {
            debug!(target: TARGET, step = ticket.step_index, "Dropped prompt from a step no longer visible");
            return false;
        }
        self.renderer.show_prompt(ticket.step_index, &prompt);
        self.session.pending_prompt = Some(PendingPrompt {
            ticket: ticket.clone(),
            counter,
            prompt,
        });
        true
    }

    /// Answers the pending prompt and returns the ticket whose animation may resume.
    pub fn answer_prompt(&mut self, value: &str) -> Option<AnimationTicket> {
        let pending = self.session.pending_prompt.take()?;
        if !self.session.is_current(&pending.ticket) {
            return None;
        }
        self.session.selection.record_prompt_answer(&pending.prompt.key, value);
        debug!(target: TARGET, key = %pending.prompt.key, value, "Prompt answered");
        Some(pending.ticket)
    }

    /// The animation for `ticket` finished; advance if it is still current.
    pub fn complete_analysis(&mut self, ticket: &AnimationTicket) -> Option<StepEntry> {
        if !self.session.is_current(ticket) {
            debug!(
                target: TARGET,
                step = ticket.step_index,
                epoch = ticket.epoch,
                current_epoch = self.session.epoch,
                "Ignored stale analysis completion"
            );
            return None;
        }
        if self.session.pending_prompt.is_some() {
            debug!(target: TARGET, step = ticket.step_index, "Completion ignored while a prompt is open");
            return None;
        }
        self.advance()
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn enter(&mut self, index: usize) -> StepEntry {
        let registry = Arc::clone(&self.registry);
        let index = index.min(registry.last_index());

        self.session.current = index;
        self.session.epoch += 1;
        self.session.pending_prompt = None;

        let slug = registry.slug_for(index);
        self.address = self.address.with_step(&slug);

        let step = registry.get(index);
        if let Some(step) = step {
            self.renderer.show_step(step);
        }
        self.renderer.reflect_address(&self.address);
        self.renderer.update_progress_track(index, registry.len());
        self.refresh_step_controls(index);

        let animation = step.and_then(|step| step.analysis.clone()).map(|stage| AnimationTicket {
            step_index: index,
            epoch: self.session.epoch,
            stage,
        });

        if step.is_some_and(|step| step.summary) {
            let model = self.summary();
            self.renderer.render_summary(&model);
        }

        debug!(target: TARGET, index, slug = %slug, epoch = self.session.epoch, "Entered step");
        StepEntry {
            index,
            slug,
            epoch: self.session.epoch,
            animation,
        }
    }

    fn refresh_step_controls(&self, step_index: usize) {
        self.renderer
            .set_continue_enabled(step_index, self.continue_enabled(step_index));
        self.renderer
            .mark_options(step_index, self.session.marks(step_index));
    }
}
