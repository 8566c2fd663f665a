//! Session state owned by the controller.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::{AnalysisStage, PromptSpec};
use crate::selection::SelectionState;

/// Identifies one run of an analysis animation.
///
/// A ticket is only honoured while the controller is still on `step_index`
/// with the same `epoch`; any later transition makes it stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationTicket {
    pub step_index: usize,
    pub epoch: u64,
    pub stage: AnalysisStage,
}

/// Emitted each time a step is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEntry {
    pub index: usize,
    pub slug: String,
    pub epoch: u64,
    /// Present when the entered step is an analysis stage.
    pub animation: Option<AnimationTicket>,
}

/// A prompt raised by a gated analysis stage, waiting for an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrompt {
    pub ticket: AnimationTicket,
    pub counter: usize,
    pub prompt: PromptSpec,
}

/// Mutable state of one funnel run.
#[derive(Debug, Clone, Default)]
pub struct FlowSession {
    pub(crate) current: usize,
    pub(crate) epoch: u64,
    pub(crate) selection: SelectionState,
    pub(crate) marks: BTreeMap<usize, Vec<String>>,
    pub(crate) pending_prompt: Option<PendingPrompt>,
    pub(crate) resumed_without_state: bool,
    pub(crate) exited: bool,
}

impl FlowSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Incremented on every step entry.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Options marked selected on `step_index`.
    pub fn marks(&self, step_index: usize) -> &[String] {
        self.marks.get(&step_index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn pending_prompt(&self) -> Option<&PendingPrompt> {
        self.pending_prompt.as_ref()
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub(crate) fn is_current(&self, ticket: &AnimationTicket) -> bool {
        ticket.epoch == self.epoch && ticket.step_index == self.current
    }
}
