//! Headless renderer that records every presentation call.
//!
//! Used by script replays (`funnel replay --trace`) and by tests.

use serde::Serialize;
use std::sync::Mutex;

use crate::analysis::PromptSpec;
use crate::selection::NumericField;
use crate::step::StepDefinition;
use crate::summary::DisplayModel;

use super::address::PageAddress;
use super::renderer::FlowRenderer;

/// One recorded presentation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum RenderCall {
    ShowStep { index: usize, slug: String },
    ContinueEnabled { step: usize, enabled: bool },
    ProgressTrack { active: usize, total: usize },
    Address { url: String },
    Marks { step: usize, marked: Vec<String> },
    SliderLabel { field: NumericField, label: String },
    Progress { step: usize, values: Vec<u8> },
    Prompt { step: usize, key: String, question: String },
    Summary { model: DisplayModel },
    Redirect { destination: String },
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: RenderCall) {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }

    /// A copy of everything recorded so far.
    pub fn calls(&self) -> Vec<RenderCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<RenderCall> {
        match self.calls.lock() {
            Ok(mut calls) => std::mem::take(&mut *calls),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// The indices passed to `show_step`, in order.
    pub fn shown_steps(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RenderCall::ShowStep { index, .. } => Some(index),
                _ => None,
            })
            .collect()
    }

    /// The last continue-gate state reported for `step`.
    pub fn continue_enabled(&self, step: usize) -> Option<bool> {
        self.calls().into_iter().rev().find_map(|call| match call {
            RenderCall::ContinueEnabled { step: s, enabled } if s == step => Some(enabled),
            _ => None,
        })
    }

    /// The last rendered summary, if any.
    pub fn last_summary(&self) -> Option<DisplayModel> {
        self.calls().into_iter().rev().find_map(|call| match call {
            RenderCall::Summary { model } => Some(model),
            _ => None,
        })
    }
}

impl FlowRenderer for RecordingRenderer {
    fn show_step(&self, step: &StepDefinition) {
        self.push(RenderCall::ShowStep {
            index: step.index,
            slug: step.slug.clone(),
        });
    }

    fn set_continue_enabled(&self, step_index: usize, enabled: bool) {
        self.push(RenderCall::ContinueEnabled {
            step: step_index,
            enabled,
        });
    }

    fn update_progress_track(&self, active: usize, total: usize) {
        self.push(RenderCall::ProgressTrack { active, total });
    }

    fn reflect_address(&self, address: &PageAddress) {
        self.push(RenderCall::Address {
            url: address.to_string(),
        });
    }

    fn mark_options(&self, step_index: usize, marked: &[String]) {
        self.push(RenderCall::Marks {
            step: step_index,
            marked: marked.to_vec(),
        });
    }

    fn set_slider_label(&self, field: NumericField, label: &str) {
        self.push(RenderCall::SliderLabel {
            field,
            label: label.to_string(),
        });
    }

    fn show_progress(&self, step_index: usize, values: &[u8]) {
        self.push(RenderCall::Progress {
            step: step_index,
            values: values.to_vec(),
        });
    }

    fn show_prompt(&self, step_index: usize, prompt: &PromptSpec) {
        self.push(RenderCall::Prompt {
            step: step_index,
            key: prompt.key.clone(),
            question: prompt.question.clone(),
        });
    }

    fn render_summary(&self, model: &DisplayModel) {
        self.push(RenderCall::Summary {
            model: model.clone(),
        });
    }

    fn redirect(&self, destination: &str) {
        self.push(RenderCall::Redirect {
            destination: destination.to_string(),
        });
    }
}
