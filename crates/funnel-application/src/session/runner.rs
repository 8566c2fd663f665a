//! A live funnel session: the controller plus its running animation.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use funnel_core::flow::{AnimationTicket, Dispatched, FlowController, FlowEvent, PendingPrompt, StepEntry};
use funnel_core::selection::{NumericField, SelectionState};
use funnel_core::summary::DisplayModel;
use funnel_execution::{AnimationHandle, AnimatorEvent, ProgressAnimator};

const TARGET: &str = "funnel::session";

/// Snapshot published after every change a front end may want to wait for.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub entry: StepEntry,
    /// An analysis animation is running (or paused on a prompt).
    pub animating: bool,
    pub prompt: Option<PendingPrompt>,
    pub redirect: Option<String>,
}

impl SessionStatus {
    /// Nothing will change until the user acts.
    pub fn is_settled(&self) -> bool {
        !self.animating || self.prompt.is_some() || self.redirect.is_some()
    }
}

struct Inner {
    id: String,
    created_at: DateTime<Utc>,
    controller: Mutex<FlowController>,
    animation: Mutex<Option<AnimationHandle>>,
    animator: ProgressAnimator,
    events_tx: mpsc::UnboundedSender<AnimatorEvent>,
    status_tx: watch::Sender<SessionStatus>,
    shutdown: CancellationToken,
}

/// Drives a [`FlowController`] and the analysis animations it asks for.
///
/// Every step entry cancels the animation of the step being left and, for
/// analysis steps, starts a new one. Animation callbacks are routed back
/// through the controller, which drops the ones from stale tickets.
///
/// Must be created inside a tokio runtime.
#[derive(Clone)]
pub struct FunnelSession {
    inner: Arc<Inner>,
}

impl FunnelSession {
    /// Starts the controller and the task relaying animation events.
    pub fn start(id: impl Into<String>, mut controller: FlowController, animator: ProgressAnimator) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let entry = controller.start();
        let (status_tx, _) = watch::channel(SessionStatus {
            entry: entry.clone(),
            animating: false,
            prompt: None,
            redirect: None,
        });

        let inner = Arc::new(Inner {
            id: id.into(),
            created_at: Utc::now(),
            controller: Mutex::new(controller),
            animation: Mutex::new(None),
            animator,
            events_tx,
            status_tx,
            shutdown: CancellationToken::new(),
        });

        tokio::spawn(pump_events(Arc::downgrade(&inner), events_rx, inner.shutdown.clone()));

        {
            let controller = lock(&inner.controller);
            inner.apply_entry(&controller, entry);
        }
        info!(target: TARGET, session_id = %inner.id, "Session started");

        Self { inner }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    // ============================================================================
    // Inputs
    // ============================================================================

    pub fn dispatch(&self, event: FlowEvent) -> Dispatched {
        let mut controller = lock(&self.inner.controller);
        let dispatched = controller.dispatch(event);
        match &dispatched {
            Dispatched::Entered(entry) => self.inner.apply_entry(&controller, entry.clone()),
            Dispatched::Resumed(ticket) => self.inner.resume(&controller, ticket),
            Dispatched::Redirected(destination) => self.inner.publish_redirect(destination),
            Dispatched::Applied | Dispatched::Ignored => {}
        }
        dispatched
    }

    pub fn select_option(&self, step_index: usize, value: &str) -> Option<StepEntry> {
        self.transition(|controller| controller.select_option(step_index, value))
    }

    pub fn advance(&self) -> Option<StepEntry> {
        self.transition(FlowController::advance)
    }

    pub fn retreat(&self) -> Option<StepEntry> {
        self.transition(FlowController::retreat)
    }

    pub fn continue_current(&self) -> Option<StepEntry> {
        self.transition(FlowController::continue_current)
    }

    pub fn jump(&self, slug: Option<&str>) -> StepEntry {
        let mut controller = lock(&self.inner.controller);
        let entry = controller.jump_from_external_reference(slug);
        self.inner.apply_entry(&controller, entry.clone());
        entry
    }

    pub fn set_slider(&self, field: NumericField, value: i32) -> String {
        lock(&self.inner.controller).set_slider(field, value)
    }

    /// Answers the open prompt and lets its animation continue.
    pub fn answer_prompt(&self, value: &str) -> Option<AnimationTicket> {
        let mut controller = lock(&self.inner.controller);
        let ticket = controller.answer_prompt(value)?;
        self.inner.resume(&controller, &ticket);
        Some(ticket)
    }

    pub fn exit(&self) -> Option<String> {
        let destination = lock(&self.inner.controller).exit()?;
        self.inner.publish_redirect(&destination);
        Some(destination)
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub fn current_index(&self) -> usize {
        lock(&self.inner.controller).current_index()
    }

    pub fn selection(&self) -> SelectionState {
        lock(&self.inner.controller).selection().clone()
    }

    pub fn summary(&self) -> DisplayModel {
        lock(&self.inner.controller).summary()
    }

    pub fn pending_prompt(&self) -> Option<PendingPrompt> {
        lock(&self.inner.controller).pending_prompt().cloned()
    }

    /// Runs `f` against the controller for queries not exposed here.
    pub fn with_controller<R>(&self, f: impl FnOnce(&FlowController) -> R) -> R {
        f(&*lock(&self.inner.controller))
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.status_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Waits until no animation is running, or it is waiting for an answer.
    pub async fn settled(&self) -> SessionStatus {
        let mut rx = self.subscribe();
        match rx.wait_for(SessionStatus::is_settled).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    /// Stops the running animation and the event relay.
    pub fn close(&self) {
        self.inner.shutdown.cancel();
        *lock(&self.inner.animation) = None;
        debug!(target: TARGET, session_id = %self.inner.id, "Session closed");
    }

    fn transition(&self, op: impl FnOnce(&mut FlowController) -> Option<StepEntry>) -> Option<StepEntry> {
        let mut controller = lock(&self.inner.controller);
        let entry = op(&mut *controller)?;
        self.inner.apply_entry(&controller, entry.clone());
        Some(entry)
    }
}

impl std::fmt::Debug for FunnelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunnelSession")
            .field("id", &self.inner.id)
            .field("created_at", &self.inner.created_at)
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// Swaps the running animation for the one `entry` asks for.
    ///
    /// Callers hold the controller lock, so entries are applied in order.
    fn apply_entry(&self, controller: &FlowController, entry: StepEntry) {
        let next = match &entry.animation {
            Some(ticket) if !self.shutdown.is_cancelled() => {
                Some(self.animator.start(ticket.clone(), self.events_tx.clone()))
            }
            _ => None,
        };
        let animating = next.is_some();
        // Dropping the previous handle cancels it.
        *lock(&self.animation) = next;

        self.status_tx.send_replace(SessionStatus {
            entry,
            animating,
            prompt: controller.pending_prompt().cloned(),
            redirect: None,
        });
    }

    fn resume(&self, controller: &FlowController, ticket: &AnimationTicket) {
        if let Some(handle) = lock(&self.animation).as_ref().filter(|h| h.ticket() == ticket) {
            handle.resume();
        }
        self.status_tx.send_modify(|status| status.prompt = controller.pending_prompt().cloned());
    }

    fn publish_redirect(&self, destination: &str) {
        self.status_tx.send_modify(|status| status.redirect = Some(destination.to_string()));
    }

    fn handle_event(&self, event: AnimatorEvent) {
        let mut controller = lock(&self.controller);
        match event {
            AnimatorEvent::Progress { ticket, values } => {
                controller.report_progress(&ticket, &values);
            }
            AnimatorEvent::PromptRaised { ticket, counter, prompt } => {
                if controller.raise_prompt(&ticket, counter, prompt) {
                    self.status_tx.send_modify(|status| status.prompt = controller.pending_prompt().cloned());
                }
            }
            AnimatorEvent::Completed { ticket } => match controller.complete_analysis(&ticket) {
                Some(entry) => self.apply_entry(&controller, entry),
                None if controller.is_ticket_current(&ticket) => {
                    *lock(&self.animation) = None;
                    self.status_tx.send_modify(|status| status.animating = false);
                }
                None => {}
            },
        }
    }
}

async fn pump_events(
    inner: Weak<Inner>,
    mut events_rx: mpsc::UnboundedReceiver<AnimatorEvent>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            event = events_rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.handle_event(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
