//! Timed runner for analysis stages.
//!
//! Each analysis step gets its own tokio task driving a
//! [`ProgressCounters`] on a fixed tick. The task never touches the
//! controller: it reports through a channel and is cancelled through its
//! [`AnimationHandle`] (dropping the handle cancels too).

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;

use funnel_core::analysis::{ProgressCounters, PromptSpec, TickOutcome};
use funnel_core::config::AnimatorConfig;
use funnel_core::flow::AnimationTicket;

/// Messages sent from a running animation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimatorEvent {
    /// Counter values after a tick.
    Progress {
        ticket: AnimationTicket,
        values: Vec<u8>,
    },
    /// A gated counter reached its target; the animation waits for `resume`.
    PromptRaised {
        ticket: AnimationTicket,
        counter: usize,
        prompt: PromptSpec,
    },
    /// All counters finished and the settle delay elapsed.
    Completed { ticket: AnimationTicket },
}

impl AnimatorEvent {
    pub fn ticket(&self) -> &AnimationTicket {
        match self {
            Self::Progress { ticket, .. } | Self::PromptRaised { ticket, .. } | Self::Completed { ticket } => ticket,
        }
    }
}

/// Starts animations with a shared configuration.
#[derive(Debug, Clone, Default)]
pub struct ProgressAnimator {
    config: AnimatorConfig,
    seed: Option<u64>,
}

impl ProgressAnimator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self { config, seed: None }
    }

    /// Makes increments reproducible. Each ticket still gets its own stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Spawns the animation for `ticket` on the current tokio runtime.
    pub fn start(&self, ticket: AnimationTicket, events: mpsc::UnboundedSender<AnimatorEvent>) -> AnimationHandle {
        let cancel = CancellationToken::new();
        let (resume_tx, resume_rx) = mpsc::unbounded_channel();
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(ticket.epoch)),
            None => StdRng::from_entropy(),
        };

        tracing::debug!(
            target: "funnel::animator",
            step = ticket.step_index,
            epoch = ticket.epoch,
            gated = ticket.stage.is_gated(),
            "Starting analysis animation"
        );

        let join = tokio::spawn(run_animation(
            ticket.clone(),
            self.config.clone(),
            rng,
            events,
            cancel.clone(),
            resume_rx,
        ));

        AnimationHandle {
            ticket,
            cancel,
            resume_tx,
            join,
        }
    }
}

/// Control over one running animation.
#[derive(Debug)]
pub struct AnimationHandle {
    ticket: AnimationTicket,
    cancel: CancellationToken,
    resume_tx: mpsc::UnboundedSender<()>,
    join: JoinHandle<()>,
}

impl AnimationHandle {
    pub fn ticket(&self) -> &AnimationTicket {
        &self.ticket
    }

    /// Lets a paused animation continue with its next counter.
    ///
    /// Returns `false` if the task is gone.
    pub fn resume(&self) -> bool {
        self.resume_tx.send(()).is_ok()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the task to end.
    pub async fn wait(&mut self) {
        if !self.join.is_finished() {
            let _ = (&mut self.join).await;
        }
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_animation(
    ticket: AnimationTicket,
    config: AnimatorConfig,
    mut rng: StdRng,
    events: mpsc::UnboundedSender<AnimatorEvent>,
    cancel: CancellationToken,
    mut resume_rx: mpsc::UnboundedReceiver<()>,
) {
    let mut counters = ProgressCounters::new(&ticket.stage);
    // `interval` rejects a zero period.
    let mut ticker = interval(config.tick_interval().max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(target: "funnel::animator", step = ticket.step_index, "Animation cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        let outcome = counters.tick(&mut rng, config.increment_min, config.increment_max);
        let progress = AnimatorEvent::Progress {
            ticket: ticket.clone(),
            values: counters.values().to_vec(),
        };
        if events.send(progress).is_err() {
            return;
        }

        match outcome {
            TickOutcome::Advanced => {}
            TickOutcome::Finished => break,
            TickOutcome::Paused { counter } => {
                let Some(prompt) = ticket.stage.counters.get(counter).and_then(|c| c.prompt.clone()) else {
                    counters.resume();
                    continue;
                };
                let raised = AnimatorEvent::PromptRaised {
                    ticket: ticket.clone(),
                    counter,
                    prompt,
                };
                if events.send(raised).is_err() {
                    return;
                }

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    resumed = resume_rx.recv() => {
                        if resumed.is_none() {
                            return;
                        }
                    }
                }
                counters.resume();
                ticker.reset();
                if counters.is_complete() {
                    break;
                }
            }
        }
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        _ = sleep(config.settle_delay()) => {}
    }

    tracing::debug!(target: "funnel::animator", step = ticket.step_index, epoch = ticket.epoch, "Animation completed");
    let _ = events.send(AnimatorEvent::Completed { ticket });
}
